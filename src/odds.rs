//! Bookmaker exact-score odds: grouping, averaging and value tiers.
//!
//! A higher coefficient means the market rates the exact score as less likely.
//! The predictor treats high coefficients as possible hidden value, i.e. scores
//! the market may be underpricing. That is a modelling choice, not a
//! statistical result.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::PredictError;
use crate::model::{BookmakerOdd, MAX_BOOKMAKER_SLOTS, MatchConfiguration};
use crate::score::{Score, check_coefficient, parse_coefficient, parse_score};

pub const PREMIUM_MIN: f64 = 8.0;
pub const HIGH_MIN: f64 = 4.0;
pub const MEDIUM_MIN: f64 = 2.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueTier {
    Premium,
    High,
    Medium,
    Low,
}

impl ValueTier {
    /// Highest tier first.
    pub const ALL: [ValueTier; 4] = [
        ValueTier::Premium,
        ValueTier::High,
        ValueTier::Medium,
        ValueTier::Low,
    ];

    pub fn classify(average: f64) -> Self {
        if average >= PREMIUM_MIN {
            ValueTier::Premium
        } else if average >= HIGH_MIN {
            ValueTier::High
        } else if average >= MEDIUM_MIN {
            ValueTier::Medium
        } else {
            ValueTier::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ValueTier::Premium => "premium",
            ValueTier::High => "high",
            ValueTier::Medium => "medium",
            ValueTier::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoefficientRange {
    pub min: f64,
    pub max: f64,
}

impl CoefficientRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    pub premium: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

/// One distinct exact score and the mean of every coefficient quoted for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreOdds {
    /// The score text as quoted; grouping is by exact text.
    pub key: String,
    pub score: Score,
    pub average: f64,
    pub quotes: usize,
    pub tier: ValueTier,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueTiers {
    pub premium: Vec<ScoreOdds>,
    pub high: Vec<ScoreOdds>,
    pub medium: Vec<ScoreOdds>,
    pub low: Vec<ScoreOdds>,
}

impl ValueTiers {
    pub fn get(&self, tier: ValueTier) -> &[ScoreOdds] {
        match tier {
            ValueTier::Premium => &self.premium,
            ValueTier::High => &self.high,
            ValueTier::Medium => &self.medium,
            ValueTier::Low => &self.low,
        }
    }

    fn get_mut(&mut self, tier: ValueTier) -> &mut Vec<ScoreOdds> {
        match tier {
            ValueTier::Premium => &mut self.premium,
            ValueTier::High => &mut self.high,
            ValueTier::Medium => &mut self.medium,
            ValueTier::Low => &mut self.low,
        }
    }

    pub fn counts(&self) -> TierCounts {
        TierCounts {
            premium: self.premium.len(),
            high: self.high.len(),
            medium: self.medium.len(),
            low: self.low.len(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OddsAnalysis {
    /// Distinct scores in order of first appearance.
    pub average_odds_by_score: Vec<ScoreOdds>,
    /// `None` when no odds were supplied.
    pub coefficient_range: Option<CoefficientRange>,
    /// Each tier sorted by average, highest first; ties keep input order.
    pub value_tiers: ValueTiers,
    pub entries: usize,
}

impl OddsAnalysis {
    pub fn distinct_scores(&self) -> usize {
        self.average_odds_by_score.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    pub fn average_for(&self, key: &str) -> Option<f64> {
        let key = key.trim();
        self.average_odds_by_score
            .iter()
            .find(|s| s.key == key)
            .map(|s| s.average)
    }

    pub fn tier_of(&self, key: &str) -> Option<ValueTier> {
        let key = key.trim();
        self.average_odds_by_score
            .iter()
            .find(|s| s.key == key)
            .map(|s| s.tier)
    }

    pub fn best_in(&self, tier: ValueTier) -> Option<&ScoreOdds> {
        self.value_tiers.get(tier).first()
    }

    /// Highest average across every tier; first listed wins a tie.
    pub fn best_overall(&self) -> Option<&ScoreOdds> {
        let mut best: Option<&ScoreOdds> = None;
        for entry in &self.average_odds_by_score {
            match best {
                Some(b) if entry.average <= b.average => {}
                _ => best = Some(entry),
            }
        }
        best
    }

    pub fn has_hidden_value(&self) -> bool {
        !self.value_tiers.premium.is_empty() || !self.value_tiers.high.is_empty()
    }
}

/// Groups quotes by exact score, averages them and buckets each score into a tier.
///
/// Every entry is re-validated; the first malformed score or coefficient fails the call.
pub fn analyze_odds(odds: &[BookmakerOdd]) -> Result<OddsAnalysis, PredictError> {
    let mut index_by_key: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Score, f64, usize)> = Vec::new();
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for (idx, odd) in odds.iter().enumerate() {
        let score = parse_score(&format!("odds[{idx}].score"), &odd.score)?;
        let coefficient = check_coefficient(&format!("odds[{idx}].coefficient"), odd.coefficient)?;

        min = min.min(coefficient);
        max = max.max(coefficient);

        let key = odd.score.trim().to_string();
        match index_by_key.get(&key) {
            Some(&pos) => {
                let group = &mut groups[pos];
                group.2 += coefficient;
                group.3 += 1;
            }
            None => {
                index_by_key.insert(key.clone(), groups.len());
                groups.push((key, score, coefficient, 1));
            }
        }
    }

    if groups.is_empty() {
        return Ok(OddsAnalysis::default());
    }

    let average_odds_by_score: Vec<ScoreOdds> = groups
        .into_iter()
        .map(|(key, score, sum, quotes)| {
            let average = sum / quotes as f64;
            ScoreOdds {
                key,
                score,
                average,
                quotes,
                tier: ValueTier::classify(average),
            }
        })
        .collect();

    let mut value_tiers = ValueTiers::default();
    for entry in &average_odds_by_score {
        value_tiers.get_mut(entry.tier).push(entry.clone());
    }
    for tier in ValueTier::ALL {
        // Stable sort, so equal averages stay in input order.
        value_tiers
            .get_mut(tier)
            .sort_by(|a, b| b.average.total_cmp(&a.average));
    }

    Ok(OddsAnalysis {
        average_odds_by_score,
        coefficient_range: Some(CoefficientRange { min, max }),
        value_tiers,
        entries: odds.len(),
    })
}

/// Merges the form's bookmaker slots (first [`MAX_BOOKMAKER_SLOTS`], half-filled
/// ones dropped) with the separate odds list, slots first.
pub fn gather_bookmaker_odds(
    config: &MatchConfiguration,
    odds: &[BookmakerOdd],
) -> Result<Vec<BookmakerOdd>, PredictError> {
    let mut out = Vec::with_capacity(MAX_BOOKMAKER_SLOTS + odds.len());

    for (idx, slot) in config
        .bookmaker_slots
        .iter()
        .take(MAX_BOOKMAKER_SLOTS)
        .enumerate()
    {
        if !slot.is_filled() {
            continue;
        }
        parse_score(&format!("bookmaker[{idx}].score"), &slot.score)?;
        let coefficient =
            parse_coefficient(&format!("bookmaker[{idx}].coefficient"), &slot.coefficient)?;
        out.push(BookmakerOdd {
            score: slot.score.trim().to_string(),
            coefficient,
            bookmaker_name: None,
        });
    }

    for (idx, odd) in odds.iter().enumerate() {
        if odd.score.trim().is_empty() {
            continue;
        }
        parse_score(&format!("odds[{idx}].score"), &odd.score)?;
        check_coefficient(&format!("odds[{idx}].coefficient"), odd.coefficient)?;
        out.push(BookmakerOdd {
            score: odd.score.trim().to_string(),
            coefficient: odd.coefficient,
            bookmaker_name: odd.bookmaker_name.clone(),
        });
    }

    Ok(out)
}
