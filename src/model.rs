use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::odds::{CoefficientRange, TierCounts};
use crate::score::{Score, is_blank};

/// Bookmaker slots the match form offers.
pub const MAX_BOOKMAKER_SLOTS: usize = 20;
/// Complete H2H records the form requires before asking for a prediction.
pub const MIN_H2H_RECORDS: usize = 3;
/// Bookmaker odds the form requires before asking for a prediction.
pub const MIN_BOOKMAKER_ODDS: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct H2hRecord {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub half_time_score: String,
    #[serde(default)]
    pub full_time_score: String,
}

impl H2hRecord {
    pub fn new(date: &str, half_time: &str, full_time: &str) -> Self {
        Self {
            date: date.to_string(),
            half_time_score: half_time.to_string(),
            full_time_score: full_time.to_string(),
        }
    }

    /// All three fields filled in. Incomplete rows are form leftovers, not data.
    pub fn is_complete(&self) -> bool {
        !is_blank(&self.date) && !is_blank(&self.half_time_score) && !is_blank(&self.full_time_score)
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmakerOdd {
    pub score: String,
    pub coefficient: f64,
    #[serde(default, alias = "bookmaker")]
    pub bookmaker_name: Option<String>,
}

impl BookmakerOdd {
    pub fn new(score: &str, coefficient: f64) -> Self {
        Self {
            score: score.to_string(),
            coefficient,
            bookmaker_name: None,
        }
    }

    pub fn with_bookmaker(mut self, name: &str) -> Self {
        self.bookmaker_name = Some(name.to_string());
        self
    }
}

/// One of the form's raw (score, coefficient) bookmaker slots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmakerSlot {
    #[serde(default)]
    pub score: String,
    #[serde(default)]
    pub coefficient: String,
}

impl BookmakerSlot {
    pub fn new(score: &str, coefficient: &str) -> Self {
        Self {
            score: score.to_string(),
            coefficient: coefficient.to_string(),
        }
    }

    pub fn is_filled(&self) -> bool {
        !is_blank(&self.score) && !is_blank(&self.coefficient)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExactScores {
    #[serde(default)]
    pub half_time: String,
    #[serde(default)]
    pub full_time: String,
}

impl ExactScores {
    pub fn half_time(&self) -> Option<&str> {
        non_blank(&self.half_time)
    }

    pub fn full_time(&self) -> Option<&str> {
        non_blank(&self.full_time)
    }
}

fn non_blank(raw: &str) -> Option<&str> {
    let s = raw.trim();
    if s.is_empty() { None } else { Some(s) }
}

/// Everything the match form collects. Read-only input to the predictor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchConfiguration {
    #[serde(default)]
    pub team_a: String,
    #[serde(default)]
    pub team_b: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub h2h_results: Vec<H2hRecord>,
    #[serde(default)]
    pub exact_scores: ExactScores,
    #[serde(default)]
    pub bookmaker_slots: Vec<BookmakerSlot>,
}

impl MatchConfiguration {
    pub fn new(team_a: &str, team_b: &str) -> Self {
        Self {
            team_a: team_a.to_string(),
            team_b: team_b.to_string(),
            ..Self::default()
        }
    }

    pub fn complete_h2h_count(&self) -> usize {
        self.h2h_results.iter().filter(|r| r.is_complete()).count()
    }

    pub fn label(&self) -> String {
        format!("{} vs {}", self.team_a.trim(), self.team_b.trim())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    BookmakerPremium,
    BookmakerHigh,
    BookmakerMedium,
    BookmakerAny,
    UserPrediction,
    Generated,
}

impl ScoreSource {
    pub fn tag(self) -> &'static str {
        match self {
            ScoreSource::BookmakerPremium => "bookmaker_premium",
            ScoreSource::BookmakerHigh => "bookmaker_high",
            ScoreSource::BookmakerMedium => "bookmaker_medium",
            ScoreSource::BookmakerAny => "bookmaker_any",
            ScoreSource::UserPrediction => "user_prediction",
            ScoreSource::Generated => "generated",
        }
    }

    pub fn is_bookmaker(self) -> bool {
        matches!(
            self,
            ScoreSource::BookmakerPremium
                | ScoreSource::BookmakerHigh
                | ScoreSource::BookmakerMedium
                | ScoreSource::BookmakerAny
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HalfTimeSource {
    UserPrediction,
    Derived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn from_confidence(confidence: u8) -> Self {
        if confidence >= 80 {
            ConfidenceLevel::High
        } else if confidence >= 60 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConfidenceLevel::High => "High Confidence",
            ConfidenceLevel::Medium => "Medium Confidence",
            ConfidenceLevel::Low => "Low Confidence",
        }
    }
}

/// Thin input that still produces a prediction, only a less trustworthy one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataAdvisory {
    FewH2hRecords { have: usize, need: usize },
    FewBookmakerOdds { have: usize, need: usize },
}

impl DataAdvisory {
    pub fn message(&self) -> String {
        match self {
            DataAdvisory::FewH2hRecords { have, need } => {
                format!("only {have} complete H2H records (at least {need} recommended)")
            }
            DataAdvisory::FewBookmakerOdds { have, need } => {
                format!("only {have} bookmaker odds (at least {need} recommended)")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionFactors {
    pub h2h_pattern: String,
    pub average_goals: f64,
    pub h2h_matches: usize,
    pub score_source: ScoreSource,
    pub bookmaker_options: usize,
    pub distinct_scores: usize,
    pub tier_distribution: TierCounts,
    pub odds_signal: String,
    pub selected_coefficient: Option<f64>,
    pub coefficient_range: Option<CoefficientRange>,
}

impl PredictionFactors {
    /// Label/value pairs in display order.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let tiers = &self.tier_distribution;
        vec![
            ("H2H Pattern", self.h2h_pattern.clone()),
            ("Average Goals", format!("{:.2}", self.average_goals)),
            ("H2H Matches", self.h2h_matches.to_string()),
            ("Score Source", self.score_source.tag().to_string()),
            ("Bookmaker Options", self.bookmaker_options.to_string()),
            ("Distinct Scores", self.distinct_scores.to_string()),
            (
                "Value Tiers",
                format!(
                    "premium {} / high {} / medium {} / low {}",
                    tiers.premium, tiers.high, tiers.medium, tiers.low
                ),
            ),
            ("Odds Analysis", self.odds_signal.clone()),
            (
                "Selected Coefficient",
                self.selected_coefficient
                    .map(|c| format!("{c:.2}"))
                    .unwrap_or_else(|| "-".to_string()),
            ),
            (
                "Coefficient Range",
                self.coefficient_range
                    .map(|r| format!("{:.2} - {:.2}", r.min, r.max))
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub half_time_score: Score,
    pub full_time_score: Score,
    pub half_time_source: HalfTimeSource,
    pub confidence: u8,
    pub score_source: ScoreSource,
    pub factors: PredictionFactors,
    #[serde(default)]
    pub advisories: Vec<DataAdvisory>,
}

impl Prediction {
    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_confidence(self.confidence)
    }
}
