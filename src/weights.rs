use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::PredictError;
use crate::score::parse_score;

/// Scores typical of high-scoring virtual fixtures, used when nothing better is known.
pub const FALLBACK_SCORES: [&str; 20] = [
    "2-1", "3-1", "2-2", "3-2", "4-1", "3-3", "4-2", "5-1", "4-3", "5-2", "1-2", "1-3", "2-4",
    "1-4", "2-5", "3-4", "1-0", "0-1", "2-0", "0-2",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceBonus {
    pub premium: f64,
    pub high: f64,
    pub medium: f64,
    pub any_bookmaker: f64,
    pub user_prediction: f64,
    pub generated: f64,
}

impl Default for SourceBonus {
    fn default() -> Self {
        Self {
            premium: 35.0,
            high: 25.0,
            medium: 15.0,
            any_bookmaker: 10.0,
            user_prediction: 12.0,
            generated: 0.0,
        }
    }
}

/// Share of each side's full-time goals already scored at half-time, drawn per side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HalfTimeFraction {
    pub min: f64,
    pub max: f64,
}

impl Default for HalfTimeFraction {
    fn default() -> Self {
        Self { min: 0.4, max: 0.8 }
    }
}

/// Heuristic constants of the predictor. Unverified domain assumptions;
/// callers may tune them but the defaults are the product's values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionWeights {
    pub base_confidence: f64,
    pub per_data_point: f64,
    pub base_cap: f64,
    pub source_bonus: SourceBonus,
    pub rich_odds_threshold: usize,
    pub rich_odds_bonus: f64,
    pub very_rich_odds_threshold: usize,
    pub very_rich_odds_bonus: f64,
    pub premium_presence_bonus: f64,
    pub jitter_max: u32,
    pub confidence_ceiling: f64,
    pub half_time_fraction: HalfTimeFraction,
    pub fallback_scores: Vec<String>,
    /// Applied to the fallback pool only when the H2H history is high-scoring.
    pub fallback_min_total: u32,
}

impl Default for PredictionWeights {
    fn default() -> Self {
        Self {
            base_confidence: 50.0,
            per_data_point: 1.5,
            base_cap: 95.0,
            source_bonus: SourceBonus::default(),
            rich_odds_threshold: 10,
            rich_odds_bonus: 8.0,
            very_rich_odds_threshold: 15,
            very_rich_odds_bonus: 5.0,
            premium_presence_bonus: 8.0,
            jitter_max: 3,
            confidence_ceiling: 98.0,
            half_time_fraction: HalfTimeFraction::default(),
            fallback_scores: FALLBACK_SCORES.iter().map(|s| s.to_string()).collect(),
            fallback_min_total: 3,
        }
    }
}

impl PredictionWeights {
    pub fn validate(&self) -> Result<(), PredictError> {
        let frac = self.half_time_fraction;
        if !(frac.min > 0.0 && frac.min < frac.max && frac.max <= 1.0) {
            return Err(PredictError::InvalidWeights(format!(
                "half-time fraction must satisfy 0 < min < max <= 1 (got {}..{})",
                frac.min, frac.max
            )));
        }
        if !(0.0..=100.0).contains(&self.confidence_ceiling) {
            return Err(PredictError::InvalidWeights(format!(
                "confidence ceiling must lie in 0..=100 (got {})",
                self.confidence_ceiling
            )));
        }
        let numbers = [
            self.base_confidence,
            self.per_data_point,
            self.base_cap,
            self.rich_odds_bonus,
            self.very_rich_odds_bonus,
            self.premium_presence_bonus,
            self.source_bonus.premium,
            self.source_bonus.high,
            self.source_bonus.medium,
            self.source_bonus.any_bookmaker,
            self.source_bonus.user_prediction,
            self.source_bonus.generated,
        ];
        if numbers.iter().any(|v| !v.is_finite()) {
            return Err(PredictError::InvalidWeights(
                "confidence terms must be finite".to_string(),
            ));
        }
        if self.fallback_scores.is_empty() {
            return Err(PredictError::InvalidWeights(
                "fallback score pool is empty".to_string(),
            ));
        }
        for (idx, raw) in self.fallback_scores.iter().enumerate() {
            parse_score(&format!("fallback_scores[{idx}]"), raw)?;
        }
        Ok(())
    }
}

/// Reads a weights snapshot; a missing file yields the defaults.
pub fn load_weights(path: &Path) -> Result<PredictionWeights> {
    if !path.exists() {
        warn!(path = %path.display(), "weights file not found, using defaults");
        return Ok(PredictionWeights::default());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read weights from {}", path.display()))?;
    let weights: PredictionWeights =
        serde_json::from_str(&raw).with_context(|| format!("parse weights {}", path.display()))?;
    weights.validate()?;
    info!(path = %path.display(), "loaded prediction weights");
    Ok(weights)
}

pub fn save_weights(path: &Path, weights: &PredictionWeights) -> Result<()> {
    weights.validate()?;
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(weights).context("serialize prediction weights")?;
    fs::write(&tmp, json).context("write prediction weights")?;
    fs::rename(&tmp, path).context("swap prediction weights")?;
    Ok(())
}
