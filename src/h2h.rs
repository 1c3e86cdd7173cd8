use serde::{Deserialize, Serialize};

use crate::error::PredictError;
use crate::model::H2hRecord;
use crate::score::parse_score;

/// Average full-time goals assumed when there is no history; the competition is high-scoring.
pub const DEFAULT_AVERAGE_GOALS: f64 = 4.2;
/// Averages above this mark the fixture as high-scoring.
pub const HIGH_SCORING_THRESHOLD: f64 = 4.0;

/// Per-match aggregates of the head-to-head history, index-aligned with the input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct H2hSummary {
    pub total_goals_per_match: Vec<u32>,
    pub half_time_goals_per_match: Vec<u32>,
    pub score_differences: Vec<u32>,
}

impl H2hSummary {
    pub fn matches(&self) -> usize {
        self.total_goals_per_match.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_goals_per_match.is_empty()
    }

    /// Mean full-time goals, or [`DEFAULT_AVERAGE_GOALS`] for an empty history.
    pub fn average_total_goals(&self) -> f64 {
        mean(&self.total_goals_per_match).unwrap_or(DEFAULT_AVERAGE_GOALS)
    }

    pub fn average_half_time_goals(&self) -> Option<f64> {
        mean(&self.half_time_goals_per_match)
    }

    pub fn average_score_difference(&self) -> Option<f64> {
        mean(&self.score_differences)
    }

    pub fn is_high_scoring(&self) -> bool {
        self.average_total_goals() > HIGH_SCORING_THRESHOLD
    }

    pub fn pattern_label(&self) -> &'static str {
        if self.is_high_scoring() {
            "High-Scoring"
        } else {
            "Moderate"
        }
    }
}

fn mean(values: &[u32]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: u64 = values.iter().map(|&v| v as u64).sum();
    Some(sum as f64 / values.len() as f64)
}

/// Aggregates the complete records of a head-to-head history.
///
/// Incomplete rows (any blank field) are skipped; a complete row with an
/// unparseable score fails the whole call.
pub fn analyze_head_to_head(records: &[H2hRecord]) -> Result<H2hSummary, PredictError> {
    let mut summary = H2hSummary::default();

    for (idx, record) in records.iter().enumerate() {
        if !record.is_complete() {
            continue;
        }
        let half = parse_score(&format!("h2h[{idx}].half_time"), &record.half_time_score)?;
        let full = parse_score(&format!("h2h[{idx}].full_time"), &record.full_time_score)?;

        summary.half_time_goals_per_match.push(half.total());
        summary.total_goals_per_match.push(full.total());
        summary.score_differences.push(full.goal_difference());
    }

    Ok(summary)
}
