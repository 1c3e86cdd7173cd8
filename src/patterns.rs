use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::PredictError;
use crate::h2h::analyze_head_to_head;
use crate::model::H2hRecord;
use crate::score::{Score, parse_score};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Home,
    Draw,
    Away,
}

pub fn classify_outcome(score: Score) -> Outcome {
    if score.home > score.away {
        Outcome::Home
    } else if score.home < score.away {
        Outcome::Away
    } else {
        Outcome::Draw
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalBucket {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreFrequency {
    pub score: Score,
    pub count: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternReport {
    pub processed_matches: usize,
    pub average_goals: f64,
    /// Mean absolute full-time goal difference.
    pub average_goal_difference: Option<f64>,
    pub goal_distribution: Vec<GoalBucket>,
    pub score_frequency: Vec<ScoreFrequency>,
    /// Percentage of full-time goals already scored by half-time.
    pub half_time_goal_share: Option<f64>,
    pub home_wins: usize,
    pub draws: usize,
    pub away_wins: usize,
    pub draw_rate: Option<f64>,
    pub latest_meeting: Option<NaiveDate>,
}

const BUCKETS: [(&str, u32, u32); 5] = [
    ("0-1", 0, 1),
    ("2-3", 2, 3),
    ("4-5", 4, 5),
    ("6-7", 6, 7),
    ("8+", 8, u32::MAX),
];

/// Descriptive view of the complete H2H records, for the pattern panel.
pub fn pattern_report(records: &[H2hRecord]) -> Result<PatternReport, PredictError> {
    let summary = analyze_head_to_head(records)?;

    let mut goal_distribution: Vec<GoalBucket> = BUCKETS
        .iter()
        .map(|(label, _, _)| GoalBucket {
            label: label.to_string(),
            count: 0,
        })
        .collect();
    for total in &summary.total_goals_per_match {
        if let Some(pos) = BUCKETS
            .iter()
            .position(|(_, lo, hi)| total >= lo && total <= hi)
        {
            goal_distribution[pos].count += 1;
        }
    }

    let mut counts: HashMap<Score, usize> = HashMap::new();
    let mut order: Vec<Score> = Vec::new();
    let (mut home_wins, mut draws, mut away_wins) = (0usize, 0usize, 0usize);
    let mut latest_meeting: Option<NaiveDate> = None;

    for (idx, record) in records.iter().enumerate() {
        if !record.is_complete() {
            continue;
        }
        let full = parse_score(&format!("h2h[{idx}].full_time"), &record.full_time_score)?;
        // "01-2" and "1-2" are the same result here.
        let key = full.canonical();
        let count = counts.entry(key).or_insert(0);
        if *count == 0 {
            order.push(key);
        }
        *count += 1;

        match classify_outcome(full) {
            Outcome::Home => home_wins += 1,
            Outcome::Draw => draws += 1,
            Outcome::Away => away_wins += 1,
        }

        if let Some(date) = record.parsed_date() {
            latest_meeting = Some(latest_meeting.map_or(date, |d| d.max(date)));
        }
    }

    let n = summary.matches();
    let mut score_frequency: Vec<ScoreFrequency> = order
        .into_iter()
        .map(|score| {
            let count = counts.get(&score).copied().unwrap_or(0);
            ScoreFrequency {
                score,
                count,
                percent: percent(count as f64, n as f64).unwrap_or(0.0),
            }
        })
        .collect();
    score_frequency.sort_by(|a, b| b.count.cmp(&a.count));

    let ht_goals: u32 = summary.half_time_goals_per_match.iter().sum();
    let ft_goals: u32 = summary.total_goals_per_match.iter().sum();

    Ok(PatternReport {
        processed_matches: n,
        average_goals: summary.average_total_goals(),
        average_goal_difference: summary.average_score_difference(),
        goal_distribution,
        score_frequency,
        half_time_goal_share: percent(ht_goals as f64, ft_goals as f64),
        home_wins,
        draws,
        away_wins,
        draw_rate: percent(draws as f64, n as f64),
        latest_meeting,
    })
}

fn percent(part: f64, whole: f64) -> Option<f64> {
    if whole <= 0.0 {
        None
    } else {
        Some(part * 100.0 / whole)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_and_outcomes() {
        let records = vec![
            H2hRecord::new("2024-01-01", "1-0", "2-1"),
            H2hRecord::new("2024-04-01", "0-0", "1-1"),
            H2hRecord::new("2024-02-01", "1-1", "3-2"),
            H2hRecord::new("2023-12-01", "2-2", "5-4"),
            H2hRecord::new("2023-11-01", "0-1", "2-1"),
        ];
        let report = pattern_report(&records).unwrap();
        assert_eq!(report.processed_matches, 5);
        let counts: Vec<usize> = report.goal_distribution.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![0, 3, 1, 0, 1]);
        assert_eq!(report.home_wins, 4);
        assert_eq!(report.draws, 1);
        assert_eq!(report.away_wins, 0);
        assert_eq!(report.draw_rate, Some(20.0));
        assert_eq!(report.average_goal_difference, Some(0.8));
        assert_eq!(report.latest_meeting, NaiveDate::from_ymd_opt(2024, 4, 1));

        assert_eq!(report.score_frequency[0].score, Score::new(2, 1));
        assert_eq!(report.score_frequency[0].count, 2);
        assert_eq!(report.score_frequency[0].percent, 40.0);
        // Ties keep first appearance.
        assert_eq!(report.score_frequency[1].score, Score::new(1, 1));
    }

    #[test]
    fn zero_padded_results_count_as_one_score() {
        let records = vec![
            H2hRecord::new("2024-01-01", "0-1", "01-2"),
            H2hRecord::new("2024-02-01", "0-0", "1-2"),
        ];
        let report = pattern_report(&records).unwrap();
        assert_eq!(report.score_frequency.len(), 1);
        assert_eq!(report.score_frequency[0].score.to_string(), "1-2");
        assert_eq!(report.score_frequency[0].count, 2);
    }

    #[test]
    fn half_time_share_of_goals() {
        let records = vec![
            H2hRecord::new("2024-01-01", "1-0", "2-2"),
            H2hRecord::new("2024-02-01", "1-1", "3-1"),
        ];
        let report = pattern_report(&records).unwrap();
        // 3 of 8 goals by the break
        assert_eq!(report.half_time_goal_share, Some(37.5));
    }

    #[test]
    fn empty_history() {
        let report = pattern_report(&[]).unwrap();
        assert_eq!(report.processed_matches, 0);
        assert_eq!(report.average_goals, 4.2);
        assert!(report.half_time_goal_share.is_none());
        assert!(report.draw_rate.is_none());
        assert!(report.average_goal_difference.is_none());
        assert!(report.score_frequency.is_empty());
        assert_eq!(report.goal_distribution.len(), 5);
    }

    #[test]
    fn goalless_history_has_no_half_time_share() {
        let records = vec![H2hRecord::new("2024-01-01", "0-0", "0-0")];
        let report = pattern_report(&records).unwrap();
        assert_eq!(report.half_time_goal_share, None);
        assert_eq!(report.goal_distribution[0].count, 1);
    }

    #[test]
    fn malformed_record_fails() {
        let records = vec![H2hRecord::new("2024-01-01", "x", "1-0")];
        assert!(pattern_report(&records).is_err());
    }
}
