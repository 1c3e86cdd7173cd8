use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::PredictError;
use crate::h2h::{H2hSummary, analyze_head_to_head};
use crate::model::{
    BookmakerOdd, DataAdvisory, HalfTimeSource, MIN_BOOKMAKER_ODDS, MIN_H2H_RECORDS,
    MatchConfiguration, Prediction, PredictionFactors, ScoreSource,
};
use crate::odds::{OddsAnalysis, ScoreOdds, ValueTier, analyze_odds, gather_bookmaker_odds};
use crate::score::{Score, parse_score};
use crate::weights::PredictionWeights;

/// Predicts with the default weights and an entropy-seeded random source.
pub fn generate_prediction(
    config: &MatchConfiguration,
    odds: &[BookmakerOdd],
) -> Result<Prediction, PredictError> {
    let mut rng = ChaCha8Rng::from_entropy();
    generate_prediction_with(config, odds, &PredictionWeights::default(), &mut rng)
}

/// Full prediction pipeline.
///
/// Everything is validated before anything random happens, so a failing call
/// consumes nothing from `rng`. Random draws, in order: fallback score (only
/// for [`ScoreSource::Generated`]), half-time fraction home then away (only
/// when half-time is derived), confidence jitter.
pub fn generate_prediction_with<R: Rng + ?Sized>(
    config: &MatchConfiguration,
    odds: &[BookmakerOdd],
    weights: &PredictionWeights,
    rng: &mut R,
) -> Result<Prediction, PredictError> {
    weights.validate()?;

    let user_full = config
        .exact_scores
        .full_time()
        .map(|raw| parse_score("exactScores.fullTime", raw))
        .transpose()?;
    let user_half = config
        .exact_scores
        .half_time()
        .map(|raw| parse_score("exactScores.halfTime", raw))
        .transpose()?;

    let h2h = analyze_head_to_head(&config.h2h_results)?;
    let quotes = gather_bookmaker_odds(config, odds)?;
    let analysis = analyze_odds(&quotes)?;

    let pick = select_full_time(&analysis, user_full, &h2h, weights, rng)?;

    let (half_time_score, half_time_source) = match user_half {
        Some(score) => (score, HalfTimeSource::UserPrediction),
        None => (
            derive_half_time(pick.score, weights, rng),
            HalfTimeSource::Derived,
        ),
    };

    let confidence = compute_confidence(&h2h, &analysis, pick.source, weights, rng);

    let factors = PredictionFactors {
        h2h_pattern: h2h.pattern_label().to_string(),
        average_goals: h2h.average_total_goals(),
        h2h_matches: h2h.matches(),
        score_source: pick.source,
        bookmaker_options: analysis.entries,
        distinct_scores: analysis.distinct_scores(),
        tier_distribution: analysis.value_tiers.counts(),
        odds_signal: if analysis.has_hidden_value() {
            "Value Detected".to_string()
        } else {
            "Standard".to_string()
        },
        selected_coefficient: pick.coefficient,
        coefficient_range: analysis.coefficient_range,
    };

    Ok(Prediction {
        half_time_score,
        full_time_score: pick.score,
        half_time_source,
        confidence,
        score_source: pick.source,
        factors,
        advisories: advisories(&h2h, &analysis),
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct FullTimePick {
    score: Score,
    source: ScoreSource,
    coefficient: Option<f64>,
}

impl FullTimePick {
    /// `entry.score` was parsed from `entry.key`, so it renders as the quoted text.
    fn from_odds(entry: &ScoreOdds, source: ScoreSource) -> Self {
        Self {
            score: entry.score,
            source,
            coefficient: Some(entry.average),
        }
    }
}

/// Priority cascade; the first rule that has a candidate decides.
fn select_full_time<R: Rng + ?Sized>(
    analysis: &OddsAnalysis,
    user_full: Option<Score>,
    h2h: &H2hSummary,
    weights: &PredictionWeights,
    rng: &mut R,
) -> Result<FullTimePick, PredictError> {
    let tiered = [
        (ValueTier::Premium, ScoreSource::BookmakerPremium),
        (ValueTier::High, ScoreSource::BookmakerHigh),
        (ValueTier::Medium, ScoreSource::BookmakerMedium),
    ];
    for (tier, source) in tiered {
        if let Some(entry) = analysis.best_in(tier) {
            return Ok(FullTimePick::from_odds(entry, source));
        }
    }
    if let Some(entry) = analysis.best_overall() {
        return Ok(FullTimePick::from_odds(entry, ScoreSource::BookmakerAny));
    }
    if let Some(score) = user_full {
        return Ok(FullTimePick {
            score,
            source: ScoreSource::UserPrediction,
            coefficient: None,
        });
    }

    let pool = fallback_pool(h2h, weights)?;
    let score = pool[rng.gen_range(0..pool.len())];
    Ok(FullTimePick {
        score,
        source: ScoreSource::Generated,
        coefficient: None,
    })
}

/// The fallback pool, narrowed to high totals when the history is high-scoring.
fn fallback_pool(h2h: &H2hSummary, weights: &PredictionWeights) -> Result<Vec<Score>, PredictError> {
    let all = weights
        .fallback_scores
        .iter()
        .enumerate()
        .map(|(idx, raw)| parse_score(&format!("fallback_scores[{idx}]"), raw))
        .collect::<Result<Vec<_>, _>>()?;

    if !h2h.is_high_scoring() {
        return Ok(all);
    }
    let filtered: Vec<Score> = all
        .iter()
        .copied()
        .filter(|s| s.total() >= weights.fallback_min_total)
        .collect();
    if filtered.is_empty() {
        Ok(all)
    } else {
        Ok(filtered)
    }
}

/// Each side keeps `floor(goals * f)` with `f` drawn independently per side,
/// so half-time never exceeds full-time on either side.
fn derive_half_time<R: Rng + ?Sized>(full: Score, weights: &PredictionWeights, rng: &mut R) -> Score {
    let frac = weights.half_time_fraction;
    let mut side = |goals: u8| -> u8 {
        let f = rng.gen_range(frac.min..frac.max);
        let ht = (goals as f64 * f).floor() as u8;
        ht.min(goals)
    };
    let home = side(full.home);
    let away = side(full.away);
    Score::new(home, away)
}

fn source_bonus(source: ScoreSource, weights: &PredictionWeights) -> f64 {
    let b = &weights.source_bonus;
    match source {
        ScoreSource::BookmakerPremium => b.premium,
        ScoreSource::BookmakerHigh => b.high,
        ScoreSource::BookmakerMedium => b.medium,
        ScoreSource::BookmakerAny => b.any_bookmaker,
        ScoreSource::UserPrediction => b.user_prediction,
        ScoreSource::Generated => b.generated,
    }
}

fn compute_confidence<R: Rng + ?Sized>(
    h2h: &H2hSummary,
    analysis: &OddsAnalysis,
    source: ScoreSource,
    weights: &PredictionWeights,
    rng: &mut R,
) -> u8 {
    let distinct = analysis.distinct_scores();
    let data_points = (h2h.matches() + distinct) as f64;

    let mut score = (weights.base_confidence + weights.per_data_point * data_points).min(weights.base_cap);
    score += source_bonus(source, weights);

    if distinct >= weights.rich_odds_threshold {
        score += weights.rich_odds_bonus;
    }
    if distinct >= weights.very_rich_odds_threshold {
        score += weights.very_rich_odds_bonus;
    }
    if !analysis.value_tiers.premium.is_empty() {
        score += weights.premium_presence_bonus;
    }

    score += rng.gen_range(0..=weights.jitter_max) as f64;

    score.floor().clamp(0.0, weights.confidence_ceiling) as u8
}

fn advisories(h2h: &H2hSummary, analysis: &OddsAnalysis) -> Vec<DataAdvisory> {
    let mut out = Vec::new();
    if h2h.matches() < MIN_H2H_RECORDS {
        out.push(DataAdvisory::FewH2hRecords {
            have: h2h.matches(),
            need: MIN_H2H_RECORDS,
        });
    }
    if analysis.entries < MIN_BOOKMAKER_ODDS {
        out.push(DataAdvisory::FewBookmakerOdds {
            have: analysis.entries,
            need: MIN_BOOKMAKER_ODDS,
        });
    }
    out
}
