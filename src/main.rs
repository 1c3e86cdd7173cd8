use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use scorecast::export::{self, ExportFormat, ExportInput};
use scorecast::model::{BookmakerOdd, MatchConfiguration};
use scorecast::patterns::pattern_report;
use scorecast::predict::generate_prediction_with;
use scorecast::weights::{PredictionWeights, load_weights};

const USAGE: &str =
    "usage: scorecast [match.json] [--seed N] [--weights PATH] [--export csv|json|xlsx PATH]";

#[derive(Debug, Deserialize)]
struct PredictionRequest {
    #[serde(rename = "match")]
    config: MatchConfiguration,
    #[serde(default)]
    odds: Vec<BookmakerOdd>,
}

#[derive(Debug, Default)]
struct Args {
    input: Option<PathBuf>,
    seed: Option<u64>,
    weights: Option<PathBuf>,
    export: Option<(ExportFormat, PathBuf)>,
}

fn parse_args(raw: impl Iterator<Item = String>) -> Result<Args> {
    let mut args = Args::default();
    let mut it = raw;
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--seed" => {
                let v = it.next().context("--seed needs a value")?;
                args.seed = Some(v.parse().with_context(|| format!("bad seed {v:?}"))?);
            }
            "--weights" => {
                args.weights = Some(PathBuf::from(it.next().context("--weights needs a path")?));
            }
            "--export" => {
                let format: ExportFormat = it.next().context("--export needs a format")?.parse()?;
                let path = it.next().context("--export needs a path")?;
                args.export = Some((format, PathBuf::from(path)));
            }
            "-h" | "--help" => bail!("{USAGE}"),
            other if other.starts_with("--") => bail!("unknown option {other}\n{USAGE}"),
            _ => args.input = Some(PathBuf::from(&arg)),
        }
    }
    Ok(args)
}

/// An unparsable `SCORECAST_SEED` is reported and ignored.
fn seed_from_env(raw: &str) -> Option<u64> {
    match raw.trim().parse::<u64>() {
        Ok(seed) => Some(seed),
        Err(err) => {
            warn!(value = raw, error = %err, "ignoring SCORECAST_SEED, falling back to an entropy seed");
            None
        }
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(env::args().skip(1))?;

    let path = args
        .input
        .unwrap_or_else(|| PathBuf::from("tests/fixtures/match_request.json"));
    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let request: PredictionRequest =
        serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;

    let weights_path = args
        .weights
        .or_else(|| env::var("SCORECAST_WEIGHTS").ok().map(PathBuf::from));
    let weights = match weights_path {
        Some(p) => load_weights(&p)?,
        None => PredictionWeights::default(),
    };

    let seed = match args.seed {
        Some(s) => Some(s),
        None => env::var("SCORECAST_SEED").ok().and_then(|v| seed_from_env(&v)),
    };
    let mut rng = match seed {
        Some(s) => {
            info!(seed = s, "using seeded random source");
            ChaCha8Rng::seed_from_u64(s)
        }
        None => ChaCha8Rng::from_entropy(),
    };

    let prediction =
        generate_prediction_with(&request.config, &request.odds, &weights, &mut rng)?;
    for advisory in &prediction.advisories {
        warn!("{}", advisory.message());
    }

    println!("Match: {}", request.config.label());
    println!("Half-time: {}", prediction.half_time_score);
    println!("Full-time: {}", prediction.full_time_score);
    println!(
        "Confidence: {}% ({})",
        prediction.confidence,
        prediction.confidence_level().label()
    );
    println!("Source: {}", prediction.score_source.tag());
    for (label, value) in prediction.factors.rows() {
        println!("  {label}: {value}");
    }

    let report = pattern_report(&request.config.h2h_results)?;
    println!(
        "H2H: {} matches, {:.1} goals avg, {} goal margin, draws {}",
        report.processed_matches,
        report.average_goals,
        report
            .average_goal_difference
            .map(|d| format!("{d:.1}"))
            .unwrap_or_else(|| "-".to_string()),
        report
            .draw_rate
            .map(|r| format!("{r:.0}%"))
            .unwrap_or_else(|| "-".to_string())
    );

    if let Some((format, out)) = args.export {
        let input = ExportInput {
            prediction: &prediction,
            config: &request.config,
            odds: &request.odds,
        };
        let summary = export::export(&out, format, input)?;
        println!("Exported {} to {}", summary.format, out.display());
    }

    Ok(())
}
