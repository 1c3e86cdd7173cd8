use criterion::{Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::hint::black_box;

use scorecast::model::BookmakerSlot;
use scorecast::patterns::pattern_report;
use scorecast::{
    BookmakerOdd, H2hRecord, MatchConfiguration, PredictionWeights, analyze_odds,
    generate_prediction_with,
};

fn sample_match() -> MatchConfiguration {
    let mut config = MatchConfiguration::new("Liverpool", "Manchester City");
    config.h2h_results = (0..6)
        .map(|i| {
            H2hRecord::new(
                &format!("2026-0{}-15", i + 1),
                &format!("{}-{}", i % 2, i % 3),
                &format!("{}-{}", i % 4 + 1, i % 3 + 1),
            )
        })
        .collect();
    config.bookmaker_slots = (0..20)
        .map(|i| {
            BookmakerSlot::new(
                &format!("{}-{}", i / 5, i % 5),
                &format!("{:.2}", 1.5 + i as f64 * 0.55),
            )
        })
        .collect();
    config
}

fn sample_odds() -> Vec<BookmakerOdd> {
    (0..10)
        .map(|i| BookmakerOdd::new(&format!("{}-{}", i % 4, i % 3), 2.0 + i as f64).with_bookmaker("Bet365"))
        .collect()
}

fn bench_generate_prediction(c: &mut Criterion) {
    let config = sample_match();
    let odds = sample_odds();
    let weights = PredictionWeights::default();
    c.bench_function("generate_prediction_20_slots", |b| {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        b.iter(|| {
            let p = generate_prediction_with(black_box(&config), black_box(&odds), &weights, &mut rng)
                .unwrap();
            black_box(p.confidence);
        })
    });
}

fn bench_analyze_odds(c: &mut Criterion) {
    let odds = sample_odds();
    c.bench_function("analyze_odds", |b| {
        b.iter(|| {
            let analysis = analyze_odds(black_box(&odds)).unwrap();
            black_box(analysis.distinct_scores());
        })
    });
}

fn bench_pattern_report(c: &mut Criterion) {
    let config = sample_match();
    c.bench_function("pattern_report", |b| {
        b.iter(|| {
            let report = pattern_report(black_box(&config.h2h_results)).unwrap();
            black_box(report.processed_matches);
        })
    });
}

criterion_group!(
    perf,
    bench_generate_prediction,
    bench_analyze_odds,
    bench_pattern_report
);
criterion_main!(perf);
