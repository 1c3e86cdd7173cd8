use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use rust_xlsxwriter::{Workbook, Worksheet};
use serde::Serialize;
use tracing::info;

use crate::model::{BookmakerOdd, MatchConfiguration, Prediction};
use crate::odds::{ValueTier, analyze_odds, gather_bookmaker_odds};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Xlsx,
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            "pdf" => bail!("PDF export is not supported (use csv, json or xlsx)"),
            other => bail!("unknown export format {other:?} (use csv, json or xlsx)"),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Xlsx => "xlsx",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub format: ExportFormat,
    pub factors: usize,
    pub h2h_rows: usize,
    pub odds_rows: usize,
}

/// What an export writes; borrowed, never recomputed.
#[derive(Debug, Clone, Copy)]
pub struct ExportInput<'a> {
    pub prediction: &'a Prediction,
    pub config: &'a MatchConfiguration,
    pub odds: &'a [BookmakerOdd],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportDocument<'a> {
    exported_at: String,
    confidence_level: &'static str,
    prediction: &'a Prediction,
    #[serde(rename = "match")]
    config: &'a MatchConfiguration,
    odds: &'a [BookmakerOdd],
}

pub fn export(path: &Path, format: ExportFormat, input: ExportInput<'_>) -> Result<ExportReport> {
    match format {
        ExportFormat::Csv => {
            let csv = to_csv_string(input)?;
            fs::write(path, csv).with_context(|| format!("write csv to {}", path.display()))?;
        }
        ExportFormat::Json => {
            let json = to_json_string(input)?;
            fs::write(path, json).with_context(|| format!("write json to {}", path.display()))?;
        }
        ExportFormat::Xlsx => export_xlsx(path, input)?,
    }

    let report = ExportReport {
        format,
        factors: factor_rows(input.prediction).len().saturating_sub(1),
        h2h_rows: h2h_rows(input.config).len().saturating_sub(1),
        odds_rows: odds_rows(input.config, input.odds)?.len().saturating_sub(1),
    };
    info!(
        format = %format,
        path = %path.display(),
        h2h = report.h2h_rows,
        odds = report.odds_rows,
        "exported prediction"
    );
    Ok(report)
}

pub fn to_json_string(input: ExportInput<'_>) -> Result<String> {
    let doc = ExportDocument {
        exported_at: Utc::now().to_rfc3339(),
        confidence_level: input.prediction.confidence_level().label(),
        prediction: input.prediction,
        config: input.config,
        odds: input.odds,
    };
    serde_json::to_string_pretty(&doc).context("serialize prediction export")
}

/// Sectioned CSV: a section title row, then that section's header and rows.
pub fn to_csv_string(input: ExportInput<'_>) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    let sections = [
        ("Match", match_rows(input.config)),
        ("Prediction", prediction_rows(input.prediction)),
        ("Factors", factor_rows(input.prediction)),
        ("H2H", h2h_rows(input.config)),
        ("Odds", odds_rows(input.config, input.odds)?),
    ];
    for (idx, (title, rows)) in sections.iter().enumerate() {
        if idx > 0 {
            writer.write_record([""]).context("write csv separator")?;
        }
        writer.write_record([*title]).context("write csv section")?;
        for row in rows {
            writer.write_record(row).context("write csv row")?;
        }
    }

    let bytes = writer.into_inner().context("flush csv")?;
    String::from_utf8(bytes).context("csv output is not utf-8")
}

pub fn export_xlsx(path: &Path, input: ExportInput<'_>) -> Result<()> {
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Prediction")?;
        let mut rows = match_rows(input.config);
        rows.extend(prediction_rows(input.prediction).into_iter().skip(1));
        write_rows(sheet, &rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Factors")?;
        write_rows(sheet, &factor_rows(input.prediction))?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("H2H")?;
        write_rows(sheet, &h2h_rows(input.config))?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Odds")?;
        write_rows(sheet, &odds_rows(input.config, input.odds)?)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    Ok(())
}

fn match_rows(config: &MatchConfiguration) -> Vec<Vec<String>> {
    vec![
        vec!["Field".to_string(), "Value".to_string()],
        vec!["Team A".to_string(), config.team_a.clone()],
        vec!["Team B".to_string(), config.team_b.clone()],
        vec!["Date".to_string(), config.date.clone()],
        vec!["Time".to_string(), config.time.clone()],
    ]
}

fn prediction_rows(prediction: &Prediction) -> Vec<Vec<String>> {
    let mut rows = vec![
        vec!["Field".to_string(), "Value".to_string()],
        vec![
            "Half-Time Score".to_string(),
            prediction.half_time_score.to_string(),
        ],
        vec![
            "Full-Time Score".to_string(),
            prediction.full_time_score.to_string(),
        ],
        vec![
            "Confidence".to_string(),
            format!("{}%", prediction.confidence),
        ],
        vec![
            "Confidence Level".to_string(),
            prediction.confidence_level().label().to_string(),
        ],
        vec![
            "Score Source".to_string(),
            prediction.score_source.tag().to_string(),
        ],
    ];
    rows.extend(
        prediction
            .advisories
            .iter()
            .map(|a| vec!["Advisory".to_string(), a.message()]),
    );
    rows
}

fn factor_rows(prediction: &Prediction) -> Vec<Vec<String>> {
    let mut rows = vec![vec!["Factor".to_string(), "Value".to_string()]];
    rows.extend(
        prediction
            .factors
            .rows()
            .into_iter()
            .map(|(label, value)| vec![label.to_string(), value]),
    );
    rows
}

fn h2h_rows(config: &MatchConfiguration) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "Date".to_string(),
        "Half-Time".to_string(),
        "Full-Time".to_string(),
    ]];
    rows.extend(
        config
            .h2h_results
            .iter()
            .filter(|r| r.is_complete())
            .map(|r| {
                vec![
                    r.date.trim().to_string(),
                    r.half_time_score.trim().to_string(),
                    r.full_time_score.trim().to_string(),
                ]
            }),
    );
    rows
}

/// Every quote the prediction saw (form slots, then the odds list), each with
/// the value tier of its score's average.
fn odds_rows(config: &MatchConfiguration, odds: &[BookmakerOdd]) -> Result<Vec<Vec<String>>> {
    let quotes = gather_bookmaker_odds(config, odds)?;
    let analysis = analyze_odds(&quotes)?;

    let mut rows = vec![vec![
        "Score".to_string(),
        "Coefficient".to_string(),
        "Bookmaker".to_string(),
        "Tier".to_string(),
    ]];
    rows.extend(quotes.iter().map(|o| {
        vec![
            o.score.clone(),
            format!("{:.2}", o.coefficient),
            o.bookmaker_name.clone().unwrap_or_default(),
            analysis
                .tier_of(&o.score)
                .map(ValueTier::label)
                .unwrap_or_default()
                .to_string(),
        ]
    }));
    Ok(rows)
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BookmakerSlot, H2hRecord, HalfTimeSource, PredictionFactors, ScoreSource};
    use crate::odds::TierCounts;
    use crate::score::Score;

    fn sample() -> (Prediction, MatchConfiguration, Vec<BookmakerOdd>) {
        let mut config = MatchConfiguration::new("Arsenal", "Chelsea");
        config.date = "2024-06-01".to_string();
        config.h2h_results = vec![
            H2hRecord::new("2024-01-01", "1-0", "2-1"),
            H2hRecord::default(),
        ];
        let odds = vec![BookmakerOdd::new("2-1", 8.5).with_bookmaker("Bet365")];
        let prediction = Prediction {
            half_time_score: Score::new(1, 0),
            full_time_score: Score::new(2, 1),
            half_time_source: HalfTimeSource::Derived,
            confidence: 91,
            score_source: ScoreSource::BookmakerPremium,
            factors: PredictionFactors {
                h2h_pattern: "Moderate".to_string(),
                average_goals: 3.0,
                h2h_matches: 1,
                score_source: ScoreSource::BookmakerPremium,
                bookmaker_options: 1,
                distinct_scores: 1,
                tier_distribution: TierCounts {
                    premium: 1,
                    ..TierCounts::default()
                },
                odds_signal: "Value Detected".to_string(),
                selected_coefficient: Some(8.5),
                coefficient_range: None,
            },
            advisories: Vec::new(),
        };
        (prediction, config, odds)
    }

    #[test]
    fn parses_formats() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("excel".parse::<ExportFormat>().unwrap(), ExportFormat::Xlsx);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!("pdf".parse::<ExportFormat>().is_err());
        assert!("doc".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn csv_has_every_section() {
        let (prediction, config, odds) = sample();
        let input = ExportInput {
            prediction: &prediction,
            config: &config,
            odds: &odds,
        };
        let csv = to_csv_string(input).unwrap();
        for title in ["Match", "Prediction", "Factors", "H2H", "Odds"] {
            assert!(csv.lines().any(|l| l == title), "missing section {title}");
        }
        assert!(csv.contains("Full-Time Score,2-1"));
        assert!(csv.contains("2-1,8.50,Bet365,premium"));
        // Blank H2H rows are not exported.
        assert_eq!(csv.matches("2024-01-01").count(), 1);
    }

    #[test]
    fn odds_rows_merge_slots_and_tag_tiers() {
        let (_, mut config, odds) = sample();
        config.bookmaker_slots = vec![
            BookmakerSlot::new("1-0", "3.0"),
            BookmakerSlot::new("2-1", "7.5"),
        ];
        let rows = odds_rows(&config, &odds).unwrap();
        let body: Vec<(&str, &str)> = rows[1..]
            .iter()
            .map(|r| (r[0].as_str(), r[3].as_str()))
            .collect();
        // 2-1 averages 8.0 across the slot and the list quote.
        assert_eq!(body, vec![("1-0", "medium"), ("2-1", "premium"), ("2-1", "premium")]);
        assert_eq!(rows[3][2], "Bet365");

        config.bookmaker_slots = vec![BookmakerSlot::new("2-1", "x")];
        assert!(odds_rows(&config, &odds).is_err());
    }

    #[test]
    fn json_round_trips_prediction() {
        let (prediction, config, odds) = sample();
        let input = ExportInput {
            prediction: &prediction,
            config: &config,
            odds: &odds,
        };
        let json = to_json_string(input).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["prediction"]["full_time_score"], "2-1");
        assert_eq!(value["prediction"]["score_source"], "bookmaker_premium");
        assert_eq!(value["confidenceLevel"], "High Confidence");
        assert_eq!(value["match"]["teamA"], "Arsenal");
        let back: Prediction = serde_json::from_value(value["prediction"].clone()).unwrap();
        assert_eq!(back, prediction);
    }

    #[test]
    fn writes_files() {
        let (prediction, config, odds) = sample();
        let input = ExportInput {
            prediction: &prediction,
            config: &config,
            odds: &odds,
        };
        let dir = std::env::temp_dir().join(format!("scorecast-export-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        for format in [ExportFormat::Csv, ExportFormat::Json, ExportFormat::Xlsx] {
            let path = dir.join(format!("prediction.{format}"));
            let report = export(&path, format, input).unwrap();
            assert_eq!(report.h2h_rows, 1);
            assert_eq!(report.odds_rows, 1);
            assert_eq!(report.factors, 10);
            assert!(fs::metadata(&path).unwrap().len() > 0);
        }
        let _ = fs::remove_dir_all(&dir);
    }
}
