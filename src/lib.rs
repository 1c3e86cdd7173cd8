pub mod error;
pub mod export;
pub mod h2h;
pub mod model;
pub mod odds;
pub mod patterns;
pub mod predict;
pub mod score;
pub mod weights;

pub use error::PredictError;
pub use h2h::{H2hSummary, analyze_head_to_head};
pub use model::{BookmakerOdd, H2hRecord, MatchConfiguration, Prediction, ScoreSource};
pub use odds::{OddsAnalysis, ValueTier, analyze_odds};
pub use predict::{generate_prediction, generate_prediction_with};
pub use score::{Score, parse_coefficient, parse_score};
pub use weights::PredictionWeights;
