use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictError {
    #[error("invalid score format in {field}: {value:?} (expected e.g. 2-1)")]
    InvalidFormat { field: String, value: String },

    #[error("invalid coefficient in {field}: {value:?} (expected a number greater than 1)")]
    InvalidCoefficient { field: String, value: String },

    #[error("invalid prediction weights: {0}")]
    InvalidWeights(String),
}

impl PredictError {
    pub fn invalid_format(field: impl Into<String>, value: impl Into<String>) -> Self {
        PredictError::InvalidFormat {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn invalid_coefficient(field: impl Into<String>, value: impl Into<String>) -> Self {
        PredictError::InvalidCoefficient {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Input location the error refers to, for mapping back onto a form control.
    pub fn field(&self) -> Option<&str> {
        match self {
            PredictError::InvalidFormat { field, .. } => Some(field),
            PredictError::InvalidCoefficient { field, .. } => Some(field),
            PredictError::InvalidWeights(_) => None,
        }
    }
}
