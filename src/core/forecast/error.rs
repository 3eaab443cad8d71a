use crate::domain::model::Granularity;
use chrono::NaiveDate;
use thiserror::Error;

/// Every way a forecast request can fail. All variants are recovered at the request
/// boundary; none of them is fatal to the process.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    #[error("No {field} provided")]
    MissingField { field: &'static str },

    #[error("Invalid {field} '{value}': expected YYYY-MM-DD")]
    InvalidDate { field: &'static str, value: String },

    #[error("{granularity} sales model not loaded")]
    ModelUnavailable { granularity: Granularity },

    #[error("{granularity} sales model missing training data")]
    MissingTrainingMetadata { granularity: Granularity },

    #[error("{field} must be in the future: {date} is not after the last training date {last_training_date}")]
    DateNotFuture {
        field: &'static str,
        date: NaiveDate,
        last_training_date: NaiveDate,
    },

    #[error("End date must be after start date ({start} .. {end})")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid forecast steps: horizon {horizon} for {date}")]
    InvalidHorizon { date: NaiveDate, horizon: i64 },

    #[error("No predictions could be generated.")]
    NoPredictionsGenerated,

    #[error("{0}")]
    ExecutionError(String),
}

impl ForecastError {
    /// Problems with the request itself, as opposed to the service's models.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ForecastError::MissingField { .. }
                | ForecastError::InvalidDate { .. }
                | ForecastError::DateNotFuture { .. }
                | ForecastError::InvalidRange { .. }
                | ForecastError::InvalidHorizon { .. }
                | ForecastError::NoPredictionsGenerated
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ForecastError::MissingField { .. } => "MissingField",
            ForecastError::InvalidDate { .. } => "InvalidDate",
            ForecastError::ModelUnavailable { .. } => "ModelUnavailable",
            ForecastError::MissingTrainingMetadata { .. } => "MissingTrainingMetadata",
            ForecastError::DateNotFuture { .. } => "DateNotFuture",
            ForecastError::InvalidRange { .. } => "InvalidRange",
            ForecastError::InvalidHorizon { .. } => "InvalidHorizon",
            ForecastError::NoPredictionsGenerated => "NoPredictionsGenerated",
            ForecastError::ExecutionError(_) => "ExecutionError",
        }
    }
}
