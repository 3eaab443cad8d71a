use crate::core::forecast::error::ForecastError;
use crate::domain::model::{ForecastResult, ForecastTarget};
use chrono::NaiveDate;
use serde::Serialize;

const SUCCESS: &str = "success";
const ERROR: &str = "error";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionItem {
    pub date: NaiveDate,
    pub predicted_sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedItem {
    pub date: NaiveDate,
    pub status: &'static str,
    pub message: String,
}

/// Externally visible forecast payloads.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ForecastResponse {
    Single {
        status: &'static str,
        date: NaiveDate,
        predicted_sales: f64,
    },
    Range {
        status: &'static str,
        predictions: Vec<PredictionItem>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        skipped: Vec<SkippedItem>,
    },
    Window {
        status: &'static str,
        sales_data: Vec<PredictionItem>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: ERROR,
            message: message.into(),
        }
    }
}

impl From<&ForecastError> for ErrorResponse {
    fn from(err: &ForecastError) -> Self {
        Self::new(err.to_string())
    }
}

/// Shapes executor output for the given target. Values were already rounded to
/// cents when the results were built.
pub fn format_results(
    target: ForecastTarget,
    results: Vec<ForecastResult>,
) -> Result<ForecastResponse, ForecastError> {
    let (successes, failures): (Vec<_>, Vec<_>) =
        results.into_iter().partition(ForecastResult::is_success);

    let predictions: Vec<PredictionItem> = successes
        .into_iter()
        .filter_map(|r| {
            r.predicted_value.map(|value| PredictionItem {
                date: r.date,
                predicted_sales: value,
            })
        })
        .collect();

    match target {
        ForecastTarget::Single(_) => {
            let item = predictions
                .into_iter()
                .next()
                .ok_or(ForecastError::NoPredictionsGenerated)?;
            Ok(ForecastResponse::Single {
                status: SUCCESS,
                date: item.date,
                predicted_sales: item.predicted_sales,
            })
        }
        ForecastTarget::Range { .. } => {
            if predictions.is_empty() {
                return Err(ForecastError::NoPredictionsGenerated);
            }
            let skipped = failures
                .into_iter()
                .map(|r| SkippedItem {
                    date: r.date,
                    status: ERROR,
                    message: r.error_message.unwrap_or_default(),
                })
                .collect();
            Ok(ForecastResponse::Range {
                status: SUCCESS,
                predictions,
                skipped,
            })
        }
        ForecastTarget::TrailingWindow { .. } => Ok(ForecastResponse::Window {
            status: SUCCESS,
            sales_data: predictions,
        }),
    }
}
