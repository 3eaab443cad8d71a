//! Forecast serving: registry lookup, request validation, model execution and
//! response shaping.
//!
//! ```text
//! ForecastQuery -> ForecastValidator -> ForecastExecutor -> format_results
//!                        |                     |
//!                        +---- ModelRegistry --+ (one model snapshot per request)
//! ```

pub mod error;
pub mod executor;
pub mod formatter;
pub mod registry;
pub mod validator;

pub use error::ForecastError;
pub use executor::{ForecastExecutor, RangeSkipPolicy};
pub use formatter::{ErrorResponse, ForecastResponse};
pub use registry::{LoadOutcome, ModelRegistry, ModelStatus};
pub use validator::{ForecastValidator, HorizonRule};

use crate::domain::model::ForecastQuery;
use crate::domain::ports::ModelSource;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastSettings {
    pub range_skip_policy: RangeSkipPolicy,
    pub weekly_horizon: HorizonRule,
    pub trailing_window_days: u32,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            range_skip_policy: RangeSkipPolicy::Skip,
            weekly_horizon: HorizonRule::CalendarMonths,
            trailing_window_days: 30,
        }
    }
}

pub struct ForecastService {
    registry: Arc<ModelRegistry>,
    executor: ForecastExecutor,
    settings: ForecastSettings,
}

impl ForecastService {
    pub fn new(registry: Arc<ModelRegistry>, settings: ForecastSettings) -> Self {
        let executor = ForecastExecutor::new(
            settings.weekly_horizon,
            settings.range_skip_policy,
            settings.trailing_window_days,
        );
        Self {
            registry,
            executor,
            settings,
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &ForecastSettings {
        &self.settings
    }

    pub fn predict(&self, query: &ForecastQuery) -> Result<ForecastResponse, ForecastError> {
        let validator = ForecastValidator::new(&self.registry, self.settings.weekly_horizon);

        let outcome = validator.validate(query).and_then(|validated| {
            tracing::debug!(
                "Running {} forecast with {} model: {:?}",
                validated.request.granularity,
                validated.model.family(),
                validated.plan
            );
            let results = self.executor.execute(&validated)?;
            formatter::format_results(validated.request.target, results)
        });

        match &outcome {
            Ok(_) => tracing::debug!("{} forecast succeeded", query.granularity()),
            Err(e) if e.is_client_error() => {
                tracing::info!("Rejected {} forecast request: {}", query.granularity(), e)
            }
            Err(e) => tracing::error!(
                "❌ {} forecast failed ({}): {}",
                query.granularity(),
                e.kind(),
                e
            ),
        }
        outcome
    }

    pub fn reload(&self, source: &dyn ModelSource) -> Vec<LoadOutcome> {
        tracing::info!("🔄 Reloading forecasting models");
        self.registry.reload(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Granularity;
    use crate::domain::ports::Forecaster;
    use crate::utils::error::ModelError;
    use chrono::NaiveDate;

    #[derive(Debug)]
    struct LinearModel;

    impl Forecaster for LinearModel {
        fn family(&self) -> &'static str {
            "linear"
        }

        fn last_training_date(&self) -> Option<NaiveDate> {
            NaiveDate::from_ymd_opt(2024, 12, 1)
        }

        fn forecast(&self, steps: usize) -> Result<Vec<f64>, ModelError> {
            Ok((1..=steps).map(|h| 1000.0 + 10.0 * h as f64 + 1.0 / 3.0).collect())
        }

        fn predict(&self, dates: &[NaiveDate]) -> Result<Vec<f64>, ModelError> {
            Ok(vec![500.0; dates.len()])
        }
    }

    fn service() -> ForecastService {
        let registry = ModelRegistry::with_models(
            Granularity::ALL
                .iter()
                .map(|g| (*g, Arc::new(LinearModel) as Arc<dyn Forecaster>)),
        );
        ForecastService::new(Arc::new(registry), ForecastSettings::default())
    }

    #[test]
    fn test_predict_is_idempotent() {
        let service = service();
        let query = ForecastQuery::Single {
            granularity: Granularity::Monthly,
            date: Some("2025-06-15".to_string()),
        };

        let first = service.predict(&query).unwrap();
        let second = service.predict(&query).unwrap();
        assert_eq!(first, second);
        match first {
            ForecastResponse::Single { predicted_sales, .. } => {
                assert_eq!(predicted_sales, 1060.33)
            }
            other => panic!("unexpected response {:?}", other),
        }
    }

    #[test]
    fn test_predict_surfaces_validation_errors() {
        let service = service();
        let query = ForecastQuery::Single {
            granularity: Granularity::Weekly,
            date: Some("2024-11-01".to_string()),
        };
        let err = service.predict(&query).unwrap_err();
        assert!(err.to_string().contains("must be in the future"));
    }
}
