use crate::domain::model::Granularity;
use crate::domain::ports::{Forecaster, ModelSource};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

type ModelTable = HashMap<Granularity, Arc<dyn Forecaster>>;

/// Pre-trained models keyed by granularity.
///
/// Models are loaded once at startup. A reload builds a complete replacement table
/// before taking the write lock, so readers only ever see the old table or the new
/// one, never a mix.
#[derive(Default)]
pub struct ModelRegistry {
    models: RwLock<ModelTable>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelStatus {
    pub granularity: Granularity,
    pub loaded: bool,
    pub family: Option<&'static str>,
    pub last_training_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadOutcome {
    pub granularity: Granularity,
    pub loaded: bool,
    pub message: String,
}

impl ModelRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_models(models: impl IntoIterator<Item = (Granularity, Arc<dyn Forecaster>)>) -> Self {
        Self {
            models: RwLock::new(models.into_iter().collect()),
        }
    }

    /// Loads every granularity from `source`. Failures are logged and leave that
    /// granularity empty; they never abort startup.
    pub fn load(source: &dyn ModelSource) -> (Self, Vec<LoadOutcome>) {
        let mut table = ModelTable::new();
        let outcomes = Self::load_into(source, &mut table);
        (
            Self {
                models: RwLock::new(table),
            },
            outcomes,
        )
    }

    pub fn get(&self, granularity: Granularity) -> Option<Arc<dyn Forecaster>> {
        self.models
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&granularity)
            .cloned()
    }

    /// Reloads every granularity and swaps the table in one step. A granularity
    /// that fails to reload keeps whatever model it had before.
    pub fn reload(&self, source: &dyn ModelSource) -> Vec<LoadOutcome> {
        let mut table = self
            .models
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let outcomes = Self::load_into(source, &mut table);

        *self.models.write().unwrap_or_else(PoisonError::into_inner) = table;
        outcomes
    }

    pub fn status(&self) -> Vec<ModelStatus> {
        let models = self.models.read().unwrap_or_else(PoisonError::into_inner);
        Granularity::ALL
            .iter()
            .map(|granularity| {
                let model = models.get(granularity);
                ModelStatus {
                    granularity: *granularity,
                    loaded: model.is_some(),
                    family: model.map(|m| m.family()),
                    last_training_date: model.and_then(|m| m.last_training_date()),
                }
            })
            .collect()
    }

    fn load_into(source: &dyn ModelSource, table: &mut ModelTable) -> Vec<LoadOutcome> {
        Granularity::ALL
            .iter()
            .map(|&granularity| match source.load(granularity) {
                Ok(model) => {
                    let message = format!(
                        "{} {} sales model loaded successfully from {}",
                        model.family(),
                        granularity,
                        source.describe(granularity)
                    );
                    tracing::info!("✅ {}", message);
                    table.insert(granularity, model);
                    LoadOutcome {
                        granularity,
                        loaded: true,
                        message,
                    }
                }
                Err(e) => {
                    let message = format!(
                        "Error loading {} sales model from {}: {}",
                        granularity,
                        source.describe(granularity),
                        e
                    );
                    tracing::warn!("⚠️ {}", message);
                    LoadOutcome {
                        granularity,
                        loaded: false,
                        message,
                    }
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::{AppError, ModelError, Result};
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Debug)]
    struct ConstantModel(f64);

    impl Forecaster for ConstantModel {
        fn family(&self) -> &'static str {
            "constant"
        }

        fn last_training_date(&self) -> Option<NaiveDate> {
            NaiveDate::from_ymd_opt(2024, 12, 1)
        }

        fn forecast(&self, steps: usize) -> std::result::Result<Vec<f64>, ModelError> {
            Ok(vec![self.0; steps])
        }

        fn predict(&self, dates: &[NaiveDate]) -> std::result::Result<Vec<f64>, ModelError> {
            Ok(vec![self.0; dates.len()])
        }
    }

    /// Serves monthly only; weekly can be switched on after construction.
    struct SwitchableSource {
        weekly_available: AtomicBool,
        value: f64,
    }

    impl ModelSource for SwitchableSource {
        fn describe(&self, granularity: Granularity) -> String {
            format!("memory://{}", granularity)
        }

        fn load(&self, granularity: Granularity) -> Result<Arc<dyn Forecaster>> {
            match granularity {
                Granularity::Monthly => Ok(Arc::new(ConstantModel(self.value))),
                Granularity::Weekly if self.weekly_available.load(Ordering::SeqCst) => {
                    Ok(Arc::new(ConstantModel(self.value)))
                }
                _ => Err(AppError::ConfigError {
                    message: "artifact missing".to_string(),
                }),
            }
        }
    }

    #[test]
    fn test_load_tolerates_missing_artifacts() {
        let source = SwitchableSource {
            weekly_available: AtomicBool::new(false),
            value: 1.0,
        };
        let (registry, outcomes) = ModelRegistry::load(&source);

        assert_eq!(outcomes.len(), 3);
        assert!(registry.get(Granularity::Monthly).is_some());
        assert!(registry.get(Granularity::Weekly).is_none());
        assert!(registry.get(Granularity::Daily).is_none());
        assert!(outcomes.iter().any(|o| !o.loaded && o.message.contains("artifact missing")));
    }

    #[test]
    fn test_reload_swaps_and_keeps_previous_on_failure() {
        let previous_daily: Arc<dyn Forecaster> = Arc::new(ConstantModel(7.0));
        let registry = ModelRegistry::with_models([(Granularity::Daily, previous_daily)]);

        let source = SwitchableSource {
            weekly_available: AtomicBool::new(true),
            value: 2.0,
        };
        let outcomes = registry.reload(&source);

        assert_eq!(outcomes.iter().filter(|o| o.loaded).count(), 2);
        assert!(registry.get(Granularity::Weekly).is_some());
        // daily failed to reload, the old model is still served
        let daily = registry.get(Granularity::Daily).unwrap();
        assert_eq!(daily.forecast(1).unwrap(), vec![7.0]);
    }

    #[test]
    fn test_status_lists_every_granularity() {
        let registry = ModelRegistry::with_models([(
            Granularity::Monthly,
            Arc::new(ConstantModel(1.0)) as Arc<dyn Forecaster>,
        )]);
        let status = registry.status();

        assert_eq!(status.len(), 3);
        let monthly = status
            .iter()
            .find(|s| s.granularity == Granularity::Monthly)
            .unwrap();
        assert!(monthly.loaded);
        assert_eq!(monthly.family, Some("constant"));
        assert_eq!(monthly.last_training_date, NaiveDate::from_ymd_opt(2024, 12, 1));
        assert!(!status.iter().find(|s| s.granularity == Granularity::Daily).unwrap().loaded);
    }
}
