use crate::core::forecast::error::ForecastError;
use crate::core::forecast::registry::ModelRegistry;
use crate::domain::model::{ForecastQuery, ForecastRequest, ForecastTarget, Granularity};
use crate::domain::ports::Forecaster;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// How many model steps separate a target date from the last training date.
///
/// Monthly models always count calendar months. Weekly models count calendar months
/// by default as well, matching how the deployed weekly artifacts were consumed;
/// `Weeks` counts started weeks instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizonRule {
    #[default]
    CalendarMonths,
    Weeks,
}

impl HorizonRule {
    pub fn horizon(self, last_training_date: NaiveDate, target: NaiveDate) -> i64 {
        match self {
            HorizonRule::CalendarMonths => {
                (target.year() as i64 - last_training_date.year() as i64) * 12
                    + (target.month() as i64 - last_training_date.month() as i64)
            }
            HorizonRule::Weeks => {
                let days = (target - last_training_date).num_days();
                (days + 6).div_euclid(7)
            }
        }
    }
}

/// What the executor has to do, decided during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastPlan {
    /// Multi-step forecast; the point estimate is the `horizon`-th step.
    Steps { date: NaiveDate, horizon: usize },
    /// Direct date-indexed prediction for one date.
    Dated { date: NaiveDate },
    /// Every Monday in `[start, end]`, each by multi-step forecast.
    WeeklyRange {
        start: NaiveDate,
        end: NaiveDate,
        last_training_date: NaiveDate,
    },
    /// Date-indexed predictions for the window ending at `end`.
    TrailingWindow { end: NaiveDate },
}

/// A request that passed validation together with the model snapshot it was
/// validated against, so a concurrent reload cannot change the model under it.
#[derive(Debug, Clone)]
pub struct ValidatedForecast {
    pub request: ForecastRequest,
    pub model: Arc<dyn Forecaster>,
    pub plan: ForecastPlan,
}

pub struct ForecastValidator<'a> {
    registry: &'a ModelRegistry,
    weekly_horizon: HorizonRule,
}

impl<'a> ForecastValidator<'a> {
    pub fn new(registry: &'a ModelRegistry, weekly_horizon: HorizonRule) -> Self {
        Self {
            registry,
            weekly_horizon,
        }
    }

    pub fn horizon_rule(&self, granularity: Granularity) -> HorizonRule {
        match granularity {
            Granularity::Weekly => self.weekly_horizon,
            _ => HorizonRule::CalendarMonths,
        }
    }

    pub fn validate(&self, query: &ForecastQuery) -> Result<ValidatedForecast, ForecastError> {
        let granularity = query.granularity();

        match query {
            ForecastQuery::Single { date, .. } => {
                let date = parse_date("date", date.as_deref())?;
                let model = self.model(granularity)?;
                let last = Self::last_training_date(granularity, model.as_ref())?;

                if date <= last {
                    return Err(ForecastError::DateNotFuture {
                        field: "Date",
                        date,
                        last_training_date: last,
                    });
                }

                let plan = match granularity {
                    Granularity::Daily => ForecastPlan::Dated { date },
                    Granularity::Weekly | Granularity::Monthly => {
                        let horizon = self.horizon_rule(granularity).horizon(last, date);
                        if horizon <= 0 {
                            return Err(ForecastError::InvalidHorizon { date, horizon });
                        }
                        ForecastPlan::Steps {
                            date,
                            horizon: horizon as usize,
                        }
                    }
                };

                Ok(ValidatedForecast {
                    request: ForecastRequest {
                        granularity,
                        target: ForecastTarget::Single(date),
                    },
                    model,
                    plan,
                })
            }
            ForecastQuery::Range {
                start_date,
                end_date,
                ..
            } => {
                let start_raw = require("start_date", start_date.as_deref())?;
                let end_raw = require("end_date", end_date.as_deref())?;
                let start = parse_date("start_date", Some(start_raw))?;
                let end = parse_date("end_date", Some(end_raw))?;

                let model = self.model(granularity)?;
                let last = Self::last_training_date(granularity, model.as_ref())?;

                if start <= last {
                    return Err(ForecastError::DateNotFuture {
                        field: "Start date",
                        date: start,
                        last_training_date: last,
                    });
                }
                if end <= start {
                    return Err(ForecastError::InvalidRange { start, end });
                }

                Ok(ValidatedForecast {
                    request: ForecastRequest {
                        granularity,
                        target: ForecastTarget::Range { start, end },
                    },
                    model,
                    plan: ForecastPlan::WeeklyRange {
                        start,
                        end,
                        last_training_date: last,
                    },
                })
            }
            ForecastQuery::TrailingWindow { date, .. } => {
                let end = parse_date("date", date.as_deref())?;
                let model = self.model(granularity)?;

                Ok(ValidatedForecast {
                    request: ForecastRequest {
                        granularity,
                        target: ForecastTarget::TrailingWindow { end },
                    },
                    model,
                    plan: ForecastPlan::TrailingWindow { end },
                })
            }
        }
    }

    fn model(&self, granularity: Granularity) -> Result<Arc<dyn Forecaster>, ForecastError> {
        self.registry
            .get(granularity)
            .ok_or(ForecastError::ModelUnavailable { granularity })
    }

    fn last_training_date(
        granularity: Granularity,
        model: &dyn Forecaster,
    ) -> Result<NaiveDate, ForecastError> {
        model
            .last_training_date()
            .ok_or(ForecastError::MissingTrainingMetadata { granularity })
    }
}

fn require<'v>(field: &'static str, raw: Option<&'v str>) -> Result<&'v str, ForecastError> {
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ForecastError::MissingField { field }),
    }
}

pub fn parse_date(field: &'static str, raw: Option<&str>) -> Result<NaiveDate, ForecastError> {
    let value = require(field, raw)?;
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| ForecastError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ModelError;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[derive(Debug)]
    struct StubModel {
        last: Option<NaiveDate>,
    }

    impl Forecaster for StubModel {
        fn family(&self) -> &'static str {
            "stub"
        }

        fn last_training_date(&self) -> Option<NaiveDate> {
            self.last
        }

        fn forecast(&self, steps: usize) -> Result<Vec<f64>, ModelError> {
            Ok(vec![0.0; steps])
        }

        fn predict(&self, dates: &[NaiveDate]) -> Result<Vec<f64>, ModelError> {
            Ok(vec![0.0; dates.len()])
        }
    }

    fn registry_with(last: Option<NaiveDate>) -> ModelRegistry {
        ModelRegistry::with_models(Granularity::ALL.iter().map(|g| {
            (*g, Arc::new(StubModel { last }) as Arc<dyn Forecaster>)
        }))
    }

    fn single(granularity: Granularity, date: Option<&str>) -> ForecastQuery {
        ForecastQuery::Single {
            granularity,
            date: date.map(str::to_string),
        }
    }

    #[test]
    fn test_calendar_month_horizon() {
        let rule = HorizonRule::CalendarMonths;
        assert_eq!(rule.horizon(ymd(2024, 12, 1), ymd(2025, 1, 15)), 1);
        assert_eq!(rule.horizon(ymd(2024, 12, 1), ymd(2024, 12, 31)), 0);
        assert_eq!(rule.horizon(ymd(2024, 12, 1), ymd(2026, 3, 1)), 15);
    }

    #[test]
    fn test_week_horizon() {
        let rule = HorizonRule::Weeks;
        assert_eq!(rule.horizon(ymd(2024, 12, 1), ymd(2024, 12, 2)), 1);
        assert_eq!(rule.horizon(ymd(2024, 12, 1), ymd(2024, 12, 8)), 1);
        assert_eq!(rule.horizon(ymd(2024, 12, 1), ymd(2024, 12, 9)), 2);
        assert_eq!(rule.horizon(ymd(2024, 12, 1), ymd(2024, 12, 1)), 0);
    }

    #[test]
    fn test_missing_and_blank_dates() {
        let registry = registry_with(Some(ymd(2024, 12, 1)));
        let validator = ForecastValidator::new(&registry, HorizonRule::CalendarMonths);

        let err = validator.validate(&single(Granularity::Monthly, None)).unwrap_err();
        assert_eq!(err, ForecastError::MissingField { field: "date" });

        let err = validator.validate(&single(Granularity::Monthly, Some("  "))).unwrap_err();
        assert_eq!(err, ForecastError::MissingField { field: "date" });

        let err = validator
            .validate(&ForecastQuery::Range {
                granularity: Granularity::Weekly,
                start_date: Some("2025-01-01".into()),
                end_date: None,
            })
            .unwrap_err();
        assert_eq!(err, ForecastError::MissingField { field: "end_date" });
    }

    #[test]
    fn test_missing_field_checked_before_model_lookup() {
        let registry = ModelRegistry::empty();
        let validator = ForecastValidator::new(&registry, HorizonRule::CalendarMonths);

        let err = validator.validate(&single(Granularity::Daily, None)).unwrap_err();
        assert!(matches!(err, ForecastError::MissingField { .. }));

        let err = validator
            .validate(&single(Granularity::Daily, Some("2025-01-01")))
            .unwrap_err();
        assert_eq!(
            err,
            ForecastError::ModelUnavailable {
                granularity: Granularity::Daily
            }
        );
    }

    #[test]
    fn test_malformed_date() {
        let registry = registry_with(Some(ymd(2024, 12, 1)));
        let validator = ForecastValidator::new(&registry, HorizonRule::CalendarMonths);

        let err = validator
            .validate(&single(Granularity::Monthly, Some("15/01/2025")))
            .unwrap_err();
        assert!(matches!(err, ForecastError::InvalidDate { field: "date", .. }));
    }

    #[test]
    fn test_missing_training_metadata() {
        let registry = registry_with(None);
        let validator = ForecastValidator::new(&registry, HorizonRule::CalendarMonths);

        let err = validator
            .validate(&single(Granularity::Weekly, Some("2025-01-15")))
            .unwrap_err();
        assert_eq!(
            err,
            ForecastError::MissingTrainingMetadata {
                granularity: Granularity::Weekly
            }
        );
    }

    #[test]
    fn test_date_must_be_after_training_data() {
        let registry = registry_with(Some(ymd(2024, 12, 1)));
        let validator = ForecastValidator::new(&registry, HorizonRule::CalendarMonths);

        for granularity in Granularity::ALL {
            for date in ["2024-11-01", "2024-12-01"] {
                let err = validator.validate(&single(granularity, Some(date))).unwrap_err();
                assert!(
                    matches!(err, ForecastError::DateNotFuture { .. }),
                    "{} {} -> {:?}",
                    granularity,
                    date,
                    err
                );
            }
        }
    }

    #[test]
    fn test_same_month_target_has_no_horizon() {
        let registry = registry_with(Some(ymd(2024, 12, 1)));
        let validator = ForecastValidator::new(&registry, HorizonRule::CalendarMonths);

        let err = validator
            .validate(&single(Granularity::Monthly, Some("2024-12-20")))
            .unwrap_err();
        assert_eq!(
            err,
            ForecastError::InvalidHorizon {
                date: ymd(2024, 12, 20),
                horizon: 0
            }
        );

        // daily requests never compute a month horizon
        let ok = validator
            .validate(&single(Granularity::Daily, Some("2024-12-20")))
            .unwrap();
        assert_eq!(ok.plan, ForecastPlan::Dated { date: ymd(2024, 12, 20) });
    }

    #[test]
    fn test_weekly_horizon_rule_applies_to_weekly_only() {
        let registry = registry_with(Some(ymd(2024, 12, 1)));
        let validator = ForecastValidator::new(&registry, HorizonRule::Weeks);

        let weekly = validator
            .validate(&single(Granularity::Weekly, Some("2024-12-20")))
            .unwrap();
        assert_eq!(
            weekly.plan,
            ForecastPlan::Steps {
                date: ymd(2024, 12, 20),
                horizon: 3
            }
        );

        let monthly = validator.validate(&single(Granularity::Monthly, Some("2024-12-20")));
        assert!(matches!(monthly, Err(ForecastError::InvalidHorizon { .. })));
    }

    #[test]
    fn test_monthly_scenario_plan() {
        let registry = registry_with(Some(ymd(2024, 12, 1)));
        let validator = ForecastValidator::new(&registry, HorizonRule::CalendarMonths);

        let validated = validator
            .validate(&single(Granularity::Monthly, Some("2025-01-15")))
            .unwrap();
        assert_eq!(
            validated.plan,
            ForecastPlan::Steps {
                date: ymd(2025, 1, 15),
                horizon: 1
            }
        );
        assert_eq!(validated.request.target, ForecastTarget::Single(ymd(2025, 1, 15)));
    }

    #[test]
    fn test_range_rules_in_order() {
        let registry = registry_with(Some(ymd(2024, 12, 1)));
        let validator = ForecastValidator::new(&registry, HorizonRule::CalendarMonths);
        let range = |start: &str, end: &str| ForecastQuery::Range {
            granularity: Granularity::Weekly,
            start_date: Some(start.to_string()),
            end_date: Some(end.to_string()),
        };

        // start in the past wins over an inverted range
        let err = validator.validate(&range("2024-11-01", "2024-10-01")).unwrap_err();
        assert!(matches!(err, ForecastError::DateNotFuture { .. }));

        let err = validator.validate(&range("2025-02-01", "2025-01-01")).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidRange { .. }));

        let err = validator.validate(&range("2025-02-01", "2025-02-01")).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidRange { .. }));

        let ok = validator.validate(&range("2025-01-01", "2025-01-31")).unwrap();
        assert_eq!(
            ok.plan,
            ForecastPlan::WeeklyRange {
                start: ymd(2025, 1, 1),
                end: ymd(2025, 1, 31),
                last_training_date: ymd(2024, 12, 1),
            }
        );
    }

    #[test]
    fn test_trailing_window_skips_training_checks() {
        let registry = registry_with(None);
        let validator = ForecastValidator::new(&registry, HorizonRule::CalendarMonths);

        let ok = validator
            .validate(&ForecastQuery::TrailingWindow {
                granularity: Granularity::Daily,
                date: Some("2017-06-30".into()),
            })
            .unwrap();
        assert_eq!(ok.plan, ForecastPlan::TrailingWindow { end: ymd(2017, 6, 30) });
    }
}
