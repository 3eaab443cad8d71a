use crate::core::forecast::error::ForecastError;
use crate::core::forecast::validator::{ForecastPlan, HorizonRule, ValidatedForecast};
use crate::domain::model::{ForecastResult, Granularity};
use crate::domain::ports::Forecaster;
use crate::utils::error::ModelError;
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// What to do with range dates whose horizon is not positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeSkipPolicy {
    /// Leave them out of the response.
    #[default]
    Skip,
    /// Return them next to the predictions as error entries.
    Report,
}

pub struct ForecastExecutor {
    weekly_horizon: HorizonRule,
    skip_policy: RangeSkipPolicy,
    trailing_window_days: u32,
}

impl ForecastExecutor {
    pub fn new(weekly_horizon: HorizonRule, skip_policy: RangeSkipPolicy, trailing_window_days: u32) -> Self {
        Self {
            weekly_horizon,
            skip_policy,
            trailing_window_days,
        }
    }

    /// Runs the plan against the model snapshot. Successful results come first in
    /// date order; skipped range dates (report policy only) follow.
    pub fn execute(&self, validated: &ValidatedForecast) -> Result<Vec<ForecastResult>, ForecastError> {
        let model = validated.model.as_ref();

        match validated.plan {
            ForecastPlan::Steps { date, horizon } => {
                let path = run_forecast(model, horizon)?;
                let value = path.last().copied().ok_or_else(|| {
                    ForecastError::ExecutionError(format!(
                        "{} model returned no forecast for {} steps",
                        model.family(),
                        horizon
                    ))
                })?;
                Ok(vec![ForecastResult::success(date, value)])
            }
            ForecastPlan::Dated { date } => {
                let values = run_predict(model, &[date])?;
                let value = values.first().copied().ok_or_else(|| {
                    ForecastError::ExecutionError(format!(
                        "{} model returned no prediction for {}",
                        model.family(),
                        date
                    ))
                })?;
                Ok(vec![ForecastResult::success(date, value)])
            }
            ForecastPlan::WeeklyRange {
                start,
                end,
                last_training_date,
            } => self.weekly_range(model, validated.request.granularity, start, end, last_training_date),
            ForecastPlan::TrailingWindow { end } => {
                let start = end - Duration::days(self.trailing_window_days as i64);
                let dates: Vec<NaiveDate> = start.iter_days().take_while(|d| *d <= end).collect();
                let values = run_predict(model, &dates)?;
                Ok(dates
                    .into_iter()
                    .zip(values)
                    .map(|(date, value)| ForecastResult::success(date, value))
                    .collect())
            }
        }
    }

    fn weekly_range(
        &self,
        model: &dyn Forecaster,
        granularity: Granularity,
        start: NaiveDate,
        end: NaiveDate,
        last_training_date: NaiveDate,
    ) -> Result<Vec<ForecastResult>, ForecastError> {
        let rule = match granularity {
            Granularity::Weekly => self.weekly_horizon,
            _ => HorizonRule::CalendarMonths,
        };

        let mut planned = Vec::new();
        let mut skipped = Vec::new();
        for date in mondays_between(start, end) {
            let horizon = rule.horizon(last_training_date, date);
            if horizon <= 0 {
                tracing::debug!("Skipping {}: forecast horizon {} is not positive", date, horizon);
                if self.skip_policy == RangeSkipPolicy::Report {
                    skipped.push(ForecastResult::skipped(
                        date,
                        format!("Invalid forecast steps: horizon {} for {}", horizon, date),
                    ));
                }
                continue;
            }
            planned.push((date, horizon as usize));
        }

        if planned.is_empty() {
            return Err(ForecastError::NoPredictionsGenerated);
        }

        // One pass covers every date: step h of the longest path equals a fresh
        // h-step forecast because models are deterministic.
        let max_horizon = planned.iter().map(|(_, h)| *h).max().unwrap_or(0);
        let path = run_forecast(model, max_horizon)?;

        let mut results = Vec::with_capacity(planned.len() + skipped.len());
        for (date, horizon) in planned {
            let value = path.get(horizon - 1).copied().ok_or_else(|| {
                ForecastError::ExecutionError(format!(
                    "{} model returned {} steps, expected {}",
                    model.family(),
                    path.len(),
                    max_horizon
                ))
            })?;
            results.push(ForecastResult::success(date, value));
        }
        results.extend(skipped);
        Ok(results)
    }
}

/// Every Monday in `[start, end]`, inclusive on both ends.
pub fn mondays_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let offset = (7 - start.weekday().num_days_from_monday()) % 7;
    let first = start + Duration::days(offset as i64);
    first
        .iter_weeks()
        .take_while(|d| *d <= end)
        .collect()
}

fn run_forecast(model: &dyn Forecaster, steps: usize) -> Result<Vec<f64>, ForecastError> {
    let values = model.forecast(steps).map_err(execution_error(model))?;
    ensure_finite(model, values)
}

fn run_predict(model: &dyn Forecaster, dates: &[NaiveDate]) -> Result<Vec<f64>, ForecastError> {
    let values = model.predict(dates).map_err(execution_error(model))?;
    if values.len() != dates.len() {
        return Err(ForecastError::ExecutionError(format!(
            "{} model returned {} predictions for {} dates",
            model.family(),
            values.len(),
            dates.len()
        )));
    }
    ensure_finite(model, values)
}

fn ensure_finite(model: &dyn Forecaster, values: Vec<f64>) -> Result<Vec<f64>, ForecastError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(step) => Err(execution_error(model)(ModelError::NonFinite { step })),
        None => Ok(values),
    }
}

fn execution_error(model: &dyn Forecaster) -> impl Fn(ModelError) -> ForecastError + '_ {
    move |e| {
        tracing::error!("{} model invocation failed: {}", model.family(), e);
        ForecastError::ExecutionError(e.to_string())
    }
}
