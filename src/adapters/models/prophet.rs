//! Prophet-style additive regression evaluated from exported parameters: a
//! piecewise linear trend plus Fourier seasonalities.

use crate::domain::ports::Forecaster;
use crate::utils::error::ModelError;
use chrono::{Days, NaiveDate};
use serde::Deserialize;
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonalityMode {
    #[default]
    Additive,
    Multiplicative,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Seasonality {
    pub name: String,
    /// Period in days.
    pub period: f64,
    pub fourier_order: usize,
    /// `[sin_1, cos_1, sin_2, cos_2, ...]`
    pub coefficients: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProphetArtifact {
    pub history_start: NaiveDate,
    #[serde(default)]
    pub history_end: Option<NaiveDate>,
    pub t_scale_days: f64,
    pub y_scale: f64,
    pub k: f64,
    pub m: f64,
    #[serde(default)]
    pub changepoints: Vec<f64>,
    #[serde(default)]
    pub deltas: Vec<f64>,
    #[serde(default)]
    pub seasonalities: Vec<Seasonality>,
    #[serde(default)]
    pub seasonality_mode: SeasonalityMode,
}

#[derive(Debug, Clone)]
pub struct Prophet {
    params: ProphetArtifact,
}

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

impl Prophet {
    pub fn from_artifact(params: ProphetArtifact) -> Result<Self, ModelError> {
        if !(params.t_scale_days.is_finite() && params.t_scale_days > 0.0) {
            return Err(ModelError::InvalidArtifact(
                "t_scale_days must be a positive number".to_string(),
            ));
        }
        if params.changepoints.len() != params.deltas.len() {
            return Err(ModelError::InvalidArtifact(format!(
                "{} changepoints but {} deltas",
                params.changepoints.len(),
                params.deltas.len()
            )));
        }
        for s in &params.seasonalities {
            if !(s.period > 0.0) {
                return Err(ModelError::InvalidArtifact(format!(
                    "seasonality '{}' needs a positive period",
                    s.name
                )));
            }
            if s.coefficients.len() != 2 * s.fourier_order {
                return Err(ModelError::InvalidArtifact(format!(
                    "seasonality '{}' of order {} needs {} coefficients, found {}",
                    s.name,
                    s.fourier_order,
                    2 * s.fourier_order,
                    s.coefficients.len()
                )));
            }
        }
        Ok(Self { params })
    }

    fn trend(&self, t: f64) -> f64 {
        let p = &self.params;
        let (slope, offset) = p
            .changepoints
            .iter()
            .zip(&p.deltas)
            .filter(|(cp, _)| **cp <= t)
            .fold((p.k, p.m), |(k, m), (cp, delta)| (k + delta, m - cp * delta));
        slope * t + offset
    }

    fn seasonal(&self, date: NaiveDate) -> f64 {
        let days = (date - epoch()).num_days() as f64;
        self.params
            .seasonalities
            .iter()
            .map(|s| {
                (0..s.fourier_order)
                    .map(|i| {
                        let x = 2.0 * PI * (i + 1) as f64 * days / s.period;
                        s.coefficients[2 * i] * x.sin() + s.coefficients[2 * i + 1] * x.cos()
                    })
                    .sum::<f64>()
            })
            .sum()
    }

    fn yhat(&self, date: NaiveDate) -> f64 {
        let p = &self.params;
        let t = (date - p.history_start).num_days() as f64 / p.t_scale_days;
        let trend = self.trend(t);
        let seasonal = self.seasonal(date);
        match p.seasonality_mode {
            SeasonalityMode::Additive => (trend + seasonal) * p.y_scale,
            SeasonalityMode::Multiplicative => trend * (1.0 + seasonal) * p.y_scale,
        }
    }
}

impl Forecaster for Prophet {
    fn family(&self) -> &'static str {
        "Prophet"
    }

    fn last_training_date(&self) -> Option<NaiveDate> {
        self.params.history_end
    }

    /// Predicts the `steps` days following the end of the training history.
    fn forecast(&self, steps: usize) -> Result<Vec<f64>, ModelError> {
        let end = self.params.history_end.ok_or_else(|| {
            ModelError::Unsupported("artifact does not record where its history ends".to_string())
        })?;
        let dates: Vec<NaiveDate> = (1..=steps as u64)
            .map_while(|h| end.checked_add_days(Days::new(h)))
            .collect();
        if dates.len() != steps {
            return Err(ModelError::Unsupported(format!(
                "cannot forecast {} days past {}",
                steps, end
            )));
        }
        self.predict(&dates)
    }

    fn predict(&self, dates: &[NaiveDate]) -> Result<Vec<f64>, ModelError> {
        Ok(dates.iter().map(|d| self.yhat(*d)).collect())
    }
}
