//! Seasonal ARIMA forecaster rebuilt from exported fit parameters.
//!
//! The model is
//!
//! ```text
//! φ(B) Φ(Bˢ) w_t = c + θ(B) Θ(Bˢ) ε_t      w_t = (1 - B)^d (1 - Bˢ)^D y_t
//! ```
//!
//! with `φ(B) = 1 - Σ ar_i Bⁱ` and `θ(B) = 1 + Σ ma_i Bⁱ`. Residuals over the
//! training window are recovered by conditional sum of squares; forecasts set all
//! future shocks to zero and integrate the differenced series back to levels.

use crate::domain::ports::Forecaster;
use crate::utils::error::ModelError;
use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SarimaArtifact {
    /// `[p, d, q]`
    pub order: [usize; 3],
    /// `[P, D, Q, s]`
    #[serde(default)]
    pub seasonal_order: [usize; 4],
    #[serde(default)]
    pub ar: Vec<f64>,
    #[serde(default)]
    pub ma: Vec<f64>,
    #[serde(default)]
    pub seasonal_ar: Vec<f64>,
    #[serde(default)]
    pub seasonal_ma: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
    pub endog: Vec<f64>,
    #[serde(default)]
    pub dates: Option<Vec<NaiveDate>>,
}

#[derive(Debug, Clone)]
pub struct Sarima {
    /// `a_l` such that `w_t = c + Σ a_l w_{t-l} + ...`; index 0 unused.
    ar_lags: Vec<f64>,
    /// `m_l` such that `... + ε_t + Σ m_l ε_{t-l}`; index 0 unused.
    ma_lags: Vec<f64>,
    /// Coefficients of `(1 - B)^d (1 - Bˢ)^D`, `diff[0] == 1`.
    diff: Vec<f64>,
    intercept: f64,
    endog: Vec<f64>,
    differenced: Vec<f64>,
    residuals: Vec<f64>,
    last_training_date: Option<NaiveDate>,
}

fn poly_mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// `1 + sign * Σ coeffs_i B^(i * spacing)`
fn lag_poly(coeffs: &[f64], spacing: usize, sign: f64) -> Vec<f64> {
    let mut poly = vec![0.0; coeffs.len() * spacing + 1];
    poly[0] = 1.0;
    for (i, c) in coeffs.iter().enumerate() {
        poly[(i + 1) * spacing] = sign * c;
    }
    poly
}

fn check_len(name: &str, values: &[f64], expected: usize) -> Result<(), ModelError> {
    if values.len() != expected {
        return Err(ModelError::InvalidArtifact(format!(
            "expected {} {} coefficients, found {}",
            expected,
            name,
            values.len()
        )));
    }
    Ok(())
}

impl Sarima {
    pub fn from_artifact(artifact: SarimaArtifact) -> Result<Self, ModelError> {
        let [p, d, q] = artifact.order;
        let [sp, sd, sq, s] = artifact.seasonal_order;

        check_len("ar", &artifact.ar, p)?;
        check_len("ma", &artifact.ma, q)?;
        check_len("seasonal_ar", &artifact.seasonal_ar, sp)?;
        check_len("seasonal_ma", &artifact.seasonal_ma, sq)?;
        if s == 0 && sp + sd + sq > 0 {
            return Err(ModelError::InvalidArtifact(
                "seasonal period must be at least 1 when seasonal terms are used".to_string(),
            ));
        }

        let non_finite = artifact
            .ar
            .iter()
            .chain(&artifact.ma)
            .chain(&artifact.seasonal_ar)
            .chain(&artifact.seasonal_ma)
            .chain(std::iter::once(&artifact.intercept))
            .chain(&artifact.endog)
            .any(|v| !v.is_finite());
        if non_finite {
            return Err(ModelError::InvalidArtifact(
                "parameters and training data must be finite".to_string(),
            ));
        }

        let last_training_date = match &artifact.dates {
            Some(dates) if dates.len() != artifact.endog.len() => {
                return Err(ModelError::InvalidArtifact(format!(
                    "{} dates given for {} observations",
                    dates.len(),
                    artifact.endog.len()
                )))
            }
            Some(dates) => dates.last().copied(),
            None => None,
        };

        let seasonal_spacing = s.max(1);
        let ar_poly = poly_mul(
            &lag_poly(&artifact.ar, 1, -1.0),
            &lag_poly(&artifact.seasonal_ar, seasonal_spacing, -1.0),
        );
        let ma_poly = poly_mul(
            &lag_poly(&artifact.ma, 1, 1.0),
            &lag_poly(&artifact.seasonal_ma, seasonal_spacing, 1.0),
        );

        let mut diff = vec![1.0];
        for _ in 0..d {
            diff = poly_mul(&diff, &[1.0, -1.0]);
        }
        for _ in 0..sd {
            diff = poly_mul(&diff, &lag_poly(&[1.0], seasonal_spacing, -1.0));
        }

        let order = diff.len() - 1;
        if artifact.endog.len() <= order {
            return Err(ModelError::InvalidArtifact(format!(
                "{} observations are not enough history for a differencing order of {}",
                artifact.endog.len(),
                order
            )));
        }

        let differenced: Vec<f64> = (order..artifact.endog.len())
            .map(|t| (0..=order).map(|k| diff[k] * artifact.endog[t - k]).sum::<f64>())
            .collect();

        let mut model = Self {
            ar_lags: ar_poly.iter().map(|c| -c).collect(),
            ma_lags: ma_poly,
            diff,
            intercept: artifact.intercept,
            endog: artifact.endog,
            differenced,
            residuals: Vec::new(),
            last_training_date,
        };
        model.residuals = model.conditional_residuals();
        Ok(model)
    }

    fn ar_order(&self) -> usize {
        self.ar_lags.len() - 1
    }

    /// One-step prediction of `w[t]` from the values and shocks before it. Lags
    /// that fall before the start of the series contribute nothing.
    fn one_step(&self, w: &[f64], shocks: &[f64], t: usize) -> f64 {
        let ar: f64 = (1..self.ar_lags.len())
            .filter(|l| *l <= t)
            .map(|l| self.ar_lags[l] * w[t - l])
            .sum();
        let ma: f64 = (1..self.ma_lags.len())
            .filter(|l| *l <= t)
            .map(|l| self.ma_lags[l] * shocks[t - l])
            .sum();
        self.intercept + ar + ma
    }

    fn conditional_residuals(&self) -> Vec<f64> {
        let mut residuals = vec![0.0; self.differenced.len()];
        for t in self.ar_order()..self.differenced.len() {
            residuals[t] = self.differenced[t] - self.one_step(&self.differenced, &residuals, t);
        }
        residuals
    }
}

impl Forecaster for Sarima {
    fn family(&self) -> &'static str {
        "SARIMA"
    }

    fn last_training_date(&self) -> Option<NaiveDate> {
        self.last_training_date
    }

    fn forecast(&self, steps: usize) -> Result<Vec<f64>, ModelError> {
        let n = self.differenced.len();
        let mut w = self.differenced.clone();
        let mut shocks = self.residuals.clone();
        for t in n..n + steps {
            let next = self.one_step(&w, &shocks, t);
            w.push(next);
            shocks.push(0.0);
        }

        let order = self.diff.len() - 1;
        let mut levels = self.endog.clone();
        for w_t in &w[n..] {
            let t = levels.len();
            let carried: f64 = (1..=order).map(|k| self.diff[k] * levels[t - k]).sum();
            levels.push(w_t - carried);
        }
        Ok(levels.split_off(self.endog.len()))
    }

    fn predict(&self, _dates: &[NaiveDate]) -> Result<Vec<f64>, ModelError> {
        Err(ModelError::Unsupported(
            "SARIMA models only produce step-ahead forecasts".to_string(),
        ))
    }
}
