//! ARIMA(p, d, q) estimation by conditional least squares.
//!
//! The estimator is deliberately simple and fully deterministic:
//!
//! - difference the series `d` times
//! - pure AR models (q = 0) are a single least-squares solve on lagged values
//! - mixed models (q > 0) use the Hannan–Rissanen two-stage regression:
//!   a long AR fit supplies residual proxies, then AR and MA coefficients are
//!   estimated jointly by least squares on lagged values + lagged proxies
//! - forecasts run the recursion with future shocks at zero, then integrate
//!   back to the original scale
//!
//! No randomness, no iterative optimizer: the same series and order always
//! produce bit-for-bit identical coefficients and forecasts.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::domain::ArimaOrder;
use crate::error::AppError;
use crate::math::solve_least_squares;
use crate::model::diff::{difference, integrate};

/// A fitted ARIMA model.
#[derive(Debug, Clone)]
pub struct Arima {
    order: ArimaOrder,
    ar: Vec<f64>,
    ma: Vec<f64>,
    intercept: f64,
    /// Original (undifferenced) series, kept for integration.
    original: Vec<f64>,
    /// Differenced series the recursion runs on.
    differenced: Vec<f64>,
    /// One-step-ahead residuals on the differenced scale.
    residuals: Vec<f64>,
    sigma2: f64,
    aic: f64,
    bic: f64,
}

/// Serializable snapshot of a fit, for reports and model JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArimaFitSummary {
    pub order: ArimaOrder,
    pub ar: Vec<f64>,
    pub ma: Vec<f64>,
    pub intercept: f64,
    pub sigma2: f64,
    pub aic: f64,
    pub bic: f64,
    pub n_obs: usize,
}

impl Arima {
    /// Fit an ARIMA model to a dense series.
    ///
    /// Fails with a model error when the series is shorter than the order
    /// requires, contains non-finite values, or is degenerate (the differenced
    /// series has zero variance, so AR/MA terms cannot be identified).
    pub fn fit(order: ArimaOrder, values: &[f64]) -> Result<Self, AppError> {
        let n = values.len();
        let needed = order.min_observations();
        if n < needed {
            return Err(AppError::model(format!(
                "Series has {n} observations; ARIMA{order} needs at least {needed}."
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(AppError::model("Series contains non-finite values."));
        }

        let differenced = difference(values, order.d);

        // A zero-variance differenced series (constant input, or an exactly
        // linear trend under d=1) leaves the lagged-value regressors
        // collinear with the constant: the AR/MA terms are unidentifiable.
        if order.p + order.q > 0 && variance(&differenced) < 1e-12 {
            return Err(AppError::model(format!(
                "Degenerate series: differenced values are constant; cannot identify ARIMA{order} terms."
            )));
        }

        let (intercept, ar, ma) = estimate(order, &differenced)?;

        let residuals = one_step_residuals(&differenced, intercept, &ar, &ma);
        let start = order.p.max(order.q);
        let n_eff = differenced.len().saturating_sub(start);
        if n_eff == 0 {
            return Err(AppError::model(format!(
                "Series too short to compute residuals for ARIMA{order}."
            )));
        }

        let sigma2 = residuals[start..].iter().map(|r| r * r).sum::<f64>() / n_eff as f64;
        if !sigma2.is_finite() {
            return Err(AppError::model(
                "Estimator produced non-finite residual variance.",
            ));
        }

        // Gaussian log-likelihood of the conditional residuals; the floor on
        // sigma2 keeps the criteria finite for exact-fit series.
        let k = order.num_params() as f64;
        let n_eff = n_eff as f64;
        let var = sigma2.max(1e-300);
        let ll = -0.5 * n_eff * (1.0 + var.ln() + (2.0 * std::f64::consts::PI).ln());
        let aic = -2.0 * ll + 2.0 * k;
        let bic = -2.0 * ll + k * n_eff.ln();

        Ok(Self {
            order,
            ar,
            ma,
            intercept,
            original: values.to_vec(),
            differenced,
            residuals,
            sigma2,
            aic,
            bic,
        })
    }

    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    /// Produce `horizon` successive point forecasts on the original scale.
    pub fn forecast(&self, horizon: usize) -> Vec<f64> {
        if horizon == 0 {
            return Vec::new();
        }

        let p = self.order.p;
        let q = self.order.q;

        let mut extended = self.differenced.clone();
        let mut extended_res = self.residuals.clone();

        for _ in 0..horizon {
            let t = extended.len();
            let mut pred = self.intercept;
            for i in 0..p {
                if t > i {
                    pred += self.ar[i] * extended[t - 1 - i];
                }
            }
            // Future shocks are zero, so MA terms fade out after q steps.
            for i in 0..q {
                if t > i {
                    pred += self.ma[i] * extended_res[t - 1 - i];
                }
            }
            extended.push(pred);
            extended_res.push(0.0);
        }

        let forecast_diff = extended[self.differenced.len()..].to_vec();
        if self.order.d > 0 {
            integrate(&forecast_diff, &self.original, self.order.d)
        } else {
            forecast_diff
        }
    }

    pub fn summary(&self) -> ArimaFitSummary {
        ArimaFitSummary {
            order: self.order,
            ar: self.ar.clone(),
            ma: self.ma.clone(),
            intercept: self.intercept,
            sigma2: self.sigma2,
            aic: self.aic,
            bic: self.bic,
            n_obs: self.original.len(),
        }
    }
}

/// Estimate `(intercept, ar, ma)` on the differenced scale.
fn estimate(order: ArimaOrder, w: &[f64]) -> Result<(f64, Vec<f64>, Vec<f64>), AppError> {
    let p = order.p;
    let q = order.q;
    let m = w.len();

    if p == 0 && q == 0 {
        let mean = w.iter().sum::<f64>() / m as f64;
        return Ok((mean, Vec::new(), Vec::new()));
    }

    if q == 0 {
        // Pure AR: regress w_t on a constant and its first p lags.
        let beta = lagged_regression(w, None, p, 0, p)?;
        let ar = beta.as_slice()[1..1 + p].to_vec();
        return Ok((beta[0], ar, Vec::new()));
    }

    // Hannan–Rissanen stage 1: a long AR fit supplies residual proxies.
    let r = (p + q).max(5).min(m.saturating_sub(2).max(1));
    let beta_long = lagged_regression(w, None, r, 0, r)?;
    let mut proxies = vec![0.0; m];
    for t in r..m {
        let mut pred = beta_long[0];
        for i in 0..r {
            pred += beta_long[1 + i] * w[t - 1 - i];
        }
        proxies[t] = w[t] - pred;
    }

    // Stage 2: joint regression on p value lags and q proxy lags. Rows start
    // after the proxies become meaningful.
    let start = r.max(p).max(q);
    let beta = lagged_regression(w, Some(&proxies), p, q, start)?;
    let ar = beta.as_slice()[1..1 + p].to_vec();
    let ma = beta.as_slice()[1 + p..1 + p + q].to_vec();
    Ok((beta[0], ar, ma))
}

/// Least-squares regression of `w_t` on `[1, w lags 1..=p, proxy lags 1..=q]`
/// over `t in start..len`.
fn lagged_regression(
    w: &[f64],
    proxies: Option<&[f64]>,
    p: usize,
    q: usize,
    start: usize,
) -> Result<DVector<f64>, AppError> {
    let m = w.len();
    let cols = 1 + p + q;
    if m <= start {
        return Err(AppError::model(
            "Series too short for the requested ARIMA order.",
        ));
    }
    let rows = m - start;

    let mut data = Vec::with_capacity(rows * cols);
    let mut ys = Vec::with_capacity(rows);
    for t in start..m {
        data.push(1.0);
        for i in 0..p {
            data.push(w[t - 1 - i]);
        }
        if let Some(e) = proxies {
            for i in 0..q {
                data.push(e[t - 1 - i]);
            }
        }
        ys.push(w[t]);
    }

    let x = DMatrix::from_row_slice(rows, cols, &data);
    let y = DVector::from_row_slice(&ys);

    solve_least_squares(&x, &y)
        .ok_or_else(|| AppError::model("Estimator failed to converge (singular design matrix)."))
}

/// One-step-ahead residuals on the differenced scale.
///
/// Residuals before `max(p, q)` are zero: the recursion has no history there.
fn one_step_residuals(w: &[f64], intercept: f64, ar: &[f64], ma: &[f64]) -> Vec<f64> {
    let m = w.len();
    let start = ar.len().max(ma.len());
    let mut residuals = vec![0.0; m];

    for t in start..m {
        let mut pred = intercept;
        for (i, phi) in ar.iter().enumerate() {
            pred += phi * w[t - 1 - i];
        }
        for (i, theta) in ma.iter().enumerate() {
            pred += theta * residuals[t - 1 - i];
        }
        residuals[t] = w[t] - pred;
    }

    residuals
}

fn variance(series: &[f64]) -> f64 {
    if series.len() < 2 {
        return 0.0;
    }
    let mean = series.iter().sum::<f64>() / series.len() as f64;
    series.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (series.len() - 1) as f64
}
