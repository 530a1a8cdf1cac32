//! Least squares solver.
//!
//! ARIMA estimation here reduces to small linear regression problems of the form:
//!
//! ```text
//! minimize Σ (y_t - x_t^T β)^2
//! ```
//!
//! where the regressors are lagged values of the differenced series (and, for
//! MA terms, lagged residual proxies).
//!
//! Implementation choices:
//! - We use SVD to solve the least-squares problem robustly even when the
//!   design matrix is tall (more rows than columns).
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - Lagged-value columns can be nearly collinear for smooth series, so we try
//!   progressively looser tolerances before giving up.
//! - Parameter dimension is tiny (p + q + 1), so SVD performance is a non-issue.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn least_squares_recovers_ar1_coefficient() {
        // y_t = 0.5 * y_{t-1}, exactly.
        let mut series = vec![1.0_f64];
        for _ in 0..9 {
            series.push(0.5 * series.last().unwrap());
        }

        let n = series.len();
        let mut rows = Vec::new();
        let mut ys = Vec::new();
        for t in 1..n {
            rows.extend_from_slice(&[1.0, series[t - 1]]);
            ys.push(series[t]);
        }
        let x = DMatrix::from_row_slice(n - 1, 2, &rows);
        let y = DVector::from_row_slice(&ys);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!(beta[0].abs() < 1e-8);
        assert!((beta[1] - 0.5).abs() < 1e-8);
    }
}
