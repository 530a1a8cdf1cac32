//! Differencing utilities for ARIMA.

/// Difference a series `d` times.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    if d == 0 || series.is_empty() {
        return series.to_vec();
    }

    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= 1 {
            break;
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Integrate (reverse differencing) a forecast made on the differenced scale.
///
/// `original` supplies the initial values at each differencing level, so the
/// integrated forecast continues seamlessly from the end of the history.
pub fn integrate(forecast_diff: &[f64], original: &[f64], d: usize) -> Vec<f64> {
    if d == 0 || forecast_diff.is_empty() {
        return forecast_diff.to_vec();
    }

    let mut result = forecast_diff.to_vec();

    for level in (0..d).rev() {
        let init_value = if level == 0 {
            original.last().copied().unwrap_or(0.0)
        } else {
            difference(original, level).last().copied().unwrap_or(0.0)
        };

        let mut integrated = Vec::with_capacity(result.len());
        let mut cumsum = init_value;
        for &diff in &result {
            cumsum += diff;
            integrated.push(cumsum);
        }
        result = integrated;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difference_order_0_is_identity() {
        let series = vec![1.0, 2.0, 3.0];
        assert_eq!(difference(&series, 0), series);
    }

    #[test]
    fn difference_order_1() {
        let series = vec![1.0, 3.0, 6.0, 10.0, 15.0];
        assert_eq!(difference(&series, 1), vec![2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn difference_order_2() {
        let series = vec![1.0, 3.0, 6.0, 10.0, 15.0];
        assert_eq!(difference(&series, 2), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn integrate_continues_from_last_value() {
        let original = vec![10.0, 12.0, 15.0, 19.0, 24.0];
        let forecast_diff = vec![6.0, 7.0];
        let integrated = integrate(&forecast_diff, &original, 1);

        // 24 + 6 = 30, 30 + 7 = 37
        assert!((integrated[0] - 30.0).abs() < 1e-10);
        assert!((integrated[1] - 37.0).abs() < 1e-10);
    }

    #[test]
    fn integrate_order_2_round_trip() {
        let original = vec![1.0, 3.0, 6.0, 10.0, 15.0];
        // Second differences of this series are all 1.0; continuing the
        // pattern should extend the quadratic: 21, 28.
        let integrated = integrate(&[1.0, 1.0], &original, 2);
        assert!((integrated[0] - 21.0).abs() < 1e-10);
        assert!((integrated[1] - 28.0).abs() < 1e-10);
    }
}
