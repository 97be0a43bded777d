//! Per-observation standardization.
//!
//! Statistics are taken over the components of the single vector being
//! normalized, not over a running history of observations.

use super::error::NormalizeError;

/// Returns `(x - mean) / stdev` for every component of `values`.
///
/// Uses the sample standard deviation (n - 1 denominator), so at least two
/// components are required.
pub fn normalize(values: &[f64]) -> Result<Vec<f64>, NormalizeError> {
    let n = values.len();
    if n < 2 {
        return Err(NormalizeError::TooShort { len: n });
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let sigma = var.sqrt();

    if !mean.is_finite() || !sigma.is_finite() {
        return Err(NormalizeError::NonFinite);
    }
    if sigma == 0.0 {
        return Err(NormalizeError::ZeroVariance);
    }

    Ok(values.iter().map(|v| (v - mean) / sigma).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mean_and_stdev(v: &[f64]) -> (f64, f64) {
        let n = v.len() as f64;
        let m = v.iter().sum::<f64>() / n;
        let s = (v.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (n - 1.0)).sqrt();
        (m, s)
    }

    #[test]
    fn test_normalize_zero_mean_unit_stdev() {
        let inputs: [&[f64]; 3] = [
            &[1.0, 2.0],
            &[3.5, -1.0, 0.25, 8.0, 8.0],
            &[1e-3, 2e-3, -4e-3, 0.0, 7e-3, 1e-3, -1e-3, 5e-3],
        ];
        for x in inputs {
            let y = normalize(x).unwrap();
            assert_eq!(y.len(), x.len());
            let (m, s) = mean_and_stdev(&y);
            assert!(m.abs() < 1e-12, "mean {m} for {x:?}");
            assert!((s - 1.0).abs() < 1e-12, "stdev {s} for {x:?}");
        }
    }

    #[test]
    fn test_normalize_two_values() {
        // mean 2, sample stdev sqrt(2)
        let y = normalize(&[1.0, 3.0]).unwrap();
        let h = std::f64::consts::FRAC_1_SQRT_2;
        assert!((y[0] + h).abs() < 1e-12);
        assert!((y[1] - h).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_shift_scale_invariant() {
        let x = [0.3, -1.2, 4.0, 2.2, 0.0, -0.7];
        let base = normalize(&x).unwrap();
        for &(a, b) in &[(2.0, 0.0), (0.5, -3.0), (17.0, 100.0), (1e-2, 10.0)] {
            let shifted: Vec<f64> = x.iter().map(|v| a * v + b).collect();
            let y = normalize(&shifted).unwrap();
            for (p, q) in base.iter().zip(&y) {
                assert!((p - q).abs() < 1e-9, "a={a} b={b}: {p} vs {q}");
            }
        }
    }

    #[test]
    fn test_normalize_rejects_short_input() {
        assert_eq!(normalize(&[]), Err(NormalizeError::TooShort { len: 0 }));
        assert_eq!(normalize(&[4.2]), Err(NormalizeError::TooShort { len: 1 }));
    }

    #[test]
    fn test_normalize_rejects_constant_input() {
        assert_eq!(normalize(&[2.5, 2.5, 2.5]), Err(NormalizeError::ZeroVariance));
    }

    #[test]
    fn test_normalize_rejects_nan() {
        assert_eq!(normalize(&[1.0, f64::NAN]), Err(NormalizeError::NonFinite));
    }
}
