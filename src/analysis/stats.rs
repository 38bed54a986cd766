//! Descriptive statistics and two-sample tests used by the analytics endpoints.

/// Threshold below which a standard deviation is treated as zero.
const STDEV_EPSILON: f64 = 1e-9;

/// Mean and standard deviation of one statistical category across a pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolStats {
    pub mean: f64,
    pub stdev: f64,
}

/// Arithmetic mean; 0.0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Unbiased sample variance (n - 1 denominator); None below two samples
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some(ss / (values.len() - 1) as f64)
}

/// Population mean and standard deviation.
///
/// The pool is the full set being compared, not a sample of a larger one.
pub fn pool_stats(values: &[f64]) -> PoolStats {
    if values.is_empty() {
        return PoolStats {
            mean: 0.0,
            stdev: 0.0,
        };
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    PoolStats {
        mean: m,
        stdev: variance.sqrt(),
    }
}

/// z-score of `value` against `stats`; 0.0 when the pool has no spread
pub fn zscore(value: f64, stats: &PoolStats) -> f64 {
    if stats.stdev < STDEV_EPSILON {
        return 0.0;
    }
    (value - stats.mean) / stats.stdev
}

/// Welch's t statistic for two independent samples with unequal variances
pub fn welch_t(a: &[f64], b: &[f64]) -> Option<f64> {
    let va = sample_variance(a)?;
    let vb = sample_variance(b)?;
    let se = (va / a.len() as f64 + vb / b.len() as f64).sqrt();
    if se < STDEV_EPSILON {
        return None;
    }
    Some((mean(a) - mean(b)) / se)
}

/// Cohen's d effect size using the pooled standard deviation
pub fn cohens_d(a: &[f64], b: &[f64]) -> Option<f64> {
    let va = sample_variance(a)?;
    let vb = sample_variance(b)?;
    let (na, nb) = (a.len() as f64, b.len() as f64);
    let pooled = (((na - 1.0) * va + (nb - 1.0) * vb) / (na + nb - 2.0)).sqrt();
    if pooled < STDEV_EPSILON {
        return None;
    }
    Some((mean(a) - mean(b)) / pooled)
}

/// Qualitative label for |d| using Cohen's conventional thresholds
pub fn effect_size_label(d: f64) -> &'static str {
    let d = d.abs();
    if d < 0.2 {
        "negligible"
    } else if d < 0.5 {
        "small"
    } else if d < 0.8 {
        "medium"
    } else {
        "large"
    }
}

/// `num / den`, or None when the denominator is zero
pub fn ratio(num: f64, den: f64) -> Option<f64> {
    if den.abs() < STDEV_EPSILON {
        None
    } else {
        Some(num / den)
    }
}

/// Round to `places` decimals for presentation
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_stats_and_zscore() {
        let stats = pool_stats(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((stats.mean - 5.0).abs() < 1e-9);
        assert!((stats.stdev - 2.0).abs() < 1e-9);
        assert!((zscore(9.0, &stats) - 2.0).abs() < 1e-9);

        let flat = pool_stats(&[3.0, 3.0]);
        assert_eq!(zscore(10.0, &flat), 0.0);
        assert_eq!(pool_stats(&[]).mean, 0.0);
    }

    #[test]
    fn test_welch_t_sign_and_degenerate_inputs() {
        let a = [110.0, 112.0, 108.0, 115.0];
        let b = [100.0, 102.0, 98.0, 101.0];
        let t = welch_t(&a, &b).unwrap();
        assert!(t > 5.0);
        assert!(welch_t(&b, &a).unwrap() < 0.0);

        assert!(welch_t(&[100.0], &b).is_none());
        assert!(welch_t(&[100.0, 100.0], &[100.0, 100.0]).is_none());
    }

    #[test]
    fn test_cohens_d() {
        let a = [1.0, 2.0, 3.0];
        let b = [2.0, 3.0, 4.0];
        let d = cohens_d(&a, &b).unwrap();
        assert!((d + 1.0).abs() < 1e-9);
        assert_eq!(effect_size_label(d), "large");
        assert_eq!(effect_size_label(0.1), "negligible");
    }

    #[test]
    fn test_ratio_and_rounding() {
        assert!(ratio(1.0, 0.0).is_none());
        assert_eq!(ratio(3.0, 4.0), Some(0.75));
        assert_eq!(round_to(0.123456, 3), 0.123);
    }
}
