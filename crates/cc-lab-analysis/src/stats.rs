//! Descriptive statistics over sample series.
//!
//! Semantics follow the conventions of the tooling this pipeline's artifacts
//! are compared against: standard deviation uses the sample estimator
//! (n - 1 denominator) and percentiles use linear interpolation between
//! order statistics. All functions return 0.0 for an empty series.

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn min(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

pub fn max(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

pub fn median(values: &[f64]) -> f64 {
    quantile(values, 0.5)
}

/// Sample standard deviation (n - 1 denominator). Zero for fewer than two
/// samples.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Quantile with linear interpolation between closest ranks, `q` in [0, 1].
pub fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let h = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (h - lo as f64)
}

/// Mean absolute first difference. Zero for fewer than two samples.
pub fn jitter(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let total: f64 = values.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
    total / (values.len() - 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn mean_min_max_median() {
        let v = [4.0, 5.0, 6.0];
        close(mean(&v), 5.0);
        close(min(&v), 4.0);
        close(max(&v), 6.0);
        close(median(&v), 5.0);
        close(median(&[1.0, 2.0, 3.0, 4.0]), 2.5);
    }

    #[test]
    fn std_dev_uses_sample_estimator() {
        close(std_dev(&[4.0, 5.0, 6.0]), 1.0);
        // Hand-computed: variance of [1,2,3,4] with n-1 is 5/3.
        close(std_dev(&[1.0, 2.0, 3.0, 4.0]), (5.0f64 / 3.0).sqrt());
        close(std_dev(&[7.0]), 0.0);
    }

    #[test]
    fn quantile_interpolates_linearly() {
        close(quantile(&[4.0, 5.0, 6.0], 0.9), 5.8);
        close(quantile(&[1.0, 2.0, 3.0, 4.0], 0.95), 3.85);
        close(quantile(&[10.0], 0.95), 10.0);
        close(quantile(&[3.0, 1.0, 2.0], 0.0), 1.0);
        close(quantile(&[3.0, 1.0, 2.0], 1.0), 3.0);
    }

    #[test]
    fn jitter_is_mean_absolute_first_difference() {
        close(jitter(&[150.0, 160.0, 140.0]), 15.0);
        close(jitter(&[100.0]), 0.0);
        close(jitter(&[]), 0.0);
    }

    #[test]
    fn empty_series_yield_zero() {
        close(mean(&[]), 0.0);
        close(std_dev(&[]), 0.0);
        close(quantile(&[], 0.5), 0.0);
    }
}
