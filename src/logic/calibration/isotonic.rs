//! Isotonic Regression
//!
//! Pool-adjacent-violators over (raw score, label) pairs sorted by raw
//! score, ties kept in input order. The fitted table maps raw scores to a
//! non-decreasing calibrated value; inference interpolates linearly between
//! adjacent breakpoints and clamps at the table's ends.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IsotonicRegressor {
    /// Raw-score breakpoints, strictly increasing
    pub breakpoints: Vec<f64>,
    /// Calibrated value at each breakpoint, non-decreasing
    pub values: Vec<f64>,
}

impl IsotonicRegressor {
    /// Fit by PAVA. Returns `None` when the split does not contain both
    /// classes (the table would be a constant and calibration degenerate).
    pub fn fit(scores: &[f64], labels: &[u8]) -> Option<Self> {
        if scores.is_empty() || scores.len() != labels.len() {
            return None;
        }
        if !labels.contains(&0) || !labels.contains(&1) {
            return None;
        }

        // Stable sort keeps ties in input order
        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&i, &j| scores[i].partial_cmp(&scores[j]).unwrap_or(Ordering::Equal));

        // Pool adjacent violators: merge blocks while a block mean exceeds
        // its successor's.
        let mut blocks: Vec<(f64, usize)> = Vec::with_capacity(scores.len());
        for &i in &order {
            let mut sum = f64::from(labels[i]);
            let mut count = 1usize;
            while let Some(&(prev_sum, prev_count)) = blocks.last() {
                if prev_sum / prev_count as f64 > sum / count as f64 {
                    sum += prev_sum;
                    count += prev_count;
                    blocks.pop();
                } else {
                    break;
                }
            }
            blocks.push((sum, count));
        }

        // Expand block means back to per-point fitted values
        let sorted_x: Vec<f64> = order.iter().map(|&i| scores[i]).collect();
        let mut fitted = Vec::with_capacity(sorted_x.len());
        for &(sum, count) in &blocks {
            let mean = sum / count as f64;
            fitted.extend(std::iter::repeat(mean).take(count));
        }

        // Collapse duplicate raw scores into single breakpoints (mean of
        // their fitted values, which preserves monotonicity).
        let mut breakpoints = Vec::new();
        let mut values = Vec::new();
        let mut i = 0;
        while i < sorted_x.len() {
            let mut j = i;
            let mut acc = 0.0;
            while j < sorted_x.len() && sorted_x[j] == sorted_x[i] {
                acc += fitted[j];
                j += 1;
            }
            breakpoints.push(sorted_x[i]);
            values.push(acc / (j - i) as f64);
            i = j;
        }

        Some(Self { breakpoints, values })
    }

    /// Piecewise-linear lookup, clamped at the table's min/max breakpoint
    pub fn calibrate(&self, raw: f64) -> f64 {
        if self.breakpoints.is_empty() {
            return raw;
        }
        let n = self.breakpoints.len();
        if raw <= self.breakpoints[0] {
            return self.values[0];
        }
        if raw >= self.breakpoints[n - 1] {
            return self.values[n - 1];
        }
        // Last breakpoint <= raw
        let k = self.breakpoints.partition_point(|&x| x <= raw) - 1;
        let (x0, x1) = (self.breakpoints[k], self.breakpoints[k + 1]);
        let (y0, y1) = (self.values[k], self.values[k + 1]);
        if x1 == x0 {
            return y0;
        }
        let t = (raw - x0) / (x1 - x0);
        y0 + t * (y1 - y0)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_requires_both_classes() {
        assert!(IsotonicRegressor::fit(&[0.1, 0.9], &[1, 1]).is_none());
        assert!(IsotonicRegressor::fit(&[], &[]).is_none());
    }

    #[test]
    fn test_fitted_values_non_decreasing() {
        let scores = vec![0.9, 0.1, 0.5, 0.3, 0.7, 0.2];
        let labels = vec![1u8, 0, 1, 0, 0, 1];
        let iso = IsotonicRegressor::fit(&scores, &labels).unwrap();
        for pair in iso.values.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
        for pair in iso.breakpoints.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_perfectly_ranked_data() {
        let scores = vec![0.1, 0.2, 0.3, 0.7, 0.8, 0.9];
        let labels = vec![0u8, 0, 0, 1, 1, 1];
        let iso = IsotonicRegressor::fit(&scores, &labels).unwrap();
        assert!(iso.calibrate(0.15) < 0.5);
        assert!(iso.calibrate(0.85) > 0.5);
    }

    #[test]
    fn test_near_identity_on_precalibrated_scores() {
        // Raw scores that already equal the empirical positive rate in
        // their bucket: the fitted curve should stay close to identity on
        // held-out points between breakpoints.
        let mut scores = Vec::new();
        let mut labels = Vec::new();
        for (bucket, rate) in [(0.2, 1), (0.4, 2), (0.6, 3), (0.8, 4)] {
            for k in 0..5 {
                scores.push(bucket);
                labels.push(u8::from(k < rate));
            }
        }
        let iso = IsotonicRegressor::fit(&scores, &labels).unwrap();
        for held_out in [0.3, 0.5, 0.7] {
            assert!(
                (iso.calibrate(held_out) - held_out).abs() < 0.11,
                "calibrate({}) = {}",
                held_out,
                iso.calibrate(held_out)
            );
        }
    }

    #[test]
    fn test_clamped_outside_table() {
        let scores = vec![0.3, 0.4, 0.6, 0.7];
        let labels = vec![0u8, 0, 1, 1];
        let iso = IsotonicRegressor::fit(&scores, &labels).unwrap();
        assert_eq!(iso.calibrate(0.0), iso.values[0]);
        assert_eq!(iso.calibrate(1.0), *iso.values.last().unwrap());
    }

    #[test]
    fn test_interpolation_between_breakpoints() {
        let scores = vec![0.2, 0.8];
        let labels = vec![0u8, 1];
        let iso = IsotonicRegressor::fit(&scores, &labels).unwrap();
        // Halfway between the 0.0 and 1.0 breakpoints
        assert!((iso.calibrate(0.5) - 0.5).abs() < 1e-12);
    }
}
