//! Evaluation Metrics
//!
//! Rank-based ROC-AUC and stepwise PR-AUC, pure and dependency-free.

/// ROC-AUC via the rank statistic: the probability a random positive
/// outscores a random negative, ties counted half. Returns 0.5 when a class
/// is absent.
pub fn roc_auc(labels: &[u8], scores: &[f64]) -> f64 {
    let pos: Vec<f64> = scores
        .iter()
        .zip(labels)
        .filter(|(_, &l)| l == 1)
        .map(|(&s, _)| s)
        .collect();
    let mut neg: Vec<f64> = scores
        .iter()
        .zip(labels)
        .filter(|(_, &l)| l == 0)
        .map(|(&s, _)| s)
        .collect();

    if pos.is_empty() || neg.is_empty() {
        return 0.5;
    }
    neg.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut better = 0.0;
    for &s in &pos {
        let lt = neg.partition_point(|&v| v < s);
        let le = neg.partition_point(|&v| v <= s);
        better += lt as f64 + 0.5 * (le - lt) as f64;
    }
    better / (pos.len() * neg.len()) as f64
}

/// Stepwise precision-recall AUC. Returns 0.0 when there are no positives.
pub fn pr_auc(labels: &[u8], scores: &[f64]) -> f64 {
    let mut paired: Vec<(f64, u8)> = scores.iter().copied().zip(labels.iter().copied()).collect();
    paired.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut fn_count = paired.iter().filter(|(_, l)| *l == 1).count();
    if fn_count == 0 {
        return 0.0;
    }

    let mut last_recall = 0.0;
    let mut area = 0.0;
    for (_, label) in paired {
        if label == 1 {
            tp += 1;
            fn_count -= 1;
        } else {
            fp += 1;
        }
        let recall = if tp + fn_count > 0 {
            tp as f64 / (tp + fn_count) as f64
        } else {
            1.0
        };
        let precision = if tp + fp > 0 {
            tp as f64 / (tp + fp) as f64
        } else {
            1.0
        };
        area += precision * (recall - last_recall).max(0.0);
        last_recall = recall;
    }
    area
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_ranking() {
        let labels = [0u8, 0, 1, 1];
        let scores = [0.1, 0.2, 0.8, 0.9];
        assert_eq!(roc_auc(&labels, &scores), 1.0);
        assert!((pr_auc(&labels, &scores) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_inverted_ranking() {
        let labels = [1u8, 1, 0, 0];
        let scores = [0.1, 0.2, 0.8, 0.9];
        assert_eq!(roc_auc(&labels, &scores), 0.0);
    }

    #[test]
    fn test_ties_count_half() {
        let labels = [0u8, 1];
        let scores = [0.5, 0.5];
        assert_eq!(roc_auc(&labels, &scores), 0.5);
    }

    #[test]
    fn test_single_class_degenerate() {
        assert_eq!(roc_auc(&[1, 1], &[0.1, 0.9]), 0.5);
        assert_eq!(roc_auc(&[0, 0], &[0.1, 0.9]), 0.5);
        assert_eq!(pr_auc(&[0, 0], &[0.1, 0.9]), 0.0);
    }

    #[test]
    fn test_partial_ranking() {
        // One inversion among 2x2 pairs: AUC = 3/4
        let labels = [0u8, 1, 0, 1];
        let scores = [0.1, 0.4, 0.6, 0.9];
        assert!((roc_auc(&labels, &scores) - 0.75).abs() < 1e-12);
    }
}
