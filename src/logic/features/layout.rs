//! Feature Layout - Centralized Feature Definition
//!
//! ## Rules (NEVER break these):
//! 1. Add a core feature → append, never reorder
//! 2. Change order → retrain every persisted model
//!
//! Model artifacts embed a CRC32 hash of their feature order; a mismatch at
//! load time means the artifact was trained against a different layout.

use crc32fast::Hasher;

// ============================================================================
// CORE FEATURES
// ============================================================================

/// Core feature names in exact vector order.
/// This is the SINGLE SOURCE OF TRUTH for the predictor's input layout.
pub const CORE_FEATURE_ORDER: &[&str] = &[
    "jaccard",       // 0: word-level set overlap
    "tfidf",         // 1: TF-IDF cosine
    "ngram",         // 2: character n-gram overlap
    "paraphrase",    // 3: embedding similarity (chunked)
    "re_rank_score", // 4: cross-encoder re-rank score (optional column)
];

/// Core dimensionality without the re-rank signal
pub const CORE_DIM: usize = 4;

/// Core dimensionality with the re-rank signal
pub const CORE_DIM_RERANK: usize = 5;

/// Diagnostic keys. Never part of the core vector; consumed only by the
/// post-calibration nudge.
pub const DIAGNOSTIC_KEYS: &[&str] = &[
    "bm25_pair",
    "ann_cosine",
    "simhash",
    "minhash",
    "cluster_same",
];

/// Core feature order at a given dimensionality (4 or 5)
pub fn core_order(dim: usize) -> Vec<String> {
    CORE_FEATURE_ORDER
        .iter()
        .take(dim.min(CORE_FEATURE_ORDER.len()))
        .map(|s| s.to_string())
        .collect()
}

/// Index of a core feature by name
pub fn feature_index(name: &str) -> Option<usize> {
    CORE_FEATURE_ORDER.iter().position(|&n| n == name)
}

/// True if `name` is a known core feature
pub fn is_core_feature(name: &str) -> bool {
    feature_index(name).is_some()
}

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 hash of a feature order. Embedded in model artifacts and checked
/// at load time to detect layout mismatches.
pub fn layout_hash(order: &[String]) -> u32 {
    let mut hasher = Hasher::new();
    for name in order {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // separator
    }
    hasher.finalize()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_order_dims() {
        assert_eq!(core_order(4).len(), 4);
        assert_eq!(core_order(5).len(), 5);
        assert_eq!(core_order(4), &["jaccard", "tfidf", "ngram", "paraphrase"]);
        assert_eq!(core_order(5)[4], "re_rank_score");
    }

    #[test]
    fn test_layout_hash_consistency() {
        let a = layout_hash(&core_order(5));
        let b = layout_hash(&core_order(5));
        assert_eq!(a, b);
        assert_ne!(a, 0);
    }

    #[test]
    fn test_layout_hash_detects_reorder() {
        let mut shuffled = core_order(4);
        shuffled.swap(0, 1);
        assert_ne!(layout_hash(&core_order(4)), layout_hash(&shuffled));
    }

    #[test]
    fn test_feature_index() {
        assert_eq!(feature_index("jaccard"), Some(0));
        assert_eq!(feature_index("re_rank_score"), Some(4));
        assert_eq!(feature_index("bm25_pair"), None);
    }

    #[test]
    fn test_diagnostics_disjoint_from_core() {
        for key in DIAGNOSTIC_KEYS {
            assert!(!is_core_feature(key));
        }
    }
}
