//! Feature Vector Assembly
//!
//! A `SignalMap` is whatever subset of signals the feature-computation side
//! produced for one document pair. Assembly projects it onto the fixed core
//! layout: missing keys become 0.0, extra keys (diagnostics included) are
//! ignored here and stay available to the nudge.

use std::collections::BTreeMap;

use super::layout::CORE_FEATURE_ORDER;

/// Per-pair signal mapping (name → value). BTreeMap keeps serialization
/// deterministic for logging and feedback records.
pub type SignalMap = BTreeMap<String, f64>;

/// Assemble a fixed-order core vector of exactly `dim` values (4 or 5).
/// Never fails; unknown dimensionalities are capped at the core layout size.
pub fn assemble(signals: &SignalMap, dim: usize) -> Vec<f64> {
    CORE_FEATURE_ORDER
        .iter()
        .take(dim.min(CORE_FEATURE_ORDER.len()))
        .map(|name| signals.get(*name).copied().unwrap_or(0.0))
        .collect()
}

/// Convenience constructor for tests and tooling
pub fn signal_map<I, K>(pairs: I) -> SignalMap
where
    I: IntoIterator<Item = (K, f64)>,
    K: Into<String>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

// ============================================================================
// TESTS
// ============================================================================
