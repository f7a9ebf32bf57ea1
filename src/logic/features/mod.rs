//! Features Module - Signal Assembly
//!
//! Turns an arbitrary per-pair signal mapping into a fixed-order numeric
//! vector. The layout in `layout.rs` is the single source of truth for
//! feature ordering; models carry its CRC32 hash for compatibility checks.

pub mod layout;
pub mod vector;

pub use layout::{CORE_FEATURE_ORDER, DIAGNOSTIC_KEYS, core_order, layout_hash};
pub use vector::{assemble, SignalMap};
