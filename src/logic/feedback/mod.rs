//! Feedback Module - Labeled Pair Records
//!
//! Human review produces one record per judged pair. Records are append-only
//! and immutable; the training orchestrator consumes them read-only in
//! batch.

pub mod record;
pub mod store;

pub use record::FeedbackRecord;
pub use store::{FeedbackStore, JsonlFeedbackStore};
