//! Per-query retrieval metrics.
//!
//! Identity metrics compare retrieved chunk ids with labeled ids; span
//! metrics compare retrieved character ranges with labeled passages.

pub mod chunk;
pub mod span;
pub mod token;

pub use chunk::ChunkMetric;
pub use token::SpanMetric;

/// A score in `[0, 1]` for one query, over the comparison unit `U`.
pub trait Metric<U>: Send + Sync {
    /// Key used in `EvaluationResult::metrics`.
    fn name(&self) -> &'static str;
    fn calculate(&self, retrieved: &[U], ground_truth: &[U]) -> f64;
}
