//! ragbench-eval
//!
//! Span algebra, retrieval metrics and the evaluation orchestrator.
//! `ChunkLevelEvaluation` compares chunk ids, `TokenLevelEvaluation`
//! compares character spans; both share the same run pipeline.

pub mod chunk_level;
pub mod metrics;
pub mod options;
mod runner;
pub mod token_level;

pub use chunk_level::ChunkLevelEvaluation;
pub use metrics::{ChunkMetric, Metric, SpanMetric};
pub use options::{ChunkLevelRunOptions, RunOptions, TokenLevelRunOptions};
pub use token_level::TokenLevelEvaluation;
