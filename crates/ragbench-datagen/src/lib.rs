//! ragbench-datagen
//!
//! Synthetic ground truth from an LLM. The chunk-level strategy asks for
//! questions answerable by specific chunk ids; the token-level strategy asks
//! for questions and then for verbatim excerpts, which are located in the
//! source document to become character spans.

pub mod chunk_level;
pub mod generator;
pub mod locate;
pub mod token_level;

pub use generator::{
    GenerateOptions, GeneratedDataset, GenerationStrategy, SyntheticDatasetGenerator, Upload,
    DEFAULT_MODEL,
};
pub use locate::locate_excerpt;
