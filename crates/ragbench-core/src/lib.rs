//! ragbench-core
//!
//! Data model, nominal identifiers, offset helpers and the collaborator
//! traits shared by the segmenter, similarity index and evaluation crates.

pub mod config;
pub mod dataset;
pub mod error;
pub mod hashing;
pub mod text;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::{
    Chunker, ChunkerKind, CompletionRequest, Embedder, GroundTruthLoader, GroundTruthUploader,
    LlmClient, PositionAwareChunker, Reranker, SearchHit, VectorStore,
};
pub use types::*;
