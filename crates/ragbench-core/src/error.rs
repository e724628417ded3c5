use thiserror::Error;

/// Errors raised by the evaluation core.
///
/// `InvalidConfig` and `Load` are fatal and always reach the caller.
/// `Location` and `Validation` describe recoverable conditions: callers that
/// can skip the offending item do so and count it instead of failing.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Could not locate text in document '{doc_id}': {preview}")]
    Location { doc_id: String, preview: String },

    #[error("Failed to load ground truth dataset '{dataset}': {source}")]
    Load {
        dataset: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Invalid span: {0}")]
    Validation(String),

    #[error("Embedding failed: {0}")]
    Embedding(#[source] anyhow::Error),

    #[error("Rerank failed: {0}")]
    Rerank(#[source] anyhow::Error),

    #[error("Vector store operation failed: {0}")]
    Store(#[source] anyhow::Error),

    #[error("Dataset generation failed: {0}")]
    Generation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
