//! ragbench-embed
//!
//! Offline embedding provider. `HashEmbedder` maps text to a fixed-size
//! feature-hashed bag of words so evaluation runs need no model or network.

pub mod hash;
pub mod pool;

pub use hash::HashEmbedder;
pub use pool::l2_normalize;

use std::sync::Arc;

use ragbench_core::config::EmbeddingSettings;
use ragbench_core::Embedder;
use tracing::info;

/// Embedder used when the caller does not inject one.
pub fn get_default_embedder(settings: &EmbeddingSettings) -> Arc<dyn Embedder> {
    info!(dimension = settings.dimension, "Using HashEmbedder");
    Arc::new(HashEmbedder::new(settings.dimension))
}
