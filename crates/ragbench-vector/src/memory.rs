use anyhow::{bail, Result};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use ragbench_core::{PositionAwareChunk, SearchHit, VectorStore};

use crate::similarity::cosine_similarity;

struct Entry {
    chunk: PositionAwareChunk,
    embedding: Vec<f32>,
}

/// Append-only in-memory index scored by exhaustive cosine similarity.
///
/// One instance belongs to one evaluation run; share it only through the
/// `VectorStore` handle that run was given.
#[derive(Default)]
pub struct InMemoryVectorStore {
    entries: RwLock<Vec<Entry>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    fn name(&self) -> String {
        "InMemory".to_string()
    }

    async fn add(&self, chunks: &[PositionAwareChunk], embeddings: &[Vec<f32>]) -> Result<()> {
        if chunks.len() != embeddings.len() {
            bail!("got {} chunks but {} embeddings", chunks.len(), embeddings.len());
        }
        let mut entries = self.entries.write().await;
        let dim = entries.first().map(|e| e.embedding.len()).or_else(|| embeddings.first().map(Vec::len));
        if let Some(dim) = dim {
            if let Some(bad) = embeddings.iter().find(|e| e.len() != dim) {
                bail!("embedding dimension {} does not match index dimension {dim}", bad.len());
            }
        }
        entries.extend(
            chunks.iter().zip(embeddings).map(|(c, e)| Entry { chunk: c.clone(), embedding: e.clone() }),
        );
        debug!(added = chunks.len(), total = entries.len(), "Indexed chunk batch");
        Ok(())
    }

    async fn search(&self, query_embedding: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        let entries = self.entries.read().await;
        if entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if let Some(first) = entries.first() {
            if first.embedding.len() != query_embedding.len() {
                bail!(
                    "query dimension {} does not match index dimension {}",
                    query_embedding.len(),
                    first.embedding.len()
                );
            }
        }
        let mut scored: Vec<(usize, f32)> = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (i, cosine_similarity(query_embedding, &e.embedding)))
            .collect();
        // stable: equal scores keep insertion order, NaN scores rank last
        scored.sort_by(|a, b| a.1.is_nan().cmp(&b.1.is_nan()).then_with(|| b.1.total_cmp(&a.1)));
        scored.truncate(k);
        Ok(scored
            .into_iter()
            .map(|(i, score)| SearchHit { chunk: entries[i].chunk.clone(), score })
            .collect())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.write().await.clear();
        Ok(())
    }
}
