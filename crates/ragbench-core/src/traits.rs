//! Seams between the evaluation engine and its collaborators.
//!
//! Segmenters are synchronous and pure. Everything that may reach a remote
//! service (embedding, reranking, dataset stores, LLMs) is async and returns
//! `anyhow::Result` so implementations can carry whatever error they have.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::types::{ChunkLevelGroundTruth, Document, PositionAwareChunk, TokenLevelGroundTruth};

/// Splits text into bare pieces without tracking where they came from.
pub trait Chunker: Send + Sync {
    fn name(&self) -> String;
    fn chunk(&self, text: &str) -> Vec<String>;
}

/// Splits a document into chunks carrying exact source offsets.
pub trait PositionAwareChunker: Send + Sync {
    fn name(&self) -> String;
    fn chunk_with_positions(&self, doc: &Document) -> Vec<PositionAwareChunk>;

    /// Pieces dropped so far because their offsets could not be recovered.
    fn skipped_chunks(&self) -> usize {
        0
    }
}

/// Segmentation strategy handed to an evaluation run.
#[derive(Clone)]
pub enum ChunkerKind {
    Plain(Arc<dyn Chunker>),
    PositionAware(Arc<dyn PositionAwareChunker>),
}

impl ChunkerKind {
    pub fn name(&self) -> String {
        match self {
            ChunkerKind::Plain(c) => c.name(),
            ChunkerKind::PositionAware(c) => c.name(),
        }
    }
}

impl fmt::Debug for ChunkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkerKind::Plain(c) => f.debug_tuple("Plain").field(&c.name()).finish(),
            ChunkerKind::PositionAware(c) => f.debug_tuple("PositionAware").field(&c.name()).finish(),
        }
    }
}

/// Text embedding provider.
///
/// `embed` must return exactly one vector per input, in input order, and
/// every vector produced within a run must have the same dimension.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn name(&self) -> String;
    fn dimension(&self) -> usize;
    async fn embed(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
    async fn embed_query(&self, text: &str) -> anyhow::Result<Vec<f32>>;
}

/// Post-retrieval reordering step.
#[async_trait]
pub trait Reranker: Send + Sync {
    fn name(&self) -> String;
    async fn rerank(
        &self,
        query: &str,
        chunks: Vec<PositionAwareChunk>,
        top_k: usize,
    ) -> anyhow::Result<Vec<PositionAwareChunk>>;
}

/// One retrieved chunk. Higher `score` is better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub chunk: PositionAwareChunk,
    pub score: f32,
}

/// Retrieval backend. Implementations must score by cosine similarity,
/// order by descending score with ties kept in insertion order, and return
/// at most `k` hits.
#[async_trait]
pub trait VectorStore: Send + Sync {
    fn name(&self) -> String;
    async fn add(&self, chunks: &[PositionAwareChunk], embeddings: &[Vec<f32>]) -> anyhow::Result<()>;
    async fn search(&self, query_embedding: &[f32], k: usize) -> anyhow::Result<Vec<SearchHit>>;
    async fn clear(&self) -> anyhow::Result<()>;
}

/// Fetches labeled queries by dataset name.
#[async_trait]
pub trait GroundTruthLoader: Send + Sync {
    async fn load_chunk_level(&self, dataset: &str) -> anyhow::Result<Vec<ChunkLevelGroundTruth>>;
    async fn load_token_level(&self, dataset: &str) -> anyhow::Result<Vec<TokenLevelGroundTruth>>;
}

/// Persists labeled queries; returns the dataset name actually written.
#[async_trait]
pub trait GroundTruthUploader: Send + Sync {
    async fn upload_chunk_level(
        &self,
        dataset: &str,
        ground_truth: &[ChunkLevelGroundTruth],
    ) -> anyhow::Result<String>;
    async fn upload_token_level(
        &self,
        dataset: &str,
        ground_truth: &[TokenLevelGroundTruth],
    ) -> anyhow::Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub prompt: String,
    /// Ask the provider to constrain the reply to a JSON object.
    pub json_response: bool,
}

/// Chat completion provider used for synthetic dataset generation.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> anyhow::Result<String>;
}
