use std::sync::Arc;

use ragbench_core::{
    ChunkLevelGroundTruth, ChunkerKind, Embedder, Reranker, TokenLevelGroundTruth, VectorStore,
};

use crate::metrics::{ChunkMetric, SpanMetric};

pub const DEFAULT_K: usize = 5;
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Everything one evaluation run needs besides the corpus.
///
/// `G` is the ground-truth record type and `M` the metric type of the
/// evaluation mode; use [`ChunkLevelRunOptions`] or [`TokenLevelRunOptions`].
pub struct RunOptions<G, M> {
    pub chunker: ChunkerKind,
    pub embedder: Arc<dyn Embedder>,
    pub k: usize,
    /// Defaults to a fresh `InMemoryVectorStore` per run.
    pub vector_store: Option<Arc<dyn VectorStore>>,
    pub reranker: Option<Arc<dyn Reranker>>,
    pub metrics: Vec<M>,
    pub batch_size: usize,
    /// Takes precedence over the evaluation's loader.
    pub ground_truth: Option<Vec<G>>,
}

pub type ChunkLevelRunOptions = RunOptions<ChunkLevelGroundTruth, ChunkMetric>;
pub type TokenLevelRunOptions = RunOptions<TokenLevelGroundTruth, SpanMetric>;

impl ChunkLevelRunOptions {
    pub fn new(chunker: ChunkerKind, embedder: Arc<dyn Embedder>) -> Self {
        Self::with_metric_set(chunker, embedder, ChunkMetric::ALL.to_vec())
    }
}

impl TokenLevelRunOptions {
    pub fn new(chunker: ChunkerKind, embedder: Arc<dyn Embedder>) -> Self {
        Self::with_metric_set(chunker, embedder, SpanMetric::ALL.to_vec())
    }
}

impl<G, M> RunOptions<G, M> {
    fn with_metric_set(chunker: ChunkerKind, embedder: Arc<dyn Embedder>, metrics: Vec<M>) -> Self {
        Self {
            chunker,
            embedder,
            k: DEFAULT_K,
            vector_store: None,
            reranker: None,
            metrics,
            batch_size: DEFAULT_BATCH_SIZE,
            ground_truth: None,
        }
    }

    #[must_use]
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    #[must_use]
    pub fn with_vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    #[must_use]
    pub fn with_reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Vec<M>) -> Self {
        self.metrics = metrics;
        self
    }

    #[must_use]
    pub fn with_ground_truth(mut self, ground_truth: Vec<G>) -> Self {
        self.ground_truth = Some(ground_truth);
        self
    }
}
