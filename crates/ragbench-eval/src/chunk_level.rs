use futures::future::BoxFuture;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

use ragbench_core::dataset::DEFAULT_CHUNK_LEVEL_DATASET;
use ragbench_core::{
    ChunkId, ChunkLevelGroundTruth, Corpus, EvaluationResult, GroundTruthLoader, PositionAwareChunk,
    PositionAwareChunkId, Result, RunDiagnostics,
};

use crate::metrics::ChunkMetric;
use crate::options::ChunkLevelRunOptions;
use crate::runner::{run_evaluation, EvaluationMode, PreparedQuery, RunContext};

/// Scores retrieval by chunk identity: a retrieved chunk counts when its
/// content hash matches a labeled chunk id.
pub struct ChunkLevelEvaluation {
    corpus: Arc<Corpus>,
    dataset_name: String,
    loader: Option<Arc<dyn GroundTruthLoader>>,
}

impl ChunkLevelEvaluation {
    pub fn new(corpus: impl Into<Arc<Corpus>>, dataset_name: impl Into<String>) -> Self {
        Self { corpus: corpus.into(), dataset_name: dataset_name.into(), loader: None }
    }

    /// Evaluation over the default chunk-level dataset name.
    pub fn with_default_dataset(corpus: impl Into<Arc<Corpus>>) -> Self {
        Self::new(corpus, DEFAULT_CHUNK_LEVEL_DATASET)
    }

    #[must_use]
    pub fn with_loader(mut self, loader: Arc<dyn GroundTruthLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn dataset_name(&self) -> &str {
        &self.dataset_name
    }

    pub async fn run(&self, options: ChunkLevelRunOptions) -> Result<EvaluationResult> {
        let ctx = RunContext { corpus: &self.corpus, dataset: &self.dataset_name, loader: self.loader.as_ref() };
        run_evaluation(IdentityMode::default(), ctx, options).await
    }
}

/// Per-run id bookkeeping for identity comparison.
#[derive(Default)]
struct IdentityMode {
    /// position-aware id -> canonical content id
    canonical: HashMap<PositionAwareChunkId, ChunkId>,
    known: HashSet<ChunkId>,
}

impl EvaluationMode for IdentityMode {
    type GroundTruth = ChunkLevelGroundTruth;
    type Unit = ChunkId;
    type Metric = ChunkMetric;

    fn label(&self) -> &'static str {
        "chunk-level"
    }

    fn load<'a>(
        &self,
        loader: &'a dyn GroundTruthLoader,
        dataset: &'a str,
    ) -> BoxFuture<'a, anyhow::Result<Vec<ChunkLevelGroundTruth>>> {
        loader.load_chunk_level(dataset)
    }

    fn index(&mut self, chunks: &[PositionAwareChunk]) {
        for chunk in chunks {
            let id = ChunkId::from_content(&chunk.content);
            self.known.insert(id.clone());
            self.canonical.insert(chunk.id.clone(), id);
        }
    }

    fn prepare(
        &self,
        _corpus: &Corpus,
        ground_truth: Vec<ChunkLevelGroundTruth>,
        diagnostics: &mut RunDiagnostics,
    ) -> Vec<PreparedQuery<ChunkId>> {
        let mut prepared = Vec::with_capacity(ground_truth.len());
        for gt in ground_truth {
            let unresolved = gt.relevant_chunk_ids.iter().filter(|id| !self.known.contains(*id)).count();
            if unresolved > 0 {
                debug!(query = %gt.query.id, unresolved, "Ground truth ids not produced by this chunker");
                diagnostics.unresolved_chunk_ids += unresolved;
            }
            prepared.push(PreparedQuery { query: gt.query, expected: gt.relevant_chunk_ids });
        }
        prepared
    }

    fn convert(&self, retrieved: &[PositionAwareChunk]) -> Vec<ChunkId> {
        retrieved
            .iter()
            .map(|c| self.canonical.get(&c.id).cloned().unwrap_or_else(|| ChunkId::from_content(&c.content)))
            .collect()
    }
}
