use futures::future::BoxFuture;
use std::sync::Arc;
use tracing::warn;

use ragbench_core::dataset::DEFAULT_TOKEN_LEVEL_DATASET;
use ragbench_core::{
    Corpus, EvaluationResult, GroundTruthLoader, PositionAwareChunk, Result, RunDiagnostics, SpanRange,
    TokenLevelGroundTruth,
};

use crate::metrics::SpanMetric;
use crate::options::TokenLevelRunOptions;
use crate::runner::{run_evaluation, EvaluationMode, PreparedQuery, RunContext};

/// Scores retrieval by character coverage of labeled passages, so results
/// are comparable across chunkers with different boundaries.
pub struct TokenLevelEvaluation {
    corpus: Arc<Corpus>,
    dataset_name: String,
    loader: Option<Arc<dyn GroundTruthLoader>>,
}

impl TokenLevelEvaluation {
    pub fn new(corpus: impl Into<Arc<Corpus>>, dataset_name: impl Into<String>) -> Self {
        Self { corpus: corpus.into(), dataset_name: dataset_name.into(), loader: None }
    }

    pub fn with_default_dataset(corpus: impl Into<Arc<Corpus>>) -> Self {
        Self::new(corpus, DEFAULT_TOKEN_LEVEL_DATASET)
    }

    #[must_use]
    pub fn with_loader(mut self, loader: Arc<dyn GroundTruthLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn dataset_name(&self) -> &str {
        &self.dataset_name
    }

    pub async fn run(&self, options: TokenLevelRunOptions) -> Result<EvaluationResult> {
        let ctx = RunContext { corpus: &self.corpus, dataset: &self.dataset_name, loader: self.loader.as_ref() };
        run_evaluation(SpanMode, ctx, options).await
    }
}

struct SpanMode;

impl EvaluationMode for SpanMode {
    type GroundTruth = TokenLevelGroundTruth;
    type Unit = SpanRange;
    type Metric = SpanMetric;

    fn label(&self) -> &'static str {
        "token-level"
    }

    fn load<'a>(
        &self,
        loader: &'a dyn GroundTruthLoader,
        dataset: &'a str,
    ) -> BoxFuture<'a, anyhow::Result<Vec<TokenLevelGroundTruth>>> {
        loader.load_token_level(dataset)
    }

    fn index(&mut self, _chunks: &[PositionAwareChunk]) {}

    fn prepare(
        &self,
        corpus: &Corpus,
        ground_truth: Vec<TokenLevelGroundTruth>,
        diagnostics: &mut RunDiagnostics,
    ) -> Vec<PreparedQuery<SpanRange>> {
        let mut prepared = Vec::with_capacity(ground_truth.len());
        for gt in ground_truth {
            let labeled = gt.relevant_spans.len();
            let mut expected = Vec::with_capacity(labeled);
            for span in &gt.relevant_spans {
                match span.validate_against(corpus) {
                    Ok(()) => expected.push(span.range()),
                    Err(e) => {
                        warn!(query = %gt.query.id, error = %e, "Rejecting ground-truth span");
                        diagnostics.spans_rejected += 1;
                    }
                }
            }
            if labeled > 0 && expected.is_empty() {
                warn!(query = %gt.query.id, "Skipping query: every labeled span was rejected");
                diagnostics.queries_skipped += 1;
                continue;
            }
            prepared.push(PreparedQuery { query: gt.query, expected });
        }
        prepared
    }

    fn convert(&self, retrieved: &[PositionAwareChunk]) -> Vec<SpanRange> {
        retrieved.iter().map(PositionAwareChunk::to_span).collect()
    }
}
