//! The pipeline shared by both evaluation modes:
//! segment, embed and index, load ground truth, retrieve, score, average.
//! The vector store is cleared on every exit path.

use anyhow::anyhow;
use futures::future::BoxFuture;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use ragbench_core::{
    Corpus, Error, EvaluationResult, GroundTruthLoader, PositionAwareChunk, Query, Result,
    RunDiagnostics, VectorStore,
};
use ragbench_text::position_aware;
use ragbench_vector::InMemoryVectorStore;

use crate::metrics::Metric;
use crate::options::RunOptions;

/// One query ready for scoring: what it asks and what counts as relevant.
pub(crate) struct PreparedQuery<U> {
    pub query: Query,
    pub expected: Vec<U>,
}

/// What differs between identity and span evaluation. A fresh value is
/// used for each run and may hold per-run state built during indexing.
pub(crate) trait EvaluationMode: Send + Sync {
    type GroundTruth: Send + Sync;
    type Unit: Send + Sync;
    type Metric: Metric<Self::Unit>;

    fn label(&self) -> &'static str;

    fn load<'a>(
        &self,
        loader: &'a dyn GroundTruthLoader,
        dataset: &'a str,
    ) -> BoxFuture<'a, anyhow::Result<Vec<Self::GroundTruth>>>;

    /// Observe the chunks just indexed, in index order.
    fn index(&mut self, chunks: &[PositionAwareChunk]);

    /// Turn ground truth into scorable queries, recording anything skipped
    /// or rejected in `diagnostics`.
    fn prepare(
        &self,
        corpus: &Corpus,
        ground_truth: Vec<Self::GroundTruth>,
        diagnostics: &mut RunDiagnostics,
    ) -> Vec<PreparedQuery<Self::Unit>>;

    fn convert(&self, retrieved: &[PositionAwareChunk]) -> Vec<Self::Unit>;
}

pub(crate) struct RunContext<'a> {
    pub corpus: &'a Corpus,
    pub dataset: &'a str,
    pub loader: Option<&'a Arc<dyn GroundTruthLoader>>,
}

pub(crate) async fn run_evaluation<E: EvaluationMode>(
    mut mode: E,
    ctx: RunContext<'_>,
    options: RunOptions<E::GroundTruth, E::Metric>,
) -> Result<EvaluationResult> {
    if options.k == 0 {
        return Err(Error::InvalidConfig("k must be greater than 0".into()));
    }
    if options.batch_size == 0 {
        return Err(Error::InvalidConfig("batch_size must be greater than 0".into()));
    }
    if options.ground_truth.is_none() && ctx.loader.is_none() {
        return Err(Error::Load {
            dataset: ctx.dataset.to_string(),
            source: anyhow!("no ground truth supplied and no loader configured"),
        });
    }

    let store: Arc<dyn VectorStore> = match &options.vector_store {
        Some(s) => Arc::clone(s),
        None => Arc::new(InMemoryVectorStore::new()),
    };

    let outcome = execute(&mut mode, &ctx, options, store.as_ref()).await;
    let cleared = store.clear().await;
    match (outcome, cleared) {
        (Ok(result), Ok(())) => Ok(result),
        (Ok(_), Err(e)) => Err(Error::Store(e)),
        (Err(e), Err(clear_err)) => {
            warn!(error = %clear_err, "Failed to clear vector store after aborted run");
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
    }
}

async fn execute<E: EvaluationMode>(
    mode: &mut E,
    ctx: &RunContext<'_>,
    options: RunOptions<E::GroundTruth, E::Metric>,
    store: &dyn VectorStore,
) -> Result<EvaluationResult> {
    let RunOptions { chunker, embedder, k, reranker, metrics, batch_size, ground_truth, .. } = options;
    let mut diagnostics = RunDiagnostics::default();

    info!(
        mode = mode.label(),
        chunker = %chunker.name(),
        embedder = %embedder.name(),
        store = %store.name(),
        k,
        "Starting evaluation"
    );

    // 1. segment
    let chunker = position_aware(&chunker);
    let skipped_before = chunker.skipped_chunks();
    let chunks: Vec<PositionAwareChunk> =
        ctx.corpus.documents().iter().flat_map(|doc| chunker.chunk_with_positions(doc)).collect();
    diagnostics.chunks_unlocated = chunker.skipped_chunks().saturating_sub(skipped_before);
    diagnostics.chunks_indexed = chunks.len();
    mode.index(&chunks);

    // 2. embed and index, one batch in flight
    for (n, batch) in chunks.chunks(batch_size).enumerate() {
        let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
        let embeddings = embedder.embed(&texts).await.map_err(Error::Embedding)?;
        if embeddings.len() != batch.len() {
            return Err(Error::Embedding(anyhow!(
                "embedder returned {} vectors for {} texts",
                embeddings.len(),
                batch.len()
            )));
        }
        store.add(batch, &embeddings).await.map_err(Error::Store)?;
        debug!(batch = n, size = batch.len(), "Indexed batch");
    }
    info!(
        chunks = diagnostics.chunks_indexed,
        unlocated = diagnostics.chunks_unlocated,
        "Corpus indexed"
    );

    // 3. ground truth
    let ground_truth = match (ground_truth, ctx.loader) {
        (Some(gt), _) => gt,
        (None, Some(loader)) => mode
            .load(loader.as_ref(), ctx.dataset)
            .await
            .map_err(|source| Error::Load { dataset: ctx.dataset.to_string(), source })?,
        (None, None) => {
            return Err(Error::Load {
                dataset: ctx.dataset.to_string(),
                source: anyhow!("no ground truth supplied and no loader configured"),
            })
        }
    };
    let prepared = mode.prepare(ctx.corpus, ground_truth, &mut diagnostics);

    // 4. retrieve and score
    let mut scores: BTreeMap<&'static str, Vec<f64>> =
        metrics.iter().map(|m| (m.name(), Vec::new())).collect();
    for pq in &prepared {
        let query_embedding = embedder.embed_query(&pq.query.text).await.map_err(Error::Embedding)?;
        let hits = store.search(&query_embedding, k).await.map_err(Error::Store)?;
        let mut retrieved: Vec<PositionAwareChunk> = hits.into_iter().map(|h| h.chunk).collect();
        if let Some(reranker) = &reranker {
            retrieved = reranker.rerank(&pq.query.text, retrieved, k).await.map_err(Error::Rerank)?;
            retrieved.truncate(k);
        }
        let units = mode.convert(&retrieved);
        for metric in &metrics {
            let score = metric.calculate(&units, &pq.expected);
            scores.entry(metric.name()).or_default().push(score);
        }
        diagnostics.queries_evaluated += 1;
        debug!(query = %pq.query.id, retrieved = retrieved.len(), "Scored query");
    }

    // 5. aggregate
    let metrics = scores
        .into_iter()
        .map(|(name, s)| {
            let mean = if s.is_empty() { 0.0 } else { s.iter().sum::<f64>() / s.len() as f64 };
            (name.to_string(), mean)
        })
        .collect();

    if diagnostics.is_clean() {
        info!(queries = diagnostics.queries_evaluated, "Evaluation finished");
    } else {
        warn!(
            queries = diagnostics.queries_evaluated,
            skipped = diagnostics.queries_skipped,
            spans_rejected = diagnostics.spans_rejected,
            chunks_unlocated = diagnostics.chunks_unlocated,
            "Evaluation finished with skipped items"
        );
    }
    Ok(EvaluationResult { metrics, diagnostics })
}
