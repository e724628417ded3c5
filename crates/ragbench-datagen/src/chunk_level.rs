use serde::Deserialize;
use std::collections::HashSet;
use tracing::{debug, warn};

use ragbench_core::text::preview;
use ragbench_core::{
    ChunkId, ChunkLevelGroundTruth, Chunker, Document, DocumentId, Query, Result,
};

use crate::generator::SyntheticDatasetGenerator;

pub const SYSTEM_PROMPT: &str = r#"You are an expert at generating evaluation data for RAG systems.
Given chunks from a document with their IDs, generate questions that can be answered using specific chunks.
For each question, list the chunk IDs that contain the answer.

Output JSON format:
{
  "qa_pairs": [
    { "query": "What is...?", "relevant_chunk_ids": ["chunk_xxx", "chunk_yyy"] }
  ]
}"#;

/// Chunks shown to the model per document.
pub const MAX_CHUNKS_PER_PROMPT: usize = 20;
/// Chars of each chunk shown to the model.
pub const CHUNK_PREVIEW_CHARS: usize = 500;

#[derive(Debug, Deserialize)]
struct QaResponse {
    #[serde(default)]
    qa_pairs: Vec<QaPair>,
}

#[derive(Debug, Deserialize)]
struct QaPair {
    query: String,
    #[serde(default)]
    relevant_chunk_ids: Vec<String>,
}

struct DocChunks<'a> {
    doc_id: &'a DocumentId,
    chunks: Vec<(ChunkId, String)>,
}

/// Every chunk id the chunker produces over the corpus, plus each
/// document's chunks in order with duplicates inside a document removed.
struct ChunkIndex<'a> {
    known: HashSet<ChunkId>,
    per_doc: Vec<DocChunks<'a>>,
}

impl<'a> ChunkIndex<'a> {
    fn build(documents: &'a [Document], chunker: &dyn Chunker) -> Self {
        let mut known = HashSet::new();
        let mut per_doc = Vec::with_capacity(documents.len());
        for doc in documents {
            let mut seen = HashSet::new();
            let mut chunks = Vec::new();
            for text in chunker.chunk(doc.content()) {
                let id = ChunkId::from_content(&text);
                known.insert(id.clone());
                if seen.insert(id.clone()) {
                    chunks.push((id, text));
                }
            }
            per_doc.push(DocChunks { doc_id: doc.id(), chunks });
        }
        Self { known, per_doc }
    }
}

pub(crate) async fn generate(
    generator: &SyntheticDatasetGenerator,
    chunker: &dyn Chunker,
    queries_per_doc: usize,
) -> Result<Vec<ChunkLevelGroundTruth>> {
    let index = ChunkIndex::build(generator.corpus().documents(), chunker);
    debug!(chunks = index.known.len(), chunker = %chunker.name(), "Built chunk index");

    let mut ground_truth = Vec::new();
    let mut counter = 0usize;
    for doc in &index.per_doc {
        if doc.chunks.is_empty() {
            continue;
        }
        let shown = &doc.chunks[..doc.chunks.len().min(MAX_CHUNKS_PER_PROMPT)];
        let response: QaResponse = generator.call_json(SYSTEM_PROMPT, qa_prompt(shown, queries_per_doc)).await?;

        for pair in response.qa_pairs {
            let ids: Vec<ChunkId> = pair
                .relevant_chunk_ids
                .into_iter()
                .map(ChunkId::from)
                .filter(|id| index.known.contains(id))
                .collect();
            if ids.is_empty() {
                warn!(doc = %doc.doc_id, query = %preview(&pair.query, 50), "Dropping question with no known chunk ids");
                continue;
            }
            let mut query = Query::new(format!("q_{counter}"), pair.query);
            query.metadata.insert("sourceDoc".into(), doc.doc_id.as_str().into());
            counter += 1;
            ground_truth.push(ChunkLevelGroundTruth { query, relevant_chunk_ids: ids });
        }
    }
    Ok(ground_truth)
}

fn qa_prompt(chunks: &[(ChunkId, String)], queries: usize) -> String {
    let listing = chunks
        .iter()
        .map(|(id, text)| format!("[{id}]: {}", preview(text, CHUNK_PREVIEW_CHARS)))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("Here are chunks from a document:\n\n{listing}\n\nGenerate {queries} diverse questions.")
}
