//! On-disk / remote record layout for labeled query datasets.
//!
//! One record per query:
//! `{"inputs": {"query"}, "outputs": {...}, "metadata": {...}}`.
//! Loading assigns query ids `q_0, q_1, ...` in record order.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::{
    CharacterSpan, ChunkId, ChunkLevelGroundTruth, Metadata, Query, QueryId, SpanRecord,
    TokenLevelGroundTruth,
};

pub const DEFAULT_CHUNK_LEVEL_DATASET: &str = "rag-eval-chunk-level";
pub const DEFAULT_TOKEN_LEVEL_DATASET: &str = "rag-eval-token-level";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryInputs {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkLevelOutputs {
    #[serde(default)]
    pub relevant_chunk_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenLevelOutputs {
    #[serde(default)]
    pub relevant_spans: Vec<SpanRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Example<O> {
    pub inputs: QueryInputs,
    pub outputs: O,
    #[serde(default)]
    pub metadata: Metadata,
}

pub type ChunkLevelExample = Example<ChunkLevelOutputs>;
pub type TokenLevelExample = Example<TokenLevelOutputs>;

fn query_for(index: usize, text: String) -> Query {
    Query::new(QueryId::new(format!("q_{index}")), text)
}

pub fn chunk_level_from_examples(examples: Vec<ChunkLevelExample>) -> Vec<ChunkLevelGroundTruth> {
    examples
        .into_iter()
        .enumerate()
        .map(|(i, ex)| ChunkLevelGroundTruth {
            query: query_for(i, ex.inputs.query),
            relevant_chunk_ids: ex.outputs.relevant_chunk_ids.into_iter().map(ChunkId::from).collect(),
        })
        .collect()
}

/// Convert token-level records. Spans that fail construction-time
/// validation are dropped with a warning; the query itself is kept.
pub fn token_level_from_examples(examples: Vec<TokenLevelExample>) -> Vec<TokenLevelGroundTruth> {
    examples
        .into_iter()
        .enumerate()
        .map(|(i, ex)| {
            let relevant_spans = ex
                .outputs
                .relevant_spans
                .into_iter()
                .filter_map(|record| match CharacterSpan::try_from(record) {
                    Ok(span) => Some(span),
                    Err(e) => {
                        warn!(query = i, error = %e, "Dropping malformed span record");
                        None
                    }
                })
                .collect();
            TokenLevelGroundTruth { query: query_for(i, ex.inputs.query), relevant_spans }
        })
        .collect()
}

pub fn chunk_level_to_examples(ground_truth: &[ChunkLevelGroundTruth]) -> Vec<ChunkLevelExample> {
    ground_truth
        .iter()
        .map(|gt| Example {
            inputs: QueryInputs { query: gt.query.text.clone() },
            outputs: ChunkLevelOutputs {
                relevant_chunk_ids: gt.relevant_chunk_ids.iter().map(ToString::to_string).collect(),
            },
            metadata: gt.query.metadata.clone(),
        })
        .collect()
}

pub fn token_level_to_examples(ground_truth: &[TokenLevelGroundTruth]) -> Vec<TokenLevelExample> {
    ground_truth
        .iter()
        .map(|gt| Example {
            inputs: QueryInputs { query: gt.query.text.clone() },
            outputs: TokenLevelOutputs {
                relevant_spans: gt.relevant_spans.iter().cloned().map(SpanRecord::from).collect(),
            },
            metadata: gt.query.metadata.clone(),
        })
        .collect()
}
