use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use ragbench_core::ChunkId;

use super::Metric;

/// Chunk-identity metrics. Retrieved ids are not deduplicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkMetric {
    Recall,
    Precision,
    F1,
}

impl ChunkMetric {
    pub const ALL: [ChunkMetric; 3] = [ChunkMetric::Recall, ChunkMetric::Precision, ChunkMetric::F1];
}

/// Fraction of labeled ids found among the retrieved ones; `1.0` with no labels.
pub fn chunk_recall(retrieved: &[ChunkId], ground_truth: &[ChunkId]) -> f64 {
    if ground_truth.is_empty() {
        return 1.0;
    }
    let retrieved: HashSet<&ChunkId> = retrieved.iter().collect();
    let hits = ground_truth.iter().filter(|id| retrieved.contains(id)).count();
    hits as f64 / ground_truth.len() as f64
}

/// Fraction of retrieved ids that are labeled; `0.0` when nothing was retrieved.
pub fn chunk_precision(retrieved: &[ChunkId], ground_truth: &[ChunkId]) -> f64 {
    if retrieved.is_empty() {
        return 0.0;
    }
    let relevant: HashSet<&ChunkId> = ground_truth.iter().collect();
    let hits = retrieved.iter().filter(|id| relevant.contains(id)).count();
    hits as f64 / retrieved.len() as f64
}

pub fn chunk_f1(retrieved: &[ChunkId], ground_truth: &[ChunkId]) -> f64 {
    let p = chunk_precision(retrieved, ground_truth);
    let r = chunk_recall(retrieved, ground_truth);
    if p + r == 0.0 {
        0.0
    } else {
        2.0 * p * r / (p + r)
    }
}

impl Metric<ChunkId> for ChunkMetric {
    fn name(&self) -> &'static str {
        match self {
            ChunkMetric::Recall => "chunk_recall",
            ChunkMetric::Precision => "chunk_precision",
            ChunkMetric::F1 => "chunk_f1",
        }
    }

    fn calculate(&self, retrieved: &[ChunkId], ground_truth: &[ChunkId]) -> f64 {
        match self {
            ChunkMetric::Recall => chunk_recall(retrieved, ground_truth),
            ChunkMetric::Precision => chunk_precision(retrieved, ground_truth),
            ChunkMetric::F1 => chunk_f1(retrieved, ground_truth),
        }
    }
}
