use serde::{Deserialize, Serialize};

use ragbench_core::SpanRange;

use super::span::{coverage, intersection_length};
use super::Metric;

/// Character-coverage metrics. Both sides are merged before comparison, so
/// overlapping retrieved chunks never count the same characters twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanMetric {
    Recall,
    Precision,
    Iou,
}

impl SpanMetric {
    pub const ALL: [SpanMetric; 3] = [SpanMetric::Recall, SpanMetric::Precision, SpanMetric::Iou];
}

pub fn span_recall(retrieved: &[SpanRange], ground_truth: &[SpanRange]) -> f64 {
    let cov_g = coverage(ground_truth);
    if cov_g == 0 {
        return 1.0;
    }
    let i = intersection_length(retrieved, ground_truth);
    (i as f64 / cov_g as f64).min(1.0)
}

pub fn span_precision(retrieved: &[SpanRange], ground_truth: &[SpanRange]) -> f64 {
    let cov_r = coverage(retrieved);
    if cov_r == 0 {
        return 0.0;
    }
    intersection_length(retrieved, ground_truth) as f64 / cov_r as f64
}

pub fn span_iou(retrieved: &[SpanRange], ground_truth: &[SpanRange]) -> f64 {
    match (retrieved.is_empty(), ground_truth.is_empty()) {
        (true, true) => return 1.0,
        (true, false) | (false, true) => return 0.0,
        (false, false) => {}
    }
    let i = intersection_length(retrieved, ground_truth);
    let union = coverage(retrieved) + coverage(ground_truth) - i;
    if union == 0 {
        0.0
    } else {
        i as f64 / union as f64
    }
}

impl Metric<SpanRange> for SpanMetric {
    fn name(&self) -> &'static str {
        match self {
            SpanMetric::Recall => "span_recall",
            SpanMetric::Precision => "span_precision",
            SpanMetric::Iou => "span_iou",
        }
    }

    fn calculate(&self, retrieved: &[SpanRange], ground_truth: &[SpanRange]) -> f64 {
        match self {
            SpanMetric::Recall => span_recall(retrieved, ground_truth),
            SpanMetric::Precision => span_precision(retrieved, ground_truth),
            SpanMetric::Iou => span_iou(retrieved, ground_truth),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(doc: &str, start: usize, end: usize) -> SpanRange {
        SpanRange::new(doc, start, end)
    }

    #[test]
    fn partial_overlap_iou() {
        let iou = span_iou(&[r("doc1", 50, 150)], &[r("doc1", 0, 100)]);
        assert!((iou - 1.0 / 3.0).abs() < 1e-9, "iou = {iou}");
    }

    #[test]
    fn recall_and_precision_partial() {
        let retrieved = [r("d", 50, 150)];
        let truth = [r("d", 0, 100)];
        assert!((span_recall(&retrieved, &truth) - 0.5).abs() < 1e-9);
        assert!((span_precision(&retrieved, &truth) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn fragmented_retrieval_is_not_double_counted() {
        let retrieved = [r("d", 0, 60), r("d", 40, 100)];
        let truth = [r("d", 0, 100)];
        assert_eq!(span_recall(&retrieved, &truth), 1.0);
        assert_eq!(span_precision(&retrieved, &truth), 1.0);
        assert_eq!(span_iou(&retrieved, &truth), 1.0);
    }

    #[test]
    fn empty_sides() {
        assert_eq!(span_recall(&[r("d", 0, 5)], &[]), 1.0);
        assert_eq!(span_precision(&[], &[r("d", 0, 5)]), 0.0);
        assert_eq!(span_iou(&[], &[]), 1.0);
        assert_eq!(span_iou(&[r("d", 0, 5)], &[]), 0.0);
        assert_eq!(span_iou(&[], &[r("d", 0, 5)]), 0.0);
    }

    #[test]
    fn other_documents_do_not_count() {
        let retrieved = [r("a", 0, 100)];
        let truth = [r("b", 0, 100)];
        assert_eq!(span_recall(&retrieved, &truth), 0.0);
        assert_eq!(span_iou(&retrieved, &truth), 0.0);
    }
}
