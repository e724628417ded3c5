//! Interval algebra over document-anchored character ranges.

use std::collections::BTreeMap;

use ragbench_core::{DocumentId, SpanRange};

/// Same document and the half-open ranges intersect.
pub fn overlaps(a: &SpanRange, b: &SpanRange) -> bool {
    a.doc_id == b.doc_id && a.start < b.end && b.start < a.end
}

pub fn overlap_length(a: &SpanRange, b: &SpanRange) -> usize {
    if a.doc_id != b.doc_id {
        return 0;
    }
    a.end.min(b.end).saturating_sub(a.start.max(b.start))
}

pub fn span_length(span: &SpanRange) -> usize {
    span.len()
}

/// Coalesce overlapping or touching ranges per document.
///
/// Output is grouped by document id (ascending) and sorted by `start`
/// within each document; ranges in the output are pairwise disjoint and
/// non-adjacent, so merging again is a no-op.
pub fn merge_overlapping(spans: &[SpanRange]) -> Vec<SpanRange> {
    let mut by_doc: BTreeMap<&DocumentId, Vec<(usize, usize)>> = BTreeMap::new();
    for s in spans {
        by_doc.entry(&s.doc_id).or_default().push((s.start, s.end));
    }

    let mut merged = Vec::new();
    for (doc_id, mut ranges) in by_doc {
        ranges.sort_unstable();
        let mut current: Option<(usize, usize)> = None;
        for (start, end) in ranges {
            current = match current {
                Some((cs, ce)) if start <= ce => Some((cs, ce.max(end))),
                Some((cs, ce)) => {
                    merged.push(SpanRange::new(doc_id.clone(), cs, ce));
                    Some((start, end))
                }
                None => Some((start, end)),
            };
        }
        if let Some((cs, ce)) = current {
            merged.push(SpanRange::new(doc_id.clone(), cs, ce));
        }
    }
    merged
}

/// Total characters covered, counting overlapped regions once.
pub fn coverage(spans: &[SpanRange]) -> usize {
    merge_overlapping(spans).iter().map(span_length).sum()
}

/// Characters covered by both sets.
pub fn intersection_length(a: &[SpanRange], b: &[SpanRange]) -> usize {
    let a = merge_overlapping(a);
    let b = merge_overlapping(b);
    a.iter().map(|x| b.iter().map(|y| overlap_length(x, y)).sum::<usize>()).sum()
}
