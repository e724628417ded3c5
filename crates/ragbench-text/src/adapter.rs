//! Offset recovery for chunkers that only return text.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::warn;

use ragbench_core::text::{preview, OffsetMap};
use ragbench_core::{Chunker, ChunkerKind, Document, Error, PositionAwareChunk, PositionAwareChunker};

const PREVIEW_CHARS: usize = 50;

/// Wraps a [`Chunker`] and locates each returned piece in the source text.
///
/// Each piece is searched for from a forward cursor first. If that fails,
/// the first occurrence anywhere in the document is used, unless it
/// overlaps a range already handed out. Pieces that cannot be placed are
/// dropped and counted in [`PositionAwareChunker::skipped_chunks`].
pub struct PositionAdapter {
    inner: Arc<dyn Chunker>,
    skipped: AtomicUsize,
}

impl PositionAdapter {
    pub fn new(inner: Arc<dyn Chunker>) -> Self {
        Self { inner, skipped: AtomicUsize::new(0) }
    }

    fn skip(&self, doc: &Document, piece: &str) {
        let err = Error::Location { doc_id: doc.id().to_string(), preview: preview(piece, PREVIEW_CHARS).to_string() };
        warn!(error = %err, "Skipping chunk");
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }
}

impl PositionAwareChunker for PositionAdapter {
    fn name(&self) -> String {
        format!("PositionAdapter({})", self.inner.name())
    }

    fn chunk_with_positions(&self, doc: &Document) -> Vec<PositionAwareChunk> {
        let content = doc.content();
        let map = OffsetMap::new(content);
        let mut accepted: Vec<(usize, usize)> = Vec::new();
        let mut cursor = 0;
        let mut out = Vec::new();

        for piece in self.inner.chunk(content) {
            if piece.is_empty() {
                self.skip(doc, &piece);
                continue;
            }
            let forward = content.get(cursor..).and_then(|tail| tail.find(piece.as_str())).map(|i| cursor + i);
            let start = forward.or_else(|| {
                content.find(piece.as_str()).filter(|&s| {
                    let e = s + piece.len();
                    !accepted.iter().any(|&(a, b)| s < b && e > a)
                })
            });
            let Some(start) = start else {
                self.skip(doc, &piece);
                continue;
            };
            let end = start + piece.len();
            let (Some(cs), Some(ce)) = (map.to_char(start), map.to_char(end)) else {
                self.skip(doc, &piece);
                continue;
            };
            accepted.push((start, end));
            cursor = end;
            out.push(PositionAwareChunk::new(doc.id().clone(), piece, cs, ce));
        }
        out
    }

    fn skipped_chunks(&self) -> usize {
        self.skipped.load(Ordering::Relaxed)
    }
}

/// Resolve a segmentation strategy to one that reports offsets, wrapping
/// plain chunkers in a [`PositionAdapter`].
pub fn position_aware(kind: &ChunkerKind) -> Arc<dyn PositionAwareChunker> {
    match kind {
        ChunkerKind::PositionAware(c) => Arc::clone(c),
        ChunkerKind::Plain(c) => Arc::new(PositionAdapter::new(Arc::clone(c))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Fixed(Vec<&'static str>);

    impl Chunker for Fixed {
        fn name(&self) -> String {
            "Fixed".into()
        }

        fn chunk(&self, _text: &str) -> Vec<String> {
            self.0.iter().map(ToString::to_string).collect()
        }
    }

    fn locate(pieces: Vec<&'static str>, text: &str) -> (Vec<(String, usize, usize)>, usize) {
        let adapter = PositionAdapter::new(Arc::new(Fixed(pieces)));
        let chunks = adapter.chunk_with_positions(&Document::new("doc", text));
        (chunks.into_iter().map(|c| (c.content, c.start, c.end)).collect(), adapter.skipped_chunks())
    }

    #[test]
    fn sequential_pieces_get_consecutive_offsets() {
        let (got, skipped) = locate(vec!["AA", "BB", "CC"], "AABBCC");
        assert_eq!(got, vec![("AA".into(), 0, 2), ("BB".into(), 2, 4), ("CC".into(), 4, 6)]);
        assert_eq!(skipped, 0);
    }

    #[test]
    fn repeated_text_advances_past_earlier_matches() {
        let (got, _) = locate(vec!["ab", "ab"], "ab ab");
        assert_eq!(got, vec![("ab".into(), 0, 2), ("ab".into(), 3, 5)]);
    }

    #[test]
    fn global_match_overlapping_accepted_range_is_rejected() {
        let (got, skipped) = locate(vec!["ab", "ab", "ab"], "abab");
        assert_eq!(got, vec![("ab".into(), 0, 2), ("ab".into(), 2, 4)]);
        assert_eq!(skipped, 1);
    }

    #[test]
    fn global_fallback_recovers_out_of_order_piece() {
        let (got, skipped) = locate(vec!["world", "hello"], "hello world");
        assert_eq!(got, vec![("world".into(), 6, 11), ("hello".into(), 0, 5)]);
        assert_eq!(skipped, 0);
    }

    #[test]
    fn missing_and_empty_pieces_are_counted() {
        let (got, skipped) = locate(vec!["nope", "", "here"], "text here");
        assert_eq!(got, vec![("here".into(), 5, 9)]);
        assert_eq!(skipped, 2);
    }

    #[test]
    fn offsets_are_char_based() {
        let (got, _) = locate(vec!["ü", "b"], "aüb");
        assert_eq!(got, vec![("ü".into(), 1, 2), ("b".into(), 2, 3)]);
    }

    #[test]
    fn name_wraps_inner() {
        let adapter = PositionAdapter::new(Arc::new(Fixed(vec![])));
        assert_eq!(adapter.name(), "PositionAdapter(Fixed)");
    }
}
