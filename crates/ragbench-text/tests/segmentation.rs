use std::sync::Arc;

use ragbench_core::text::char_len;
use ragbench_core::{Chunker, ChunkerKind, Document, PositionAwareChunker};
use ragbench_text::{position_aware, RecursiveCharacterChunker, RecursiveCharacterOptions};

fn sample_document() -> Document {
    let mut text = String::new();
    for p in 0..12 {
        for s in 0..(3 + p % 4) {
            text.push_str(&format!("Paragraph {p} sentence {s} talks about señor Müller's 🦀 crate. "));
        }
        text.push_str(if p % 3 == 0 { "\n" } else { "\n\n" });
    }
    text.push_str(&"x".repeat(250));
    Document::new("sample.md", text)
}

fn chunker(size: usize, overlap: usize) -> RecursiveCharacterChunker {
    RecursiveCharacterChunker::new(RecursiveCharacterOptions {
        chunk_size: size,
        chunk_overlap: overlap,
        ..Default::default()
    })
    .expect("valid options")
}

#[test]
fn zero_overlap_pieces_are_bounded_and_exact() {
    let doc = sample_document();
    for size in [40, 100, 333] {
        let chunks = chunker(size, 0).chunk_with_positions(&doc);
        assert!(!chunks.is_empty());
        let mut last_end = 0;
        for c in &chunks {
            assert!(char_len(&c.content) <= size, "size {size}: {:?}", c.content);
            assert_eq!(doc.slice(c.start, c.end), Some(c.content.as_str()));
            assert!(c.start >= last_end, "pieces must not overlap without overlap");
            last_end = c.end;
        }
    }
}

#[test]
fn overlapping_pieces_share_at_most_overlap() {
    let doc = sample_document();
    let overlap = 30;
    let chunks = chunker(120, overlap).chunk_with_positions(&doc);
    for pair in chunks.windows(2) {
        let shared = pair[0].end.saturating_sub(pair[1].start);
        assert!(shared <= overlap, "adjacent overlap {shared} exceeds {overlap}");
    }
    for c in &chunks {
        assert_eq!(doc.slice(c.start, c.end), Some(c.content.as_str()));
    }
}

#[test]
fn adapter_recovers_native_offsets_without_overlap() {
    let doc = sample_document();
    let native = Arc::new(chunker(80, 0));
    let plain: Arc<dyn Chunker> = native.clone();
    let adapted = position_aware(&ChunkerKind::Plain(plain));

    let expected: Vec<(usize, usize)> = native.chunk_with_positions(&doc).iter().map(|c| (c.start, c.end)).collect();
    let got: Vec<(usize, usize)> = adapted.chunk_with_positions(&doc).iter().map(|c| (c.start, c.end)).collect();
    assert_eq!(got, expected);
    assert_eq!(adapted.skipped_chunks(), 0);
    assert_eq!(adapted.name(), "PositionAdapter(RecursiveCharacter(size=80, overlap=0))");
}

#[test]
fn position_aware_kind_is_used_directly() {
    let native: Arc<dyn PositionAwareChunker> = Arc::new(chunker(80, 0));
    let resolved = position_aware(&ChunkerKind::PositionAware(native));
    assert_eq!(resolved.name(), "RecursiveCharacter(size=80, overlap=0)");
}
