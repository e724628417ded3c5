//! Recursive, separator-driven text splitter.
//!
//! Pieces are bounded by `chunk_size` chars, adjacent pieces share at most
//! `chunk_overlap` chars, and every piece carries the exact `[start, end)`
//! char range it was cut from. Splitting runs on byte offsets into the
//! source; offsets are translated to chars once at the end.

use ragbench_core::config::ChunkingSettings;
use ragbench_core::text::{char_len, OffsetMap};
use ragbench_core::{Chunker, Document, Error, PositionAwareChunk, PositionAwareChunker, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecursiveCharacterOptions {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Most to least specific. An empty string means "split per character"
    /// and ends the list.
    pub separators: Vec<String>,
}

impl Default for RecursiveCharacterOptions {
    fn default() -> Self {
        ChunkingSettings::default().into()
    }
}

impl From<ChunkingSettings> for RecursiveCharacterOptions {
    fn from(s: ChunkingSettings) -> Self {
        Self { chunk_size: s.chunk_size, chunk_overlap: s.chunk_overlap, separators: s.separators }
    }
}

#[derive(Debug, Clone)]
pub struct RecursiveCharacterChunker {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

/// A trimmed piece of the root text; `start` is a byte offset into it.
#[derive(Debug, Clone, Copy)]
struct Piece<'a> {
    text: &'a str,
    start: usize,
}

impl RecursiveCharacterChunker {
    pub fn new(options: RecursiveCharacterOptions) -> Result<Self> {
        if options.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk_size must be greater than 0".into()));
        }
        if options.chunk_overlap >= options.chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                options.chunk_overlap, options.chunk_size
            )));
        }
        Ok(Self {
            chunk_size: options.chunk_size,
            chunk_overlap: options.chunk_overlap,
            separators: options.separators,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    fn pieces<'a>(&self, text: &'a str) -> Vec<Piece<'a>> {
        let mut out = Vec::new();
        self.split(text, &self.separators, 0, &mut out);
        out
    }

    fn split<'a>(&self, text: &'a str, separators: &[String], base: usize, out: &mut Vec<Piece<'a>>) {
        if text.trim().is_empty() {
            return;
        }
        if char_len(text) <= self.chunk_size {
            push_trimmed(text, base, out);
            return;
        }

        let mut chosen = None;
        for (i, sep) in separators.iter().enumerate() {
            if sep.is_empty() {
                break;
            }
            if text.contains(sep.as_str()) {
                chosen = Some((sep.as_str(), &separators[i + 1..]));
                break;
            }
        }
        let Some((sep, rest)) = chosen else {
            self.split_chars(text, base, out);
            return;
        };

        // (byte offset within `text`, fragment)
        let mut parts: Vec<(usize, &'a str)> = Vec::new();
        let mut pos = 0;
        for part in text.split(sep) {
            parts.push((pos, part));
            pos += part.len() + sep.len();
        }
        let sep_len = char_len(sep);
        let lens: Vec<usize> = parts.iter().map(|(_, p)| char_len(p)).collect();

        // Window is parts[lo..hi]; window_len is its joined char length.
        let mut lo = 0;
        let mut window_len = 0;
        for hi in 0..parts.len() {
            let part_len = lens[hi];
            let add = if hi == lo { part_len } else { sep_len + part_len };
            if hi > lo && window_len + add > self.chunk_size {
                self.emit(text, &parts[lo..hi], rest, base, out);
                if self.chunk_overlap == 0 {
                    lo = hi;
                    window_len = 0;
                } else {
                    // keep at most `chunk_overlap` chars; an oversized next
                    // window is split again by `emit`
                    while lo < hi && window_len > self.chunk_overlap {
                        window_len = if lo + 1 == hi { 0 } else { window_len - lens[lo] - sep_len };
                        lo += 1;
                    }
                }
            }
            window_len = if hi == lo { part_len } else { window_len + sep_len + part_len };
        }
        if lo < parts.len() {
            self.emit(text, &parts[lo..], rest, base, out);
        }
    }

    /// Emit the window `parts` as one trimmed piece, recursing with the
    /// remaining separators when it is still too long.
    fn emit<'a>(
        &self,
        text: &'a str,
        parts: &[(usize, &'a str)],
        rest: &[String],
        base: usize,
        out: &mut Vec<Piece<'a>>,
    ) {
        let (Some(&(first, _)), Some(&(last, last_text))) = (parts.first(), parts.last()) else {
            return;
        };
        let raw = &text[first..last + last_text.len()];
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return;
        }
        let start = base + first + (raw.len() - raw.trim_start().len());
        if char_len(trimmed) > self.chunk_size && !rest.is_empty() {
            self.split(trimmed, rest, start, out);
        } else {
            out.push(Piece { text: trimmed, start });
        }
    }

    /// Fixed-stride slicing for text no separator applies to.
    fn split_chars<'a>(&self, text: &'a str, base: usize, out: &mut Vec<Piece<'a>>) {
        let map = OffsetMap::new(text);
        let total = map.char_len();
        let stride = self.chunk_size - self.chunk_overlap;
        let mut i = 0;
        while i < total {
            let end = (i + self.chunk_size).min(total);
            if let (Some(from), Some(to)) = (map.to_byte(i), map.to_byte(end)) {
                push_trimmed(&text[from..to], base + from, out);
            }
            i += stride;
        }
    }
}

fn push_trimmed<'a>(raw: &'a str, raw_start: usize, out: &mut Vec<Piece<'a>>) {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return;
    }
    let lead = raw.len() - raw.trim_start().len();
    out.push(Piece { text: trimmed, start: raw_start + lead });
}

impl Chunker for RecursiveCharacterChunker {
    fn name(&self) -> String {
        format!("RecursiveCharacter(size={}, overlap={})", self.chunk_size, self.chunk_overlap)
    }

    fn chunk(&self, text: &str) -> Vec<String> {
        self.pieces(text).into_iter().map(|p| p.text.to_string()).collect()
    }
}

impl PositionAwareChunker for RecursiveCharacterChunker {
    fn name(&self) -> String {
        Chunker::name(self)
    }

    fn chunk_with_positions(&self, doc: &Document) -> Vec<PositionAwareChunk> {
        let content = doc.content();
        let map = OffsetMap::new(content);
        self.pieces(content)
            .into_iter()
            .filter_map(|p| {
                let start = map.to_char(p.start)?;
                let end = map.to_char(p.start + p.text.len())?;
                Some(PositionAwareChunk::new(doc.id().clone(), p.text, start, end))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ragbench_core::text::slice_chars;

    fn chunker(size: usize, overlap: usize) -> RecursiveCharacterChunker {
        RecursiveCharacterChunker::new(RecursiveCharacterOptions {
            chunk_size: size,
            chunk_overlap: overlap,
            ..Default::default()
        })
        .expect("valid options")
    }

    fn ranges(c: &RecursiveCharacterChunker, text: &str) -> Vec<(String, usize, usize)> {
        c.chunk_with_positions(&Document::new("d", text))
            .into_iter()
            .map(|p| (p.content, p.start, p.end))
            .collect()
    }

    #[test]
    fn overlap_not_below_size_is_rejected() {
        for overlap in [100, 200] {
            let res = RecursiveCharacterChunker::new(RecursiveCharacterOptions {
                chunk_size: 100,
                chunk_overlap: overlap,
                ..Default::default()
            });
            assert!(matches!(res, Err(Error::InvalidConfig(_))));
        }
        let zero = RecursiveCharacterChunker::new(RecursiveCharacterOptions {
            chunk_size: 0,
            chunk_overlap: 0,
            ..Default::default()
        });
        assert!(matches!(zero, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn defaults_and_name() {
        let c = RecursiveCharacterChunker::new(RecursiveCharacterOptions::default()).expect("defaults");
        assert_eq!(Chunker::name(&c), "RecursiveCharacter(size=1000, overlap=200)");
    }

    #[test]
    fn short_text_is_one_trimmed_piece() {
        assert_eq!(ranges(&chunker(20, 0), "  hello  "), vec![("hello".to_string(), 2, 7)]);
    }

    #[test]
    fn blank_text_yields_nothing() {
        assert!(chunker(10, 0).chunk("").is_empty());
        assert!(chunker(10, 0).chunk(" \n\n \t ").is_empty());
        assert!(chunker(3, 0).chunk("      \n\n        ").is_empty());
    }

    #[test]
    fn paragraphs_pack_greedily_without_overlap() {
        let text = "aaaa\n\nbbbb\n\ncccc";
        assert_eq!(
            ranges(&chunker(10, 0), text),
            vec![("aaaa\n\nbbbb".to_string(), 0, 10), ("cccc".to_string(), 12, 16)]
        );
    }

    #[test]
    fn trailing_fragments_seed_the_next_window() {
        let text = "aaaa\n\nbbbb\n\ncccc";
        assert_eq!(
            ranges(&chunker(10, 4), text),
            vec![("aaaa\n\nbbbb".to_string(), 0, 10), ("bbbb\n\ncccc".to_string(), 6, 16)]
        );
    }

    #[test]
    fn retained_fragment_is_kept_even_when_next_window_overflows() {
        let text = "aaaa\n\nbbbb\n\ncccccc";
        let pieces = ranges(&chunker(10, 6), text);
        assert_eq!(pieces[0], ("aaaa\n\nbbbb".to_string(), 0, 10));
        assert!(
            pieces[1..].iter().any(|(t, start, _)| *start == 6 && t.starts_with("bbbb")),
            "retained fragment missing: {pieces:?}"
        );
        assert_eq!(
            pieces,
            vec![
                ("aaaa\n\nbbbb".to_string(), 0, 10),
                ("bbbb".to_string(), 6, 10),
                ("bbbb\n\ncccc".to_string(), 6, 16),
                ("cccccc".to_string(), 12, 18),
                ("cccc".to_string(), 14, 18),
            ]
        );
        for (t, start, end) in &pieces {
            assert_eq!(slice_chars(text, *start, *end), Some(t.as_str()));
        }
    }

    #[test]
    fn leading_whitespace_in_window_shifts_start() {
        let text = "  aaaa\n\nbbbbbbbbbb";
        assert_eq!(
            ranges(&chunker(10, 0), text),
            vec![("aaaa".to_string(), 2, 6), ("bbbbbbbbbb".to_string(), 8, 18)]
        );
    }

    #[test]
    fn character_fallback_uses_fixed_stride() {
        let c = RecursiveCharacterChunker::new(RecursiveCharacterOptions {
            chunk_size: 4,
            chunk_overlap: 1,
            separators: vec![String::new()],
        })
        .expect("options");
        assert_eq!(
            ranges(&c, "abcdefghij"),
            vec![
                ("abcd".to_string(), 0, 4),
                ("defg".to_string(), 3, 7),
                ("ghij".to_string(), 6, 10),
                ("j".to_string(), 9, 10),
            ]
        );
    }

    #[test]
    fn oversized_window_recurses_into_finer_separators() {
        let text = "one two three four five six\n\nseven";
        let c = chunker(12, 0);
        let doc = Document::new("d", text);
        let chunks = c.chunk_with_positions(&doc);
        assert!(chunks.len() > 2);
        for ch in &chunks {
            assert!(char_len(&ch.content) <= 12, "piece too long: {:?}", ch.content);
            assert_eq!(doc.slice(ch.start, ch.end), Some(ch.content.as_str()));
        }
        assert_eq!(chunks.last().map(|c| c.content.as_str()), Some("seven"));
    }

    #[test]
    fn offsets_count_chars_for_multibyte_text() {
        let text = "ééééé ééééé ééééé";
        assert_eq!(
            ranges(&chunker(11, 0), text),
            vec![("ééééé ééééé".to_string(), 0, 11), ("ééééé".to_string(), 12, 17)]
        );
    }

    #[test]
    fn chunk_matches_positioned_content() {
        let c = chunker(30, 5);
        let text = "First paragraph here.\n\nSecond one is a bit longer. It has two sentences.\n\nThird.";
        let plain = c.chunk(text);
        let positioned: Vec<String> =
            c.chunk_with_positions(&Document::new("d", text)).into_iter().map(|p| p.content).collect();
        assert_eq!(plain, positioned);
    }
}
