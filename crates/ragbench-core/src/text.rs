//! Character offset helpers.
//!
//! Every public offset in this workspace counts Unicode scalar values, not
//! bytes. Internally the segmenter and locator search with byte offsets and
//! convert at the boundary through an [`OffsetMap`].

/// Byte/char offset translation table for one string.
///
/// Holds the byte position of every char start plus the total byte length,
/// so both directions are O(log n) or O(1).
#[derive(Debug, Clone)]
pub struct OffsetMap {
    boundaries: Vec<usize>,
}

impl OffsetMap {
    pub fn new(text: &str) -> Self {
        let mut boundaries: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        boundaries.push(text.len());
        Self { boundaries }
    }

    /// Number of chars in the mapped string.
    pub fn char_len(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// Char offset of a byte offset that sits on a char boundary.
    pub fn to_char(&self, byte: usize) -> Option<usize> {
        self.boundaries.binary_search(&byte).ok()
    }

    /// Byte offset of a char offset; `char_len()` maps to the byte length.
    pub fn to_byte(&self, ch: usize) -> Option<usize> {
        self.boundaries.get(ch).copied()
    }
}

/// Char count of `text`.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Slice `text` by the half-open char range `[start, end)`.
pub fn slice_chars(text: &str, start: usize, end: usize) -> Option<&str> {
    if start > end {
        return None;
    }
    let map = OffsetMap::new(text);
    let from = map.to_byte(start)?;
    let to = map.to_byte(end)?;
    text.get(from..to)
}

/// First `max_chars` chars of `text`, used for log previews and prompts.
pub fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((b, _)) => &text[..b],
        None => text,
    }
}
