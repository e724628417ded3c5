//! Finding LLM-quoted excerpts inside their source document.

use ragbench_core::text::{char_len, OffsetMap};

/// Char range `[start, end)` of `excerpt` inside `content`.
///
/// The excerpt is trimmed first. An exact match wins; otherwise both sides
/// are compared with whitespace runs collapsed to one space and letters
/// lowercased, and the match is mapped back to exact offsets in `content`.
/// Returns `None` for empty excerpts and for text that is not there.
pub fn locate_excerpt(content: &str, excerpt: &str) -> Option<(usize, usize)> {
    let excerpt = excerpt.trim();
    if excerpt.is_empty() {
        return None;
    }

    if let Some(byte) = content.find(excerpt) {
        let start = OffsetMap::new(content).to_char(byte)?;
        return Some((start, start + char_len(excerpt)));
    }

    let haystack = Normalized::new(content);
    let needle = Normalized::new(excerpt);
    let byte = haystack.text.find(&needle.text)?;
    let first = OffsetMap::new(&haystack.text).to_char(byte)?;
    let last = first + char_len(&needle.text) - 1;
    let start = *haystack.origin.get(first)?;
    let end = *haystack.origin.get(last)? + 1;
    Some((start, end))
}

/// Whitespace-collapsed lowercase text with, for each of its chars, the
/// char index in the source it came from.
struct Normalized {
    text: String,
    origin: Vec<usize>,
}

impl Normalized {
    fn new(source: &str) -> Self {
        let mut text = String::with_capacity(source.len());
        let mut origin = Vec::with_capacity(source.len());
        let mut in_space = false;
        for (i, c) in source.chars().enumerate() {
            if c.is_whitespace() {
                if !in_space {
                    text.push(' ');
                    origin.push(i);
                }
                in_space = true;
                continue;
            }
            in_space = false;
            for lower in c.to_lowercase() {
                text.push(lower);
                origin.push(i);
            }
        }
        Self { text, origin }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragbench_core::text::slice_chars;

    #[test]
    fn exact_match() {
        let doc = "The quick brown fox jumps.";
        assert_eq!(locate_excerpt(doc, "brown fox"), Some((10, 19)));
    }

    #[test]
    fn excerpt_is_trimmed() {
        let doc = "alpha beta gamma";
        assert_eq!(locate_excerpt(doc, "  beta \n"), Some((6, 10)));
    }

    #[test]
    fn collapsed_whitespace_and_case_map_back_exactly() {
        let doc = "First line.\nThe   Quick\n\tbrown fox.";
        let (start, end) = locate_excerpt(doc, "the quick brown").expect("found");
        assert_eq!(slice_chars(doc, start, end), Some("The   Quick\n\tbrown"));
    }

    #[test]
    fn offsets_count_chars_not_bytes() {
        let doc = "café au lait, s'il vous plaît";
        let (start, end) = locate_excerpt(doc, "AU  LAIT").expect("found");
        assert_eq!((start, end), (5, 12));
        assert_eq!(slice_chars(doc, start, end), Some("au lait"));
    }

    #[test]
    fn missing_or_empty_excerpt() {
        assert_eq!(locate_excerpt("some text", "absent"), None);
        assert_eq!(locate_excerpt("some text", "   "), None);
    }
}
