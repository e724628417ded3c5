//! Domain types shared by the segmenter, similarity index and evaluators.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::hashing::content_digest;
use crate::text::{char_len, slice_chars};

pub type Metadata = BTreeMap<String, serde_json::Value>;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Stable document identity, usually the path relative to the corpus root.
    DocumentId
);
string_id!(QueryId);
string_id!(
    /// Canonical content-addressed chunk id (`chunk_<digest>`).
    ChunkId
);
string_id!(
    /// Id carried by position-aware chunks (`pa_chunk_<digest>`).
    PositionAwareChunkId
);

impl ChunkId {
    pub fn from_content(content: &str) -> Self {
        Self(format!("chunk_{}", content_digest(content)))
    }
}

impl PositionAwareChunkId {
    pub fn from_content(content: &str) -> Self {
        Self(format!("pa_chunk_{}", content_digest(content)))
    }
}

/// A source document. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    id: DocumentId,
    content: String,
    #[serde(default)]
    metadata: Metadata,
}

impl Document {
    pub fn new(id: impl Into<DocumentId>, content: impl Into<String>) -> Self {
        Self { id: id.into(), content: content.into(), metadata: Metadata::new() }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Text of the half-open char range `[start, end)`, if in bounds.
    pub fn slice(&self, start: usize, end: usize) -> Option<&str> {
        slice_chars(&self.content, start, end)
    }
}

/// Ordered, immutable collection of documents evaluated together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Corpus {
    documents: Vec<Document>,
    #[serde(default)]
    metadata: Metadata,
}

impl Corpus {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents, metadata: Metadata::new() }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn document(&self, id: &DocumentId) -> Option<&Document> {
        self.documents.iter().find(|d| &d.id == id)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub id: QueryId,
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Query {
    pub fn new(id: impl Into<QueryId>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into(), metadata: Metadata::new() }
    }
}

/// Bare `[start, end)` interval anchored to a document, without text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanRange {
    pub doc_id: DocumentId,
    pub start: usize,
    pub end: usize,
}

impl SpanRange {
    pub fn new(doc_id: impl Into<DocumentId>, start: usize, end: usize) -> Self {
        Self { doc_id: doc_id.into(), start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// A validated character span: `end > start` and `text` holds exactly
/// `end - start` chars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SpanRecord", into = "SpanRecord")]
pub struct CharacterSpan {
    doc_id: DocumentId,
    start: usize,
    end: usize,
    text: String,
}

impl CharacterSpan {
    pub fn new(
        doc_id: impl Into<DocumentId>,
        start: usize,
        end: usize,
        text: impl Into<String>,
    ) -> Result<Self> {
        let doc_id = doc_id.into();
        let text = text.into();
        if end <= start {
            return Err(Error::Validation(format!(
                "span [{start}, {end}) in '{doc_id}' must have end > start"
            )));
        }
        let text_len = char_len(&text);
        if text_len != end - start {
            return Err(Error::Validation(format!(
                "span [{start}, {end}) in '{doc_id}' carries {text_len} chars of text, expected {}",
                end - start
            )));
        }
        Ok(Self { doc_id, start, end, text })
    }

    /// Build a span by slicing `doc`, so the text is correct by construction.
    pub fn from_document(doc: &Document, start: usize, end: usize) -> Result<Self> {
        let text = doc.slice(start, end).ok_or_else(|| {
            Error::Validation(format!("span [{start}, {end}) is out of bounds for '{}'", doc.id()))
        })?;
        Self::new(doc.id().clone(), start, end, text)
    }

    /// Check the span against its source document: the document must exist
    /// in `corpus` and its content at `[start, end)` must equal `text`.
    pub fn validate_against(&self, corpus: &Corpus) -> Result<()> {
        let doc = corpus.document(&self.doc_id).ok_or_else(|| {
            Error::Validation(format!("document '{}' is not in the corpus", self.doc_id))
        })?;
        match doc.slice(self.start, self.end) {
            Some(actual) if actual == self.text => Ok(()),
            Some(_) => Err(Error::Validation(format!(
                "span [{}, {}) text does not match '{}'",
                self.start, self.end, self.doc_id
            ))),
            None => Err(Error::Validation(format!(
                "span [{}, {}) is out of bounds for '{}'",
                self.start, self.end, self.doc_id
            ))),
        }
    }

    pub fn doc_id(&self) -> &DocumentId {
        &self.doc_id
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn range(&self) -> SpanRange {
        SpanRange::new(self.doc_id.clone(), self.start, self.end)
    }
}

/// Wire layout of a span in dataset files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanRecord {
    pub doc_id: String,
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl TryFrom<SpanRecord> for CharacterSpan {
    type Error = Error;

    fn try_from(r: SpanRecord) -> Result<Self> {
        CharacterSpan::new(r.doc_id, r.start, r.end, r.text)
    }
}

impl From<CharacterSpan> for SpanRecord {
    fn from(s: CharacterSpan) -> Self {
        Self { doc_id: s.doc_id.0, start: s.start, end: s.end, text: s.text }
    }
}

/// A chunk carrying its exact source offsets:
/// `content == document.slice(start, end)` for the document `doc_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionAwareChunk {
    pub id: PositionAwareChunkId,
    pub content: String,
    pub doc_id: DocumentId,
    pub start: usize,
    pub end: usize,
    #[serde(default)]
    pub metadata: Metadata,
}

impl PositionAwareChunk {
    pub fn new(doc_id: DocumentId, content: impl Into<String>, start: usize, end: usize) -> Self {
        let content = content.into();
        Self {
            id: PositionAwareChunkId::from_content(&content),
            content,
            doc_id,
            start,
            end,
            metadata: Metadata::new(),
        }
    }

    pub fn to_span(&self) -> SpanRange {
        SpanRange::new(self.doc_id.clone(), self.start, self.end)
    }
}

/// Identity-mode ground truth: the chunks that answer a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkLevelGroundTruth {
    pub query: Query,
    pub relevant_chunk_ids: Vec<ChunkId>,
}

/// Span-mode ground truth: the exact passages that answer a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenLevelGroundTruth {
    pub query: Query,
    pub relevant_spans: Vec<CharacterSpan>,
}

/// Countable trace of everything a run recovered from instead of failing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunDiagnostics {
    pub chunks_indexed: usize,
    pub chunks_unlocated: usize,
    pub queries_evaluated: usize,
    pub queries_skipped: usize,
    pub spans_rejected: usize,
    pub unresolved_chunk_ids: usize,
}

impl RunDiagnostics {
    /// True when nothing was dropped or skipped.
    pub fn is_clean(&self) -> bool {
        self.chunks_unlocated == 0 && self.queries_skipped == 0 && self.spans_rejected == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub metrics: BTreeMap<String, f64>,
    #[serde(default)]
    pub diagnostics: RunDiagnostics,
}

impl EvaluationResult {
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_ids_are_content_addressed() {
        let a = ChunkId::from_content("same text");
        let b = ChunkId::from_content("same text");
        assert_eq!(a, b);
        assert!(a.as_str().starts_with("chunk_"));
        assert_eq!(a.as_str().len(), "chunk_".len() + 12);
        let pa = PositionAwareChunkId::from_content("same text");
        assert!(pa.as_str().starts_with("pa_chunk_"));
        assert_eq!(&pa.as_str()["pa_".len()..], a.as_str());
    }

    #[test]
    fn span_rejects_empty_and_mismatched_text() {
        assert!(matches!(CharacterSpan::new("d", 5, 5, ""), Err(Error::Validation(_))));
        assert!(matches!(CharacterSpan::new("d", 5, 3, ""), Err(Error::Validation(_))));
        assert!(matches!(CharacterSpan::new("d", 0, 3, "ab"), Err(Error::Validation(_))));
        assert!(CharacterSpan::new("d", 0, 3, "abc").is_ok());
    }

    #[test]
    fn span_text_length_counts_chars() {
        assert!(CharacterSpan::new("d", 0, 2, "é🦀").is_ok());
    }

    #[test]
    fn span_from_document_slices_content() {
        let doc = Document::new("a.md", "hello world");
        let span = CharacterSpan::from_document(&doc, 6, 11).expect("span");
        assert_eq!(span.text(), "world");
        assert!(CharacterSpan::from_document(&doc, 6, 40).is_err());
    }

    #[test]
    fn span_validates_against_corpus() {
        let corpus = Corpus::new(vec![Document::new("a.md", "hello world")]);
        let good = CharacterSpan::new("a.md", 0, 5, "hello").expect("span");
        assert!(good.validate_against(&corpus).is_ok());
        let wrong_text = CharacterSpan::new("a.md", 0, 5, "HELLO").expect("span");
        assert!(wrong_text.validate_against(&corpus).is_err());
        let wrong_doc = CharacterSpan::new("b.md", 0, 5, "hello").expect("span");
        assert!(wrong_doc.validate_against(&corpus).is_err());
    }

    #[test]
    fn span_deserialization_validates() {
        let ok: CharacterSpan =
            serde_json::from_str(r#"{"docId":"a","start":0,"end":2,"text":"ab"}"#).expect("span");
        assert_eq!(ok.doc_id().as_str(), "a");
        let bad = serde_json::from_str::<CharacterSpan>(r#"{"docId":"a","start":2,"end":2,"text":""}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn corpus_looks_up_documents() {
        let corpus = Corpus::new(vec![Document::new("a", "x"), Document::new("b", "y")]);
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.document(&DocumentId::from("b")).map(Document::content), Some("y"));
        assert!(corpus.document(&DocumentId::from("c")).is_none());
    }
}
