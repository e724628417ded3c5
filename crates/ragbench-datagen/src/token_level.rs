use serde::Deserialize;
use tracing::{debug, warn};

use ragbench_core::text::preview;
use ragbench_core::{CharacterSpan, Document, Query, Result, TokenLevelGroundTruth};

use crate::generator::SyntheticDatasetGenerator;
use crate::locate::locate_excerpt;

pub const QUERY_PROMPT: &str = r#"You are an expert at generating evaluation questions.
Given a document, generate diverse questions answerable from specific passages.

Output JSON: { "questions": ["What is...?", "How does...?", ...] }"#;

pub const EXCERPT_PROMPT: &str = r#"You are an expert at identifying relevant text.
Given a document and question, extract exact passages that answer it.
Copy text VERBATIM - do not paraphrase. Each excerpt must appear exactly in the document.

Output JSON: { "excerpts": ["exact text from document...", ...] }"#;

/// Chars of the document shown to the model.
pub const DOCUMENT_PREVIEW_CHARS: usize = 8000;

#[derive(Debug, Deserialize)]
struct Questions {
    #[serde(default)]
    questions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Excerpts {
    #[serde(default)]
    excerpts: Vec<String>,
}

pub(crate) async fn generate(
    generator: &SyntheticDatasetGenerator,
    queries_per_doc: usize,
) -> Result<Vec<TokenLevelGroundTruth>> {
    let mut ground_truth = Vec::new();
    let mut counter = 0usize;

    for doc in generator.corpus().documents() {
        let shown = preview(doc.content(), DOCUMENT_PREVIEW_CHARS);
        let prompt = format!("Document:\n{shown}\n\nGenerate {queries_per_doc} diverse questions.");
        let Questions { questions } = generator.call_json(QUERY_PROMPT, prompt).await?;
        debug!(doc = %doc.id(), questions = questions.len(), "Generated questions");

        for question in questions {
            let prompt = format!("Document:\n{shown}\n\nQuestion: {question}\n\nExtract exact passages.");
            let Excerpts { excerpts } = generator.call_json(EXCERPT_PROMPT, prompt).await?;
            let spans = locate_spans(doc, &excerpts);
            if spans.is_empty() {
                warn!(doc = %doc.id(), question = %preview(&question, 50), "Dropping question with no located excerpts");
                continue;
            }
            let mut query = Query::new(format!("q_{counter}"), question);
            query.metadata.insert("sourceDoc".into(), doc.id().as_str().into());
            counter += 1;
            ground_truth.push(TokenLevelGroundTruth { query, relevant_spans: spans });
        }
    }
    Ok(ground_truth)
}

/// Spans for every excerpt found in `doc`; the span text is the
/// document's own text at the located offsets.
fn locate_spans(doc: &Document, excerpts: &[String]) -> Vec<CharacterSpan> {
    let mut spans = Vec::with_capacity(excerpts.len());
    for excerpt in excerpts {
        let Some((start, end)) = locate_excerpt(doc.content(), excerpt) else {
            warn!(doc = %doc.id(), excerpt = %preview(excerpt, 50), "Could not locate excerpt");
            continue;
        };
        match CharacterSpan::from_document(doc, start, end) {
            Ok(span) => spans.push(span),
            Err(e) => warn!(doc = %doc.id(), error = %e, "Span validation failed for excerpt"),
        }
    }
    spans
}
