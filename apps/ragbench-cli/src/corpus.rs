//! Folder corpus loading.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

use ragbench_core::{Corpus, Document};

/// Read every file under `dir` whose extension is `ext` (case-insensitive).
///
/// Document ids are paths relative to `dir` joined with `/`, and documents
/// are ordered by id so runs over the same folder are reproducible.
pub fn load_corpus(dir: &Path, ext: &str) -> Result<Corpus> {
    if !dir.is_dir() {
        bail!("corpus directory {} does not exist", dir.display());
    }
    let ext = ext.trim_start_matches('.');

    let mut documents = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.with_context(|| format!("walking {}", dir.display()))?;
        let path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(ext));
        if !matches {
            continue;
        }
        let relative = path.strip_prefix(dir).unwrap_or(path);
        let id = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let content = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        debug!(doc = %id, chars = content.chars().count(), "Loaded document");
        documents.push(Document::new(id, content));
    }

    if documents.is_empty() {
        bail!("no .{ext} files found under {}", dir.display());
    }
    documents.sort_by(|a, b| a.id().as_str().cmp(b.id().as_str()));
    info!(documents = documents.len(), dir = %dir.display(), "Loaded corpus");
    Ok(Corpus::new(documents))
}
