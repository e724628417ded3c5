//! Result formatting for terminal and JSON output.

use std::fmt::{self, Write};

use ragbench_core::EvaluationResult;

pub fn format_json(result: &EvaluationResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(result)
}

/// Metric table with four-decimal scores followed by run diagnostics.
pub fn format_human(mode: &str, result: &EvaluationResult) -> Result<String, fmt::Error> {
    let width = result.metrics.keys().map(String::len).max().unwrap_or(0).max("metric".len());
    let mut out = String::new();
    writeln!(out, "{mode} evaluation\n")?;
    writeln!(out, "{:<width$}  score", "metric")?;
    writeln!(out, "{}  ------", "-".repeat(width))?;
    for (name, score) in &result.metrics {
        writeln!(out, "{name:<width$}  {score:.4}")?;
    }

    let d = &result.diagnostics;
    writeln!(out)?;
    writeln!(out, "chunks indexed:   {}", d.chunks_indexed)?;
    writeln!(out, "queries scored:   {}", d.queries_evaluated)?;
    if !d.is_clean() || d.unresolved_chunk_ids > 0 {
        writeln!(out, "chunks unlocated: {}", d.chunks_unlocated)?;
        writeln!(out, "queries skipped:  {}", d.queries_skipped)?;
        writeln!(out, "spans rejected:   {}", d.spans_rejected)?;
        writeln!(out, "unresolved ids:   {}", d.unresolved_chunk_ids)?;
    }
    Ok(out.trim_end().to_string())
}
