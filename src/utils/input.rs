//! Batch ingestion: newline-delimited text or a JSON array of strings.
//! Blank lines are dropped and duplicates collapsed (first occurrence wins)
//! before anything reaches the engine.

use crate::core::error::{AppError, Result};
use std::collections::HashSet;
use std::path::Path;

/// Reads candidate addresses from a file. A `.json` extension (or a leading
/// `[`) selects JSON-array parsing; anything else is treated as
/// newline-delimited text.
pub fn read_candidates(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        || contents.trim_start().starts_with('[');

    let raw: Vec<String> = if is_json {
        serde_json::from_str(&contents)?
    } else {
        contents.lines().map(|l| l.to_string()).collect()
    };

    let candidates = normalize_batch(&raw);
    if candidates.is_empty() {
        return Err(AppError::EmptyBatch(format!(
            "No usable addresses found in {}",
            path.display()
        )));
    }
    tracing::info!(
        "Ingested {} candidate(s) from {} ({} raw line(s)).",
        candidates.len(),
        path.display(),
        raw.len()
    );
    Ok(candidates)
}

/// Trims, drops blanks, lower-cases, and deduplicates while preserving
/// first-seen order. Syntactically hopeless lines are kept: the engine still
/// owes each of them an INVALID verdict.
pub fn normalize_batch(raw: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.iter()
        .map(|line| line.trim().to_lowercase())
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(line.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn drops_blanks_and_duplicates() {
        let batch = normalize_batch(&strings(&[
            "a@example.com",
            "",
            "  ",
            "A@Example.com",
            "b@example.com",
        ]));
        assert_eq!(batch, vec!["a@example.com", "b@example.com"]);
    }

    #[test]
    fn keeps_malformed_lines_for_the_engine() {
        let batch = normalize_batch(&strings(&["bad-address", "ok@example.com"]));
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn preserves_first_seen_order() {
        let batch = normalize_batch(&strings(&["z@x.com", "a@x.com", "z@x.com"]));
        assert_eq!(batch, vec!["z@x.com", "a@x.com"]);
    }
}
