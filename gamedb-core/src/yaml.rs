//! Document loading, rendering, and atomic writes.
//!
//! GameDB documents pass through two raw-text stages outside the structural
//! model: a pre-parse pass that applies known text substitutions and excises
//! lines carrying retired identifiers, and a post-render pass that pads flow
//! braces and drops explicit nulls (canonical form never serializes a null).
//! Output files are written through a named temp file and atomically
//! persisted so an aborted run never leaves a half-written destination.

use std::borrow::Cow;
use std::io::Write;
use std::path::Path;

use thiserror::Error;

use crate::Database;

/// Prefix for intermediate temp files, kept recognizable so a crashed run's
/// leftovers are easy to spot (the temp file is normally removed on drop).
const TEMP_PREFIX: &str = "GameIndex[temp]";

#[derive(Debug, Error)]
pub enum YamlError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("YAML parse error in {path}: {source}")]
    Parse {
        path: String,
        source: serde_yml::Error,
    },
    #[error("YAML serialize error: {0}")]
    Serialize(#[source] serde_yml::Error),
    #[error("I/O error writing {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// Read a file to a string.
pub fn read_text(path: &Path) -> Result<String, YamlError> {
    std::fs::read_to_string(path).map_err(|e| YamlError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Parse a GameDB document from text. `origin` is only used for error context.
pub fn parse_database(text: &str, origin: &Path) -> Result<Database, YamlError> {
    serde_yml::from_str(text).map_err(|e| YamlError::Parse {
        path: origin.display().to_string(),
        source: e,
    })
}

/// Load a GameDB document from a file.
pub fn load_database(path: &Path) -> Result<Database, YamlError> {
    parse_database(&read_text(path)?, path)
}

/// Raw-line pass run before structural parsing (and again over merged
/// output): apply the first matching text substitution per line, then drop
/// any line containing an ignore-list needle.
pub fn filter_raw_lines(text: &str, replacements: &[(&str, &str)], ignore: &[&str]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut dropped = 0usize;
    for line in text.lines() {
        let mut line = Cow::Borrowed(line);
        if let Some((from, to)) = replacements.iter().find(|(from, _)| line.contains(*from)) {
            line = Cow::Owned(line.replace(*from, to));
        }
        if ignore.iter().any(|needle| line.contains(*needle)) {
            dropped += 1;
            continue;
        }
        out.push_str(&line);
        out.push('\n');
    }
    if dropped > 0 {
        log::debug!("dropped {dropped} raw line(s) carrying retired identifiers");
    }
    out
}

/// Serialize a document and post-process the rendered lines.
pub fn render_database(db: &Database) -> Result<String, YamlError> {
    let text = serde_yml::to_string(db).map_err(YamlError::Serialize)?;
    Ok(postprocess_lines(&text))
}

/// Pad flow braces with an interior space and drop lines serializing an
/// explicit null.
fn postprocess_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        if line.contains(": null") {
            continue;
        }
        let mut line = Cow::Borrowed(line);
        if line.contains('{') {
            line = Cow::Owned(line.replace('{', "{ "));
        }
        if line.contains('}') {
            line = Cow::Owned(line.replace('}', " }"));
        }
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Write text to `path` atomically: stage into a `GameIndex[temp]`-prefixed
/// temp file in the destination directory, then persist over the
/// destination. The temp file is removed on every early-exit path.
pub fn write_atomic(path: &Path, text: &str) -> Result<(), YamlError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let write_err = |source: std::io::Error| YamlError::Write {
        path: path.display().to_string(),
        source,
    };

    let mut temp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(".yaml")
        .tempfile_in(dir)
        .map_err(write_err)?;
    temp.write_all(text.as_bytes()).map_err(write_err)?;
    temp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_drops_ignored_lines() {
        let text = "SLUS-12345:\n  gsHWFixes:\n    beforeDraw: GSC_IRem\n    autoFlush: 1\n";
        let filtered = filter_raw_lines(text, &[], &["GSC_IRem"]);
        assert!(!filtered.contains("GSC_IRem"));
        assert!(filtered.contains("autoFlush: 1"));
    }

    #[test]
    fn filter_applies_replacements() {
        let text = "SLUS-12345:\n  name: Some Game (PlayStation2 Classic)\n";
        let filtered = filter_raw_lines(text, &[("PlayStation2", "PlayStation 2")], &[]);
        assert!(filtered.contains("PlayStation 2 Classic"));
        assert!(!filtered.contains("PlayStation2 "));
    }

    #[test]
    fn postprocess_pads_braces_and_drops_nulls() {
        let text = "SLUS-12345:\n  memcardFilters: {slot1: A}\n  compat: null\n";
        let processed = postprocess_lines(text);
        assert!(processed.contains("{ slot1: A }"));
        assert!(!processed.contains("compat"));
    }

    #[test]
    fn render_omits_explicit_nulls() {
        let db: Database =
            serde_yml::from_str("SLUS-12345:\n  name: Okage\n  compat: null\n").unwrap();
        let rendered = render_database(&db).unwrap();
        assert!(rendered.contains("name: Okage"));
        assert!(!rendered.contains("null"));
    }

    #[test]
    fn parse_preserves_entry_order() {
        let db: Database =
            serde_yml::from_str("SLUS-00002:\n  compat: 5\nSLUS-00001:\n  compat: 4\n").unwrap();
        let ids: Vec<&str> = db.keys().filter_map(serde_yml::Value::as_str).collect();
        assert_eq!(ids, vec!["SLUS-00002", "SLUS-00001"]);
    }
}
