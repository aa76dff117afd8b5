//! The merge driver: three-way combination of upstream, converted, and
//! override documents.
//!
//! Stages, each consuming the previous stage's full document:
//!
//! 1. Raw-filter and parse the upstream input; write the converted file.
//! 2. Reconcile the original-schema reference document against the converted
//!    document (upgrading old-schema entries with the converted entries as
//!    the fallback source of structure).
//! 3. Overlay the reconciled document, then the local override document,
//!    onto the converted document — whole-entry overwrite, overrides last.
//! 4. Reconcile the merged result against a snapshot of itself so correction
//!    tables and the split/combined invariant also cover entries introduced
//!    by the overlays.
//! 5. Render, raw-filter once more, and write the merged file.
//!
//! All output writes are atomic; an aborted run leaves no partial file.

use std::path::{Path, PathBuf};

use thiserror::Error;

use gamedb_core::{Database, yaml, yaml::YamlError};

use crate::corrections::{RAW_LINE_IGNORE, RAW_TEXT_REPLACEMENTS};
use crate::progress::MergeProgress;
use crate::reconcile::ReconcileStats;
use crate::{filter, reconcile};

pub const CONVERTED_FILE: &str = "GameIndex[converted].yaml";
pub const MERGED_FILE: &str = "GameIndex[merged].yaml";
pub const ORIGINAL_FILE: &str = "files/GameIndex[original].yaml";
pub const OVERRIDE_FILE: &str = "files/GameIndex[override].yaml";

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("Input file not found: {0}")]
    MissingInput(String),
    #[error(transparent)]
    Yaml(#[from] YamlError),
}

/// Where the pipeline reads and writes.
pub struct MergeOptions {
    /// Upstream GameIndex document to convert and merge.
    pub input: PathBuf,
    /// Directory holding `files/` and receiving the output documents.
    pub work_dir: PathBuf,
}

impl MergeOptions {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            work_dir: PathBuf::from("."),
        }
    }
}

/// Summary of a full pipeline run.
#[derive(Debug)]
pub struct MergeReport {
    pub converted_entries: usize,
    pub merged_entries: usize,
    /// Stats from upgrading the original-schema document.
    pub upgrade: ReconcileStats,
    /// Stats from the final self-reconciliation pass.
    pub finalize: ReconcileStats,
}

/// Run the full convert-and-merge pipeline.
pub fn run(options: &MergeOptions, progress: &dyn MergeProgress) -> Result<MergeReport, MergeError> {
    let original_path = options.work_dir.join(ORIGINAL_FILE);
    let override_path = options.work_dir.join(OVERRIDE_FILE);
    for path in [&options.input, &original_path, &override_path] {
        if !path.is_file() {
            return Err(MergeError::MissingInput(path.display().to_string()));
        }
    }

    progress.on_phase(&format!("Processing {}...", display_name(&options.input)));
    let raw = yaml::read_text(&options.input)?;
    let cleaned = yaml::filter_raw_lines(&raw, RAW_TEXT_REPLACEMENTS, RAW_LINE_IGNORE);
    let mut merged = yaml::parse_database(&cleaned, &options.input)?;

    progress.on_phase(&format!("Creating {CONVERTED_FILE}..."));
    yaml::write_atomic(
        &options.work_dir.join(CONVERTED_FILE),
        &yaml::render_database(&merged)?,
    )?;
    let converted_entries = merged.len();

    progress.on_phase("Loading GameDB entries to merge...");
    let original = yaml::load_database(&original_path)?;
    let overrides = yaml::load_database(&override_path)?;

    progress.on_phase("Processing older GameDB prior to merging...");
    let mut original = filter::filter_database(original);
    let upgrade = reconcile::reconcile(&mut original, &merged);

    progress.on_phase("Merging GameDB entries...");
    overlay(&mut merged, original);
    overlay(&mut merged, overrides);

    let snapshot = merged.clone();
    let finalize = reconcile::reconcile(&mut merged, &snapshot);

    progress.on_phase(&format!("Creating {MERGED_FILE}..."));
    let rendered = yaml::render_database(&merged)?;
    let rendered = yaml::filter_raw_lines(&rendered, RAW_TEXT_REPLACEMENTS, RAW_LINE_IGNORE);
    yaml::write_atomic(&options.work_dir.join(MERGED_FILE), &rendered)?;

    progress.on_complete("All done!");
    Ok(MergeReport {
        converted_entries,
        merged_entries: merged.len(),
        upgrade,
        finalize,
    })
}

/// Whole-entry overwrite: entries with matching ids are fully replaced
/// (keeping their position); new ids append at the end.
fn overlay(base: &mut Database, layer: Database) {
    for (key, value) in layer {
        base.insert(key, value);
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
