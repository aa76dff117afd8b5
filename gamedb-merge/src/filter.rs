//! Entry relevance filtering.
//!
//! Only entries that touch at least one recognized nested block, or that are
//! keyed in a correction table, take part in reconciliation. Everything else
//! is dropped from the candidate document (entries in the base document are
//! never removed by this — they just aren't reconciled).

use gamedb_core::{Database, Entry, schema};

use crate::corrections;

/// Whether an entry is worth reconciling at all.
pub fn is_relevant(id: &str, entry: &Entry) -> bool {
    schema::BLOCK_FIELDS.iter().any(|f| entry.contains_key(*f)) || corrections::is_corrected(id)
}

/// Retain only relevant entries of a candidate document. Non-mapping values
/// are dropped as well; they cannot carry any recognized block.
pub fn filter_database(db: Database) -> Database {
    db.into_iter()
        .filter(|(key, value)| match (key.as_str(), value.as_mapping()) {
            (Some(id), Some(entry)) => is_relevant(id, entry),
            _ => false,
        })
        .collect()
}
