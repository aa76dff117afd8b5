//! Merge and reconciliation engine for GameDB compatibility databases.
//!
//! This crate owns the conflict-resolution policy: deciding which entries
//! are relevant, merging a "new" document's entries into a "base" document
//! under fallback/override rules, force-applying the hardcoded correction
//! tables, and driving the three-way combination of upstream, converted,
//! and override documents.

pub mod corrections;
pub mod filter;
pub mod merge;
pub mod progress;
pub mod reconcile;

pub use corrections::{AppliedCorrections, Correction, apply_corrections, is_corrected};
pub use filter::{filter_database, is_relevant};
pub use merge::{MergeError, MergeOptions, MergeReport, run};
pub use progress::{LogProgress, MergeProgress, SilentProgress};
pub use reconcile::{ReconcileStats, merge_mode_block, reconcile};
