//! Field-level reconciliation of one document into another.
//!
//! Merges a "new" document's entries into a "base" document, base winning
//! unless a rule says otherwise: identity fields sync from new (except
//! `name`/`region`, which are only compared), missing blocks fall back to
//! the new copy, combined VU clamp/round fields migrate to their split
//! forms, gameFixes union, speedHacks/gsHWFixes take the new value per key,
//! and the correction tables are force-applied last. Entries that gained a
//! top-level field are reordered into canonical form; untouched entries keep
//! their original field order.

use serde_yml::{Mapping, Value};

use gamedb_core::schema::{self, BlockKind};
use gamedb_core::{Database, Entry};

use crate::{corrections, filter};

/// Counters from one reconciliation pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileStats {
    pub entries_examined: usize,
    pub identity_updates: usize,
    /// `name`/`region` disagreements left for human review.
    pub review_mismatches: usize,
    pub blocks_added: usize,
    /// Combined VU fields evicted in favor of split fields.
    pub modes_migrated: usize,
    pub mode_fields_added: usize,
    pub flags_added: usize,
    pub hacks_overwritten: usize,
    pub corrections_applied: usize,
    pub entries_normalized: usize,
}

/// Reconcile `new` into `base` entry by entry. Irrelevant entries are
/// skipped untouched; relevant entries missing from `new` still receive
/// their correction-table fixes.
pub fn reconcile(base: &mut Database, new: &Database) -> ReconcileStats {
    let mut stats = ReconcileStats::default();

    for (key, value) in base.iter_mut() {
        let Some(id) = key.as_str() else { continue };

        let needs_sort = {
            let Some(entry) = value.as_mapping_mut() else {
                continue;
            };
            if !filter::is_relevant(id, entry) {
                continue;
            }
            stats.entries_examined += 1;

            let mut needs_sort = false;
            if let Some(new_entry) = new.get(id).and_then(Value::as_mapping) {
                needs_sort |= merge_entry(id, entry, new_entry, &mut stats);
            }

            let applied = corrections::apply_corrections(id, entry);
            stats.corrections_applied += applied.applied;
            needs_sort |= applied.blocks_created > 0;
            needs_sort
        };

        if needs_sort {
            let normalized = value.as_mapping().map(schema::normalize_entry);
            if let Some(normalized) = normalized {
                *value = Value::Mapping(normalized);
                stats.entries_normalized += 1;
            }
        }
    }

    stats
}

/// Merge one new entry into its base counterpart. Returns whether a
/// top-level field was added (normalization required).
fn merge_entry(id: &str, base: &mut Entry, new: &Entry, stats: &mut ReconcileStats) -> bool {
    for &field in schema::SYNCED_IDENTITY_FIELDS {
        if let Some(value) = new.get(field) {
            if base.get(field) != Some(value) {
                base.insert(Value::from(field), value.clone());
                stats.identity_updates += 1;
            }
        }
    }
    for &field in schema::REVIEW_IDENTITY_FIELDS {
        if let (Some(ours), Some(theirs)) = (base.get(field), new.get(field)) {
            if ours != theirs {
                log::warn!("{id}: {field} differs from upstream ({ours:?} vs {theirs:?}); keeping ours");
                stats.review_mismatches += 1;
            }
        }
    }

    let mut needs_sort = false;
    for &field in schema::BLOCK_FIELDS {
        let Some(new_block) = new.get(field) else {
            continue;
        };
        if !base.contains_key(field) {
            base.insert(Value::from(field), new_block.clone());
            stats.blocks_added += 1;
            needs_sort = true;
            // Fall through: a freshly copied block may still need the
            // combined-field eviction below.
        }

        match schema::block_kind(field) {
            BlockKind::ModeMigrate {
                combined,
                splits,
                vocabulary,
            } => {
                if let (Some(base_block), Some(new_block)) = (
                    base.get_mut(field).and_then(Value::as_mapping_mut),
                    new_block.as_mapping(),
                ) {
                    let (migrated, added) =
                        merge_mode_block(base_block, new_block, combined, splits, vocabulary);
                    stats.modes_migrated += migrated;
                    stats.mode_fields_added += added;
                }
            }
            BlockKind::FlagUnion { vocabulary } => {
                if let (Some(base_flags), Some(new_flags)) = (
                    base.get_mut(field).and_then(Value::as_sequence_mut),
                    new_block.as_sequence(),
                ) {
                    stats.flags_added += union_flags(base_flags, new_flags, vocabulary);
                }
            }
            BlockKind::ModeOverwrite { vocabulary } => {
                if let (Some(base_block), Some(new_block)) = (
                    base.get_mut(field).and_then(Value::as_mapping_mut),
                    new_block.as_mapping(),
                ) {
                    stats.hacks_overwritten += overwrite_modes(base_block, new_block, vocabulary);
                }
            }
            BlockKind::Opaque => {}
        }
    }

    needs_sort
}

/// Merge a clamp/round mode block, migrating away from the legacy combined
/// VU field: a split field arriving from `new` evicts the combined field,
/// and any vocabulary field absent from `base` is inserted (evicting the
/// combined field first unless it is the combined field itself). Fields
/// already present in `base` are never overwritten.
///
/// Returns `(combined fields evicted, fields inserted)`.
pub fn merge_mode_block(
    base: &mut Mapping,
    new: &Mapping,
    combined: &str,
    splits: &[&str],
    vocabulary: &[&str],
) -> (usize, usize) {
    let mut migrated = 0;
    let mut added = 0;

    for &split in splits {
        if let Some(value) = new.get(split) {
            if base.contains_key(combined) {
                base.shift_remove(combined);
                base.insert(Value::from(split), value.clone());
                migrated += 1;
            }
        }
    }

    for &field in vocabulary {
        let Some(value) = new.get(field) else {
            continue;
        };
        if base.contains_key(field) {
            continue;
        }
        if field == combined {
            // Never let the combined field back in next to a split field.
            if splits.iter().any(|s| base.contains_key(*s)) {
                continue;
            }
        } else if base.contains_key(combined) {
            base.shift_remove(combined);
            migrated += 1;
        }
        base.insert(Value::from(field), value.clone());
        added += 1;
    }

    (migrated, added)
}

/// Append recognized flags present in `new` and missing from `base`,
/// preserving existing order. Idempotent.
fn union_flags(base: &mut Vec<Value>, new: &[Value], vocabulary: &[&str]) -> usize {
    let mut appended = 0;
    for &flag in vocabulary {
        if !new.iter().any(|v| v.as_str() == Some(flag)) {
            continue;
        }
        if !base.iter().any(|v| v.as_str() == Some(flag)) {
            base.push(Value::from(flag));
            appended += 1;
        }
    }
    appended
}

/// Overwrite `base` with every recognized key present in `new`.
fn overwrite_modes(base: &mut Mapping, new: &Mapping, vocabulary: &[&str]) -> usize {
    let mut overwritten = 0;
    for &field in vocabulary {
        if let Some(value) = new.get(field) {
            if base.get(field) != Some(value) {
                base.insert(Value::from(field), value.clone());
                overwritten += 1;
            }
        }
    }
    overwritten
}
