//! Hardcoded correction tables: forced per-title fixes applied regardless of
//! what the source documents say.
//!
//! Three tables keyed by game id guarantee known-necessary fixes survive any
//! merge. This module also owns the raw-line ignore list and text
//! substitution map consumed by the pre-parse and post-render text passes.

use serde_yml::{Mapping, Value};

use gamedb_core::Entry;

/// A single forced fix for a game id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correction {
    /// Append a flag to a flag-list block if not already present.
    AddFlag(&'static str),
    /// Set a key in a mode-map block, overwriting any existing value.
    SetField(&'static str, i64),
}

/// An immutable table of forced fixes targeting one block field.
#[derive(Debug)]
pub struct CorrectionTable {
    /// Entry field the corrections are written into.
    pub block: &'static str,
    entries: &'static [(&'static str, &'static [Correction])],
}

impl CorrectionTable {
    pub fn get(&self, id: &str) -> Option<&'static [Correction]> {
        self.entries
            .iter()
            .find(|(key, _)| *key == id)
            .map(|(_, corrections)| *corrections)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }
}

const SOFTWARE_FMV: &[Correction] = &[Correction::AddFlag("SoftwareRendererFMVHack")];
const NO_DEPTH: &[Correction] = &[Correction::SetField("disableDepthSupport", 1)];
const NO_MVU_FLAG: &[Correction] = &[Correction::SetField("mvuFlag", 0)];

/// Titles whose FMVs break under the hardware renderer.
pub static GAME_FIX_TABLE: CorrectionTable = CorrectionTable {
    block: "gameFixes",
    entries: &[
        ("SLES-54822", SOFTWARE_FMV),
        ("SLUS-21327", SOFTWARE_FMV),
        ("SLUS-21564", SOFTWARE_FMV),
        ("SLES-51252", SOFTWARE_FMV),
        ("SLPM-65212", SOFTWARE_FMV),
        ("SLPM-67005", SOFTWARE_FMV),
        ("SLPM-67546", SOFTWARE_FMV),
        ("SLPS-29003", SOFTWARE_FMV),
        ("SLPS-29004", SOFTWARE_FMV),
        ("SLUS-20578", SOFTWARE_FMV),
    ],
};

/// Titles that need depth emulation disabled.
pub static HW_FIX_TABLE: CorrectionTable = CorrectionTable {
    block: "gsHWFixes",
    entries: &[
        ("SCAJ-20095", NO_DEPTH),
        ("SCAJ-20120", NO_DEPTH),
        ("SLES-53458", NO_DEPTH),
        ("SLES-54555", NO_DEPTH),
        ("SLKA-25300", NO_DEPTH),
        ("SLKA-25301", NO_DEPTH),
        ("SLPM-65597", NO_DEPTH),
        ("SLPM-65795", NO_DEPTH),
        ("SLPM-66372", NO_DEPTH),
        ("SLPM-66373", NO_DEPTH),
        ("SLUS-20974", NO_DEPTH),
        ("SLUS-21152", NO_DEPTH),
        ("SLUS-28049", NO_DEPTH),
        ("SLUS-28052", NO_DEPTH),
    ],
};

/// Titles that hang with the mVU flag speedhack enabled.
pub static SPEED_HACK_TABLE: CorrectionTable = CorrectionTable {
    block: "speedHacks",
    entries: &[
        ("SLPM-60149", NO_MVU_FLAG),
        ("SLPS-25052", NO_MVU_FLAG),
        ("SLPS-73205", NO_MVU_FLAG),
        ("SLPS-73410", NO_MVU_FLAG),
        ("SLUS-20152", NO_MVU_FLAG),
    ],
};

pub static ALL_TABLES: [&CorrectionTable; 3] =
    [&GAME_FIX_TABLE, &HW_FIX_TABLE, &SPEED_HACK_TABLE];

/// Raw lines containing any of these needles are excised before structural
/// parsing; covers renderer hooks and keys retired from the schema.
pub static RAW_LINE_IGNORE: &[&str] = &[
    "GSC_IRem",
    "GSC_SandGrainGames",
    "GSC_Turok",
    "recommendedBlendingLevel",
];

/// Cosmetic raw-text substitutions applied line by line.
pub static RAW_TEXT_REPLACEMENTS: &[(&str, &str)] = &[("PlayStation2", "PlayStation 2")];

/// Whether any correction table keys this game id.
pub fn is_corrected(id: &str) -> bool {
    ALL_TABLES.iter().any(|table| table.contains(id))
}

/// Outcome of applying the correction tables to one entry.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AppliedCorrections {
    /// Corrections that changed the entry (flags appended, fields set).
    pub applied: usize,
    /// Blocks created because the entry lacked the target block.
    pub blocks_created: usize,
}

/// Force-apply every correction listed for `id` into the entry, creating the
/// target block when absent. `AddFlag` appends only when the flag is missing;
/// `SetField` always overwrites.
pub fn apply_corrections(id: &str, entry: &mut Entry) -> AppliedCorrections {
    let mut outcome = AppliedCorrections::default();

    for table in ALL_TABLES {
        let Some(corrections) = table.get(id) else {
            continue;
        };

        if !entry.contains_key(table.block) {
            let empty = match corrections.first() {
                Some(Correction::AddFlag(_)) => Value::Sequence(Vec::new()),
                _ => Value::Mapping(Mapping::new()),
            };
            entry.insert(Value::from(table.block), empty);
            outcome.blocks_created += 1;
        }
        let Some(slot) = entry.get_mut(table.block) else {
            continue;
        };

        for correction in corrections {
            match *correction {
                Correction::AddFlag(flag) => {
                    if let Some(seq) = slot.as_sequence_mut() {
                        if !seq.iter().any(|v| v.as_str() == Some(flag)) {
                            seq.push(Value::from(flag));
                            outcome.applied += 1;
                        }
                    }
                }
                Correction::SetField(key, value) => {
                    if let Some(map) = slot.as_mapping_mut() {
                        map.insert(Value::from(key), Value::from(value));
                        outcome.applied += 1;
                    }
                }
            }
        }
    }

    outcome
}
