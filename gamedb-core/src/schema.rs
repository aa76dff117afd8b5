//! Field vocabulary and canonical ordering for the GameDB entry schema.
//!
//! The schema is hardcoded: this is not a general YAML tool, it knows exactly
//! which fields a compatibility entry may carry and how each nested block is
//! merged. Fields outside the vocabulary are dropped during normalization.

use serde_yml::Value;

use crate::Entry;

/// Canonical top-level field order for an entry. Normalization rebuilds an
/// entry in this order; fields not listed here are dropped.
pub const ENTRY_FIELD_ORDER: &[&str] = &[
    "name",
    "name-sort",
    "name-en",
    "region",
    "compat",
    "clampModes",
    "roundModes",
    "gameFixes",
    "speedHacks",
    "gsHWFixes",
    "patches",
    "dynaPatches",
    "memcardFilters",
];

/// The nested block fields an entry may carry.
pub const BLOCK_FIELDS: &[&str] = &[
    "clampModes",
    "dynaPatches",
    "gameFixes",
    "gsHWFixes",
    "memcardFilters",
    "patches",
    "roundModes",
    "speedHacks",
];

/// Identity fields the reconciler copies from the new document unconditionally.
pub const SYNCED_IDENTITY_FIELDS: &[&str] = &["name-sort", "name-en", "compat"];

/// Identity fields that are compared but never auto-overwritten; mismatches
/// are left for human review.
pub const REVIEW_IDENTITY_FIELDS: &[&str] = &["name", "region"];

pub const CLAMP_FIELDS: &[&str] = &["eeClampMode", "vuClampMode", "vu0ClampMode", "vu1ClampMode"];

pub const ROUND_FIELDS: &[&str] = &[
    "eeDivRoundMode",
    "eeRoundMode",
    "vuRoundMode",
    "vu0RoundMode",
    "vu1RoundMode",
];

/// Legacy combined VU fields and their per-VU replacements. A block never
/// holds a combined field and a split field at the same time.
pub const VU_CLAMP_COMBINED: &str = "vuClampMode";
pub const VU_CLAMP_SPLIT: &[&str] = &["vu0ClampMode", "vu1ClampMode"];
pub const VU_ROUND_COMBINED: &str = "vuRoundMode";
pub const VU_ROUND_SPLIT: &[&str] = &["vu0RoundMode", "vu1RoundMode"];

pub const GAME_FIX_FLAGS: &[&str] = &[
    "BlitInternalFPSHack",
    "DMABusyHack",
    "EETimingHack",
    "FpuMulHack",
    "GIFFIFOHack",
    "GoemonTlbHack",
    "IbitHack",
    "OPHFlagHack",
    "SkipMPEGHack",
    "SoftwareRendererFMVHack",
    "VIF1StallHack",
    "VIFFIFOHack",
    "VuAddSubHack",
    "VUOverflowHack",
    "FullVU0SyncHack",
    "VUSyncHack",
    "XGKickHack",
];

pub const SPEED_HACK_FIELDS: &[&str] = &["mvuFlag", "instantVU1", "mtvu", "eeCycleRate"];

pub const HW_FIX_FIELDS: &[&str] = &[
    "autoFlush",
    "cpuFramebufferConversion",
    "readTCOnClose",
    "disableDepthSupport",
    "preloadFrameData",
    "disablePartialInvalidation",
    "partialTargetInvalidation",
    "textureInsideRT",
    "alignSprite",
    "mergeSprite",
    "forceEvenSpritePosition",
    "bilinearUpscale",
    "nativePaletteDraw",
    "estimateTextureRegion",
    "PCRTCOffsets",
    "PCRTCOverscan",
    "mipmap",
    "trilinearFiltering",
    "skipDrawStart",
    "skipDrawEnd",
    "halfBottomOverride",
    "halfPixelOffset",
    "nativeScaling",
    "roundSprite",
    "texturePreloading",
    "deinterlace",
    "cpuSpriteRenderBW",
    "cpuSpriteRenderLevel",
    "cpuCLUTRender",
    "gpuTargetCLUT",
    "gpuPaletteConversion",
    "minimumBlendingLevel",
    "maximumBlendingLevel",
    "getSkipCount",
    "beforeDraw",
    "moveHandler",
];

/// How a nested block participates in reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Mode map merged by fallback, with combined→split VU field migration.
    ModeMigrate {
        combined: &'static str,
        splits: &'static [&'static str],
        vocabulary: &'static [&'static str],
    },
    /// Flag sequence merged by vocabulary-ordered union, no duplicates.
    FlagUnion { vocabulary: &'static [&'static str] },
    /// Mode map where the new document's value always wins per key.
    ModeOverwrite { vocabulary: &'static [&'static str] },
    /// Copied wholesale when the base entry lacks it, never field-merged.
    Opaque,
}

/// Merge behavior for a block field name.
pub fn block_kind(field: &str) -> BlockKind {
    match field {
        "clampModes" => BlockKind::ModeMigrate {
            combined: VU_CLAMP_COMBINED,
            splits: VU_CLAMP_SPLIT,
            vocabulary: CLAMP_FIELDS,
        },
        "roundModes" => BlockKind::ModeMigrate {
            combined: VU_ROUND_COMBINED,
            splits: VU_ROUND_SPLIT,
            vocabulary: ROUND_FIELDS,
        },
        "gameFixes" => BlockKind::FlagUnion {
            vocabulary: GAME_FIX_FLAGS,
        },
        "speedHacks" => BlockKind::ModeOverwrite {
            vocabulary: SPEED_HACK_FIELDS,
        },
        "gsHWFixes" => BlockKind::ModeOverwrite {
            vocabulary: HW_FIX_FIELDS,
        },
        _ => BlockKind::Opaque,
    }
}

/// Rebuild an entry with its fields in canonical order.
///
/// Absent fields are omitted; fields outside [`ENTRY_FIELD_ORDER`] are
/// dropped. An entry already in canonical order comes back unchanged.
pub fn normalize_entry(entry: &Entry) -> Entry {
    let mut out = Entry::new();
    for &field in ENTRY_FIELD_ORDER {
        if let Some(value) = entry.get(field) {
            out.insert(Value::from(field), value.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(yaml: &str) -> Entry {
        serde_yml::from_str(yaml).unwrap()
    }

    #[test]
    fn normalize_is_noop_on_canonical_entry() {
        let e = entry(
            "name: Ace Combat 04\nregion: NTSC-U\ncompat: 5\nclampModes:\n  eeClampMode: 1\ngameFixes:\n  - EETimingHack\n",
        );
        assert_eq!(normalize_entry(&e), e);
    }

    #[test]
    fn normalize_reorders_scrambled_fields() {
        let e = entry("gameFixes:\n  - VuAddSubHack\ncompat: 4\nname: Gradius V\nclampModes:\n  vu0ClampMode: 2\n");
        let normalized = normalize_entry(&e);
        let fields: Vec<&str> = normalized.keys().filter_map(Value::as_str).collect();
        assert_eq!(fields, vec!["name", "compat", "clampModes", "gameFixes"]);
    }

    #[test]
    fn normalize_drops_unknown_fields() {
        let e = entry("name: Okami\nrecommendedBlendingLevel: 3\ncompat: 5\n");
        let normalized = normalize_entry(&e);
        assert!(normalized.get("recommendedBlendingLevel").is_none());
        assert_eq!(normalized.len(), 2);
    }

    #[test]
    fn block_kinds_cover_all_block_fields() {
        for &field in BLOCK_FIELDS {
            let opaque = matches!(block_kind(field), BlockKind::Opaque);
            let expected = matches!(field, "patches" | "dynaPatches" | "memcardFilters");
            assert_eq!(opaque, expected, "{field}");
        }
    }
}
