//! Core data model and document I/O for the GameDB toolkit.
//!
//! A GameDB document is an insertion-ordered YAML mapping of game id
//! (disc serial, e.g. `SLUS-20152`) to a per-title entry. Entries carry a
//! fixed field vocabulary plus nested configuration blocks; everything is
//! handled as untyped `serde_yml` values so unknown scalars and opaque
//! blocks pass through losslessly.

pub mod schema;
pub mod yaml;

pub use schema::{BlockKind, block_kind, normalize_entry};
pub use yaml::{YamlError, filter_raw_lines, load_database, parse_database, render_database, write_atomic};

/// A GameDB document: ordered mapping of game id → entry.
pub type Database = serde_yml::Mapping;

/// One game title's configuration record: ordered mapping of field → value.
pub type Entry = serde_yml::Mapping;
