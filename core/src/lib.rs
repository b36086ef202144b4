//! Sheet Patch: apply, describe and render structured changes to tabular
//! sheets.
//!
//! This crate provides:
//! - A [`Sheet`] capability trait with an in-memory [`MemSheet`], and a
//!   [`Book`] of named sheets
//! - The change model ([`RowChange`], [`OrderChange`], [`NameChange`], ...)
//!   emitted by an upstream table comparison
//! - [`SheetPatcher`], which replays a change stream against a live sheet,
//!   either destructively or as an annotated ("descriptive") diff
//! - Renderers ([`TdiffWriter`], [`CsvPatchWriter`], [`JsonLinesPatcher`])
//!   that consume the same stream
//! - Deterministic content hashing for equality checks
//!
//! # Quick Start
//!
//! ```
//! use sheet_patch::{MemBook, MemSheet, PatchConfig, Patcher, RowChange, SheetPatcher};
//!
//! let sheet = MemSheet::from_rows([["id", "v"], ["1", "2"], ["3", "4"]]);
//! let mut patcher = SheetPatcher::new(MemBook::unnamed(sheet), PatchConfig::default());
//! patcher.set_sheet("data")?;
//! patcher.merge_start()?;
//! patcher.change_row(&RowChange::update().with_cond("id", "1").with_val("v", "9"))?;
//! assert_eq!(patcher.sheet().unwrap().text_rows()[1], vec!["1", "9"]);
//! # Ok::<(), sheet_patch::PatchError>(())
//! ```

mod addressing;
pub mod alignment;
mod appearance;
mod book;
mod cell;
mod change;
mod config;
mod engine;
mod error;
pub mod error_codes;
mod hashing;
mod names;
mod output;
mod session;
mod sheet;
mod sheet_patcher;
mod sink;

pub use addressing::column_label;
pub use alignment::{RowInstruction, RowLabel, interpret};
pub use appearance::{
    FULL_COLOR, HALF_COLOR, RecordingStyles, Rgb16, Style, StyleSink, StyleTarget,
};
pub use book::{Book, MemBook};
pub use cell::Cell;
pub use change::{
    CellMap, ConfigChange, LinkDeclare, LinkDeclareMode, NameChange, NameChangeMode, OrderChange,
    OrderChangeMode, PatchEvent, PoolChange, RowChange, RowChangeMode, TableField,
};
pub use config::{AlignmentCosts, ConfigError, PatchConfig, PatchConfigBuilder, PatchMode};
pub use engine::{PatchIssue, PatchReport, apply_events};
pub use error::{PatchError, StreamError};
pub use hashing::{ContentHash, content_hash, hash_sheet, sheets_equal};
pub use names::{HeaderSniffer, LetterSniffer, NameSniffer, SniffedNames};
pub use output::csv_patch::{CSV_PATCH_HEADER, CsvPatchWriter, CsvStyle};
pub use output::json_lines::{EVENT_SCHEMA_VERSION, JsonLinesPatcher, read_json_lines};
pub use output::tdiff::{TDIFF_HEADER, TdiffWriter};
pub use session::{INSERTED, SessionState, TOMBSTONE};
pub use sheet::{MemSheet, PendingRow, Sheet, SheetError, copy_data};
pub use sheet_patcher::SheetPatcher;
pub use sink::{CallbackPatcher, PatchChain, Patcher, VecPatcher};
