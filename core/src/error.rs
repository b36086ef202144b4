//! Errors produced while applying a change stream.

use thiserror::Error;

use crate::change::RowChangeMode;
use crate::error_codes;
use crate::sheet::SheetError;

/// Errors produced by patchers.
///
/// Row and column resolution failures are local to one event; see
/// [`PatchError::is_terminal`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum PatchError {
    #[error(
        "[SPATCH_SESSION_001] no sheet is attached. Suggestion: call set_sheet before sending changes."
    )]
    SheetUnavailable,

    #[error("[SPATCH_SESSION_002] sheet '{requested}' not found. Available sheets: {}. Suggestion: check the sheet name and casing.", available.join(", "))]
    SheetNotFound {
        requested: String,
        available: Vec<String>,
    },

    #[error("[SPATCH_SESSION_003] sink error: {message}. Suggestion: check the output destination and retry.")]
    SinkError { message: String },

    #[error("[SPATCH_EVENT_001] column '{name}' not found among the visible columns.")]
    ColumnNotFound { name: String },

    #[error("[SPATCH_EVENT_002] no row matches {mode} condition {cond}.")]
    RowNotFound { mode: RowChangeMode, cond: String },

    #[error("[SPATCH_EVENT_003] declared {got} column names but the sheet has {expected} columns.")]
    NameMismatch { expected: usize, got: usize },

    #[error("[SPATCH_EVENT_004] unsupported: {what}.")]
    Unsupported { what: String },

    #[error("[SPATCH_EVENT_005] sheet access failed: {0}")]
    Sheet(#[from] SheetError),
}

impl PatchError {
    pub fn code(&self) -> &'static str {
        match self {
            PatchError::SheetUnavailable => error_codes::SHEET_UNAVAILABLE,
            PatchError::SheetNotFound { .. } => error_codes::SHEET_NOT_FOUND,
            PatchError::SinkError { .. } => error_codes::SINK_ERROR,
            PatchError::ColumnNotFound { .. } => error_codes::COLUMN_NOT_FOUND,
            PatchError::RowNotFound { .. } => error_codes::ROW_NOT_FOUND,
            PatchError::NameMismatch { .. } => error_codes::NAME_MISMATCH,
            PatchError::Unsupported { .. } => error_codes::UNSUPPORTED,
            PatchError::Sheet(_) => error_codes::SHEET_ACCESS,
        }
    }

    /// Whether the error ends the current session rather than just the event
    /// that raised it.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PatchError::SheetUnavailable
                | PatchError::SheetNotFound { .. }
                | PatchError::SinkError { .. }
        )
    }

    pub(crate) fn sink(err: impl std::fmt::Display) -> PatchError {
        PatchError::SinkError {
            message: err.to_string(),
        }
    }
}

/// A terminal error together with the position in the event stream where it
/// happened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("event #{index} ({event}) aborted the patch: {source}")]
pub struct StreamError {
    pub index: usize,
    pub event: &'static str,
    #[source]
    pub source: PatchError,
}
