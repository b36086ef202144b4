//! Stable error codes carried in error messages.

pub const SHEET_UNAVAILABLE: &str = "SPATCH_SESSION_001";
pub const SHEET_NOT_FOUND: &str = "SPATCH_SESSION_002";
pub const SINK_ERROR: &str = "SPATCH_SESSION_003";
pub const COLUMN_NOT_FOUND: &str = "SPATCH_EVENT_001";
pub const ROW_NOT_FOUND: &str = "SPATCH_EVENT_002";
pub const NAME_MISMATCH: &str = "SPATCH_EVENT_003";
pub const UNSUPPORTED: &str = "SPATCH_EVENT_004";
pub const SHEET_ACCESS: &str = "SPATCH_EVENT_005";
