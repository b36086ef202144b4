//! Renderers that consume the patch event stream instead of applying it.

pub mod csv_patch;
pub mod json_lines;
pub mod tdiff;
