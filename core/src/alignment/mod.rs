//! Turns buffered row events into readable rendering instructions.
//!
//! [`viterbi`] is a generic minimum-cost lattice decoder. [`interpret`]
//! builds the row-event lattice on top of it: every event is either rendered
//! literally or paired with a neighbour into a single changed row.

pub mod interpret;
pub mod viterbi;

pub use interpret::{RowInstruction, RowLabel, interpret};
pub use viterbi::{Decoded, decode};
