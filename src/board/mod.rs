//! Board logic: which column an issue sits in, what a move changes, and how
//! long to wait before GitHub reflects it.

pub mod columns;
pub mod moves;
pub mod sync;

pub use columns::{classify, Board, BoardFilter, Column};
pub use moves::{MoveOutcome, MovePlan};
