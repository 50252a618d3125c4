//! `hexheat_core` — deterministic heat-flow tick over a hexagonal board.
//!
//! No IO, no network. All randomness via the passed-in Rng; one tick is a
//! pure function from the prior state to the next.

pub mod commands;
mod diffusion;
mod engine;
mod extraction;
pub mod hex;
mod lifecycle;
mod los;
mod storage;
mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use commands::{apply_command, Command};
pub use engine::tick;
pub use hex::{Hex, DIRECTIONS, HALF_DIRECTIONS};
pub use los::line_of_sight;
pub use types::*;

#[cfg(test)]
mod tests;
