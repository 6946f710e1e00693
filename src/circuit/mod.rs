#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Circular fuel tours.
//!
//! A car drives around a closed circuit of pits. At each pit it can take on a fixed amount of
//! fuel, and it burns a fixed amount driving to the next pit. The question is which pit to start
//! from, with an empty tank, so that the whole lap can be driven.

/// Pits, the example circuits and the pit file format.
pub mod pit;
/// Start pit search, feasibility checks and fuel traces.
pub mod search;

pub use pit::{EXAMPLE_PITS_ONE, EXAMPLE_PITS_TWO, Pit};
pub use search::{brute_force_start, fuel_trace, is_feasible_start, search_start_pit};
