#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Edge-matching tile puzzles.
//!
//! Every tile is a square with a colour on each of its four sides. The squares have to be laid
//! out on a grid, each one used exactly once and rotated as needed, so that the sides of
//! neighbouring squares show the same colour. A puzzle may also have a frame colour that every
//! side on the border of the grid must show.

/// Backtracking search, the puzzle file format and random puzzles.
pub mod solver;
/// Colours, sides, squares and their rotations.
pub mod square;

pub use solver::{Board, Puzzle, TileStats};
pub use square::{Colour, Placement, Side, Square};
