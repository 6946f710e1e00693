#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Connecting a set of power plants at minimum cost.
//!
//! Two families of problems are covered:
//! - placing a single straight transmission trunk with a spur to every plant, searched either
//!   exhaustively over integer positions (`brute_force`) or by ternary search (`ternary_search`);
//! - connecting the plants with a tree, either a minimum spanning tree (`prims`) or an
//!   approximate Steiner tree that may route through extra junction points (`steiner`).

/// Bowyer-Watson Delaunay triangulation.
pub mod delaunay;
/// Exhaustive search over integer transmission line positions.
pub mod brute_force;
/// Weighted graphs, Dijkstra and metric closures.
pub mod graph;
/// Plant locations, edges and the plant file format.
pub mod loc;
/// PNG rendering of cost curves and trees.
pub mod plot;
/// Prim's minimum spanning tree over plant locations.
pub mod prims;
/// Approximate Steiner trees.
pub mod steiner;
/// Ternary search for the transmission line position.
pub mod ternary_search;
/// The transmission line cost function.
pub mod transmission;
