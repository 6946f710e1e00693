#![deny(missing_docs)]
//! This crate provides a handful of small algorithm katas: placing a transmission line between
//! power plants, spanning and Steiner trees over plant locations, finding the start of a circular
//! fuel tour, and solving edge-matching tile puzzles.

/// The `circuit` module finds a pit from which a circular tour can be completed without running dry.
pub mod circuit;

/// The `error` module defines the error type shared by every kata.
pub mod error;

/// The `power_plant` module places transmission lines and connection trees between power plants.
pub mod power_plant;

/// The `tiles` module implements the edge-matching tile puzzle, where every square may be rotated.
pub mod tiles;

/// Shared line-oriented parsing for the instance file formats.
pub(crate) mod input;
