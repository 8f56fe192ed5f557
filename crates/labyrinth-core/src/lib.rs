//! **labyrinth-core** provides geometry primitives shared by the labyrinth escape
//! agent crates.
//!
//! This crate provides [`Point`] cell coordinates, half-open [`Range`]
//! rectangles, and the [`Dir`] move tokens of the turn protocol.

pub mod dir;
pub mod geom;

pub use dir::{Dir, ParseDirError};
pub use geom::{Point, Range, RangeIter};
