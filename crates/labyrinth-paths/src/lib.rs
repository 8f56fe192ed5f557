//! Breadth-first navigation for a partially observed labyrinth.
//!
//! Every turn the known labyrinth is captured in a [`GridView`] and a
//! [`PathTree`] is rebuilt from the avatar's cell with one breadth-first
//! search. The tree answers three questions:
//!
//! - **Exploration**: the first step toward the nearest cell the avatar has
//!   not stood on yet that borders fog ([`PathTree::find_path_to_nearest_unvisited`]).
//! - **Goal seeking**: the first step toward a known cell, such as the
//!   control room ([`PathTree::find_path_to_target`]).
//! - **Return**: the same query toward the recorded entry point.
//!
//! Unreachable goals and "already there" are both reported as `None`; the
//! caller decides which move to emit instead.

mod pathtree;
mod render;
mod search;
mod view;
mod visited;

pub use pathtree::{PathNode, PathTree};
pub use render::{PATH_SYMBOL, render_path};
pub use search::Query;
pub use view::{CellState, GridError, GridView};
pub use visited::Visited;
