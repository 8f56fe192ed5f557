use std::collections::VecDeque;

use labyrinth_core::{Point, Range};

/// One reachable cell of a shortest-path tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathNode {
    pub pos: Point,
    /// Number of steps from the start cell.
    pub distance: u32,
    /// Index of the node this one was first reached from. `None` for the
    /// root.
    pub parent: Option<usize>,
}

/// Marker for cells without a node in the dense slot table.
pub(crate) const NO_NODE: usize = usize::MAX;

// ---------------------------------------------------------------------------
// PathTree
// ---------------------------------------------------------------------------

/// Breadth-first shortest-path tree over a [`GridView`](crate::GridView).
///
/// Nodes live in an arena; parent links are indices into it and the root is
/// always index 0. A `PathTree` can be reused from turn to turn to keep its
/// allocations, but every search starts from a cleared state.
#[derive(Debug, Clone, Default)]
pub struct PathTree {
    pub(crate) rng: Range,
    pub(crate) width: usize,
    pub(crate) nodes: Vec<PathNode>,
    /// Dense table mapping each cell to its node index, or [`NO_NODE`].
    /// Doubles as the search's visited set.
    pub(crate) slots: Vec<usize>,
    pub(crate) queue: VecDeque<usize>,
    pub(crate) goal: Option<usize>,
}

impl PathTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear every result and size the slot table for `rng`.
    pub(crate) fn reset(&mut self, rng: Range) {
        self.goal = None;
        self.nodes.clear();
        self.queue.clear();
        self.rng = rng;
        self.width = rng.width().max(0) as usize;
        let len = rng.len();
        self.slots.clear();
        self.slots.resize(len, NO_NODE);
        self.nodes.reserve(len);
    }

    /// The grid rectangle of the last search.
    #[inline]
    pub fn range(&self) -> Range {
        self.rng
    }

    /// All nodes of the last search, in creation (BFS discovery) order.
    #[inline]
    pub fn nodes(&self) -> &[PathNode] {
        &self.nodes
    }

    /// Number of nodes created by the last search.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The root node, if the last search created one.
    #[inline]
    pub fn root(&self) -> Option<PathNode> {
        self.nodes.first().copied()
    }

    /// Index of the selected goal node.
    #[inline]
    pub fn goal(&self) -> Option<usize> {
        self.goal
    }

    /// The selected goal node.
    #[inline]
    pub fn goal_node(&self) -> Option<PathNode> {
        self.goal.map(|i| self.nodes[i])
    }

    /// The node created for `p`, if `p` was reached by the last search.
    pub fn node_at(&self, p: Point) -> Option<PathNode> {
        let slot = self.slots[self.idx(p)?];
        (slot != NO_NODE).then(|| self.nodes[slot])
    }

    /// Distance from the start recorded for `p`.
    pub fn distance_at(&self, p: Point) -> Option<u32> {
        self.node_at(p).map(|n| n.distance)
    }

    // -----------------------------------------------------------------------
    // Coordinate helpers
    // -----------------------------------------------------------------------

    /// Convert a `Point` to a flat index. Returns `None` if out of range.
    #[inline]
    pub(crate) fn idx(&self, p: Point) -> Option<usize> {
        if !self.rng.contains(p) {
            return None;
        }
        let x = (p.x - self.rng.min.x) as usize;
        let y = (p.y - self.rng.min.y) as usize;
        Some(y * self.width + x)
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn pathnode_round_trip() {
        let node = PathNode {
            pos: Point::new(3, 7),
            distance: 42,
            parent: Some(5),
        };
        let json = serde_json::to_string(&node).unwrap();
        let back: PathNode = serde_json::from_str(&json).unwrap();
        assert_eq!(node, back);
    }
}
