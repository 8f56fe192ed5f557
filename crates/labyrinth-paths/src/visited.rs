//! Cells the avatar has stood on.

use labyrinth_core::{Point, Range};

/// Dense map of avatar-visited cells.
///
/// This is separate from the per-search visited set: it persists across
/// turns and is owned by the caller. Searches only read it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Visited {
    bounds: Range,
    cells: Vec<bool>,
}

impl Visited {
    /// An empty map covering `bounds`.
    pub fn new(bounds: Range) -> Self {
        Self {
            bounds,
            cells: vec![false; bounds.len()],
        }
    }

    /// The covered range.
    #[inline]
    pub fn bounds(&self) -> Range {
        self.bounds
    }

    #[inline]
    fn idx(&self, p: Point) -> Option<usize> {
        if !self.bounds.contains(p) {
            return None;
        }
        let x = (p.x - self.bounds.min.x) as usize;
        let y = (p.y - self.bounds.min.y) as usize;
        Some(y * self.bounds.width() as usize + x)
    }

    /// Record that the avatar stood on `p`. Returns `false` when `p` is out
    /// of range.
    pub fn mark(&mut self, p: Point) -> bool {
        match self.idx(p) {
            Some(i) => {
                self.cells[i] = true;
                true
            }
            None => false,
        }
    }

    /// Whether the avatar has stood on `p`. Out of range cells are reported
    /// as visited so they are never chosen as exploration goals.
    #[inline]
    pub fn is_visited(&self, p: Point) -> bool {
        self.idx(p).is_none_or(|i| self.cells[i])
    }

    /// Number of visited cells.
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&v| v).count()
    }
}
