//! Per-turn snapshot of the known labyrinth.
//!
//! A [`GridView`] is built from the protocol rows every turn and never
//! mutated afterwards. Each cell is classified as a [`CellState`].

use std::fmt;
use std::str::FromStr;

use labyrinth_core::{Point, Range};

/// Classification of one labyrinth cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellState {
    /// Traversable floor (`.`).
    Open,
    /// Blocked (`#`).
    Wall,
    /// Not observed yet (`?`). Never traversed, but frontier detection looks
    /// for it.
    Fog,
    /// Entry point marker (`T`), traversable.
    Entry,
    /// Control room marker (`C`), traversable.
    Target,
}

impl CellState {
    /// Decode a protocol character.
    pub const fn from_symbol(ch: char) -> Option<Self> {
        match ch {
            '.' => Some(Self::Open),
            '#' => Some(Self::Wall),
            '?' => Some(Self::Fog),
            'T' => Some(Self::Entry),
            'C' => Some(Self::Target),
            _ => None,
        }
    }

    /// Protocol character for this state.
    pub const fn symbol(self) -> char {
        match self {
            Self::Open => '.',
            Self::Wall => '#',
            Self::Fog => '?',
            Self::Entry => 'T',
            Self::Target => 'C',
        }
    }

    /// Whether a path may go through a cell in this state.
    #[inline]
    pub const fn is_traversable(self) -> bool {
        !matches!(self, Self::Wall | Self::Fog)
    }
}

/// An immutable rectangular table of [`CellState`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridView {
    cells: Vec<CellState>,
    bounds: Range,
}

impl GridView {
    /// Build a view from a row-major cell vector.
    ///
    /// Fails with [`GridError::InconsistentSize`] if `cells.len()` is not
    /// `cols * rows`.
    pub fn from_cells(cols: i32, rows: i32, cells: Vec<CellState>) -> Result<Self, GridError> {
        let bounds = Range::sized(cols, rows);
        if cols < 0 || rows < 0 || cells.len() != bounds.len() {
            return Err(GridError::InconsistentSize {
                row: 0,
                expected: cols.max(0) as usize,
                found: cells.len(),
            });
        }
        Ok(Self { cells, bounds })
    }

    /// A view of the given size where every cell has the same state.
    pub fn filled(cols: i32, rows: i32, state: CellState) -> Self {
        let bounds = Range::sized(cols, rows);
        Self {
            cells: vec![state; bounds.len()],
            bounds,
        }
    }

    /// Parse protocol rows, one string per grid row.
    ///
    /// Every row must have the same width and only contain characters from
    /// `#.TC?`.
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self, GridError> {
        let mut cells = Vec::new();
        let mut width: Option<usize> = None;
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let mut n = 0usize;
            for (x, ch) in row.chars().enumerate() {
                let state = CellState::from_symbol(ch).ok_or(GridError::InvalidSymbol {
                    ch,
                    pos: Point::new(x as i32, y as i32),
                })?;
                cells.push(state);
                n += 1;
            }
            match width {
                None => width = Some(n),
                Some(w) if w != n => {
                    return Err(GridError::InconsistentSize {
                        row: y,
                        expected: w,
                        found: n,
                    });
                }
                Some(_) => {}
            }
        }
        let cols = width.unwrap_or(0) as i32;
        Ok(Self {
            cells,
            bounds: Range::sized(cols, rows.len() as i32),
        })
    }

    /// The bounding range `[0, cols) x [0, rows)`.
    #[inline]
    pub fn bounds(&self) -> Range {
        self.bounds
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> i32 {
        self.bounds.height()
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> i32 {
        self.bounds.width()
    }

    /// True iff `0 <= p.y < rows` and `0 <= p.x < cols`.
    #[inline]
    pub fn in_bounds(&self, p: Point) -> bool {
        self.bounds.contains(p)
    }

    #[inline]
    fn index(&self, p: Point) -> usize {
        p.y as usize * self.bounds.width() as usize + p.x as usize
    }

    /// Classification of `p`, or `None` when out of bounds.
    #[inline]
    pub fn cell_state(&self, p: Point) -> Option<CellState> {
        if !self.in_bounds(p) {
            return None;
        }
        Some(self.cells[self.index(p)])
    }

    /// True iff `p` is in bounds and traversable (not wall, not fog).
    #[inline]
    pub fn is_open(&self, p: Point) -> bool {
        self.cell_state(p).is_some_and(CellState::is_traversable)
    }

    /// First cell carrying `marker`, scanning rows top to bottom and each row
    /// left to right.
    pub fn find_marker(&self, marker: CellState) -> Option<Point> {
        self.bounds
            .iter()
            .find(|&p| self.cells[self.index(p)] == marker)
    }

    /// Whether any orthogonal neighbour of `p` is in bounds and carries
    /// `marker`.
    pub fn has_neighbor(&self, p: Point, marker: CellState) -> bool {
        p.neighbors_4()
            .into_iter()
            .any(|n| self.cell_state(n) == Some(marker))
    }

    /// Count cells in a given state.
    pub fn count(&self, state: CellState) -> usize {
        self.cells.iter().filter(|&&c| c == state).count()
    }

    /// Iterate over `(Point, CellState)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Point, CellState)> + '_ {
        self.bounds.iter().zip(self.cells.iter().copied())
    }

    /// The view encoded back into protocol rows.
    pub fn to_rows(&self) -> Vec<String> {
        let w = self.cols().max(0) as usize;
        if w == 0 {
            return vec![String::new(); self.rows().max(0) as usize];
        }
        self.cells
            .chunks(w)
            .map(|row| row.iter().map(|c| c.symbol()).collect())
            .collect()
    }
}

impl FromStr for GridView {
    type Err = GridError;

    /// Parse newline-separated rows. Surrounding whitespace is trimmed from
    /// the whole string but not from individual lines.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = s.trim().lines().collect();
        Self::parse(&rows)
    }
}

impl fmt::Display for GridView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.to_rows().iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            f.write_str(row)?;
        }
        Ok(())
    }
}

/// Errors that can occur when building a [`GridView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// A row does not have the width of the first row.
    InconsistentSize {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// A character outside `#.TC?` was found.
    InvalidSymbol { ch: char, pos: Point },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InconsistentSize {
                row,
                expected,
                found,
            } => write!(
                f,
                "grid: inconsistent size: row {row} has {found} cells, expected {expected}"
            ),
            Self::InvalidSymbol { ch, pos } => write!(
                f,
                "grid contains invalid symbol \u{201c}{ch}\u{201d} at ({}, {})",
                pos.x, pos.y
            ),
        }
    }
}

impl std::error::Error for GridError {}
