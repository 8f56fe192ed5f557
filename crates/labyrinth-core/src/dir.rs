//! The [`Dir`] type: one move token of the turn protocol.

use std::fmt;
use std::str::FromStr;

use crate::geom::Point;

/// A cardinal move, or the "no move" sentinel.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
    #[default]
    None,
}

impl Dir {
    /// The four real moves, in no particular order.
    pub const CARDINAL: [Dir; 4] = [Dir::Up, Dir::Down, Dir::Left, Dir::Right];

    /// Classify a displacement vector.
    ///
    /// The horizontal component wins: `x > 0` is `Right`, `x < 0` is `Left`,
    /// then `y > 0` is `Down` and `y < 0` is `Up`. The zero vector maps to
    /// [`Dir::None`].
    pub const fn from_vector(v: Point) -> Dir {
        if v.x > 0 {
            Dir::Right
        } else if v.x < 0 {
            Dir::Left
        } else if v.y > 0 {
            Dir::Down
        } else if v.y < 0 {
            Dir::Up
        } else {
            Dir::None
        }
    }

    /// Unit displacement of this move.
    pub const fn vector(self) -> Point {
        match self {
            Dir::Up => Point::new(0, -1),
            Dir::Down => Point::new(0, 1),
            Dir::Left => Point::new(-1, 0),
            Dir::Right => Point::new(1, 0),
            Dir::None => Point::ZERO,
        }
    }

    /// Protocol token.
    pub const fn as_str(self) -> &'static str {
        match self {
            Dir::Up => "UP",
            Dir::Down => "DOWN",
            Dir::Left => "LEFT",
            Dir::Right => "RIGHT",
            Dir::None => "NONE",
        }
    }
}

impl fmt::Display for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a move token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDirError(pub String);

impl fmt::Display for ParseDirError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown move token \u{201c}{}\u{201d}", self.0)
    }
}

impl std::error::Error for ParseDirError {}

impl FromStr for Dir {
    type Err = ParseDirError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UP" => Ok(Dir::Up),
            "DOWN" => Ok(Dir::Down),
            "LEFT" => Ok(Dir::Left),
            "RIGHT" => Ok(Dir::Right),
            "NONE" => Ok(Dir::None),
            _ => Err(ParseDirError(s.to_string())),
        }
    }
}
