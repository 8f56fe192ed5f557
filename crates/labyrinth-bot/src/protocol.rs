//! Turn protocol over text streams.
//!
//! ```text
//! R C A          header: rows, columns, alarm rounds
//! KR KC          every turn: avatar row, then column
//! #####...       R rows of C characters from `#.TC?`
//! ```
//!
//! Numbers and rows are whitespace-separated tokens. Every turn is answered
//! with one of `UP`, `DOWN`, `LEFT`, `RIGHT` or `NONE` on its own line.

use std::collections::VecDeque;
use std::fmt;
use std::io::{self, BufRead, Write};

use labyrinth_core::{Dir, Point};
use labyrinth_paths::{GridError, GridView};

/// Game parameters sent once before the first turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Header {
    pub rows: i32,
    pub cols: i32,
    /// Rounds between reaching the control room and the alarm going off.
    pub alarm: i32,
}

impl Header {
    /// Largest grid (rows times columns) a header may announce.
    pub const MAX_CELLS: usize = 1 << 20;
}

/// One turn of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub pos: Point,
    pub view: GridView,
}

/// Errors raised while reading or writing the protocol.
#[derive(Debug)]
pub enum ProtocolError {
    Io(io::Error),
    /// Input ended in the middle of a turn.
    UnexpectedEof { expected: &'static str },
    MalformedHeader(String),
    MalformedPosition(String),
    Grid(GridError),
    /// The rows do not match the header dimensions (x = cols, y = rows).
    DimensionMismatch { expected: Point, found: Point },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "protocol i/o: {e}"),
            Self::UnexpectedEof { expected } => {
                write!(f, "unexpected end of input, expected {expected}")
            }
            Self::MalformedHeader(fields) => write!(f, "malformed header: {fields:?}"),
            Self::MalformedPosition(fields) => write!(f, "malformed position: {fields:?}"),
            Self::Grid(e) => write!(f, "{e}"),
            Self::DimensionMismatch { expected, found } => write!(
                f,
                "grid is {}x{}, header announced {}x{}",
                found.x, found.y, expected.x, expected.y
            ),
        }
    }
}

impl std::error::Error for ProtocolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Grid(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ProtocolError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<GridError> for ProtocolError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

fn parse_ints<const N: usize>(fields: &[String; N]) -> Option<[i32; N]> {
    let mut out = [0; N];
    for (slot, field) in out.iter_mut().zip(fields) {
        *slot = field.parse().ok()?;
    }
    Some(out)
}

// ---------------------------------------------------------------------------
// TurnReader
// ---------------------------------------------------------------------------

/// Decodes the header and turns from a buffered reader.
///
/// Input is consumed as whitespace-separated tokens, so line breaks between
/// numbers or blank lines between turns do not matter. Grid rows contain no
/// whitespace and are read as one token each.
pub struct TurnReader<R> {
    input: R,
    tokens: VecDeque<String>,
}

impl<R: BufRead> TurnReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            tokens: VecDeque::new(),
        }
    }

    /// Next token, reading more lines as needed. `None` at end of input.
    fn next_token(&mut self) -> Result<Option<String>, ProtocolError> {
        let mut line = String::new();
        while self.tokens.is_empty() {
            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.tokens.extend(line.split_whitespace().map(str::to_string));
        }
        Ok(self.tokens.pop_front())
    }

    fn expect_token(&mut self, expected: &'static str) -> Result<String, ProtocolError> {
        self.next_token()?.ok_or(ProtocolError::UnexpectedEof { expected })
    }

    /// Read the `R C A` header.
    pub fn read_header(&mut self) -> Result<Header, ProtocolError> {
        let fields = [
            self.expect_token("header")?,
            self.expect_token("header")?,
            self.expect_token("header")?,
        ];
        match parse_ints(&fields) {
            Some([rows, cols, alarm])
                if rows >= 0
                    && cols >= 0
                    && (rows as usize) * (cols as usize) <= Header::MAX_CELLS =>
            {
                Ok(Header { rows, cols, alarm })
            }
            _ => Err(ProtocolError::MalformedHeader(fields.join(" "))),
        }
    }

    /// Read one turn. Returns `Ok(None)` if the input ends cleanly before the
    /// turn starts.
    pub fn read_turn(&mut self, header: &Header) -> Result<Option<Turn>, ProtocolError> {
        let Some(row) = self.next_token()? else {
            return Ok(None);
        };
        let fields = [row, self.expect_token("position")?];
        let [row, col] =
            parse_ints(&fields).ok_or_else(|| ProtocolError::MalformedPosition(fields.join(" ")))?;
        let pos = Point::new(col, row);

        let mut rows = Vec::new();
        for _ in 0..header.rows {
            rows.push(self.expect_token("grid row")?);
        }
        let view = GridView::parse(&rows)?;
        if view.cols() != header.cols || view.rows() != header.rows {
            return Err(ProtocolError::DimensionMismatch {
                expected: Point::new(header.cols, header.rows),
                found: Point::new(view.cols(), view.rows()),
            });
        }
        Ok(Some(Turn { pos, view }))
    }
}

// ---------------------------------------------------------------------------
// MoveWriter
// ---------------------------------------------------------------------------

/// Encodes move tokens, one per line, flushing after each.
pub struct MoveWriter<W> {
    output: W,
}

impl<W: Write> MoveWriter<W> {
    pub fn new(output: W) -> Self {
        Self { output }
    }

    pub fn write_move(&mut self, dir: Dir) -> Result<(), ProtocolError> {
        writeln!(self.output, "{dir}")?;
        self.output.flush()?;
        Ok(())
    }

    /// Return the wrapped writer.
    pub fn into_inner(self) -> W {
        self.output
    }
}
