//! Offline labyrinth simulator.
//!
//! A [`Labyrinth`] is the fully known map. A [`Simulation`] plays it as a
//! [`Driver`]: it reveals the cells around the avatar, applies moves, and
//! tracks the alarm countdown and remaining fuel.

use std::fmt;

use labyrinth_core::{Dir, Point, Range};
use labyrinth_paths::{CellState, GridError, GridView, PathTree, Query};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::app::Driver;
use crate::config::SimConfig;
use crate::protocol::{Header, Turn};

// ---------------------------------------------------------------------------
// Labyrinth
// ---------------------------------------------------------------------------

/// A fully known labyrinth with one entry and one control room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labyrinth {
    map: GridView,
    entry: Point,
    control: Point,
}

/// Errors raised when loading a labyrinth from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    Grid(GridError),
    /// The map does not contain the given marker.
    MissingMarker(CellState),
    /// Simulated maps must be fully known.
    FogInMap(Point),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grid(e) => write!(f, "{e}"),
            Self::MissingMarker(m) => write!(f, "labyrinth has no {:?} marker ({})", m, m.symbol()),
            Self::FogInMap(p) => write!(f, "labyrinth contains fog at {p}"),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Grid(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GridError> for SimError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

impl Labyrinth {
    /// Load a map written in the protocol alphabet, without fog.
    pub fn parse(s: &str) -> Result<Self, SimError> {
        let map: GridView = s.parse()?;
        if let Some(p) = map.find_marker(CellState::Fog) {
            return Err(SimError::FogInMap(p));
        }
        let entry = map
            .find_marker(CellState::Entry)
            .ok_or(SimError::MissingMarker(CellState::Entry))?;
        let control = map
            .find_marker(CellState::Target)
            .ok_or(SimError::MissingMarker(CellState::Target))?;
        Ok(Self {
            map,
            entry,
            control,
        })
    }

    /// Carve a random labyrinth.
    ///
    /// Starting from a random interior entry cell, random walks carve floor
    /// until `fill_pct` of the interior is open. The border stays walled. The
    /// control room is placed on the carved cell farthest from the entry.
    pub fn generate(config: &SimConfig) -> Self {
        let config = config.normalized();
        let mut rng = StdRng::seed_from_u64(config.seed);
        let bounds = Range::sized(config.cols, config.rows);
        let interior = Range::new(1, 1, config.cols - 1, config.rows - 1);

        let mut cells = vec![CellState::Wall; bounds.len()];
        let index = |p: Point| p.y as usize * config.cols as usize + p.x as usize;

        let entry = Point::new(
            rng.random_range(interior.min.x..interior.max.x),
            rng.random_range(interior.min.y..interior.max.y),
        );
        let total = interior.len();
        let target = ((total as f64 * config.fill_pct) as usize).clamp(2, total);
        let step_limit = total * 4;
        let mut carved = 0usize;

        'walks: for _ in 0..total {
            let mut pos = entry;
            for _ in 0..step_limit {
                if carved >= target {
                    break 'walks;
                }
                if cells[index(pos)] != CellState::Open {
                    cells[index(pos)] = CellState::Open;
                    carved += 1;
                }
                let next = pos + Dir::CARDINAL[rng.random_range(0..4usize)].vector();
                if interior.contains(next) {
                    pos = next;
                }
            }
        }

        // Every carved cell is connected to the entry. A target outside the
        // map never matches, so the search visits them all and its last node
        // is the farthest one.
        let open = GridView::from_cells(config.cols, config.rows, cells.clone())
            .unwrap_or_else(|_| GridView::filled(config.cols, config.rows, CellState::Wall));
        let mut tree = PathTree::new();
        tree.search(&open, entry, Query::SeekTarget(Point::new(-1, -1)), true);
        let control = tree.nodes().last().map_or(entry, |n| n.pos);

        cells[index(control)] = CellState::Target;
        cells[index(entry)] = CellState::Entry;
        let map = GridView::from_cells(config.cols, config.rows, cells)
            .unwrap_or_else(|_| GridView::filled(config.cols, config.rows, CellState::Wall));
        log::debug!(
            "generated {}x{} labyrinth (seed {}): {carved} floor cells, entry {entry}, control room {control}",
            config.cols,
            config.rows,
            config.seed
        );
        Self {
            map,
            entry,
            control,
        }
    }

    pub fn map(&self) -> &GridView {
        &self.map
    }

    pub fn entry(&self) -> Point {
        self.entry
    }

    pub fn control(&self) -> Point {
        self.control
    }
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// State of a simulated game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    Running,
    /// Back at the entry after visiting the control room, in time.
    Escaped,
    AlarmExpired,
    OutOfFuel,
    /// Moved into a wall, fog, or off the map.
    HitWall,
    /// Answered with `NONE`.
    Stalled,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Outcome::Running => "running",
            Outcome::Escaped => "escaped",
            Outcome::AlarmExpired => "alarm expired",
            Outcome::OutOfFuel => "out of fuel",
            Outcome::HitWall => "hit a wall",
            Outcome::Stalled => "stalled",
        })
    }
}

/// A [`Driver`] playing a [`Labyrinth`] offline.
pub struct Simulation {
    labyrinth: Labyrinth,
    config: SimConfig,
    revealed: Vec<bool>,
    pos: Point,
    alarm_left: Option<i32>,
    fuel_left: u32,
    moves: u32,
    outcome: Outcome,
}

impl Simulation {
    pub fn new(labyrinth: Labyrinth, config: &SimConfig) -> Self {
        let config = config.normalized();
        let revealed = vec![false; labyrinth.map.bounds().len()];
        let pos = labyrinth.entry;
        let fuel_left = config.fuel;
        let mut sim = Self {
            labyrinth,
            config,
            revealed,
            pos,
            alarm_left: None,
            fuel_left,
            moves: 0,
            outcome: Outcome::Running,
        };
        sim.reveal();
        sim
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn pos(&self) -> Point {
        self.pos
    }

    /// Moves applied so far.
    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// Rounds left before the alarm goes off, once it is running.
    pub fn alarm_left(&self) -> Option<i32> {
        self.alarm_left
    }

    pub fn labyrinth(&self) -> &Labyrinth {
        &self.labyrinth
    }

    fn reveal(&mut self) {
        let bounds = self.labyrinth.map.bounds();
        let w = bounds.width() as usize;
        for p in bounds.around(self.pos, self.config.view_radius) {
            self.revealed[p.y as usize * w + p.x as usize] = true;
        }
    }

    /// What the avatar currently knows: revealed cells, fog elsewhere.
    pub fn view(&self) -> GridView {
        let cells = self
            .labyrinth
            .map
            .iter()
            .zip(self.revealed.iter())
            .map(|((_, state), &seen)| if seen { state } else { CellState::Fog })
            .collect();
        let bounds = self.labyrinth.map.bounds();
        GridView::from_cells(bounds.width(), bounds.height(), cells)
            .unwrap_or_else(|_| GridView::filled(bounds.width(), bounds.height(), CellState::Fog))
    }

    fn finish(&mut self, outcome: Outcome) {
        log::info!("simulation over after {} moves: {outcome}", self.moves);
        self.outcome = outcome;
    }

    /// Apply one move and update the game state.
    pub fn step(&mut self, dir: Dir) {
        if self.outcome != Outcome::Running {
            return;
        }
        self.moves += 1;
        self.fuel_left = self.fuel_left.saturating_sub(1);
        if dir == Dir::None {
            self.finish(Outcome::Stalled);
            return;
        }
        let next = self.pos + dir.vector();
        if !self.labyrinth.map.is_open(next) {
            self.finish(Outcome::HitWall);
            return;
        }
        self.pos = next;
        self.reveal();

        if let Some(left) = self.alarm_left.as_mut() {
            *left -= 1;
            if self.pos == self.labyrinth.entry {
                self.finish(Outcome::Escaped);
                return;
            }
            if *left <= 0 {
                self.finish(Outcome::AlarmExpired);
                return;
            }
        } else if self.pos == self.labyrinth.control {
            log::info!("control room reached after {} moves, alarm started", self.moves);
            self.alarm_left = Some(self.config.alarm);
        }

        if self.fuel_left == 0 {
            self.finish(Outcome::OutOfFuel);
        }
    }
}

impl Driver for Simulation {
    fn init(&mut self) -> Result<Header, Box<dyn std::error::Error>> {
        let bounds = self.labyrinth.map.bounds();
        Ok(Header {
            rows: bounds.height(),
            cols: bounds.width(),
            alarm: self.config.alarm,
        })
    }

    fn next_turn(&mut self, _header: &Header) -> Result<Option<Turn>, Box<dyn std::error::Error>> {
        if self.outcome != Outcome::Running {
            return Ok(None);
        }
        Ok(Some(Turn {
            pos: self.pos,
            view: self.view(),
        }))
    }

    fn send_move(&mut self, dir: Dir) -> Result<(), Box<dyn std::error::Error>> {
        self.step(dir);
        Ok(())
    }
}
