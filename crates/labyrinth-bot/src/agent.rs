//! Per-turn move selection.
//!
//! The agent explores until the control room shows up, walks to it, and then
//! heads back to the entry. All path finding is delegated to a
//! [`PathTree`] rebuilt every turn.

use std::fmt;

use labyrinth_core::{Dir, Point, Range};
use labyrinth_paths::{CellState, GridView, PathTree, Visited};

/// What the agent is currently trying to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stage {
    /// Control room not in sight: explore toward the nearest frontier.
    SearchControlRoom,
    /// Control room visible: walk to it.
    GoToControlRoom,
    /// Control room reached: return to the entry.
    GoBack,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::SearchControlRoom => "search control room",
            Stage::GoToControlRoom => "go to control room",
            Stage::GoBack => "go back",
        })
    }
}

pub struct Agent {
    stage: Stage,
    visited: Visited,
    entry: Option<Point>,
    tree: PathTree,
    turn: u32,
}

impl Agent {
    /// A fresh agent for a labyrinth covering `bounds`.
    pub fn new(bounds: Range) -> Self {
        Self {
            stage: Stage::SearchControlRoom,
            visited: Visited::new(bounds),
            entry: None,
            tree: PathTree::new(),
            turn: 0,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Entry point recorded on the first turn.
    pub fn entry(&self) -> Option<Point> {
        self.entry
    }

    /// Cells the avatar has stood on.
    pub fn visited(&self) -> &Visited {
        &self.visited
    }

    /// The path tree of the last decision.
    pub fn tree(&self) -> &PathTree {
        &self.tree
    }

    /// Number of turns seen so far.
    pub fn turns(&self) -> u32 {
        self.turn
    }

    fn set_stage(&mut self, stage: Stage) {
        if self.stage != stage {
            log::info!("turn {}: {} -> {}", self.turn, self.stage, stage);
            self.stage = stage;
        }
    }

    /// Choose the move for this turn.
    ///
    /// Returns `None` when no move is possible or none is needed; the caller
    /// decides what to emit in that case.
    pub fn next_move(&mut self, pos: Point, view: &GridView) -> Option<Dir> {
        self.turn += 1;
        if view.bounds() != self.visited.bounds() {
            log::warn!(
                "view bounds changed from {} to {}, forgetting visited cells",
                self.visited.bounds(),
                view.bounds()
            );
            self.visited = Visited::new(view.bounds());
        }
        self.visited.mark(pos);

        if self.entry.is_none() {
            let entry = view.find_marker(CellState::Entry).unwrap_or(pos);
            log::info!("entry point recorded at {entry}");
            self.entry = Some(entry);
        }

        let control = view.find_marker(CellState::Target);
        if control == Some(pos) {
            self.set_stage(Stage::GoBack);
        }
        log::debug!(
            "turn {}: avatar at {pos}, control room {control:?}, stage {}",
            self.turn,
            self.stage
        );

        let step = match (self.stage, control) {
            (Stage::GoBack, _) => {
                match view.find_marker(CellState::Entry).or(self.entry) {
                    Some(entry) => self.tree.find_path_to_target(view, pos, entry),
                    None => None,
                }
            }
            (_, Some(control)) => {
                self.set_stage(Stage::GoToControlRoom);
                match self.tree.find_path_to_target(view, pos, control) {
                    Some(step) => Some(step),
                    None => {
                        log::debug!("control room at {control} not reachable yet, exploring");
                        self.tree
                            .find_path_to_nearest_unvisited(view, &self.visited, pos)
                    }
                }
            }
            (_, None) => {
                self.set_stage(Stage::SearchControlRoom);
                self.tree
                    .find_path_to_nearest_unvisited(view, &self.visited, pos)
            }
        };
        step.map(Dir::from_vector)
    }
}
