//! The turn loop: [`Driver`], [`App`].

use std::io::{self, BufRead, StdinLock, Stdout, Write};

use labyrinth_core::{Dir, Range};
use labyrinth_paths::render_path;

use crate::agent::{Agent, Stage};
use crate::config::BotConfig;
use crate::protocol::{Header, MoveWriter, Turn, TurnReader};

// ---------------------------------------------------------------------------
// Driver trait
// ---------------------------------------------------------------------------

/// Source of turns and sink of moves (e.g. the stdio protocol or the
/// offline simulator).
pub trait Driver {
    /// Start the game and return its parameters.
    fn init(&mut self) -> Result<Header, Box<dyn std::error::Error>>;

    /// Next turn, or `None` once the game is over.
    fn next_turn(&mut self, header: &Header) -> Result<Option<Turn>, Box<dyn std::error::Error>>;

    /// Deliver the move chosen for the last turn.
    fn send_move(&mut self, dir: Dir) -> Result<(), Box<dyn std::error::Error>>;

    /// Release resources. Called once, also after errors.
    fn close(&mut self) {}
}

// ---------------------------------------------------------------------------
// StdioDriver
// ---------------------------------------------------------------------------

/// [`Driver`] speaking the line protocol over a reader and a writer.
pub struct StdioDriver<R, W> {
    reader: TurnReader<R>,
    writer: MoveWriter<W>,
}

impl<R: BufRead, W: Write> StdioDriver<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            reader: TurnReader::new(input),
            writer: MoveWriter::new(output),
        }
    }

    /// Return the wrapped writer.
    pub fn into_writer(self) -> W {
        self.writer.into_inner()
    }
}

impl StdioDriver<StdinLock<'static>, Stdout> {
    /// Driver over the process's standard input and output.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Driver for StdioDriver<R, W> {
    fn init(&mut self) -> Result<Header, Box<dyn std::error::Error>> {
        Ok(self.reader.read_header()?)
    }

    fn next_turn(&mut self, header: &Header) -> Result<Option<Turn>, Box<dyn std::error::Error>> {
        Ok(self.reader.read_turn(header)?)
    }

    fn send_move(&mut self, dir: Dir) -> Result<(), Box<dyn std::error::Error>> {
        Ok(self.writer.write_move(dir)?)
    }
}

// ---------------------------------------------------------------------------
// AppConfig / App
// ---------------------------------------------------------------------------

/// Configuration for creating an [`App`].
pub struct AppConfig<D: Driver> {
    pub driver: D,
    pub bot: BotConfig,
}

/// What happened during [`App::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub turns: u32,
    /// Turns answered with the configured fallback move.
    pub fallbacks: u32,
    pub stage: Stage,
}

/// The main turn loop.
pub struct App<D: Driver> {
    driver: D,
    config: BotConfig,
}

impl<D: Driver> App<D> {
    pub fn new(config: AppConfig<D>) -> Self {
        Self {
            driver: config.driver,
            config: config.bot,
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Play until the driver runs out of turns or the turn limit is hit.
    ///
    /// Every turn is answered with exactly one move: when the agent has no
    /// direction the configured fallback is sent instead.
    pub fn run(&mut self) -> Result<RunSummary, Box<dyn std::error::Error>> {
        let result = self.play();
        self.driver.close();
        result
    }

    fn play(&mut self) -> Result<RunSummary, Box<dyn std::error::Error>> {
        let header = self.driver.init()?;
        log::info!(
            "labyrinth {}x{}, alarm {} rounds",
            header.cols,
            header.rows,
            header.alarm
        );
        let mut agent = Agent::new(Range::sized(header.cols, header.rows));
        let mut summary = RunSummary {
            turns: 0,
            fallbacks: 0,
            stage: agent.stage(),
        };

        while summary.turns < self.config.max_turns {
            let Some(turn) = self.driver.next_turn(&header)? else {
                break;
            };
            let dir = match agent.next_move(turn.pos, &turn.view) {
                Some(dir) => dir,
                None => {
                    log::warn!(
                        "turn {}: no path from {}, sending {}",
                        summary.turns + 1,
                        turn.pos,
                        self.config.fallback
                    );
                    summary.fallbacks += 1;
                    self.config.fallback
                }
            };
            if self.config.render_paths {
                for row in render_path(&turn.view, agent.tree()) {
                    log::info!("{row}");
                }
            }
            self.driver.send_move(dir)?;
            summary.turns += 1;
            summary.stage = agent.stage();
        }

        if summary.turns >= self.config.max_turns {
            log::warn!("turn limit of {} reached", self.config.max_turns);
        }
        Ok(summary)
    }
}
