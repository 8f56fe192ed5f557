//! **labyrinth-bot** holds the escape agent and the programs that drive it.
//!
//! [`Agent`] picks one move per turn. [`App`] runs the turn loop over any
//! [`Driver`]: [`StdioDriver`] speaks the line protocol on standard streams,
//! [`Simulation`] plays a generated or loaded [`Labyrinth`] offline.

pub mod agent;
pub mod app;
pub mod config;
pub mod protocol;
pub mod sim;

pub use agent::{Agent, Stage};
pub use app::{App, AppConfig, Driver, RunSummary, StdioDriver};
pub use config::{BotConfig, SimConfig};
pub use protocol::{Header, MoveWriter, ProtocolError, Turn, TurnReader};
pub use sim::{Labyrinth, Outcome, SimError, Simulation};
