//! labyrinth-bot: play over stdin/stdout, or simulate a labyrinth offline.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use labyrinth_bot::{
    App, AppConfig, BotConfig, Labyrinth, SimConfig, Simulation, StdioDriver,
};
use labyrinth_core::Dir;

#[derive(Parser)]
#[command(name = "labyrinth-bot", about = "Labyrinth escape agent")]
struct Cli {
    /// Move sent when no path is available (UP, DOWN, LEFT, RIGHT or NONE).
    #[arg(long, default_value_t = Dir::None)]
    fallback: Dir,

    /// Stop after this many turns.
    #[arg(long, default_value_t = BotConfig::default().max_turns)]
    max_turns: u32,

    /// Log the planned path over the labyrinth every turn.
    #[arg(long)]
    render_paths: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Play a labyrinth offline and report the outcome.
    Simulate {
        /// Load the labyrinth from a file instead of generating one.
        #[arg(long)]
        map: Option<PathBuf>,
        #[arg(long, default_value_t = SimConfig::default().seed)]
        seed: u64,
        #[arg(long, default_value_t = SimConfig::default().cols)]
        cols: i32,
        #[arg(long, default_value_t = SimConfig::default().rows)]
        rows: i32,
        #[arg(long, default_value_t = SimConfig::default().alarm)]
        alarm: i32,
        #[arg(long, default_value_t = SimConfig::default().fuel)]
        fuel: u32,
        #[arg(long, default_value_t = SimConfig::default().view_radius)]
        view_radius: i32,
        #[arg(long, default_value_t = SimConfig::default().fill_pct)]
        fill_pct: f64,
        /// Print the labyrinth before playing it.
        #[arg(long)]
        show: bool,
    },
}

/// Log filter used when `RUST_LOG` is unset. Path overlays are logged at
/// `info`, so asking for them raises the default level.
fn default_log_filter(render_paths: bool) -> &'static str {
    if render_paths { "info" } else { "warn" }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_log_filter(cli.render_paths)),
    )
    .init();

    let bot = BotConfig {
        max_turns: cli.max_turns,
        fallback: cli.fallback,
        render_paths: cli.render_paths,
    };

    match cli.command {
        None => {
            let mut app = App::new(AppConfig {
                driver: StdioDriver::stdio(),
                bot,
            });
            let summary = app.run()?;
            log::info!(
                "{} turns played, {} fallback moves, final stage: {}",
                summary.turns,
                summary.fallbacks,
                summary.stage
            );
        }
        Some(Command::Simulate {
            map,
            seed,
            cols,
            rows,
            alarm,
            fuel,
            view_radius,
            fill_pct,
            show,
        }) => {
            let config = SimConfig {
                cols,
                rows,
                alarm,
                fuel,
                view_radius,
                fill_pct,
                seed,
            };
            let labyrinth = match map {
                Some(path) => Labyrinth::parse(&std::fs::read_to_string(path)?)?,
                None => Labyrinth::generate(&config),
            };
            if show {
                println!("{}", labyrinth.map());
            }
            let mut app = App::new(AppConfig {
                driver: Simulation::new(labyrinth, &config),
                bot,
            });
            let summary = app.run()?;
            let sim = app.into_driver();
            println!(
                "{} after {} moves (stage: {}, fallbacks: {})",
                sim.outcome(),
                sim.moves(),
                summary.stage,
                summary.fallbacks
            );
        }
    }
    Ok(())
}
