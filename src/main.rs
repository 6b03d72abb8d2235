use clap::{Args, Parser, Subcommand};
use knucklebones_core::engine::config::EngineConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod session;

#[derive(Parser, Debug)]
#[command(
    name = "knucklebones",
    version,
    about = "Knucklebones against a negamax opponent"
)]
struct Cli {
    #[command(flatten)]
    opts: SessionOpts,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Args, Debug)]
struct SessionOpts {
    /// JSON engine config; the flags below override it
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
    /// Search depth in plies
    #[arg(long, global = true)]
    depth: Option<u8>,
    /// Transposition table snapshot, loaded at start and saved at the end
    #[arg(long = "tt", value_name = "FILE", global = true)]
    tt_path: Option<PathBuf>,
    /// Search without a transposition table
    #[arg(long, global = true)]
    no_tt: bool,
    /// Seed for dice rolls and random choices
    #[arg(long, global = true)]
    seed: Option<u64>,
    #[arg(long, global = true)]
    columns: Option<usize>,
    #[arg(long, global = true)]
    rows: Option<usize>,
    #[arg(long, global = true)]
    max_dice: Option<u8>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play a game with random columns for both players
    Random,
    /// Let the engine play both sides
    Selfplay,
    /// Play against the engine from the terminal
    Play,
}

impl SessionOpts {
    fn engine_config(&self) -> Result<EngineConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::load_from_file(path)?,
            None => EngineConfig::default(),
        };
        if let Some(depth) = self.depth {
            config.depth = depth;
        }
        if let Some(path) = &self.tt_path {
            config.tt_path.clone_from(path);
        }
        if self.no_tt {
            config.use_transposition_table = false;
        }
        if let Some(columns) = self.columns {
            config.rules.columns = columns;
        }
        if let Some(rows) = self.rows {
            config.rules.rows = rows;
        }
        if let Some(max_dice) = self.max_dice {
            config.rules.max_dice_value = max_dice;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.opts.engine_config()?;
    tracing::debug!(?config, "engine config");

    match cli.cmd {
        Command::Random => session::run_random_game(&config, cli.opts.seed),
        Command::Selfplay => session::run_selfplay(&config, cli.opts.seed),
        Command::Play => session::play_against_engine(&config, cli.opts.seed),
    }
}
