use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use merge1024_core::*;
use merge1024_protocol::StatsOrder;
use merge1024_store::{FileStatsSink, StatsStore, upload_channel};

use crate::config::Config;
use crate::play::{Engine, Session};

mod config;
mod play;
mod stats;

#[derive(Parser, Debug)]
#[command(version, about = "Slide and merge tiles until you reach the target", long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,

    /// TOML file with default settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play a game in the terminal
    Play(PlayArgs),
    /// Show a player's profile and finished games
    Stats(StatsArgs),
}

#[derive(clap::Args, Debug)]
struct PlayArgs {
    /// Board side length, 3 to 7
    #[arg(short, long)]
    size: Option<BoardSize>,

    /// Tile value that wins the game, a power of two
    #[arg(short, long)]
    target: Option<Tile>,

    /// Force a seed instead of random
    #[arg(long)]
    seed: Option<u64>,

    /// Player to record finished games for
    #[arg(short, long)]
    player: Option<String>,

    /// Where finished games are recorded
    #[arg(long)]
    stats_file: Option<PathBuf>,

    /// Session file to resume from and save to
    #[arg(long)]
    resume: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
struct StatsArgs {
    /// Player whose games to list
    #[arg(short, long)]
    player: Option<String>,

    /// Where finished games are recorded
    #[arg(long)]
    stats_file: Option<PathBuf>,

    /// newest, steps-asc or steps-desc
    #[arg(long, default_value = "newest")]
    sort: StatsOrder,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let config = Config::load_optional(args.config.as_deref())?;
    log::debug!("config: {:?}", config);

    match args.command {
        Command::Play(play_args) => play_game(&config, play_args),
        Command::Stats(stats_args) => show_stats(&config, stats_args),
    }
}

fn play_game(config: &Config, args: PlayArgs) -> anyhow::Result<()> {
    let settings = config.settings(args.size, args.target)?;
    let player = config.player(args.player).map(PlayerId::new);

    let recorder: Box<dyn StatsSink> = if player.is_some() {
        let path = config.stats_file(args.stats_file);
        let recorder = FileStatsSink::open(&path)
            .with_context(|| format!("Could not open stats file {}", path.display()))?;
        Box::new(recorder)
    } else {
        log::info!("No player given, finished games will not be recorded");
        Box::new(NullSink)
    };
    let (sink, uploads) = upload_channel();

    let spawner = match args.seed {
        Some(seed) => RandomTileSpawner::from_seed(seed),
        None => RandomTileSpawner::from_time(),
    };

    let snapshot = match &args.resume {
        Some(path) => play::load_snapshot(path)?,
        None => None,
    };
    let mut engine: Engine = match snapshot {
        Some(snapshot) => {
            let mut engine = MergeEngine::restore(snapshot, spawner, sink)
                .context("Could not resume saved session")?;
            if args.size.is_some() || args.target.is_some() {
                engine.apply_settings(settings);
            }
            engine
        }
        None => MergeEngine::new(settings, spawner, sink),
    };
    engine.set_player(player);

    let mut session = Session::new(engine, uploads, recorder, args.resume.as_deref());
    session.run(io::stdin().lock(), io::stdout().lock())?;
    log::debug!(
        "leaving after {} moves ({:?})",
        session.engine().move_count(),
        session.engine().state()
    );
    Ok(())
}

fn show_stats(config: &Config, args: StatsArgs) -> anyhow::Result<()> {
    let player = config
        .player(args.player)
        .map(PlayerId::new)
        .context("No player given, pass --player or set it in the config file")?;
    let path = config.stats_file(args.stats_file);
    let store = StatsStore::load(&path)
        .with_context(|| format!("Could not read stats file {}", path.display()))?;

    stats::print_stats(&store, &player, args.sort, &mut io::stdout().lock())
}
