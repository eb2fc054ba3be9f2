mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use monopoly_sim::{Game, SimConfig, Simulation};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => SimConfig::from_file(path)?,
        None => SimConfig::default(),
    };

    match cli.command {
        Command::Simulate { games, seed, json } => simulate(config, games, seed, json),
        Command::Play { seed } => play(config, seed),
        Command::Board => {
            let board = config.load_board()?;
            println!("{}", serde_json::to_string_pretty(&board.records())?);
            Ok(())
        }
    }
}

fn new_game(config: &SimConfig, seed: Option<u64>) -> Result<Game<StdRng>> {
    let rng = match seed.or(config.seed) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let board = config.load_board()?;
    debug!(players = config.players.len(), "table ready");
    Ok(Game::new(board, config.build_players(), rng).with_rules(config.rules()))
}

fn simulate(config: SimConfig, games: Option<usize>, seed: Option<u64>, json: bool) -> Result<()> {
    let games = games.unwrap_or(config.games);
    info!(games, "Starting simulation");
    let mut simulation = Simulation::new(new_game(&config, seed)?);
    let report = simulation.run(games)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    for summary in report.summaries() {
        println!(
            "{} won {} out of {} games ({:.1}%).",
            summary.name,
            summary.wins,
            report.games(),
            summary.win_rate * 100.0
        );
    }
    if report.unfinished() > 0 {
        println!("{} games hit the round limit.", report.unfinished());
    }
    println!(
        "Average length of game is {:.0} rounds (shortest {}, longest {}).",
        report.mean_rounds(),
        report.min_rounds().unwrap_or(0),
        report.max_rounds().unwrap_or(0)
    );
    Ok(())
}

fn play(config: SimConfig, seed: Option<u64>) -> Result<()> {
    let mut game = new_game(&config, seed)?;
    let winner = game.play()?;
    for player in &game.players {
        let status = if player.bankrupt { " (bankrupt)" } else { "" };
        println!(
            "{}{} -- Cash: ${}, properties: {}, houses: {}, net worth: ${}",
            player.name,
            status,
            player.cash,
            player.owned(&game.board).len(),
            player.houses_owned(&game.board),
            player.net_worth(&game.board)
        );
    }
    match winner {
        Some(id) => println!("Winner is {} after {} rounds!", game.player(id).name, game.rounds()),
        None => println!("No winner after {} rounds.", game.rounds()),
    }
    Ok(())
}
