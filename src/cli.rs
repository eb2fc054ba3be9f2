//! Command-line interface for monopoly-sim.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Monte-Carlo simulator for the classic property-trading board game
#[derive(Parser, Debug)]
#[command(name = "monopoly-sim")]
#[command(about = "Simulates many games and reports win rates and game lengths", long_about = None)]
#[command(version)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log every turn event
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play many games and print the statistics
    Simulate {
        /// Number of games, overrides the config
        #[arg(short, long)]
        games: Option<usize>,

        /// Seed for reproducible runs, overrides the config
        #[arg(short, long)]
        seed: Option<u64>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Play a single game and print the final standings
    Play {
        /// Seed for a reproducible game, overrides the config
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Print the board in the JSON board-file format
    Board,
}
