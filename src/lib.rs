//! Simulator for the classic property-trading board game.
//!
//! A [`Game`] drives rounds of [`Turn`]s over a shared [`Board`] until a
//! single solvent player is left; [`Simulation`] repeats that to collect
//! win rates and game lengths.

#![forbid(unsafe_code)]

pub mod board;
pub mod config;
pub mod dice;
pub mod error;
pub mod game;
pub mod player;
pub mod simulation;
pub mod space;
pub mod turn;

pub use board::{load_board, Board, BoardError, BoardIndex, SpaceRecord, HOUSE_POOL, TILES};
pub use config::{ConfigError, PlayerConfig, SimConfig};
pub use dice::Roll;
pub use error::ActionError;
pub use game::{Game, GameRules, Trade};
pub use player::{Creditor, Player, PlayerId, PlayerState};
pub use simulation::{GameRecord, PlayerSummary, Simulation, SimulationReport};
pub use space::{CardKind, Color, Holding, PropertyFrame, Space, SpaceKind, MAX_HOUSES};
pub use turn::Turn;
