//! Repeated games on one reusable table, and the statistics over them.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::ActionError;
use crate::game::Game;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    /// `None` when the round limit ended the game.
    pub winner: Option<String>,
    pub rounds: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub name: String,
    pub wins: usize,
    pub win_rate: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub players: Vec<String>,
    pub records: Vec<GameRecord>,
}

impl SimulationReport {

    pub fn games(&self) -> usize {
        self.records.len()
    }

    pub fn wins(&self, name: &str) -> usize {
        self.records
            .iter()
            .filter(|record| record.winner.as_deref() == Some(name))
            .count()
    }

    pub fn win_rate(&self, name: &str) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        self.wins(name) as f64 / self.records.len() as f64
    }

    /// Games stopped by the round limit.
    pub fn unfinished(&self) -> usize {
        self.records.iter().filter(|record| record.winner.is_none()).count()
    }

    pub fn mean_rounds(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        let total: u64 = self.records.iter().map(|record| record.rounds as u64).sum();
        total as f64 / self.records.len() as f64
    }

    pub fn min_rounds(&self) -> Option<u32> {
        self.records.iter().map(|record| record.rounds).min()
    }

    pub fn max_rounds(&self) -> Option<u32> {
        self.records.iter().map(|record| record.rounds).max()
    }

    pub fn summaries(&self) -> Vec<PlayerSummary> {
        self.players
            .iter()
            .map(|name| PlayerSummary {
                name: name.clone(),
                wins: self.wins(name),
                win_rate: self.win_rate(name),
            })
            .collect()
    }

}

pub struct Simulation<R> {
    pub game: Game<R>,
}

impl<R: Rng> Simulation<R> {

    pub fn new(game: Game<R>) -> Self {
        Self { game }
    }

    #[instrument(skip(self))]
    pub fn run(&mut self, games: usize) -> Result<SimulationReport, ActionError> {
        let mut report = SimulationReport {
            players: self.game.players.iter().map(|player| player.name.clone()).collect(),
            records: Vec::with_capacity(games),
        };
        for n in 0..games {
            let winner = self.game.play()?;
            let record = GameRecord {
                winner: winner.map(|id| self.game.player(id).name.clone()),
                rounds: self.game.rounds(),
            };
            debug!(game = n, winner = ?record.winner, rounds = record.rounds, "game finished");
            report.records.push(record);
        }
        info!(games, mean_rounds = report.mean_rounds(), "simulation finished");
        Ok(report)
    }

}
