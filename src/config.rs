//! Simulation configuration, read from TOML.

use std::path::{Path, PathBuf};

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::board::{self, Board, BoardError};
use crate::game::GameRules;
use crate::player::{Player, DEFAULT_CASH_THRESHOLD};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub name: String,
    /// Falls back to the default threshold when omitted.
    #[serde(default)]
    pub cash_threshold: Option<i64>,
}

impl PlayerConfig {

    pub fn new(name: impl Into<String>, cash_threshold: Option<i64>) -> Self {
        Self {
            name: name.into(),
            cash_threshold,
        }
    }

    pub fn build(&self) -> Player {
        Player::new(self.name.clone())
            .with_cash_threshold(self.cash_threshold.unwrap_or(DEFAULT_CASH_THRESHOLD))
    }

}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default = "default_players")]
    pub players: Vec<PlayerConfig>,
    #[serde(default = "default_games")]
    pub games: usize,
    /// Unseeded runs draw from the OS entropy source.
    #[serde(default)]
    pub seed: Option<u64>,
    /// JSON board file; the standard board when omitted.
    #[serde(default)]
    pub board: Option<PathBuf>,
    #[serde(default)]
    pub round_limit: Option<u32>,
    #[serde(default = "default_stall_trade_interval")]
    pub stall_trade_interval: u32,
    #[serde(default = "default_periodic_trade_interval")]
    pub periodic_trade_interval: u32,
}

fn default_players() -> Vec<PlayerConfig> {
    vec![
        PlayerConfig::new("Josh", Some(50)),
        PlayerConfig::new("Austin", None),
        PlayerConfig::new("Zander", None),
        PlayerConfig::new("Scott", Some(500)),
    ]
}

fn default_games() -> usize {
    20
}

fn default_stall_trade_interval() -> u32 {
    GameRules::default().stall_trade_interval
}

fn default_periodic_trade_interval() -> u32 {
    GameRules::default().periodic_trade_interval
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            players: default_players(),
            games: default_games(),
            seed: None,
            board: None,
            round_limit: None,
            stall_trade_interval: default_stall_trade_interval(),
            periodic_trade_interval: default_periodic_trade_interval(),
        }
    }
}

impl SimConfig {

    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        info!(players = config.players.len(), games = config.games, "Config loaded successfully");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.players.len() < 2 {
            return Err(ConfigError::new(format!(
                "a game needs at least 2 players, found {}",
                self.players.len()
            )));
        }
        // the threshold is a cash floor
        if let Some(player) = self
            .players
            .iter()
            .find(|player| player.cash_threshold.is_some_and(|threshold| threshold < 0))
        {
            return Err(ConfigError::new(format!(
                "cash_threshold of {} must not be negative",
                player.name
            )));
        }
        Ok(())
    }

    pub fn build_players(&self) -> Vec<Player> {
        self.players.iter().map(PlayerConfig::build).collect()
    }

    pub fn rules(&self) -> GameRules {
        GameRules {
            stall_trade_interval: self.stall_trade_interval,
            periodic_trade_interval: self.periodic_trade_interval,
            round_limit: self.round_limit,
        }
    }

    pub fn load_board(&self) -> Result<Board, BoardError> {
        match &self.board {
            Some(path) => board::load_board(path),
            None => Ok(Board::standard()),
        }
    }

}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    pub message: String,
    pub line: u32,
    pub file: &'static str,
}

impl ConfigError {

    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_mirror_the_four_player_table() {
        let config = SimConfig::default();
        let players = config.build_players();
        let thresholds: Vec<i64> = players.iter().map(|p| p.cash_threshold).collect();
        assert_eq!(thresholds, vec![50, 200, 200, 500]);
        assert_eq!(config.rules(), GameRules::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: SimConfig = toml::from_str(
            r#"
games = 5
seed = 9

[[players]]
name = "A"

[[players]]
name = "B"
cash_threshold = 0
"#,
        )
        .unwrap();
        assert_eq!(config.games, 5);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.players[0].build().cash_threshold, DEFAULT_CASH_THRESHOLD);
        assert_eq!(config.players[1].build().cash_threshold, 0);
        assert_eq!(config.stall_trade_interval, 10);
        assert_eq!(config.periodic_trade_interval, 50);
    }

    #[test]
    fn negative_threshold_is_rejected() {
        let config = SimConfig {
            players: vec![PlayerConfig::new("Reckless", Some(-1000)), PlayerConfig::new("b", None)],
            ..SimConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.message.contains("Reckless"), "{err}");

        let config = SimConfig {
            players: vec![PlayerConfig::new("a", Some(0)), PlayerConfig::new("b", None)],
            ..SimConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn lone_player_is_rejected() {
        let config = SimConfig {
            players: vec![PlayerConfig::new("solo", None)],
            ..SimConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
