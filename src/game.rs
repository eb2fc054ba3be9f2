use rand::seq::{index, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::board::Board;
use crate::error::ActionError;
use crate::player::{Player, PlayerId};
use crate::turn::Turn;

/// Knobs of the anti-deadlock fallback. Tunable, not a proof of termination.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRules {
    /// Random trade after this many consecutive rounds without any monopoly.
    pub stall_trade_interval: u32,
    /// Random trade every this many rounds regardless.
    pub periodic_trade_interval: u32,
    /// Give up on a game after this many rounds.
    pub round_limit: Option<u32>,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            stall_trade_interval: 10,
            periodic_trade_interval: 50,
            round_limit: None,
        }
    }
}

/// Two ownable cells that changed hands.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Trade {
    pub buyer: PlayerId,
    pub seller: PlayerId,
    /// Moved from seller to buyer.
    pub bought: usize,
    /// Moved from buyer to seller.
    pub sold: usize,
}

pub struct Game<R> {
    pub board: Board,
    pub players: Vec<Player>,
    pub rules: GameRules,
    rng: R,
    rounds: u32,
    rounds_without_monopoly: u32,
}

impl<R: Rng> Game<R> {

    /// Player ids are reassigned to match their index.
    pub fn new(board: Board, mut players: Vec<Player>, rng: R) -> Self {
        for (idx, player) in players.iter_mut().enumerate() {
            player.id = PlayerId(idx);
        }
        Self {
            board,
            players,
            rules: GameRules::default(),
            rng,
            rounds: 0,
            rounds_without_monopoly: 0,
        }
    }

    pub fn with_rules(mut self, rules: GameRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn rounds_without_monopoly(&self) -> u32 {
        self.rounds_without_monopoly
    }

    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id.0]
    }

    pub fn reset(&mut self) {
        self.board.reset();
        for player in self.players.iter_mut() {
            player.reset();
        }
        self.rounds = 0;
        self.rounds_without_monopoly = 0;
    }

    /// Starts a turn for `id` over the shared state.
    pub fn turn(&mut self, id: PlayerId) -> Turn<'_, R> {
        Turn::new(&mut self.board, &mut self.players, id, &mut self.rng)
    }

    pub fn take_turn(&mut self, id: PlayerId) -> Result<(), ActionError> {
        self.turn(id).take_turn()
    }

    pub fn player_count(&self) -> usize {
        self.players.iter().filter(|player| !player.bankrupt).count()
    }

    pub fn game_over(&self) -> bool {
        self.player_count() == 1
    }

    pub fn active_players(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|player| !player.bankrupt)
            .map(|player| player.id)
            .collect()
    }

    pub fn winner(&self) -> Option<&Player> {
        if !self.game_over() {
            return None;
        }
        self.players.iter().find(|player| !player.bankrupt)
    }

    pub fn has_monopolies(&self) -> bool {
        self.players
            .iter()
            .any(|player| !player.monopolies(&self.board).is_empty())
    }

    #[instrument(skip(self), fields(round = self.rounds + 1))]
    pub fn play_round(&mut self) -> Result<(), ActionError> {
        self.rounds += 1;
        for idx in 0..self.players.len() {
            let id = PlayerId(idx);
            if self.players[idx].bankrupt {
                continue;
            }
            self.take_turn(id)?;
            self.find_trades(id);
            if self.game_over() {
                break;
            }
        }
        Ok(())
    }

    /// Swaps one wanted property each way between `buyer` and the first
    /// player holding something the buyer wants and wanting something back.
    pub fn find_trades(&mut self, buyer: PlayerId) -> Option<Trade> {
        let buyer_player = &self.players[buyer.0];
        if buyer_player.bankrupt {
            return None;
        }
        let buyer_wants = buyer_player.wants(&self.board);
        if buyer_wants.is_empty() {
            return None;
        }
        let buyer_owned = buyer_player.owned(&self.board);

        let mut found = None;
        for seller_player in self.players.iter().filter(|p| p.id != buyer && !p.bankrupt) {
            let seller = seller_player.id;
            let seller_owned = seller_player.owned(&self.board);
            let bought: Vec<usize> = buyer_wants
                .iter()
                .copied()
                .filter(|position| seller_owned.contains(position))
                .collect();
            let sold: Vec<usize> = seller_player
                .wants(&self.board)
                .into_iter()
                .filter(|position| buyer_owned.contains(position))
                .collect();
            if bought.is_empty() || sold.is_empty() {
                continue;
            }
            let pair = bought.iter().find_map(|&x| {
                let x_color = self.board.space(x).color();
                sold.iter()
                    .find(|&&y| self.board.space(y).color() != x_color)
                    .map(|&y| (x, y))
            });
            if let Some((bought, sold)) = pair {
                found = Some(Trade {
                    buyer,
                    seller,
                    bought,
                    sold,
                });
                break;
            }
        }
        let trade = found?;
        self.swap(trade);
        Some(trade)
    }

    /// Swaps a random cell between two random active players.
    pub fn random_trade(&mut self) -> Option<Trade> {
        let active = self.active_players();
        if active.len() < 2 {
            return None;
        }
        let picked = index::sample(&mut self.rng, active.len(), 2);
        let (buyer, seller) = (active[picked.index(0)], active[picked.index(1)]);
        let sold = *self.players[buyer.0].owned(&self.board).choose(&mut self.rng)?;
        let bought = *self.players[seller.0].owned(&self.board).choose(&mut self.rng)?;
        let trade = Trade {
            buyer,
            seller,
            bought,
            sold,
        };
        self.swap(trade);
        Some(trade)
    }

    fn swap(&mut self, trade: Trade) {
        if let Some(holding) = self.board.space_mut(trade.bought).holding_mut() {
            holding.owner = Some(trade.buyer);
        }
        if let Some(holding) = self.board.space_mut(trade.sold).holding_mut() {
            holding.owner = Some(trade.seller);
        }
        debug!(
            buyer = %self.players[trade.buyer.0].name,
            seller = %self.players[trade.seller.0].name,
            bought = %self.board.space(trade.bought).name(),
            sold = %self.board.space(trade.sold).name(),
            "trade"
        );
    }

    /// Plays a fresh game to the end. Returns the winner, or `None` when the
    /// round limit stopped the game first.
    #[instrument(skip(self))]
    pub fn play(&mut self) -> Result<Option<PlayerId>, ActionError> {
        self.reset();
        while self.player_count() > 1 {
            if let Some(limit) = self.rules.round_limit {
                if self.rounds >= limit {
                    warn!(rounds = self.rounds, "round limit reached");
                    return Ok(None);
                }
            }

            let stall = self.rules.stall_trade_interval;
            if stall > 0 && self.rounds_without_monopoly > 0 && self.rounds_without_monopoly % stall == 0 {
                self.random_trade();
            }
            let period = self.rules.periodic_trade_interval;
            if period > 0 && self.rounds > 0 && self.rounds % period == 0 {
                self.random_trade();
            }

            self.play_round()?;
            if self.has_monopolies() {
                self.rounds_without_monopoly = 0;
            } else {
                self.rounds_without_monopoly += 1;
            }
        }
        let winner = self.winner().map(|player| player.id);
        if let Some(id) = winner {
            info!(winner = %self.players[id.0].name, rounds = self.rounds, "game over");
        }
        Ok(winner)
    }

}
