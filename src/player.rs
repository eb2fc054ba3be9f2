use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::space::{Color, Space, SpaceKind};

pub const INITIAL_CURRENCY: i64 = 1500;
pub const DEFAULT_CASH_THRESHOLD: i64 = 200;

/// Index of a player in the game's player list.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[display("player #{_0}")]
pub struct PlayerId(pub usize);

/// Who receives the money when a player cannot pay.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Creditor {
    Bank,
    Player(PlayerId),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlayerState {
    Active,
    InJail,
    Bankrupt,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub name: String,
    pub id: PlayerId,
    pub cash: i64,
    pub bankrupt: bool,
    /// Cash the player refuses to spend below.
    pub cash_threshold: i64,
    pub in_jail: bool,
    pub turns_in_jail: u8,
    pub position: usize,
}

impl Player {

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: PlayerId(0),
            cash: INITIAL_CURRENCY,
            bankrupt: false,
            cash_threshold: DEFAULT_CASH_THRESHOLD,
            in_jail: false,
            turns_in_jail: 0,
            position: 0,
        }
    }

    pub fn with_cash_threshold(mut self, cash_threshold: i64) -> Self {
        self.cash_threshold = cash_threshold;
        self
    }

    /// Back to the beginning-of-game status. The threshold is a strategy, it stays.
    pub fn reset(&mut self) {
        self.cash = INITIAL_CURRENCY;
        self.bankrupt = false;
        self.in_jail = false;
        self.turns_in_jail = 0;
        self.position = 0;
    }

    pub fn state(&self) -> PlayerState {
        if self.bankrupt {
            PlayerState::Bankrupt
        } else if self.in_jail {
            PlayerState::InJail
        } else {
            PlayerState::Active
        }
    }

    /// Positions of every ownable cell this player holds, in board order.
    pub fn owned(&self, board: &Board) -> Vec<usize> {
        board
            .tiles
            .iter()
            .enumerate()
            .filter(|(_, tile)| tile.is_owned_by(self.id))
            .map(|(position, _)| position)
            .collect()
    }

    fn count_owned(&self, board: &Board, kind: SpaceKind) -> usize {
        board
            .tiles
            .iter()
            .filter(|tile| tile.kind() == kind && tile.is_owned_by(self.id))
            .count()
    }

    pub fn railroads_owned(&self, board: &Board) -> usize {
        self.count_owned(board, SpaceKind::Railroad)
    }

    pub fn utilities_owned(&self, board: &Board) -> usize {
        self.count_owned(board, SpaceKind::Utility)
    }

    pub fn houses_owned(&self, board: &Board) -> u32 {
        board
            .tiles
            .iter()
            .filter(|tile| tile.is_owned_by(self.id))
            .map(|tile| tile.houses() as u32)
            .sum()
    }

    /// (held, needed) for one color group.
    fn color_count(&self, board: &Board, color: Color) -> (usize, usize) {
        let group = board.color_group(color);
        let held = group
            .iter()
            .filter(|&&position| board.space(position).is_owned_by(self.id))
            .count();
        (held, group.len())
    }

    pub fn has_monopoly(&self, board: &Board, color: Color) -> bool {
        let (held, needed) = self.color_count(board, color);
        needed > 0 && held == needed
    }

    pub fn monopolies(&self, board: &Board) -> Vec<Color> {
        Color::all()
            .filter(|&color| self.has_monopoly(board, color))
            .collect()
    }

    /// Colors where a single property is missing for a monopoly.
    pub fn almost_monopolies(&self, board: &Board) -> Vec<Color> {
        Color::all()
            .filter(|&color| {
                let (held, needed) = self.color_count(board, color);
                held > 0 && held + 1 == needed
            })
            .collect()
    }

    /// The properties that would complete one of this player's almost-monopolies.
    pub fn wants(&self, board: &Board) -> Vec<usize> {
        self.almost_monopolies(board)
            .into_iter()
            .flat_map(|color| board.color_group(color))
            .filter(|&position| !board.space(position).is_owned_by(self.id))
            .collect()
    }

    pub fn net_worth(&self, board: &Board) -> i64 {
        let holdings: i64 = self
            .owned(board)
            .into_iter()
            .map(|position| match board.space(position) {
                Space::Property { frame, houses, holding } => {
                    let deed = if holding.mortgaged { 0 } else { frame.price };
                    deed + frame.house_price * *houses as i64
                }
                other if other.is_mortgaged() => 0,
                other => other.price().unwrap_or(0),
            })
            .sum();
        self.cash + holdings
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn give(board: &mut Board, position: usize, player: PlayerId) {
        board.space_mut(position).holding_mut().unwrap().owner = Some(player);
    }

    #[test]
    fn owned_is_derived_from_the_board() {
        let mut board = Board::standard();
        let player = Player::new("Josh");
        give(&mut board, 5, player.id);
        give(&mut board, 1, player.id);
        give(&mut board, 3, PlayerId(1));
        assert_eq!(player.owned(&board), vec![1, 5]);
        assert_eq!(player.railroads_owned(&board), 1);
        assert_eq!(player.utilities_owned(&board), 0);
    }

    #[test]
    fn small_groups_need_two() {
        let mut board = Board::standard();
        let player = Player::new("Austin");
        give(&mut board, 37, player.id);
        assert_eq!(player.almost_monopolies(&board), vec![Color::Blue]);
        assert_eq!(player.wants(&board), vec![39]);
        give(&mut board, 39, player.id);
        assert!(player.has_monopoly(&board, Color::Blue));
        assert!(player.almost_monopolies(&board).is_empty());
        assert!(player.wants(&board).is_empty());
    }

    #[test]
    fn large_groups_need_three() {
        let mut board = Board::standard();
        let player = Player::new("Zander");
        give(&mut board, 21, player.id);
        assert!(player.almost_monopolies(&board).is_empty());
        give(&mut board, 23, player.id);
        assert_eq!(player.almost_monopolies(&board), vec![Color::Red]);
        assert_eq!(player.wants(&board), vec![24]);
        give(&mut board, 24, player.id);
        assert_eq!(player.monopolies(&board), vec![Color::Red]);
    }

    #[test]
    fn houses_and_worth_count_only_own_cells() {
        let mut board = Board::standard();
        let player = Player::new("Josh");
        give(&mut board, 1, player.id);
        give(&mut board, 3, player.id);
        give(&mut board, 5, player.id);
        give(&mut board, 6, PlayerId(1));
        for (position, built) in [(1, 2), (3, 1), (6, 4)] {
            if let Space::Property { houses, .. } = board.space_mut(position) {
                *houses = built;
            }
        }
        board.space_mut(5).holding_mut().unwrap().mortgaged = true;
        assert_eq!(player.houses_owned(&board), 3);
        // 60 + 60 for the deeds, 3 houses at 50, nothing for the mortgaged railroad
        assert_eq!(player.net_worth(&board), 1500 + 120 + 150);
    }

    #[test]
    fn reset_keeps_threshold() {
        let mut player = Player::new("Scott").with_cash_threshold(500);
        player.cash = 3;
        player.bankrupt = true;
        player.in_jail = true;
        player.turns_in_jail = 2;
        player.position = 10;
        player.reset();
        assert_eq!(player.cash, INITIAL_CURRENCY);
        assert_eq!(player.state(), PlayerState::Active);
        assert_eq!(player.turns_in_jail, 0);
        assert_eq!(player.position, 0);
        assert_eq!(player.cash_threshold, 500);
    }
}
