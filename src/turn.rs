//! The per-player turn automaton.
//!
//! A [`Turn`] borrows the board, every player and the random source for the
//! duration of one player's turn. Rent and bankruptcy move money to other
//! players, so the acting player is addressed by id rather than borrowed alone.

use rand::Rng;
use tracing::{debug, info};

use crate::board::{Board, TILES};
use crate::dice::Roll;
use crate::error::ActionError;
use crate::player::{Creditor, Player, PlayerId};
use crate::space::{CardKind, Color, Space, SpaceKind, MAX_HOUSES};

pub const PASS_GO_BONUS: i64 = 200;
pub const JAIL_FEE: i64 = 50;
pub const LUXURY_TAX: i64 = 75;
pub const INCOME_TAX_FLAT: i64 = 200;
pub const INCOME_TAX_CUTOFF: i64 = 2000;
pub const RAILROAD_RENT: i64 = 50;
pub const MAX_TURNS_IN_JAIL: u8 = 3;
pub const DOUBLES_TO_JAIL: u8 = 3;

pub struct Turn<'a, R: Rng + ?Sized> {
    board: &'a mut Board,
    players: &'a mut [Player],
    me: PlayerId,
    rng: &'a mut R,
}

impl<'a, R: Rng + ?Sized> Turn<'a, R> {

    pub fn new(board: &'a mut Board, players: &'a mut [Player], me: PlayerId, rng: &'a mut R) -> Self {
        Self {
            board,
            players,
            me,
            rng,
        }
    }

    #[inline]
    fn player(&self) -> &Player {
        &self.players[self.me.0]
    }

    #[inline]
    fn player_mut(&mut self) -> &mut Player {
        &mut self.players[self.me.0]
    }

    /// Plays a whole turn: jail escape or up to three rolls, then asset management.
    pub fn take_turn(&mut self) -> Result<(), ActionError> {
        if self.player().bankrupt {
            return Ok(());
        }
        debug!(player = %self.player().name, cash = self.player().cash, "turn starts");
        if self.player().in_jail {
            self.jail_turn()?;
        } else {
            self.free_turn()?;
        }
        self.manage_assets()
    }

    fn jail_turn(&mut self) -> Result<(), ActionError> {
        self.player_mut().turns_in_jail += 1;
        let roll = self.roll();
        if roll.is_double() {
            debug!(player = %self.player().name, "escapes from jail");
            self.leave_jail(roll.total())?;
        } else if self.player().turns_in_jail >= MAX_TURNS_IN_JAIL {
            debug!(player = %self.player().name, "posts bail");
            self.pay_bank(JAIL_FEE)?;
            if !self.player().bankrupt {
                self.leave_jail(roll.total())?;
            }
        }
        Ok(())
    }

    fn leave_jail(&mut self, spaces: usize) -> Result<(), ActionError> {
        let player = self.player_mut();
        player.in_jail = false;
        player.turns_in_jail = 0;
        self.advance(spaces);
        self.resolve_space(self.player().position)
    }

    fn free_turn(&mut self) -> Result<(), ActionError> {
        let mut doubles = 0;
        loop {
            let roll = self.roll();
            if roll.is_double() {
                doubles += 1;
                if doubles == DOUBLES_TO_JAIL {
                    self.go_to_jail();
                    break;
                }
            }
            self.advance(roll.total());
            self.resolve_space(self.player().position)?;
            let player = self.player();
            if !roll.is_double() || player.in_jail || player.bankrupt {
                break;
            }
        }
        Ok(())
    }

    pub fn roll(&mut self) -> Roll {
        let roll = Roll::random(&mut *self.rng);
        debug!(
            player = %self.player().name,
            total = roll.total(),
            double = roll.is_double(),
            "rolls {}+{}",
            roll.first,
            roll.second
        );
        roll
    }

    /// Moves forward; wrapping past go pays the bonus once.
    pub fn advance(&mut self, spaces: usize) {
        let player = self.player_mut();
        let old = player.position;
        player.position = (old + spaces) % TILES;
        if spaces > 0 && player.position < old {
            player.cash += PASS_GO_BONUS;
            debug!(player = %player.name, "passes go");
        }
    }

    pub fn go_to_jail(&mut self) {
        let jail = self.board.index.jail;
        let player = self.player_mut();
        player.position = jail;
        player.in_jail = true;
        player.turns_in_jail = 0;
        debug!(player = %player.name, "goes to jail");
    }

    pub fn resolve_space(&mut self, position: usize) -> Result<(), ActionError> {
        let space = self.board.space(position);
        debug!(player = %self.player().name, position, kind = %space.kind(), "lands");
        match space.kind() {
            SpaceKind::Property | SpaceKind::Railroad | SpaceKind::Utility => {
                match space.owner() {
                    Some(owner) if owner == self.me => Ok(()),
                    Some(_) => self.pay_rent(position),
                    None => {
                        let price = space.price().unwrap_or(0);
                        let player = self.player();
                        if player.cash - price > player.cash_threshold {
                            self.buy(position)
                        } else {
                            debug!(player = %player.name, space = %space.name(), "declines to buy");
                            Ok(())
                        }
                    }
                }
            }
            SpaceKind::LuxuryTax => self.pay_bank(LUXURY_TAX),
            SpaceKind::IncomeTax => {
                let cash = self.player().cash;
                let amount = if cash >= INCOME_TAX_CUTOFF {
                    INCOME_TAX_FLAT
                } else {
                    (cash * 10 + 50).div_euclid(100)
                };
                self.pay_bank(amount)
            }
            SpaceKind::GoToJail => {
                self.go_to_jail();
                Ok(())
            }
            SpaceKind::Chance => {
                self.draw_card(CardKind::Chance);
                Ok(())
            }
            SpaceKind::CommunityChest => {
                self.draw_card(CardKind::Community);
                Ok(())
            }
            SpaceKind::Go | SpaceKind::Jail | SpaceKind::FreeParking => Ok(()),
        }
    }

    /// Card decks are not modelled; drawing has no effect.
    pub fn draw_card(&mut self, kind: CardKind) {
        debug!(player = %self.player().name, ?kind, "draws a card");
    }

    /// Rent currently due on `position`. Utilities roll fresh dice.
    pub fn rent(&mut self, position: usize) -> i64 {
        let space = self.board.space(position);
        let Some(owner) = space.owner() else {
            return 0;
        };
        if space.is_mortgaged() {
            return 0;
        }
        let owner = &self.players[owner.0];
        match space {
            Space::Property { frame, houses, .. } => {
                let rent = frame.rents[*houses as usize];
                if *houses == 0 && owner.has_monopoly(self.board, frame.color) {
                    rent * 2
                } else {
                    rent
                }
            }
            Space::Railroad { .. } => RAILROAD_RENT * owner.railroads_owned(self.board) as i64,
            Space::Utility { .. } => {
                let multiplier = if owner.utilities_owned(self.board) == 1 { 4 } else { 10 };
                multiplier * Roll::random(&mut *self.rng).total() as i64
            }
            Space::Unownable(_) => 0,
        }
    }

    pub fn pay_rent(&mut self, position: usize) -> Result<(), ActionError> {
        let Some(owner) = self.board.space(position).owner() else {
            return Ok(());
        };
        let rent = self.rent(position);
        self.settle(rent, Creditor::Player(owner))
    }

    pub fn pay_bank(&mut self, amount: i64) -> Result<(), ActionError> {
        self.settle(amount, Creditor::Bank)
    }

    fn settle(&mut self, amount: i64, creditor: Creditor) -> Result<(), ActionError> {
        let cash = self.player().cash;
        if cash - amount < 0 {
            self.cover_debt(amount - cash, creditor)?;
        }
        if self.player().bankrupt {
            return Ok(());
        }
        self.player_mut().cash -= amount;
        match creditor {
            Creditor::Bank => debug!(player = %self.player().name, amount, "pays the bank"),
            Creditor::Player(id) => {
                let payee = &mut self.players[id.0];
                payee.cash += amount;
                debug!(player = %self.players[self.me.0].name, payee = %self.players[id.0].name, amount, "pays rent");
            }
        }
        Ok(())
    }

    /// Raises at least `debt` by liquidating assets, cheapest loss first.
    /// Declares bankruptcy to `creditor` when everything is gone and it was not enough.
    pub fn cover_debt(&mut self, debt: i64, creditor: Creditor) -> Result<(), ActionError> {
        let mut raised = 0;
        let owned = self.player().owned(self.board);

        for &position in &owned {
            let space = self.board.space(position);
            if matches!(space.kind(), SpaceKind::Railroad | SpaceKind::Utility) && !space.is_mortgaged() {
                raised += self.mortgage(position)?;
                if raised > debt {
                    return Ok(());
                }
            }
        }

        // most built first keeps the houses level
        while let Some(position) = self.most_built(&owned) {
            raised += self.sell_house(position)?;
            if raised > debt {
                return Ok(());
            }
        }

        for &position in &owned {
            let space = self.board.space(position);
            if space.kind() == SpaceKind::Property && !space.is_mortgaged() {
                raised += self.mortgage(position)?;
                if raised > debt {
                    return Ok(());
                }
            }
        }

        self.declare_bankruptcy(creditor);
        Ok(())
    }

    fn most_built(&self, owned: &[usize]) -> Option<usize> {
        owned
            .iter()
            .copied()
            .filter(|&position| self.board.space(position).houses() > 0)
            .fold(None, |best: Option<usize>, position| match best {
                Some(b) if self.board.space(b).houses() >= self.board.space(position).houses() => Some(b),
                _ => Some(position),
            })
    }

    /// Terminal. Everything owned goes to the creditor, or back to the bank,
    /// as it is: mortgages stay in place.
    pub fn declare_bankruptcy(&mut self, creditor: Creditor) {
        if self.player().bankrupt {
            return;
        }
        info!(player = %self.player().name, ?creditor, "declares bankruptcy");
        self.player_mut().bankrupt = true;
        let owned = self.player().owned(self.board);
        for position in owned {
            if creditor == Creditor::Bank {
                if let Space::Property { houses, .. } = self.board.space_mut(position) {
                    let returned = std::mem::take(houses) as u32;
                    self.board.houses += returned;
                }
            }
            let new_owner = match creditor {
                Creditor::Bank => None,
                Creditor::Player(id) => Some(id),
            };
            if let Some(holding) = self.board.space_mut(position).holding_mut() {
                holding.owner = new_owner;
            }
        }
        if let Creditor::Player(id) = creditor {
            let cash = std::mem::take(&mut self.player_mut().cash);
            self.players[id.0].cash += cash;
        }
    }

    /// Returns the cash received.
    pub fn mortgage(&mut self, position: usize) -> Result<i64, ActionError> {
        let me = self.me;
        let space = self.board.space_mut(position);
        let value = space.mortgage_value().unwrap_or(0);
        let holding = space
            .holding_mut()
            .filter(|holding| holding.owner == Some(me))
            .ok_or(ActionError::MortgageNotOwned { position })?;
        if holding.mortgaged {
            return Err(ActionError::AlreadyMortgaged { position });
        }
        holding.mortgaged = true;
        self.player_mut().cash += value;
        debug!(player = %self.player().name, position, value, "mortgages");
        Ok(value)
    }

    /// Returns the cash spent.
    pub fn un_mortgage(&mut self, position: usize) -> Result<i64, ActionError> {
        let me = self.me;
        let space = self.board.space_mut(position);
        let cost = space.unmortgage_cost().unwrap_or(0);
        let holding = space
            .holding_mut()
            .filter(|holding| holding.owner == Some(me))
            .ok_or(ActionError::UnmortgageNotOwned { position })?;
        if !holding.mortgaged {
            return Err(ActionError::NotMortgaged { position });
        }
        holding.mortgaged = false;
        self.player_mut().cash -= cost;
        debug!(player = %self.player().name, position, cost, "un-mortgages");
        Ok(cost)
    }

    pub fn buy(&mut self, position: usize) -> Result<(), ActionError> {
        let me = self.me;
        let space = self.board.space_mut(position);
        let price = space.price().ok_or(ActionError::NotForSale { position })?;
        let holding = space.holding_mut().ok_or(ActionError::NotForSale { position })?;
        if holding.owner.is_some() {
            return Err(ActionError::AlreadyOwned { position });
        }
        holding.owner = Some(me);
        self.player_mut().cash -= price;
        debug!(player = %self.player().name, position, price, "buys");
        Ok(())
    }

    /// Returns the house price paid.
    pub fn buy_house(&mut self, position: usize) -> Result<i64, ActionError> {
        let me = self.me;
        if self.board.houses == 0 {
            return Err(ActionError::NoHousesLeft);
        }
        let Space::Property { frame, holding, houses } = self.board.space_mut(position) else {
            return Err(ActionError::NotBuildable { position });
        };
        if holding.owner != Some(me) {
            return Err(ActionError::NotBuildable { position });
        }
        if *houses >= MAX_HOUSES {
            return Err(ActionError::FullyBuilt { position });
        }
        *houses += 1;
        let price = frame.house_price;
        self.board.houses -= 1;
        self.player_mut().cash -= price;
        debug!(player = %self.player().name, position, "buys a house");
        Ok(price)
    }

    /// Returns the cash received: half the house price.
    pub fn sell_house(&mut self, position: usize) -> Result<i64, ActionError> {
        let me = self.me;
        let Space::Property { frame, holding, houses } = self.board.space_mut(position) else {
            return Err(ActionError::NotBuildable { position });
        };
        if holding.owner != Some(me) {
            return Err(ActionError::NotBuildable { position });
        }
        if *houses == 0 {
            return Err(ActionError::NoHouses { position });
        }
        *houses -= 1;
        let value = (frame.house_price + 1) / 2;
        self.board.houses += 1;
        self.player_mut().cash += value;
        debug!(player = %self.player().name, position, "sells a house");
        Ok(value)
    }

    /// Lifts affordable mortgages, then builds evenly on every monopoly.
    pub fn manage_assets(&mut self) -> Result<(), ActionError> {
        let player = self.player();
        if player.bankrupt || player.cash <= player.cash_threshold {
            return Ok(());
        }
        let owned = self.player().owned(self.board);
        for position in owned {
            let space = self.board.space(position);
            if !space.is_mortgaged() {
                continue;
            }
            let cost = space.unmortgage_cost().unwrap_or(0);
            if self.player().cash - cost >= self.player().cash_threshold {
                self.un_mortgage(position)?;
            }
        }
        let monopolies = self.player().monopolies(self.board);
        for color in monopolies {
            self.build_evenly(color)?;
        }
        Ok(())
    }

    fn build_evenly(&mut self, color: Color) -> Result<(), ActionError> {
        let group = self.board.color_group(color);
        while self.board.houses > 0 {
            let Some(min) = group.iter().map(|&position| self.board.space(position).houses()).min() else {
                break;
            };
            if min >= MAX_HOUSES {
                break;
            }
            let mut raised = false;
            for &position in &group {
                let space = self.board.space(position);
                let Space::Property { frame, houses, .. } = space else {
                    continue;
                };
                let affordable = self.player().cash - frame.house_price >= self.player().cash_threshold;
                if *houses <= min && !space.is_mortgaged() && affordable && self.board.houses > 0 {
                    self.buy_house(position)?;
                    raised = true;
                }
            }
            if !raised {
                break;
            }
        }
        Ok(())
    }

}
