use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};

use crate::player::PlayerId;

pub const MAX_HOUSES: u8 = 5; // the 5th level is a hotel
pub const RAILROAD_PRICE: i64 = 200;
pub const UTILITY_PRICE: i64 = 150;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, EnumIter, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Color {
    Brown,
    LightBlue,
    Pink,
    Orange,
    Red,
    Yellow,
    Green,
    Blue,
}

impl Color {

    pub fn all() -> impl Iterator<Item = Color> {
        Color::iter()
    }

}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SpaceKind {
    Go,
    Property,
    Railroad,
    Utility,
    Chance,
    CommunityChest,
    IncomeTax,
    LuxuryTax,
    Jail,
    GoToJail,
    FreeParking,
}

impl SpaceKind {

    #[inline]
    pub fn is_ownable(self) -> bool {
        matches!(self, SpaceKind::Property | SpaceKind::Railroad | SpaceKind::Utility)
    }

}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    Chance,
    Community,
}

/// The immutable part of a colored property, as read from the board data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyFrame {
    pub name: String,
    pub color: Color,
    pub price: i64,
    pub rents: [i64; 1 + MAX_HOUSES as usize],
    pub house_price: i64,
}

/// Ownership state shared by every ownable space.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Holding {
    pub owner: Option<PlayerId>,
    pub mortgaged: bool,
}

impl Holding {

    pub fn reset(&mut self) {
        self.owner = None;
        self.mortgaged = false;
    }

}

#[derive(Clone, Debug, PartialEq)]
pub enum Space {
    /// Any cell nobody can own. Never carries `Property`, `Railroad` or `Utility`.
    Unownable(SpaceKind),
    Property {
        frame: PropertyFrame,
        holding: Holding,
        houses: u8,
    },
    Railroad {
        name: String,
        price: i64,
        holding: Holding,
    },
    Utility {
        name: String,
        price: i64,
        holding: Holding,
    },
}

impl Space {

    pub fn property(frame: PropertyFrame) -> Self {
        Space::Property {
            frame,
            holding: Holding::default(),
            houses: 0,
        }
    }

    pub fn railroad(name: impl Into<String>, price: i64) -> Self {
        Space::Railroad {
            name: name.into(),
            price,
            holding: Holding::default(),
        }
    }

    pub fn utility(name: impl Into<String>, price: i64) -> Self {
        Space::Utility {
            name: name.into(),
            price,
            holding: Holding::default(),
        }
    }

    pub fn kind(&self) -> SpaceKind {
        match self {
            Space::Unownable(kind) => *kind,
            Space::Property { .. } => SpaceKind::Property,
            Space::Railroad { .. } => SpaceKind::Railroad,
            Space::Utility { .. } => SpaceKind::Utility,
        }
    }

    pub fn name(&self) -> String {
        match self {
            Space::Unownable(kind) => kind.to_string(),
            Space::Property { frame, .. } => frame.name.clone(),
            Space::Railroad { name, .. } | Space::Utility { name, .. } => name.clone(),
        }
    }

    pub fn color(&self) -> Option<Color> {
        match self {
            Space::Property { frame, .. } => Some(frame.color),
            _ => None,
        }
    }

    pub fn price(&self) -> Option<i64> {
        match self {
            Space::Unownable(_) => None,
            Space::Property { frame, .. } => Some(frame.price),
            Space::Railroad { price, .. } | Space::Utility { price, .. } => Some(*price),
        }
    }

    pub fn holding(&self) -> Option<&Holding> {
        match self {
            Space::Unownable(_) => None,
            Space::Property { holding, .. }
            | Space::Railroad { holding, .. }
            | Space::Utility { holding, .. } => Some(holding),
        }
    }

    pub fn holding_mut(&mut self) -> Option<&mut Holding> {
        match self {
            Space::Unownable(_) => None,
            Space::Property { holding, .. }
            | Space::Railroad { holding, .. }
            | Space::Utility { holding, .. } => Some(holding),
        }
    }

    #[inline]
    pub fn owner(&self) -> Option<PlayerId> {
        self.holding().and_then(|holding| holding.owner)
    }

    #[inline]
    pub fn is_owned_by(&self, player: PlayerId) -> bool {
        self.owner() == Some(player)
    }

    #[inline]
    pub fn is_mortgaged(&self) -> bool {
        self.holding().map_or(false, |holding| holding.mortgaged)
    }

    pub fn houses(&self) -> u8 {
        match self {
            Space::Property { houses, .. } => *houses,
            _ => 0,
        }
    }

    /// Cash paid out when the space is mortgaged: half the price, rounded.
    pub fn mortgage_value(&self) -> Option<i64> {
        self.price().map(|price| (price + 1) / 2)
    }

    /// Cash needed to lift the mortgage: 110% of half the price, rounded.
    pub fn unmortgage_cost(&self) -> Option<i64> {
        self.price().map(|price| (price * 11 + 10) / 20)
    }

    /// Rent read from the schedule for the current number of houses.
    pub fn scheduled_rent(&self) -> Option<i64> {
        match self {
            Space::Property { frame, houses, .. } => Some(frame.rents[*houses as usize]),
            _ => None,
        }
    }

    /// Clears everything a game may have changed. Houses are not returned to
    /// the pool here, `Board::reset` refills it.
    pub fn reset(&mut self) {
        match self {
            Space::Unownable(_) => {}
            Space::Property { holding, houses, .. } => {
                holding.reset();
                *houses = 0;
            }
            Space::Railroad { holding, .. } | Space::Utility { holding, .. } => holding.reset(),
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn mediterranean() -> Space {
        Space::property(PropertyFrame {
            name: "Mediterranean Avenue".to_string(),
            color: Color::Brown,
            price: 60,
            rents: [2, 10, 30, 90, 160, 250],
            house_price: 50,
        })
    }

    #[test]
    fn unownable_spaces_expose_no_holding() {
        let jail = Space::Unownable(SpaceKind::Jail);
        assert_eq!(jail.kind(), SpaceKind::Jail);
        assert!(jail.holding().is_none());
        assert!(jail.owner().is_none());
        assert!(jail.price().is_none());
        assert!(!jail.kind().is_ownable());
    }

    #[test]
    fn scheduled_rent_follows_houses() {
        let mut space = mediterranean();
        assert_eq!(space.scheduled_rent(), Some(2));
        if let Space::Property { houses, .. } = &mut space {
            *houses = 5;
        }
        assert_eq!(space.scheduled_rent(), Some(250));
    }

    #[test]
    fn mortgage_amounts_round_half_up() {
        let space = mediterranean();
        assert_eq!(space.mortgage_value(), Some(30));
        assert_eq!(space.unmortgage_cost(), Some(33));
        let odd = Space::railroad("Odd Line", 75);
        assert_eq!(odd.mortgage_value(), Some(38));
        // 1.1 * 37.5 = 41.25
        assert_eq!(odd.unmortgage_cost(), Some(41));
    }

    #[test]
    fn reset_clears_state() {
        let mut space = mediterranean();
        if let Space::Property { holding, houses, .. } = &mut space {
            holding.owner = Some(PlayerId(2));
            holding.mortgaged = true;
            *houses = 3;
        }
        space.reset();
        assert_eq!(space, mediterranean());
    }

    #[test]
    fn colors_iterate_in_board_order() {
        let colors: Vec<_> = Color::all().collect();
        assert_eq!(colors.len(), 8);
        assert_eq!(colors[0], Color::Brown);
        assert_eq!(colors[7], Color::Blue);
        assert_eq!(Color::LightBlue.to_string(), "light_blue");
    }
}
