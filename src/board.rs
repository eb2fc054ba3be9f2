use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::space::{Color, PropertyFrame, Space, SpaceKind, RAILROAD_PRICE, UTILITY_PRICE};

pub const TILES: usize = 40;
pub const HOUSE_POOL: u32 = 44;

#[derive(Clone, Debug)]
pub struct Board {
    pub tiles: [Space; TILES],
    pub index: BoardIndex,
    /// Houses still available to build.
    pub houses: u32,
}

impl Board {

    pub fn new(tiles: [Space; TILES]) -> Result<Self, BoardError> {
        let index = BoardIndex::new(&tiles)?;
        Ok(Self {
            tiles,
            index,
            houses: HOUSE_POOL,
        })
    }

    pub fn from_records(records: Vec<SpaceRecord>) -> Result<Self, BoardError> {
        let len = records.len();
        let tiles: Vec<Space> = records.into_iter().map(Space::from).collect();
        let tiles: [Space; TILES] = tiles
            .try_into()
            .map_err(|_| BoardError::new(format!("expected {TILES} spaces, found {len}")))?;
        Self::new(tiles)
    }

    /// The classic layout with the classic prices and rents.
    pub fn standard() -> Self {
        Self::from_records(standard_records()).expect("the standard layout is valid")
    }

    pub fn records(&self) -> Vec<SpaceRecord> {
        self.tiles.iter().map(SpaceRecord::from).collect()
    }

    #[inline]
    pub fn space(&self, position: usize) -> &Space {
        &self.tiles[position]
    }

    #[inline]
    pub fn space_mut(&mut self, position: usize) -> &mut Space {
        &mut self.tiles[position]
    }

    pub fn reset(&mut self) {
        self.houses = HOUSE_POOL;
        for tile in self.tiles.iter_mut() {
            tile.reset();
        }
    }

    /// Positions of the colored properties, grouped by color.
    pub fn color_groups(&self) -> BTreeMap<Color, Vec<usize>> {
        let mut groups: BTreeMap<Color, Vec<usize>> = BTreeMap::new();
        for (position, tile) in self.tiles.iter().enumerate() {
            if let Some(color) = tile.color() {
                groups.entry(color).or_default().push(position);
            }
        }
        groups
    }

    pub fn color_group(&self, color: Color) -> Vec<usize> {
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, tile)| tile.color() == Some(color))
            .map(|(position, _)| position)
            .collect()
    }

    pub fn houses_built(&self) -> u32 {
        self.tiles.iter().map(|tile| tile.houses() as u32).sum()
    }

}

/// Positions of the cells the turn logic needs to find.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BoardIndex {
    pub jail: usize,
    pub go: usize,
}

impl BoardIndex {

    pub fn new(board: &[Space; TILES]) -> Result<Self, BoardError> {
        let mut jail_idx = None;
        let mut go_idx = None;
        for (idx, tile) in board.iter().enumerate() {
            match tile.kind() {
                SpaceKind::Jail => {
                    if jail_idx.replace(idx).is_some() {
                        return Err(BoardError::new("there may only be 1 jail"));
                    }
                }
                SpaceKind::Go => {
                    if go_idx.replace(idx).is_some() {
                        return Err(BoardError::new("there may only be 1 go"));
                    }
                }
                kind if kind.is_ownable() && tile.holding().is_none() => {
                    return Err(BoardError::new(format!("space {idx} is an unownable {kind}")));
                }
                _ => {}
            }
        }
        Ok(Self {
            jail: jail_idx.ok_or_else(|| BoardError::new("no jail was found on the board"))?,
            go: go_idx.ok_or_else(|| BoardError::new("no go was found on the board"))?,
        })
    }

}

/// One board cell as stored in a board file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpaceRecord {
    Go,
    Property(PropertyFrame),
    Railroad {
        name: String,
        #[serde(default = "default_railroad_price")]
        price: i64,
    },
    Utility {
        name: String,
        #[serde(default = "default_utility_price")]
        price: i64,
    },
    Chance,
    CommunityChest,
    IncomeTax,
    LuxuryTax,
    Jail,
    GoToJail,
    FreeParking,
}

fn default_railroad_price() -> i64 {
    RAILROAD_PRICE
}

fn default_utility_price() -> i64 {
    UTILITY_PRICE
}

impl From<SpaceRecord> for Space {
    fn from(record: SpaceRecord) -> Self {
        match record {
            SpaceRecord::Property(frame) => Space::property(frame),
            SpaceRecord::Railroad { name, price } => Space::railroad(name, price),
            SpaceRecord::Utility { name, price } => Space::utility(name, price),
            SpaceRecord::Go => Space::Unownable(SpaceKind::Go),
            SpaceRecord::Chance => Space::Unownable(SpaceKind::Chance),
            SpaceRecord::CommunityChest => Space::Unownable(SpaceKind::CommunityChest),
            SpaceRecord::IncomeTax => Space::Unownable(SpaceKind::IncomeTax),
            SpaceRecord::LuxuryTax => Space::Unownable(SpaceKind::LuxuryTax),
            SpaceRecord::Jail => Space::Unownable(SpaceKind::Jail),
            SpaceRecord::GoToJail => Space::Unownable(SpaceKind::GoToJail),
            SpaceRecord::FreeParking => Space::Unownable(SpaceKind::FreeParking),
        }
    }
}

impl From<&Space> for SpaceRecord {
    fn from(space: &Space) -> Self {
        match space {
            Space::Property { frame, .. } => SpaceRecord::Property(frame.clone()),
            Space::Railroad { name, price, .. } => SpaceRecord::Railroad {
                name: name.clone(),
                price: *price,
            },
            Space::Utility { name, price, .. } => SpaceRecord::Utility {
                name: name.clone(),
                price: *price,
            },
            Space::Unownable(kind) => match kind {
                SpaceKind::Go => SpaceRecord::Go,
                SpaceKind::Chance => SpaceRecord::Chance,
                SpaceKind::CommunityChest => SpaceRecord::CommunityChest,
                SpaceKind::IncomeTax => SpaceRecord::IncomeTax,
                SpaceKind::LuxuryTax => SpaceRecord::LuxuryTax,
                SpaceKind::Jail => SpaceRecord::Jail,
                SpaceKind::GoToJail => SpaceRecord::GoToJail,
                SpaceKind::FreeParking => SpaceRecord::FreeParking,
                SpaceKind::Property | SpaceKind::Railroad | SpaceKind::Utility => {
                    unreachable!("`Board::new` rejects unownable {kind} cells")
                }
            },
        }
    }
}

/// Reads a JSON array of 40 space records.
#[instrument(skip(path), fields(path = %path.as_ref().display()))]
pub fn load_board(path: impl AsRef<Path>) -> Result<Board, BoardError> {
    let buf = fs::read_to_string(path.as_ref())
        .map_err(|err| BoardError::new(format!("failed to read board file: {err}")))?;
    let records: Vec<SpaceRecord> = serde_json::from_str(&buf)
        .map_err(|err| BoardError::new(format!("failed to parse board file: {err}")))?;
    let board = Board::from_records(records)?;
    debug!(jail = board.index.jail, "board loaded");
    Ok(board)
}

/// Board data error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Board error: {} at {}:{}", message, file, line)]
pub struct BoardError {
    pub message: String,
    pub line: u32,
    pub file: &'static str,
}

impl BoardError {

    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

}

fn street(name: &str, color: Color, price: i64, rents: [i64; 6], house_price: i64) -> SpaceRecord {
    SpaceRecord::Property(PropertyFrame {
        name: name.to_string(),
        color,
        price,
        rents,
        house_price,
    })
}

fn railroad(name: &str) -> SpaceRecord {
    SpaceRecord::Railroad {
        name: name.to_string(),
        price: RAILROAD_PRICE,
    }
}

fn utility(name: &str) -> SpaceRecord {
    SpaceRecord::Utility {
        name: name.to_string(),
        price: UTILITY_PRICE,
    }
}

pub fn standard_records() -> Vec<SpaceRecord> {
    use Color::*;
    vec![
        SpaceRecord::Go,
        street("Mediterranean Avenue", Brown, 60, [2, 10, 30, 90, 160, 250], 50),
        SpaceRecord::CommunityChest,
        street("Baltic Avenue", Brown, 60, [4, 20, 60, 180, 320, 450], 50),
        SpaceRecord::IncomeTax,
        railroad("Reading Railroad"),
        street("Oriental Avenue", LightBlue, 100, [6, 30, 90, 270, 400, 550], 50),
        SpaceRecord::Chance,
        street("Vermont Avenue", LightBlue, 100, [6, 30, 90, 270, 400, 550], 50),
        street("Connecticut Avenue", LightBlue, 120, [8, 40, 100, 300, 450, 600], 50),
        SpaceRecord::Jail,
        street("St. Charles Place", Pink, 140, [10, 50, 150, 450, 625, 750], 100),
        utility("Electric Company"),
        street("States Avenue", Pink, 140, [10, 50, 150, 450, 625, 750], 100),
        street("Virginia Avenue", Pink, 160, [12, 60, 180, 500, 700, 900], 100),
        railroad("Pennsylvania Railroad"),
        street("St. James Place", Orange, 180, [14, 70, 200, 550, 750, 950], 100),
        SpaceRecord::CommunityChest,
        street("Tennessee Avenue", Orange, 180, [14, 70, 200, 550, 750, 950], 100),
        street("New York Avenue", Orange, 200, [16, 80, 220, 600, 800, 1000], 100),
        SpaceRecord::FreeParking,
        street("Kentucky Avenue", Red, 220, [18, 90, 250, 700, 875, 1050], 150),
        SpaceRecord::Chance,
        street("Indiana Avenue", Red, 220, [18, 90, 250, 700, 875, 1050], 150),
        street("Illinois Avenue", Red, 240, [20, 100, 300, 750, 925, 1100], 150),
        railroad("B. & O. Railroad"),
        street("Atlantic Avenue", Yellow, 260, [22, 110, 330, 800, 975, 1150], 150),
        street("Ventnor Avenue", Yellow, 260, [22, 110, 330, 800, 975, 1150], 150),
        utility("Water Works"),
        street("Marvin Gardens", Yellow, 280, [24, 120, 360, 850, 1025, 1200], 150),
        SpaceRecord::GoToJail,
        street("Pacific Avenue", Green, 300, [26, 130, 390, 900, 1100, 1275], 200),
        street("North Carolina Avenue", Green, 300, [26, 130, 390, 900, 1100, 1275], 200),
        SpaceRecord::CommunityChest,
        street("Pennsylvania Avenue", Green, 320, [28, 150, 450, 1000, 1200, 1400], 200),
        railroad("Short Line"),
        SpaceRecord::Chance,
        street("Park Place", Blue, 350, [35, 175, 500, 1100, 1300, 1500], 200),
        SpaceRecord::LuxuryTax,
        street("Boardwalk", Blue, 400, [50, 200, 600, 1400, 1700, 2000], 200),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlayerId;

    #[test]
    fn standard_board_layout() {
        let board = Board::standard();
        assert_eq!(board.index.go, 0);
        assert_eq!(board.index.jail, 10);
        assert_eq!(board.space(30).kind(), SpaceKind::GoToJail);
        assert_eq!(board.houses, HOUSE_POOL);
        assert_eq!(board.tiles.iter().filter(|t| t.kind() == SpaceKind::Railroad).count(), 4);
        assert_eq!(board.tiles.iter().filter(|t| t.kind() == SpaceKind::Utility).count(), 2);
    }

    #[test]
    fn color_groups_have_classic_sizes() {
        let groups = Board::standard().color_groups();
        assert_eq!(groups.len(), 8);
        for (color, members) in &groups {
            let expected = match color {
                Color::Brown | Color::Blue => 2,
                _ => 3,
            };
            assert_eq!(members.len(), expected, "{color}");
        }
        assert_eq!(groups[&Color::Blue], vec![37, 39]);
    }

    #[test]
    fn reset_restores_pool_and_cells() {
        let mut board = Board::standard();
        board.houses = 40;
        if let Space::Property { holding, houses, .. } = board.space_mut(1) {
            holding.owner = Some(PlayerId(0));
            *houses = 4;
        }
        if let Some(holding) = board.space_mut(5).holding_mut() {
            holding.owner = Some(PlayerId(1));
            holding.mortgaged = true;
        }
        board.reset();
        assert_eq!(board.houses, HOUSE_POOL);
        assert_eq!(board.houses_built(), 0);
        assert!(board.tiles.iter().all(|t| t.owner().is_none() && !t.is_mortgaged()));
    }

    #[test]
    fn records_survive_json() {
        let board = Board::standard();
        let json = serde_json::to_string(&board.records()).unwrap();
        let records: Vec<SpaceRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(records, standard_records());
    }

    #[test]
    fn railroad_price_defaults() {
        let record: SpaceRecord = serde_json::from_str(r#"{"kind":"railroad","name":"Reading"}"#).unwrap();
        assert_eq!(record, SpaceRecord::Railroad { name: "Reading".to_string(), price: 200 });
    }

    #[test]
    fn wrong_length_is_rejected() {
        let mut records = standard_records();
        records.pop();
        let err = Board::from_records(records).err().unwrap();
        assert!(err.message.contains("found 39"));
    }

    #[test]
    fn second_jail_is_rejected() {
        let mut records = standard_records();
        records[20] = SpaceRecord::Jail;
        assert!(Board::from_records(records).is_err());
    }
}
