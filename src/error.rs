use derive_more::{Display, Error};

/// A player action whose preconditions do not hold. The action is aborted,
/// nothing is changed.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ActionError {
    #[display("can't mortgage space {position}: not owned by the acting player")]
    MortgageNotOwned { position: usize },
    #[display("space {position} is already mortgaged")]
    AlreadyMortgaged { position: usize },
    #[display("can't un-mortgage space {position}: not owned by the acting player")]
    UnmortgageNotOwned { position: usize },
    #[display("space {position} is not mortgaged")]
    NotMortgaged { position: usize },
    #[display("space {position} can't be bought")]
    NotForSale { position: usize },
    #[display("space {position} is already owned")]
    AlreadyOwned { position: usize },
    #[display("space {position} is not a property owned by the acting player")]
    NotBuildable { position: usize },
    #[display("space {position} already has a hotel")]
    FullyBuilt { position: usize },
    #[display("no houses left in the pool")]
    NoHousesLeft,
    #[display("space {position} has no houses to sell")]
    NoHouses { position: usize },
}
