//! Common types for the game core: attack results and the error taxonomy
//! shared by the board, placement, and attack modules.

use alloc::string::String;

use crate::board::CellState;
use crate::coord::Coordinate;

/// Result of a resolved attack, as reported to the attacker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttackResult {
    /// The target cell held no ship.
    Miss,
    /// The target cell held a ship that is still afloat.
    Hit,
    /// The attack hit the last intact part of a ship.
    Sunk,
}

impl AttackResult {
    /// Integer code used on the wire (`0=Miss`, `1=Hit`, `2=Sunk`).
    pub const fn code(self) -> u8 {
        match self {
            AttackResult::Miss => 0,
            AttackResult::Hit => 1,
            AttackResult::Sunk => 2,
        }
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(AttackResult::Miss),
            1 => Some(AttackResult::Hit),
            2 => Some(AttackResult::Sunk),
            _ => None,
        }
    }
}

#[cfg(feature = "std")]
impl serde::Serialize for AttackResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

#[cfg(feature = "std")]
impl<'de> serde::Deserialize<'de> for AttackResult {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u8::deserialize(deserializer)?;
        AttackResult::from_code(code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown attack result {}", code)))
    }
}

/// Errors from converting raw input into a [`Coordinate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordError {
    /// Row or column falls outside the 10x10 grid.
    #[error("coordinate (row {row}, col {col}) is outside the grid")]
    OutOfRange { row: i64, col: i64 },
    /// Key is not of the form `<Letter><Number>`.
    #[error("malformed coordinate key {0:?}")]
    Malformed(String),
}

/// Errors returned by [`Board`](crate::Board) mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// The requested cell change is not one of the legal transitions.
    #[error("illegal transition at {coord}: {from:?} -> {to:?}")]
    IllegalTransition {
        coord: Coordinate,
        from: CellState,
        to: CellState,
    },
    /// A sink report whose ship coordinates leave out the cell that was shot.
    #[error("sink reported at {0} but the ship does not cover it")]
    SunkTargetMissing(Coordinate),
}

/// Reasons a candidate fleet is rejected by the placement validator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    /// A ship part lies outside the grid.
    #[error("ship part at (row {row}, col {col}) lies outside the grid")]
    OutOfBounds { row: i32, col: i32 },
    /// Two ships claim the same cell.
    #[error("ships overlap at {0}")]
    Overlap(Coordinate),
    /// A ship's parts do not form a straight line along its orientation.
    #[error("{0} is not a straight, contiguous line")]
    NotContiguous(&'static str),
    /// The candidate set is not exactly one ship of each class.
    #[error("wrong fleet composition: {0}")]
    FleetComposition(&'static str),
}

/// Reasons an attack is refused by the resolver. None of these mutate state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttackError {
    /// The target does not name a cell on the grid.
    #[error("attack target is not a grid coordinate")]
    InvalidTarget,
    /// The cell was already resolved as hit, miss, or sunk.
    #[error("{0} was already attacked")]
    AlreadyAttacked(Coordinate),
    /// The board shows a ship at the target but no ship in the fleet owns it.
    #[error("board and fleet disagree: no ship part at {0}")]
    UnknownShipHit(Coordinate),
}
