//! Per-player grid state: the authoritative [`Board`] and the attacker's
//! [`TrackingBoard`] view of an opponent.

use core::fmt;

use crate::bitboard::GridMask;
use crate::common::{AttackResult, BoardError};
use crate::config::CELL_COUNT;
use crate::coord::Coordinate;

/// State of one board cell. The discriminants are the wire codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum CellState {
    #[default]
    Empty = 0,
    Ship = 1,
    Hit = 2,
    Miss = 3,
    Sunk = 4,
}

impl CellState {
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(CellState::Empty),
            1 => Some(CellState::Ship),
            2 => Some(CellState::Hit),
            3 => Some(CellState::Miss),
            4 => Some(CellState::Sunk),
            _ => None,
        }
    }

    /// Whether an attack has already resolved this cell.
    pub const fn is_attacked(self) -> bool {
        matches!(self, CellState::Hit | CellState::Miss | CellState::Sunk)
    }

    /// Legal transitions on an authoritative board.
    pub const fn can_become(self, next: CellState) -> bool {
        matches!(
            (self, next),
            (CellState::Empty, CellState::Ship)
                | (CellState::Empty, CellState::Miss)
                | (CellState::Ship, CellState::Hit)
                | (CellState::Hit, CellState::Sunk)
        )
    }
}

#[cfg(feature = "std")]
impl serde::Serialize for CellState {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

#[cfg(feature = "std")]
impl<'de> serde::Deserialize<'de> for CellState {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u8::deserialize(deserializer)?;
        CellState::from_code(code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown cell state {}", code)))
    }
}

/// One player's 100-cell grid. Always fully populated.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    cells: [CellState; CELL_COUNT],
}

impl Board {
    /// A board with every cell `Empty`.
    pub fn new() -> Self {
        Board {
            cells: [CellState::Empty; CELL_COUNT],
        }
    }

    /// A board with `Ship` on every cell of `ships` and `Empty` elsewhere.
    pub fn with_ships(ships: &GridMask) -> Self {
        let mut board = Board::new();
        for coord in ships.coords() {
            board.cells[coord.index()] = CellState::Ship;
        }
        board
    }

    pub fn get(&self, coord: Coordinate) -> CellState {
        self.cells[coord.index()]
    }

    /// Change one cell, enforcing [`CellState::can_become`]. Setting a cell
    /// to the state it already holds is rejected as well.
    pub fn set(&mut self, coord: Coordinate, state: CellState) -> Result<(), BoardError> {
        let from = self.get(coord);
        if !from.can_become(state) {
            return Err(BoardError::IllegalTransition {
                coord,
                from,
                to: state,
            });
        }
        self.cells[coord.index()] = state;
        Ok(())
    }

    /// All cells with their coordinates, in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Coordinate, CellState)> + '_ {
        Coordinate::all().map(move |c| (c, self.get(c)))
    }

    pub fn count(&self, state: CellState) -> usize {
        self.cells.iter().filter(|&&c| c == state).count()
    }

    /// True iff no cell is still an intact `Ship`.
    pub fn is_game_over(&self) -> bool {
        !self.cells.contains(&CellState::Ship)
    }

    /// What an opponent may see of this board: intact ship cells read as
    /// `Empty`.
    pub fn attack_view(&self) -> TrackingBoard {
        let mut view = TrackingBoard::new();
        for (i, cell) in self.cells.iter().enumerate() {
            view.cells[i] = match cell {
                CellState::Ship => CellState::Empty,
                other => *other,
            };
        }
        view
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board {{")?;
        for row in self.cells.chunks(crate::config::BOARD_SIZE as usize) {
            write!(f, " ")?;
            for cell in row {
                write!(f, " {}", cell.code())?;
            }
            writeln!(f)?;
        }
        write!(f, "}}")
    }
}

#[cfg(feature = "std")]
impl serde::Serialize for Board {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(CELL_COUNT))?;
        for (coord, cell) in self.iter() {
            map.serialize_entry(&coord, &cell)?;
        }
        map.end()
    }
}

#[cfg(feature = "std")]
impl<'de> serde::Deserialize<'de> for Board {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries =
            std::collections::BTreeMap::<Coordinate, CellState>::deserialize(deserializer)?;
        if entries.len() != CELL_COUNT {
            return Err(serde::de::Error::custom(format!(
                "board must list all {} cells, got {}",
                CELL_COUNT,
                entries.len()
            )));
        }
        let mut board = Board::new();
        for (coord, cell) in entries {
            board.cells[coord.index()] = cell;
        }
        Ok(board)
    }
}

/// An attacker's record of what it has learned about an opponent's board.
/// `Empty` means "not yet attacked"; only attack results change it.
#[derive(Clone, PartialEq, Eq)]
pub struct TrackingBoard {
    cells: [CellState; CELL_COUNT],
}

impl TrackingBoard {
    pub fn new() -> Self {
        TrackingBoard {
            cells: [CellState::Empty; CELL_COUNT],
        }
    }

    pub fn get(&self, coord: Coordinate) -> CellState {
        self.cells[coord.index()]
    }

    pub fn is_known(&self, coord: Coordinate) -> bool {
        self.get(coord).is_attacked()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Coordinate, CellState)> + '_ {
        Coordinate::all().map(move |c| (c, self.get(c)))
    }

    pub fn count(&self, state: CellState) -> usize {
        self.cells.iter().filter(|&&c| c == state).count()
    }

    /// Record the defender's verdict on `target`. For a sink, `affected`
    /// lists every coordinate of the sunk ship and all of them become
    /// `Sunk`.
    pub fn record(
        &mut self,
        target: Coordinate,
        result: AttackResult,
        affected: &[Coordinate],
    ) -> Result<(), BoardError> {
        let from = self.get(target);
        let to = match result {
            AttackResult::Miss => CellState::Miss,
            AttackResult::Hit => CellState::Hit,
            AttackResult::Sunk => CellState::Sunk,
        };
        if from != CellState::Empty {
            return Err(BoardError::IllegalTransition {
                coord: target,
                from,
                to,
            });
        }
        // Nothing is written until the whole report checks out.
        if result == AttackResult::Sunk {
            if !affected.contains(&target) {
                return Err(BoardError::SunkTargetMissing(target));
            }
            for &coord in affected {
                if let from @ (CellState::Miss | CellState::Ship) = self.get(coord) {
                    return Err(BoardError::IllegalTransition {
                        coord,
                        from,
                        to: CellState::Sunk,
                    });
                }
            }
            for &coord in affected {
                self.cells[coord.index()] = CellState::Sunk;
            }
        } else {
            self.cells[target.index()] = to;
        }
        Ok(())
    }
}

impl Default for TrackingBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TrackingBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackingBoard")
            .field("hits", &self.count(CellState::Hit))
            .field("misses", &self.count(CellState::Miss))
            .field("sunk", &self.count(CellState::Sunk))
            .finish()
    }
}

/// True iff `board` has no intact ship cell left.
pub fn is_game_over(board: &Board) -> bool {
    board.is_game_over()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(key: &str) -> Coordinate {
        Coordinate::from_key(key).unwrap()
    }

    #[test]
    fn ship_cells_follow_legal_path_only() {
        let mut board = Board::new();
        board.set(at("A1"), CellState::Ship).unwrap();
        assert!(board.set(at("A1"), CellState::Miss).is_err());
        assert!(board.set(at("A1"), CellState::Sunk).is_err());
        board.set(at("A1"), CellState::Hit).unwrap();
        board.set(at("A1"), CellState::Sunk).unwrap();
        assert!(board.set(at("A1"), CellState::Hit).is_err());
    }

    #[test]
    fn attack_view_hides_intact_ships() {
        let mut board = Board::new();
        board.set(at("B2"), CellState::Ship).unwrap();
        board.set(at("B3"), CellState::Ship).unwrap();
        board.set(at("B3"), CellState::Hit).unwrap();
        let view = board.attack_view();
        assert_eq!(view.get(at("B2")), CellState::Empty);
        assert_eq!(view.get(at("B3")), CellState::Hit);
    }

    #[test]
    fn tracking_sink_marks_whole_ship() {
        let mut view = TrackingBoard::new();
        view.record(at("A1"), AttackResult::Hit, &[at("A1")]).unwrap();
        view.record(at("A2"), AttackResult::Sunk, &[at("A1"), at("A2")]).unwrap();
        assert_eq!(view.get(at("A1")), CellState::Sunk);
        assert_eq!(view.get(at("A2")), CellState::Sunk);
        assert!(view.record(at("A2"), AttackResult::Miss, &[]).is_err());
    }

    #[test]
    fn rejected_sink_report_writes_nothing() {
        let mut view = TrackingBoard::new();
        view.record(at("A1"), AttackResult::Miss, &[at("A1")]).unwrap();
        let before = view.clone();

        assert_eq!(
            view.record(at("B1"), AttackResult::Sunk, &[at("B1"), at("A1")]),
            Err(BoardError::IllegalTransition {
                coord: at("A1"),
                from: CellState::Miss,
                to: CellState::Sunk,
            })
        );
        assert_eq!(
            view.record(at("B1"), AttackResult::Sunk, &[at("C1"), at("D1")]),
            Err(BoardError::SunkTargetMissing(at("B1")))
        );
        assert_eq!(view, before);
    }
}
