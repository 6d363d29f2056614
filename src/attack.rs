//! Attack resolution: the single place where hit, sink and game-end
//! semantics are decided. Hotseat play and the networked defender both go
//! through [`resolve_attack`].

use alloc::vec;
use alloc::vec::Vec;

use crate::board::{Board, CellState};
use crate::common::{AttackError, AttackResult};
use crate::coord::Coordinate;
use crate::ship::Fleet;

/// Everything an attack changed, in the order it was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackOutcome {
    pub target: Coordinate,
    pub result: AttackResult,
    /// `[target]` for a miss or hit; every coordinate of the ship for a sink.
    pub affected: Vec<Coordinate>,
    pub mutations: Vec<(Coordinate, CellState)>,
    /// Name of the ship this attack sank, if any.
    pub sunk_ship: Option<&'static str>,
    /// Defender has no intact ship cell left.
    pub game_over: bool,
}

/// Resolve an attack on `target` against the defender's `board` and
/// `fleet`. Refused attacks leave both untouched.
pub fn resolve_attack<T>(
    board: &mut Board,
    fleet: &mut Fleet,
    target: T,
) -> Result<AttackOutcome, AttackError>
where
    T: TryInto<Coordinate>,
{
    let target = target.try_into().map_err(|_| AttackError::InvalidTarget)?;
    let cell = board.get(target);
    if cell.is_attacked() {
        log::debug!("rejected repeat attack on {}", target);
        return Err(AttackError::AlreadyAttacked(target));
    }

    if cell == CellState::Empty {
        set_cell(board, target, CellState::Miss)?;
        return Ok(AttackOutcome {
            target,
            result: AttackResult::Miss,
            affected: vec![target],
            mutations: vec![(target, CellState::Miss)],
            sunk_ship: None,
            game_over: board.is_game_over(),
        });
    }

    let index = fleet
        .ship_at(target)
        .ok_or(AttackError::UnknownShipHit(target))?;
    let ship = fleet
        .ship_mut(index)
        .ok_or(AttackError::UnknownShipHit(target))?;

    // A sinking hit turns every other part from Hit to Sunk; check them all
    // before the first write.
    let sinks = ship.parts().iter().all(|p| p.hit || p.coord == target);
    if sinks {
        if let Some(stray) = ship
            .coords()
            .find(|&c| c != target && board.get(c) != CellState::Hit)
        {
            return Err(AttackError::UnknownShipHit(stray));
        }
    }

    set_cell(board, target, CellState::Hit)?;
    ship.register_hit(target);
    let mut mutations = vec![(target, CellState::Hit)];

    let (result, affected, sunk_ship) = if ship.is_sunk() {
        let coords: Vec<Coordinate> = ship.coords().collect();
        for &coord in &coords {
            set_cell(board, coord, CellState::Sunk)?;
            mutations.push((coord, CellState::Sunk));
        }
        log::info!("{} sunk at {}", ship.name(), target);
        (AttackResult::Sunk, coords, Some(ship.name()))
    } else {
        (AttackResult::Hit, vec![target], None)
    };

    Ok(AttackOutcome {
        target,
        result,
        affected,
        mutations,
        sunk_ship,
        game_over: board.is_game_over(),
    })
}

/// Board writes that the resolver has already proven legal. A failure here
/// means the fleet and board disagree about a cell.
fn set_cell(board: &mut Board, coord: Coordinate, state: CellState) -> Result<(), AttackError> {
    board
        .set(coord, state)
        .map_err(|_| AttackError::UnknownShipHit(coord))
}
