//! Ship placement validation.
//!
//! The validator is stateless: it receives the final resting cells of every
//! ship and either rejects the set or materializes a [`Fleet`] and its
//! [`Board`]. Dragging, snapping and rotation belong to the caller.

use alloc::vec::Vec;
use rand::Rng;

use crate::bitboard::GridMask;
use crate::board::Board;
use crate::common::PlacementError;
use crate::config::{BOARD_SIZE, NUM_SHIPS, SHIPS};
use crate::coord::Coordinate;
use crate::ship::{Fleet, Orientation, Ship, ShipClass};

/// A proposed ship position. Cells are signed so that parts dropped off the
/// grid can still be described (and rejected).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipPlacement {
    pub class: ShipClass,
    pub orientation: Orientation,
    pub cells: Vec<(i32, i32)>,
}

impl ShipPlacement {
    /// Expand an anchor cell into `class.length()` cells along `orientation`.
    /// Far-off anchors saturate instead of wrapping; they stay off the grid.
    pub fn new(class: ShipClass, row: i32, col: i32, orientation: Orientation) -> Self {
        let (dr, dc) = orientation.step();
        let cells = (0..class.length() as i32)
            .map(|i| (row.saturating_add(i * dr), col.saturating_add(i * dc)))
            .collect();
        ShipPlacement {
            class,
            orientation,
            cells,
        }
    }

    /// Candidate for an already placed ship, e.g. one received from a peer.
    pub fn from_ship(ship: &Ship) -> Self {
        ShipPlacement {
            class: ship.class(),
            orientation: ship.orientation(),
            cells: ship
                .coords()
                .map(|c| (c.row() as i32, c.col() as i32))
                .collect(),
        }
    }
}

/// A validated fleet together with the board it occupies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub fleet: Fleet,
    pub board: Board,
}

/// Check that `candidates` is one of each fixed ship class, fully on the
/// grid, with straight contiguous ships and no shared cells.
pub fn validate_placement(candidates: &[ShipPlacement]) -> Result<Placement, PlacementError> {
    check_composition(candidates)?;

    let mut occupied = GridMask::new();
    let mut ships = Vec::with_capacity(NUM_SHIPS);
    for candidate in candidates {
        let mut coords = Vec::with_capacity(candidate.cells.len());
        for &(row, col) in &candidate.cells {
            let coord = Coordinate::from_signed(row, col)
                .ok_or(PlacementError::OutOfBounds { row, col })?;
            if !occupied.insert_coord(coord) {
                return Err(PlacementError::Overlap(coord));
            }
            coords.push(coord);
        }
        check_line(candidate, &coords)?;
        ships.push(Ship::new(candidate.class, candidate.orientation, &coords));
    }

    let board = Board::with_ships(&occupied);
    log::debug!("placement accepted: {} ship cells", occupied.count_ones());
    Ok(Placement {
        fleet: Fleet::from_ships(ships),
        board,
    })
}

fn check_composition(candidates: &[ShipPlacement]) -> Result<(), PlacementError> {
    if candidates.len() != NUM_SHIPS {
        return Err(PlacementError::FleetComposition("expected exactly five ships"));
    }
    let mut seen = [false; NUM_SHIPS];
    for candidate in candidates {
        let slot = SHIPS
            .iter()
            .position(|class| *class == candidate.class)
            .ok_or(PlacementError::FleetComposition("unknown ship class"))?;
        if seen[slot] {
            return Err(PlacementError::FleetComposition("duplicate ship class"));
        }
        seen[slot] = true;
        if candidate.cells.len() != candidate.class.length() {
            return Err(PlacementError::FleetComposition(
                "part count does not match ship length",
            ));
        }
    }
    Ok(())
}

fn check_line(candidate: &ShipPlacement, coords: &[Coordinate]) -> Result<(), PlacementError> {
    let (dr, dc) = candidate.orientation.step();
    let straight = coords.windows(2).all(|pair| {
        pair[1].row() as i32 - pair[0].row() as i32 == dr
            && pair[1].col() as i32 - pair[0].col() as i32 == dc
    });
    if straight {
        Ok(())
    } else {
        Err(PlacementError::NotContiguous(candidate.class.name()))
    }
}

/// Random candidate set that always passes [`validate_placement`].
pub fn random_placements<R: Rng>(rng: &mut R) -> Vec<ShipPlacement> {
    loop {
        if let Some(candidates) = try_random_placements(rng) {
            return candidates;
        }
    }
}

fn try_random_placements<R: Rng>(rng: &mut R) -> Option<Vec<ShipPlacement>> {
    let size = BOARD_SIZE as i32;
    let mut occupied = GridMask::new();
    let mut out = Vec::with_capacity(NUM_SHIPS);
    for class in SHIPS {
        let mut attempts = 0;
        let placed = loop {
            attempts += 1;
            if attempts > 100 {
                break None;
            }
            let orientation = if rng.random() {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            };
            let span = size - class.length() as i32;
            let (max_r, max_c) = match orientation {
                Orientation::Horizontal => (size - 1, span),
                Orientation::Vertical => (span, size - 1),
            };
            let candidate = ShipPlacement::new(
                class,
                rng.random_range(0..=max_r),
                rng.random_range(0..=max_c),
                orientation,
            );
            let free = candidate.cells.iter().all(|&(r, c)| {
                Coordinate::from_signed(r, c).is_some_and(|coord| !occupied.contains(coord))
            });
            if free {
                break Some(candidate);
            }
        }?;
        for &(r, c) in &placed.cells {
            if let Some(coord) = Coordinate::from_signed(r, c) {
                occupied.insert_coord(coord);
            }
        }
        out.push(placed);
    }
    Some(out)
}
