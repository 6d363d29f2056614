#![cfg(feature = "std")]

//! Plain-text rendering and input parsing for the terminal front end.

use std::fmt::Write;

use crate::attack::AttackOutcome;
use crate::board::{Board, CellState, TrackingBoard};
use crate::common::AttackResult;
use crate::config::{BOARD_SIZE, ROW_LETTERS};
use crate::coord::Coordinate;
use crate::placement::ShipPlacement;
use crate::session::PlayerId;
use crate::ship::{Orientation, ShipClass};

fn cell_char(state: CellState) -> char {
    match state {
        CellState::Empty => '.',
        CellState::Ship => 'S',
        CellState::Hit => 'X',
        CellState::Miss => 'o',
        CellState::Sunk => '#',
    }
}

fn render_grid(mut cell: impl FnMut(Coordinate) -> CellState) -> String {
    let mut out = String::from("  ");
    for c in 1..=BOARD_SIZE {
        let _ = write!(out, "{:>3}", c);
    }
    out.push('\n');
    for (row, letter) in ROW_LETTERS.iter().enumerate() {
        let _ = write!(out, "{} ", letter);
        for col in 0..BOARD_SIZE as usize {
            let ch = Coordinate::new(row, col).map_or(' ', |coord| cell_char(cell(coord)));
            let _ = write!(out, "{:>3}", ch);
        }
        out.push('\n');
    }
    out
}

/// A player's own board with ships revealed.
pub fn render_board(board: &Board) -> String {
    render_grid(|coord| board.get(coord))
}

/// What is known of the opponent's board.
pub fn render_view(view: &TrackingBoard) -> String {
    render_grid(|coord| view.get(coord))
}

/// Opponent view on top, own board below.
pub fn render_player_view(own: &Board, view: &TrackingBoard) -> String {
    format!(
        "Opponent board:\n{}\nYour board:\n{}",
        render_view(view),
        render_board(own)
    )
}

pub fn describe_result(target: Coordinate, result: AttackResult) -> String {
    match result {
        AttackResult::Miss => format!("{}: miss", target),
        AttackResult::Hit => format!("{}: hit!", target),
        AttackResult::Sunk => format!("{}: hit and sunk!", target),
    }
}

pub fn describe_outcome(outcome: &AttackOutcome) -> String {
    match outcome.sunk_ship {
        Some(name) => format!("{}: {} sunk!", outcome.target, name),
        None => describe_result(outcome.target, outcome.result),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("expected an anchor and an orientation, e.g. \"A1 H\"")]
    Shape,
    #[error("{0}")]
    Coord(#[from] crate::common::CoordError),
    #[error("orientation must be H or V, got {0:?}")]
    Orientation(String),
}

/// Parse `"<key> <H|V>"` into a candidate for `class`. Only the anchor has
/// to be on the grid; the rest of the ship is left to the validator.
pub fn parse_placement(line: &str, class: ShipClass) -> Result<ShipPlacement, InputError> {
    let mut parts = line.split_whitespace();
    let (Some(anchor), Some(orient), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(InputError::Shape);
    };
    let anchor = Coordinate::from_key(anchor)?;
    let orientation = match orient.to_ascii_uppercase().as_str() {
        "H" | "HORIZONTAL" => Orientation::Horizontal,
        "V" | "VERTICAL" => Orientation::Vertical,
        _ => return Err(InputError::Orientation(orient.to_string())),
    };
    Ok(ShipPlacement::new(
        class,
        anchor.row() as i32,
        anchor.col() as i32,
        orientation,
    ))
}

/// Blank lines that push the previous player's boards out of sight.
pub fn blank_screen() -> String {
    "\n".repeat(40)
}

/// Hotseat hand-off screen shown between turns.
pub fn handoff_screen(next: PlayerId) -> String {
    format!(
        "{}=== Turn over ===\n{}'s turn is next. {} look away!\nPress Enter when ready.",
        blank_screen(),
        next,
        next.other()
    )
}
