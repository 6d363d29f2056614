//! Commonly used types and utilities for ease of import.

pub use crate::{
    advance_turn, random_placements, resolve_attack, validate_placement, AttackOutcome,
    AttackResult, Board, CellState, Coordinate, Fleet, Orientation, Phase, PlayerId, Session,
    ShipPlacement, TrackingBoard, SHIPS,
};

#[cfg(feature = "std")]
pub use crate::{
    connect_as_client, connect_as_host, Channel, Message, NetConfig, NetEvent, NodeUpdate,
    PeerNode,
};
