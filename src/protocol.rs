#![cfg(feature = "std")]

//! JSON messages exchanged between two networked peers.
//!
//! Every body is one JSON object with a `command` tag. Coordinates travel as
//! `"C7"` keys, cell and attack codes as integers.

use crate::attack::AttackOutcome;
use crate::board::Board;
use crate::common::AttackResult;
use crate::coord::Coordinate;
use crate::placement::Placement;
use crate::session::PlayerId;
use crate::ship::Fleet;

/// Commands this build understands.
pub const KNOWN_COMMANDS: [&str; 4] = ["SETUP_DATA", "START_GAME", "ATTACK", "ATTACK_RESPONSE"];

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "command", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    /// A player's validated fleet and the board it occupies.
    SetupData {
        player: PlayerId,
        ship_data: Fleet,
        board_data: Board,
    },
    /// Both fleets are in; battle begins with Player 1.
    StartGame,
    /// `attacker` fires at `target` on the receiver's board. Carries no
    /// result: only the board's owner computes it.
    Attack { target: String, attacker: PlayerId },
    /// The defender's verdict on an attack.
    AttackResponse {
        target: String,
        result: AttackResult,
        effected_ships: Vec<Coordinate>,
        #[serde(default)]
        check_end: bool,
    },
}

impl Message {
    pub fn setup(player: PlayerId, placement: &Placement) -> Self {
        Message::SetupData {
            player,
            ship_data: placement.fleet.clone(),
            board_data: placement.board.clone(),
        }
    }

    pub fn attack(attacker: PlayerId, target: Coordinate) -> Self {
        Message::Attack {
            target: target.to_key(),
            attacker,
        }
    }

    pub fn response(outcome: &AttackOutcome) -> Self {
        Message::AttackResponse {
            target: outcome.target.to_key(),
            result: outcome.result,
            effected_ships: outcome.affected.clone(),
            check_end: outcome.game_over,
        }
    }

    /// The wire name of the command.
    pub fn command(&self) -> &'static str {
        match self {
            Message::SetupData { .. } => "SETUP_DATA",
            Message::StartGame => "START_GAME",
            Message::Attack { .. } => "ATTACK",
            Message::AttackResponse { .. } => "ATTACK_RESPONSE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// Well-formed object whose command this build does not know.
    #[error("unknown command {0:?}")]
    UnknownCommand(String),
    #[error("malformed message: {0}")]
    MalformedMessage(String),
}

pub fn encode(msg: &Message) -> Result<Vec<u8>, ProtocolError> {
    serde_json::to_vec(msg).map_err(|e| ProtocolError::MalformedMessage(e.to_string()))
}

/// Decode one frame body.
pub fn decode(body: &[u8]) -> Result<Message, ProtocolError> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| ProtocolError::MalformedMessage(e.to_string()))?;
    let command = match value.get("command") {
        Some(serde_json::Value::String(command)) => command.clone(),
        Some(_) => {
            return Err(ProtocolError::MalformedMessage(
                "command is not a string".to_string(),
            ))
        }
        None if value.is_object() => {
            return Err(ProtocolError::MalformedMessage(
                "missing command".to_string(),
            ))
        }
        None => {
            return Err(ProtocolError::MalformedMessage(
                "body is not a JSON object".to_string(),
            ))
        }
    };
    if !KNOWN_COMMANDS.contains(&command.as_str()) {
        return Err(ProtocolError::UnknownCommand(command));
    }
    serde_json::from_value(value).map_err(|e| ProtocolError::MalformedMessage(e.to_string()))
}
