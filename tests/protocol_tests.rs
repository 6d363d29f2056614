#![cfg(feature = "std")]

use broadside::protocol::{decode, encode, Message, ProtocolError};
use broadside::{
    random_placements, validate_placement, AttackResult, CellState, Coordinate, PlayerId,
};
use rand::{rngs::SmallRng, SeedableRng};
use serde_json::{json, Value};

#[test]
fn test_attack_wire_shape() {
    let msg = Message::attack(PlayerId::One, Coordinate::from_key("C3").unwrap());
    let value: Value = serde_json::from_slice(&encode(&msg).unwrap()).unwrap();
    assert_eq!(
        value,
        json!({"command": "ATTACK", "target": "C3", "attacker": 1})
    );
}

#[test]
fn test_attack_response_with_loose_spacing() {
    let body = br#"{"command": "ATTACK_RESPONSE", "target": "C3", "result": 2, "effected_ships": ["C3", "C4"], "check_end": true}"#;
    let msg = decode(body).unwrap();
    assert_eq!(
        msg,
        Message::AttackResponse {
            target: "C3".to_string(),
            result: AttackResult::Sunk,
            effected_ships: vec![
                Coordinate::from_key("C3").unwrap(),
                Coordinate::from_key("C4").unwrap()
            ],
            check_end: true,
        }
    );
}

#[test]
fn test_check_end_defaults_to_false() {
    let body = br#"{"command":"ATTACK_RESPONSE","target":"A1","result":0,"effected_ships":["A1"]}"#;
    match decode(body).unwrap() {
        Message::AttackResponse { check_end, .. } => assert!(!check_end),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_start_game_is_bare() {
    assert_eq!(decode(br#"{"command":"START_GAME"}"#).unwrap(), Message::StartGame);
    assert_eq!(encode(&Message::StartGame).unwrap(), br#"{"command":"START_GAME"}"#);
}

#[test]
fn test_setup_data_carries_board_codes() {
    let mut rng = SmallRng::seed_from_u64(11);
    let placement = validate_placement(&random_placements(&mut rng)).unwrap();
    let msg = Message::setup(PlayerId::Two, &placement);
    let value: Value = serde_json::from_slice(&encode(&msg).unwrap()).unwrap();

    assert_eq!(value["command"], "SETUP_DATA");
    assert_eq!(value["player"], 2);
    let board = value["board_data"].as_object().unwrap();
    assert_eq!(board.len(), 100);
    let ship = placement.fleet.ships()[0].coords().next().unwrap();
    assert_eq!(board[ship.to_key().as_str()], json!(CellState::Ship.code()));
    let ships = value["ship_data"].as_array().unwrap();
    assert_eq!(ships.len(), 5);
    assert_eq!(ships[0]["parts"][0]["hit"], false);

    assert_eq!(decode(&encode(&msg).unwrap()).unwrap(), msg);
}

#[test]
fn test_unknown_command_is_distinguished() {
    assert_eq!(
        decode(br#"{"command":"CHAT","text":"hi"}"#),
        Err(ProtocolError::UnknownCommand("CHAT".to_string()))
    );
}

#[test]
fn test_malformed_bodies() {
    let bodies: [&[u8]; 8] = [
        b"not json",
        br#"[1, 2, 3]"#,
        br#"{"target":"A1"}"#,
        br#"{"command":7}"#,
        br#"{"command":"ATTACK","target":"A1"}"#,
        br#"{"command":"ATTACK","target":"A1","attacker":3}"#,
        br#"{"command":"ATTACK_RESPONSE","target":"A1","result":5,"effected_ships":[]}"#,
        &[0xff, 0xfe],
    ];
    for body in bodies {
        assert!(
            matches!(decode(body), Err(ProtocolError::MalformedMessage(_))),
            "accepted {:?}",
            String::from_utf8_lossy(body)
        );
    }
}

#[test]
fn test_short_board_is_malformed() {
    let body = json!({
        "command": "SETUP_DATA",
        "player": 1,
        "ship_data": [],
        "board_data": {"A1": 0}
    });
    assert!(matches!(
        decode(body.to_string().as_bytes()),
        Err(ProtocolError::MalformedMessage(_))
    ));
}
