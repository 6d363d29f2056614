use broadside::{
    advance_turn, random_placements, AttackError, AttackResult, CellState, Coordinate, Mode,
    Phase, PlayerId, Session, SessionError, SessionState, TransitionError, TurnEvent,
};
use rand::{rngs::SmallRng, SeedableRng};

const P1: PlayerId = PlayerId::One;
const P2: PlayerId = PlayerId::Two;

fn at(key: &str) -> Coordinate {
    Coordinate::from_key(key).unwrap()
}

fn placed_hotseat(seed: u64) -> Session {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut session = Session::hotseat();
    session.submit_placement(P1, &random_placements(&mut rng)).unwrap();
    session.submit_placement(P2, &random_placements(&mut rng)).unwrap();
    session
}

/// First coordinate of the defender's board holding `state`.
fn find(session: &Session, defender: PlayerId, state: CellState) -> Coordinate {
    session
        .board(defender)
        .iter()
        .find(|&(_, cell)| cell == state)
        .map(|(coord, _)| coord)
        .unwrap()
}

#[test]
fn test_hotseat_placement_order() {
    let mut rng = SmallRng::seed_from_u64(1);
    let mut session = Session::hotseat();
    assert_eq!(session.current_phase(), Phase::Placement(P1));

    let err = session
        .submit_placement(P2, &random_placements(&mut rng))
        .unwrap_err();
    assert_eq!(
        err,
        SessionError::Transition(TransitionError::NotYourTurn {
            active: P1,
            attempted: P2
        })
    );

    session.submit_placement(P1, &random_placements(&mut rng)).unwrap();
    assert_eq!(session.current_phase(), Phase::Placement(P2));
    session.submit_placement(P2, &random_placements(&mut rng)).unwrap();
    assert_eq!(session.current_phase(), Phase::Battle(P1));
    assert_eq!(session.active_player(), P1);
}

#[test]
fn test_rejected_placement_keeps_phase() {
    let mut session = Session::hotseat();
    let mut candidates = random_placements(&mut SmallRng::seed_from_u64(2));
    candidates.pop();
    assert!(matches!(
        session.submit_placement(P1, &candidates),
        Err(SessionError::Placement(_))
    ));
    assert_eq!(session.current_phase(), Phase::Placement(P1));
    assert!(session.fleet(P1).is_none());
}

#[test]
fn test_turns_alternate_on_miss_and_hit() {
    let mut session = placed_hotseat(3);

    let water = find(&session, P2, CellState::Empty);
    let outcome = session.attack(water).unwrap();
    assert_eq!(outcome.result, AttackResult::Miss);
    assert_eq!(session.current_phase(), Phase::Battle(P2));

    let ship = find(&session, P1, CellState::Ship);
    let outcome = session.attack(ship).unwrap();
    assert_ne!(outcome.result, AttackResult::Miss);
    assert_eq!(session.current_phase(), Phase::Battle(P1));
}

#[test]
fn test_out_of_turn_attack_is_refused() {
    let mut session = placed_hotseat(4);
    let before = session.board(P1).clone();
    let err = session.attack_as(P2, "A1").unwrap_err();
    assert_eq!(
        err,
        SessionError::Transition(TransitionError::NotYourTurn {
            active: P1,
            attempted: P2
        })
    );
    assert_eq!(session.board(P1), &before);
    assert_eq!(session.current_phase(), Phase::Battle(P1));
}

#[test]
fn test_repeat_attack_keeps_the_turn() {
    let mut session = placed_hotseat(5);
    let water = find(&session, P2, CellState::Empty);
    session.attack(water).unwrap();
    let other = find(&session, P1, CellState::Empty);
    session.attack(other).unwrap();
    assert_eq!(
        session.attack(water).unwrap_err(),
        SessionError::Attack(AttackError::AlreadyAttacked(water))
    );
    assert_eq!(session.current_phase(), Phase::Battle(P1));
}

#[test]
fn test_hotseat_game_to_the_end() {
    let mut session = placed_hotseat(6);
    let p2_ships: Vec<Coordinate> = session
        .fleet(P2)
        .unwrap()
        .ships()
        .iter()
        .flat_map(|s| s.coords())
        .collect();
    let p1_water: Vec<Coordinate> = session
        .board(P1)
        .iter()
        .filter(|&(_, cell)| cell == CellState::Empty)
        .map(|(coord, _)| coord)
        .collect();

    for (i, target) in p2_ships.iter().enumerate() {
        session.attack(*target).unwrap();
        if session.is_game_over() {
            assert_eq!(i, p2_ships.len() - 1);
            break;
        }
        session.attack(p1_water[i]).unwrap();
    }

    assert_eq!(session.winner(), Some(P1));
    assert_eq!(
        session.attack(p1_water[0]).unwrap_err(),
        SessionError::Transition(TransitionError::GameOver)
    );
    let view = session.attack_view(P1);
    assert_eq!(view.count(CellState::Sunk), p2_ships.len());

    session.reset();
    assert_eq!(session.current_phase(), Phase::Placement(P1));
    assert!(session.fleet(P1).is_none());
}

#[test]
fn test_attack_view_hides_ships() {
    let session = placed_hotseat(7);
    let view = session.attack_view(P1);
    assert_eq!(view.count(CellState::Empty), 100);
    assert_eq!(view.count(CellState::Ship), 0);
}

#[test]
fn test_transitions_are_pure() {
    let start = SessionState::new(Mode::Hotseat);
    let next = advance_turn(start, TurnEvent::FleetReady(P1)).unwrap();
    assert_eq!(start.phase, Phase::Placement(P1));
    assert_eq!(next.phase, Phase::Placement(P2));
    assert_eq!(next.ready, [true, false]);

    assert!(matches!(
        advance_turn(next, TurnEvent::FleetReady(P1)),
        Err(TransitionError::InvalidEvent { .. })
    ));
    assert!(matches!(
        advance_turn(next, TurnEvent::StartGame),
        Err(TransitionError::InvalidEvent { .. })
    ));

    let over = SessionState {
        phase: Phase::GameOver { winner: P2 },
        ..next
    };
    assert_eq!(
        advance_turn(over, TurnEvent::FleetReady(P2)),
        Err(TransitionError::GameOver)
    );
    assert_eq!(advance_turn(over, TurnEvent::Reset).unwrap(), start);
}

#[test]
fn test_networked_attacker_flow() {
    let local = P1;
    let mut state = SessionState::new(Mode::Networked { local });
    state = advance_turn(state, TurnEvent::FleetReady(P1)).unwrap();
    assert_eq!(state.phase, Phase::AwaitingPlacement(P1));
    state = advance_turn(state, TurnEvent::FleetReady(P2)).unwrap();
    assert_eq!(state.phase, Phase::Battle(P1));
    // START_GAME after both fleets are in is a no-op.
    assert_eq!(advance_turn(state, TurnEvent::StartGame).unwrap(), state);

    let target = at("C3");
    state = advance_turn(state, TurnEvent::AttackSent { attacker: P1, target }).unwrap();
    assert_eq!(state.phase, Phase::Waiting { attacker: P1, target });
    // Still no second shot while waiting.
    assert!(advance_turn(state, TurnEvent::AttackSent { attacker: P1, target }).is_err());

    state = advance_turn(
        state,
        TurnEvent::AttackResolved {
            attacker: P1,
            defender_defeated: false,
        },
    )
    .unwrap();
    assert_eq!(state.phase, Phase::Battle(P2));

    state = advance_turn(
        state,
        TurnEvent::AttackResolved {
            attacker: P2,
            defender_defeated: true,
        },
    )
    .unwrap();
    assert_eq!(state.phase, Phase::GameOver { winner: P2 });
}

#[test]
fn test_networked_session_c3_scenario() {
    let mut rng = SmallRng::seed_from_u64(8);
    let mut host = Session::networked(P1);
    let mut joiner = Session::networked(P2);

    let host_fleet = host.submit_placement(P1, &random_placements(&mut rng)).unwrap();
    let joiner_fleet = joiner.submit_placement(P2, &random_placements(&mut rng)).unwrap();
    assert_eq!(joiner.current_phase(), Phase::AwaitingPlacement(P2));

    host.accept_peer_setup(P2, &joiner_fleet.fleet, &joiner_fleet.board)
        .unwrap();
    joiner
        .accept_peer_setup(P1, &host_fleet.fleet, &host_fleet.board)
        .unwrap();
    assert_eq!(host.current_phase(), Phase::Battle(P1));
    assert_eq!(joiner.current_phase(), Phase::Battle(P1));
    // The peer's ships stay hidden.
    assert_eq!(host.attack_view(P1).count(CellState::Empty), 100);

    // Joiner may not fire out of turn.
    assert!(matches!(
        joiner.begin_attack("A1"),
        Err(SessionError::Transition(TransitionError::NotYourTurn { .. }))
    ));

    // Aim at a joiner ship cell that is not the last of its ship.
    let target = joiner_fleet.fleet.ships()[0].coords().next().unwrap();
    let sent = host.begin_attack(target.to_key().as_str()).unwrap();
    assert_eq!(sent, target);
    assert_eq!(host.current_phase(), Phase::Waiting { attacker: P1, target });

    let outcome = joiner.receive_attack(P1, target.to_key().as_str()).unwrap();
    assert_eq!(outcome.result, AttackResult::Hit);
    assert_eq!(joiner.board(P2).get(target), CellState::Hit);
    assert_eq!(joiner.current_phase(), Phase::Battle(P2));

    host.apply_attack_response(target, outcome.result, &outcome.affected, outcome.game_over)
        .unwrap();
    assert_eq!(host.attack_view(P1).get(target), CellState::Hit);
    assert_eq!(host.current_phase(), Phase::Battle(P2));

    // Known cells are refused locally on the next turn.
    let water = find(&host, P1, CellState::Empty);
    joiner.begin_attack(water).unwrap();
    let reply = host.receive_attack(P2, water).unwrap();
    joiner
        .apply_attack_response(water, reply.result, &reply.affected, reply.game_over)
        .unwrap();
    assert_eq!(
        host.begin_attack(target).unwrap_err(),
        SessionError::Attack(AttackError::AlreadyAttacked(target))
    );
    assert_eq!(host.current_phase(), Phase::Battle(P1));
}

#[test]
fn test_rejected_sink_report_keeps_waiting_for_the_real_one() {
    let mut rng = SmallRng::seed_from_u64(10);
    let mut host = Session::networked(P1);
    host.submit_placement(P1, &random_placements(&mut rng)).unwrap();
    let mut peer = Session::hotseat();
    peer.submit_placement(P1, &random_placements(&mut rng)).unwrap();
    let joiner = peer.submit_placement(P2, &random_placements(&mut rng)).unwrap();
    host.accept_peer_setup(P2, &joiner.fleet, &joiner.board).unwrap();

    host.begin_attack("A1").unwrap();
    host.apply_attack_response(at("A1"), AttackResult::Miss, &[at("A1")], false)
        .unwrap();
    let water = find(&host, P1, CellState::Empty);
    host.receive_attack(P2, water).unwrap();

    host.begin_attack("B1").unwrap();
    let waiting = Phase::Waiting {
        attacker: P1,
        target: at("B1"),
    };
    assert!(host
        .apply_attack_response(at("B1"), AttackResult::Sunk, &[at("A1"), at("B1")], false)
        .is_err());
    assert!(host
        .apply_attack_response(at("B1"), AttackResult::Sunk, &[at("C1")], false)
        .is_err());
    assert_eq!(host.attack_view(P1).get(at("B1")), CellState::Empty);
    assert_eq!(host.attack_view(P1).get(at("A1")), CellState::Miss);
    assert_eq!(host.current_phase(), waiting);

    host.apply_attack_response(at("B1"), AttackResult::Hit, &[at("B1")], false)
        .unwrap();
    assert_eq!(host.attack_view(P1).get(at("B1")), CellState::Hit);
    assert_eq!(host.current_phase(), Phase::Battle(P2));
}

#[test]
fn test_mismatched_peer_board_is_refused() {
    let mut rng = SmallRng::seed_from_u64(9);
    let mut host = Session::networked(P1);
    let mut joiner = Session::hotseat();
    let a = joiner.submit_placement(P1, &random_placements(&mut rng)).unwrap();
    let b = joiner.submit_placement(P2, &random_placements(&mut rng)).unwrap();
    assert_eq!(
        host.accept_peer_setup(P2, &a.fleet, &b.board),
        Err(SessionError::SetupMismatch)
    );
    assert_eq!(
        host.accept_peer_setup(P1, &a.fleet, &a.board).unwrap_err(),
        SessionError::Transition(TransitionError::InvalidEvent {
            phase: Phase::Placement(P1),
            event: "peer setup for the local seat",
        })
    );
}
