//! Turn and session state machine.
//!
//! [`advance_turn`] is the pure transition function over a small `Copy`
//! [`SessionState`]. [`Session`] owns the boards and fleets of one game
//! instance and funnels every mutation through placement validation, the
//! attack resolver, and `advance_turn`, in that order, so a rejected
//! request never leaves partial state behind.

use core::fmt;

use crate::attack::{resolve_attack, AttackOutcome};
use crate::board::{Board, TrackingBoard};
use crate::common::{AttackError, AttackResult, BoardError, PlacementError};
use crate::coord::Coordinate;
use crate::placement::{validate_placement, Placement, ShipPlacement};
use crate::ship::Fleet;

/// One of the two seats. In networked play the host is `One`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PlayerId {
    One,
    Two,
}

impl PlayerId {
    pub const fn other(self) -> Self {
        match self {
            PlayerId::One => PlayerId::Two,
            PlayerId::Two => PlayerId::One,
        }
    }

    /// 1 or 2, as used on the wire.
    pub const fn number(self) -> u8 {
        match self {
            PlayerId::One => 1,
            PlayerId::Two => 2,
        }
    }

    pub const fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(PlayerId::One),
            2 => Some(PlayerId::Two),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            PlayerId::One => 0,
            PlayerId::Two => 1,
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.number())
    }
}

#[cfg(feature = "std")]
impl serde::Serialize for PlayerId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.number())
    }
}

#[cfg(feature = "std")]
impl<'de> serde::Deserialize<'de> for PlayerId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let number = u8::deserialize(deserializer)?;
        PlayerId::from_number(number)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown player {}", number)))
    }
}

/// How the two players are connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Both players share this process.
    Hotseat,
    /// This process controls `local`; the opponent is a remote peer.
    Networked { local: PlayerId },
}

/// Where the game is. Every variant names the player it concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The player is placing ships.
    Placement(PlayerId),
    /// The local player's fleet is submitted; the peer's is outstanding.
    AwaitingPlacement(PlayerId),
    /// The player may attack.
    Battle(PlayerId),
    /// The local attack on `target` is waiting for the defender's verdict.
    Waiting { attacker: PlayerId, target: Coordinate },
    GameOver { winner: PlayerId },
}

impl Phase {
    /// The player the phase is about: placer, attacker or winner.
    pub const fn active_player(self) -> PlayerId {
        match self {
            Phase::Placement(p) | Phase::AwaitingPlacement(p) | Phase::Battle(p) => p,
            Phase::Waiting { attacker, .. } => attacker,
            Phase::GameOver { winner } => winner,
        }
    }
}

/// Inputs to [`advance_turn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnEvent {
    /// The player's fleet passed validation.
    FleetReady(PlayerId),
    /// The peer confirmed that both fleets are in.
    StartGame,
    /// Networked only: the local attack left for the defender.
    AttackSent { attacker: PlayerId, target: Coordinate },
    /// An attack by `attacker` has been resolved by the board's owner.
    AttackResolved {
        attacker: PlayerId,
        defender_defeated: bool,
    },
    Reset,
}

impl TurnEvent {
    fn name(self) -> &'static str {
        match self {
            TurnEvent::FleetReady(_) => "FleetReady",
            TurnEvent::StartGame => "StartGame",
            TurnEvent::AttackSent { .. } => "AttackSent",
            TurnEvent::AttackResolved { .. } => "AttackResolved",
            TurnEvent::Reset => "Reset",
        }
    }
}

/// Rejections from [`advance_turn`]. A rejected event changes nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("it is {active}'s turn, not {attempted}'s")]
    NotYourTurn {
        active: PlayerId,
        attempted: PlayerId,
    },
    #[error("the game is over; only a reset is accepted")]
    GameOver,
    #[error("{event} is not valid during {phase:?}")]
    InvalidEvent { phase: Phase, event: &'static str },
}

/// The part of a session the state machine reasons about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    pub mode: Mode,
    pub phase: Phase,
    /// Whose fleets have passed validation, indexed by [`PlayerId::index`].
    pub ready: [bool; 2],
}

impl SessionState {
    /// Fresh game: the first player to place is Player 1 in hotseat play
    /// and the local player in networked play.
    pub const fn new(mode: Mode) -> Self {
        let first = match mode {
            Mode::Hotseat => PlayerId::One,
            Mode::Networked { local } => local,
        };
        SessionState {
            mode,
            phase: Phase::Placement(first),
            ready: [false, false],
        }
    }

    fn both_ready(&self) -> bool {
        self.ready[0] && self.ready[1]
    }
}

/// Apply `event` to `state`, returning the next state.
pub fn advance_turn(
    state: SessionState,
    event: TurnEvent,
) -> Result<SessionState, TransitionError> {
    if event == TurnEvent::Reset {
        return Ok(SessionState::new(state.mode));
    }
    if let Phase::GameOver { .. } = state.phase {
        return Err(TransitionError::GameOver);
    }
    let invalid = TransitionError::InvalidEvent {
        phase: state.phase,
        event: event.name(),
    };
    let mut next = state;

    match event {
        TurnEvent::FleetReady(player) => {
            if state.ready[player.index()] {
                return Err(invalid);
            }
            match (state.mode, state.phase) {
                (Mode::Hotseat, Phase::Placement(p)) if p == player => {
                    next.phase = Phase::Placement(player.other());
                }
                (Mode::Hotseat, Phase::Placement(p)) => {
                    return Err(TransitionError::NotYourTurn {
                        active: p,
                        attempted: player,
                    })
                }
                (Mode::Networked { local }, Phase::Placement(_)) if player == local => {
                    next.phase = Phase::AwaitingPlacement(local);
                }
                (Mode::Networked { local }, Phase::Placement(_) | Phase::AwaitingPlacement(_))
                    if player != local => {}
                _ => return Err(invalid),
            }
            next.ready[player.index()] = true;
            if next.both_ready() {
                next.phase = Phase::Battle(PlayerId::One);
            }
        }
        TurnEvent::StartGame => {
            if !state.both_ready() || state.mode == Mode::Hotseat {
                return Err(invalid);
            }
            if let Phase::Placement(_) | Phase::AwaitingPlacement(_) = state.phase {
                next.phase = Phase::Battle(PlayerId::One);
            }
        }
        TurnEvent::AttackSent { attacker, target } => {
            let Mode::Networked { local } = state.mode else {
                return Err(invalid);
            };
            match state.phase {
                Phase::Battle(p) if p != attacker => {
                    return Err(TransitionError::NotYourTurn {
                        active: p,
                        attempted: attacker,
                    })
                }
                Phase::Battle(_) if attacker == local => {
                    next.phase = Phase::Waiting { attacker, target };
                }
                _ => return Err(invalid),
            }
        }
        TurnEvent::AttackResolved {
            attacker,
            defender_defeated,
        } => {
            match (state.mode, state.phase) {
                (_, Phase::Battle(p)) | (_, Phase::Waiting { attacker: p, .. })
                    if p != attacker =>
                {
                    return Err(TransitionError::NotYourTurn {
                        active: p,
                        attempted: attacker,
                    })
                }
                (Mode::Hotseat, Phase::Battle(_)) => {}
                // The defender resolves the remote attacker's shot directly.
                (Mode::Networked { local }, Phase::Battle(_)) if attacker != local => {}
                (Mode::Networked { .. }, Phase::Waiting { .. }) => {}
                _ => return Err(invalid),
            }
            next.phase = if defender_defeated {
                Phase::GameOver { winner: attacker }
            } else {
                Phase::Battle(attacker.other())
            };
        }
        TurnEvent::Reset => next = SessionState::new(state.mode),
    }

    log::debug!("{:?} --{}--> {:?}", state.phase, event.name(), next.phase);
    Ok(next)
}

/// Errors surfaced by [`Session`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Placement(#[from] PlacementError),
    #[error(transparent)]
    Attack(#[from] AttackError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error("{0} has not placed a fleet")]
    MissingFleet(PlayerId),
    #[error("peer board does not match its fleet")]
    SetupMismatch,
    #[error("operation is only available in {0} mode")]
    WrongMode(&'static str),
}

/// One game instance. Owns every board and fleet it knows about; nothing
/// is shared with other sessions.
#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
    boards: [Board; 2],
    fleets: [Option<Fleet>; 2],
    /// Networked only: what the local player has learned of the peer.
    view: TrackingBoard,
}

impl Session {
    pub fn new(mode: Mode) -> Self {
        Session {
            state: SessionState::new(mode),
            boards: [Board::new(), Board::new()],
            fleets: [None, None],
            view: TrackingBoard::new(),
        }
    }

    pub fn hotseat() -> Self {
        Self::new(Mode::Hotseat)
    }

    pub fn networked(local: PlayerId) -> Self {
        Self::new(Mode::Networked { local })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn current_phase(&self) -> Phase {
        self.state.phase
    }

    pub fn active_player(&self) -> PlayerId {
        self.state.phase.active_player()
    }

    pub fn winner(&self) -> Option<PlayerId> {
        match self.state.phase {
            Phase::GameOver { winner } => Some(winner),
            _ => None,
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.winner().is_some()
    }

    /// The player's own board. In networked play the peer's board is never
    /// known, so this is blank for the remote seat.
    pub fn board(&self, player: PlayerId) -> &Board {
        &self.boards[player.index()]
    }

    pub fn fleet(&self, player: PlayerId) -> Option<&Fleet> {
        self.fleets[player.index()].as_ref()
    }

    /// What `player` knows about the opponent's board.
    pub fn attack_view(&self, player: PlayerId) -> TrackingBoard {
        match self.state.mode {
            Mode::Networked { local } if local == player => self.view.clone(),
            _ => self.boards[player.other().index()].attack_view(),
        }
    }

    /// Validate and store `player`'s fleet. Nothing changes on rejection.
    pub fn submit_placement(
        &mut self,
        player: PlayerId,
        candidates: &[ShipPlacement],
    ) -> Result<Placement, SessionError> {
        let placement = validate_placement(candidates)?;
        if let Mode::Networked { local } = self.state.mode {
            if player != local {
                return Err(TransitionError::InvalidEvent {
                    phase: self.state.phase,
                    event: "local placement for the remote seat",
                }
                .into());
            }
        }
        self.state = advance_turn(self.state, TurnEvent::FleetReady(player))?;
        log::info!("{} fleet ready", player);
        self.boards[player.index()] = placement.board.clone();
        self.fleets[player.index()] = Some(placement.fleet.clone());
        Ok(placement)
    }

    /// Hotseat: the active player attacks the other player's board.
    pub fn attack<T>(&mut self, target: T) -> Result<AttackOutcome, SessionError>
    where
        T: TryInto<Coordinate>,
    {
        self.attack_as(self.active_player(), target)
    }

    /// Hotseat: `attacker` attacks the other player's board. Rejected unless
    /// `attacker` holds the turn.
    pub fn attack_as<T>(
        &mut self,
        attacker: PlayerId,
        target: T,
    ) -> Result<AttackOutcome, SessionError>
    where
        T: TryInto<Coordinate>,
    {
        if self.state.mode != Mode::Hotseat {
            return Err(SessionError::WrongMode("hotseat"));
        }
        self.resolve_incoming(attacker, target)
    }

    /// Networked: check a local attack and move to `Waiting`. Invalid or
    /// already known targets are refused without a transition, so the
    /// caller sends nothing.
    pub fn begin_attack<T>(&mut self, target: T) -> Result<Coordinate, SessionError>
    where
        T: TryInto<Coordinate>,
    {
        let Mode::Networked { local } = self.state.mode else {
            return Err(SessionError::WrongMode("networked"));
        };
        match self.state.phase {
            Phase::Battle(p) if p == local => {}
            Phase::Battle(p) => {
                return Err(TransitionError::NotYourTurn {
                    active: p,
                    attempted: local,
                }
                .into())
            }
            Phase::GameOver { .. } => return Err(TransitionError::GameOver.into()),
            phase => {
                return Err(TransitionError::InvalidEvent {
                    phase,
                    event: "AttackSent",
                }
                .into())
            }
        }
        let target = target.try_into().map_err(|_| AttackError::InvalidTarget)?;
        if self.view.is_known(target) {
            log::debug!("{} already attacked, not sending", target);
            return Err(AttackError::AlreadyAttacked(target).into());
        }
        self.state = advance_turn(
            self.state,
            TurnEvent::AttackSent {
                attacker: local,
                target,
            },
        )?;
        Ok(target)
    }

    /// Networked: resolve the peer's attack against the local board, which
    /// only this side may do.
    pub fn receive_attack<T>(
        &mut self,
        attacker: PlayerId,
        target: T,
    ) -> Result<AttackOutcome, SessionError>
    where
        T: TryInto<Coordinate>,
    {
        match self.state.mode {
            Mode::Networked { local } if attacker != local => {
                self.resolve_incoming(attacker, target)
            }
            Mode::Networked { .. } => Err(TransitionError::InvalidEvent {
                phase: self.state.phase,
                event: "remote attack from the local seat",
            }
            .into()),
            Mode::Hotseat => Err(SessionError::WrongMode("networked")),
        }
    }

    fn resolve_incoming<T>(
        &mut self,
        attacker: PlayerId,
        target: T,
    ) -> Result<AttackOutcome, SessionError>
    where
        T: TryInto<Coordinate>,
    {
        // Dry run: the transition must be legal before anything is touched.
        advance_turn(
            self.state,
            TurnEvent::AttackResolved {
                attacker,
                defender_defeated: false,
            },
        )?;
        let defender = attacker.other();
        let fleet = self.fleets[defender.index()]
            .as_mut()
            .ok_or(SessionError::MissingFleet(defender))?;
        let outcome = resolve_attack(&mut self.boards[defender.index()], fleet, target)?;
        self.state = advance_turn(
            self.state,
            TurnEvent::AttackResolved {
                attacker,
                defender_defeated: outcome.game_over,
            },
        )?;
        log::info!("{} attacked {}: {:?}", attacker, outcome.target, outcome.result);
        Ok(outcome)
    }

    /// Networked: apply the defender's verdict on the in-flight attack.
    pub fn apply_attack_response(
        &mut self,
        target: Coordinate,
        result: AttackResult,
        affected: &[Coordinate],
        check_end: bool,
    ) -> Result<(), SessionError> {
        let attacker = match self.state.phase {
            Phase::Waiting {
                attacker,
                target: pending,
            } if pending == target => attacker,
            phase => {
                return Err(TransitionError::InvalidEvent {
                    phase,
                    event: "AttackResolved",
                }
                .into())
            }
        };
        let next = advance_turn(
            self.state,
            TurnEvent::AttackResolved {
                attacker,
                defender_defeated: check_end,
            },
        )?;
        self.view.record(target, result, affected)?;
        self.state = next;
        log::info!("attack on {}: {:?}", target, result);
        Ok(())
    }

    /// Networked: accept the peer's SETUP_DATA. The fleet is re-validated
    /// and must match the board it came with. The peer's ship positions
    /// are not kept.
    pub fn accept_peer_setup(
        &mut self,
        player: PlayerId,
        fleet: &Fleet,
        board: &Board,
    ) -> Result<(), SessionError> {
        match self.state.mode {
            Mode::Networked { local } if player != local => {}
            Mode::Networked { .. } => {
                return Err(TransitionError::InvalidEvent {
                    phase: self.state.phase,
                    event: "peer setup for the local seat",
                }
                .into())
            }
            Mode::Hotseat => return Err(SessionError::WrongMode("networked")),
        }
        let candidates: alloc::vec::Vec<ShipPlacement> =
            fleet.ships().iter().map(ShipPlacement::from_ship).collect();
        let placement = validate_placement(&candidates)?;
        if placement.board != *board {
            return Err(SessionError::SetupMismatch);
        }
        self.state = advance_turn(self.state, TurnEvent::FleetReady(player))?;
        log::info!("{} fleet received", player);
        Ok(())
    }

    /// Networked: the peer says both fleets are in.
    pub fn start_game(&mut self) -> Result<(), SessionError> {
        self.state = advance_turn(self.state, TurnEvent::StartGame)?;
        Ok(())
    }

    /// Throw everything away and start over in the same mode.
    pub fn reset(&mut self) {
        *self = Session::new(self.state.mode);
    }
}
