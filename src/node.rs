#![cfg(feature = "std")]

//! The control task's view of a networked game.
//!
//! A [`PeerNode`] is the only writer of its [`Session`]. The listener task
//! never touches game state: it queues [`NetEvent`]s and the node applies
//! them one at a time through [`PeerNode::handle_event`].

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;

use crate::attack::AttackOutcome;
use crate::common::{AttackError, AttackResult};
use crate::coord::Coordinate;
use crate::placement::{Placement, ShipPlacement};
use crate::protocol::Message;
use crate::session::{Phase, PlayerId, Session, SessionError};
use crate::transport::{Channel, FrameWriter, MessageSink, NetEvent, NetworkError};

/// What a processed event changed, for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeUpdate {
    /// Nothing visible changed: a dropped or redundant message.
    Ignored,
    /// The peer's fleet is in.
    PeerReady,
    /// Both fleets are in and Player 1 may attack.
    BattleStarted,
    /// The peer attacked the local board.
    Defended(AttackOutcome),
    /// The peer answered the local attack.
    Resolved {
        target: Coordinate,
        result: AttackResult,
        affected: Vec<Coordinate>,
    },
    /// The connection is gone and the session has been reset.
    Disconnected(NetworkError),
}

#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("peer disconnected: {0}")]
    Disconnected(NetworkError),
    #[error("not connected")]
    NotConnected,
}

pub struct PeerNode<W> {
    session: Session,
    local: PlayerId,
    writer: Option<W>,
    listener: Option<JoinHandle<()>>,
}

impl<W> PeerNode<FrameWriter<W>>
where
    W: AsyncWrite + Unpin + Send,
{
    /// Start the listener for `channel` and return the node together with
    /// the queue it feeds.
    pub fn start<R>(channel: Channel<R, W>, local: PlayerId) -> (Self, UnboundedReceiver<NetEvent>)
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let (writer, listener) = channel.spawn_receive_loop(tx);
        (PeerNode::new(local, writer, Some(listener)), rx)
    }
}

impl<W: MessageSink> PeerNode<W> {
    pub fn new(local: PlayerId, writer: W, listener: Option<JoinHandle<()>>) -> Self {
        Self {
            session: Session::networked(local),
            local,
            writer: Some(writer),
            listener,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn local(&self) -> PlayerId {
        self.local
    }

    pub fn is_connected(&self) -> bool {
        self.writer.is_some()
    }

    /// Whether the local player may attack now.
    pub fn my_turn(&self) -> bool {
        self.session.current_phase() == Phase::Battle(self.local)
    }

    /// Validate the local fleet and announce it. If the peer's fleet is
    /// already in, the battle starts and the peer is told so.
    pub async fn submit_placement(
        &mut self,
        candidates: &[ShipPlacement],
    ) -> Result<Placement, NodeError> {
        if !self.is_connected() {
            return Err(NodeError::NotConnected);
        }
        let placement = self.session.submit_placement(self.local, candidates)?;
        self.send(&Message::setup(self.local, &placement)).await?;
        if matches!(self.session.current_phase(), Phase::Battle(_)) {
            self.send(&Message::StartGame).await?;
        }
        Ok(placement)
    }

    /// Fire at `target`. Invalid or already known targets are refused
    /// before anything is sent.
    pub async fn request_attack<T>(&mut self, target: T) -> Result<Coordinate, NodeError>
    where
        T: TryInto<Coordinate>,
    {
        if !self.is_connected() {
            return Err(NodeError::NotConnected);
        }
        let target = self.session.begin_attack(target)?;
        self.send(&Message::attack(self.local, target)).await?;
        Ok(target)
    }

    /// Apply one event from the listener queue.
    pub async fn handle_event(&mut self, event: NetEvent) -> NodeUpdate {
        let msg = match event {
            NetEvent::Message(msg) => msg,
            NetEvent::Disconnected(err) => {
                self.teardown();
                return NodeUpdate::Disconnected(err);
            }
        };
        if !self.is_connected() {
            log::debug!("dropping {} after disconnect", msg.command());
            return NodeUpdate::Ignored;
        }
        match self.apply(msg).await {
            Ok(update) => update,
            Err(NodeError::Disconnected(err)) => NodeUpdate::Disconnected(err),
            Err(e) => {
                log::warn!("dropping message: {}", e);
                NodeUpdate::Ignored
            }
        }
    }

    async fn apply(&mut self, msg: Message) -> Result<NodeUpdate, NodeError> {
        match msg {
            Message::SetupData {
                player,
                ship_data,
                board_data,
            } => {
                self.session.accept_peer_setup(player, &ship_data, &board_data)?;
                if matches!(self.session.current_phase(), Phase::Battle(_)) {
                    self.send(&Message::StartGame).await?;
                    return Ok(NodeUpdate::BattleStarted);
                }
                Ok(NodeUpdate::PeerReady)
            }
            Message::StartGame => {
                let before = self.session.current_phase();
                self.session.start_game()?;
                if before == self.session.current_phase() {
                    log::debug!("START_GAME while already in {:?}", before);
                    return Ok(NodeUpdate::Ignored);
                }
                Ok(NodeUpdate::BattleStarted)
            }
            Message::Attack { target, attacker } => {
                let outcome = self.session.receive_attack(attacker, target.as_str())?;
                self.send(&Message::response(&outcome)).await?;
                Ok(NodeUpdate::Defended(outcome))
            }
            Message::AttackResponse {
                target,
                result,
                effected_ships,
                check_end,
            } => {
                let target = Coordinate::from_key(&target).map_err(|e| {
                    log::warn!("response for unreadable target: {}", e);
                    SessionError::from(AttackError::InvalidTarget)
                })?;
                self.session
                    .apply_attack_response(target, result, &effected_ships, check_end)?;
                Ok(NodeUpdate::Resolved {
                    target,
                    result,
                    affected: effected_ships,
                })
            }
        }
    }

    async fn send(&mut self, msg: &Message) -> Result<(), NodeError> {
        let writer = self.writer.as_mut().ok_or(NodeError::NotConnected)?;
        let sent = writer.send(msg).await;
        if let Err(err) = sent {
            log::warn!("send of {} failed: {}", msg.command(), err);
            self.teardown();
            return Err(NodeError::Disconnected(err));
        }
        Ok(())
    }

    /// Drop the connection and start the session over.
    fn teardown(&mut self) {
        if self.writer.take().is_some() {
            log::info!("disconnected, resetting session");
        }
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
        self.session.reset();
    }
}

impl<W> Drop for PeerNode<W> {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }
}
