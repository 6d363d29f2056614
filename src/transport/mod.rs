#![cfg(feature = "std")]

//! Network plumbing between two peers: framing, the send/receive seam, and
//! the listener task that feeds decoded messages to the control task.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::config::MAX_FRAME_LEN;
use crate::protocol::Message;

pub mod frame;
pub mod tcp;

pub use frame::{FrameReader, FrameWriter};

/// Failures of the connection itself. Any of these ends the session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    #[error("connect failed: {0}")]
    ConnectFailed(String),
    #[error("send failed: {0}")]
    SendFailed(String),
    #[error("receive failed: {0}")]
    ReceiveFailed(String),
}

/// Runtime network settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetConfig {
    /// Largest frame body accepted or sent.
    pub max_frame_len: usize,
    /// Limit on connect and accept. `None` waits forever.
    pub connect_timeout: Option<Duration>,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            max_frame_len: MAX_FRAME_LEN,
            connect_timeout: None,
        }
    }
}

/// What the listener hands to the control task.
#[derive(Debug, Clone, PartialEq)]
pub enum NetEvent {
    Message(Message),
    /// The connection is gone. Sent once, after which the listener exits.
    Disconnected(NetworkError),
}

#[async_trait::async_trait]
pub trait MessageSink: Send {
    async fn send(&mut self, msg: &Message) -> Result<(), NetworkError>;
}

#[async_trait::async_trait]
pub trait MessageSource: Send {
    async fn recv(&mut self) -> Result<Message, NetworkError>;
}

#[async_trait::async_trait]
impl<W> MessageSink for FrameWriter<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, msg: &Message) -> Result<(), NetworkError> {
        self.write_message(msg).await
    }
}

#[async_trait::async_trait]
impl<R> MessageSource for FrameReader<R>
where
    R: AsyncRead + Unpin + Send,
{
    async fn recv(&mut self) -> Result<Message, NetworkError> {
        self.read_message().await
    }
}

/// Run the receive loop on a background task. Every message is queued in
/// arrival order; the first failure is queued as `Disconnected` and ends
/// the task.
pub fn spawn_listener<S>(mut source: S, tx: UnboundedSender<NetEvent>) -> JoinHandle<()>
where
    S: MessageSource + 'static,
{
    tokio::spawn(async move {
        log::debug!("listener started");
        loop {
            match source.recv().await {
                Ok(msg) => {
                    log::debug!("received {}", msg.command());
                    if tx.send(NetEvent::Message(msg)).is_err() {
                        log::debug!("event queue closed, listener exiting");
                        return;
                    }
                }
                Err(err) => {
                    log::warn!("connection lost: {}", err);
                    let _ = tx.send(NetEvent::Disconnected(err));
                    return;
                }
            }
        }
    })
}

/// Both halves of one framed connection.
pub struct Channel<R, W> {
    reader: FrameReader<R>,
    writer: FrameWriter<W>,
}

impl<R, W> Channel<R, W>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W, config: &NetConfig) -> Self {
        Self {
            reader: FrameReader::new(reader, config.max_frame_len),
            writer: FrameWriter::new(writer, config.max_frame_len),
        }
    }

    /// Move the reader onto a listener task feeding `tx` and keep the
    /// writer for the caller.
    pub fn spawn_receive_loop(
        self,
        tx: UnboundedSender<NetEvent>,
    ) -> (FrameWriter<W>, JoinHandle<()>) {
        let handle = spawn_listener(self.reader, tx);
        (self.writer, handle)
    }
}
