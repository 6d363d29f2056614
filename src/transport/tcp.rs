#![cfg(feature = "std")]

use std::future::Future;
use std::net::SocketAddr;

use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::time::timeout;

use crate::transport::{Channel, NetConfig, NetworkError};

pub type TcpChannel = Channel<OwnedReadHalf, OwnedWriteHalf>;

impl TcpChannel {
    pub fn from_stream(stream: TcpStream, config: &NetConfig) -> Self {
        if let Err(e) = stream.set_nodelay(true) {
            log::warn!("failed to set TCP_NODELAY: {}", e);
        }
        let (reader, writer) = stream.into_split();
        Channel::new(reader, writer, config)
    }
}

async fn limited<F, T>(config: &NetConfig, what: &str, fut: F) -> Result<T, NetworkError>
where
    F: Future<Output = std::io::Result<T>>,
{
    let result = match config.connect_timeout {
        Some(limit) => timeout(limit, fut)
            .await
            .map_err(|_| {
                NetworkError::ConnectFailed(format!("{} timed out after {:?}", what, limit))
            })?,
        None => fut.await,
    };
    result.map_err(|e| NetworkError::ConnectFailed(format!("{}: {}", what, e)))
}

/// A bound host socket waiting for its single peer.
pub struct HostListener {
    listener: TcpListener,
}

impl HostListener {
    pub async fn bind<A: ToSocketAddrs>(addr: A) -> Result<Self, NetworkError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| NetworkError::ConnectFailed(format!("bind: {}", e)))?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, NetworkError> {
        self.listener
            .local_addr()
            .map_err(|e| NetworkError::ConnectFailed(format!("local address: {}", e)))
    }

    /// Accept exactly one peer. The listening socket is closed afterwards.
    pub async fn accept(
        self,
        config: &NetConfig,
    ) -> Result<(TcpChannel, SocketAddr), NetworkError> {
        let (stream, peer) = limited(config, "accept", self.listener.accept()).await?;
        log::info!("peer connected from {}", peer);
        Ok((TcpChannel::from_stream(stream, config), peer))
    }
}

/// Bind `addr`, wait for one peer, and stop listening.
pub async fn connect_as_host<A: ToSocketAddrs>(
    addr: A,
    config: &NetConfig,
) -> Result<(TcpChannel, SocketAddr), NetworkError> {
    let host = HostListener::bind(addr).await?;
    log::info!("waiting for a peer on {}", host.local_addr()?);
    host.accept(config).await
}

/// Connect to a waiting host.
pub async fn connect_as_client<A: ToSocketAddrs>(
    addr: A,
    config: &NetConfig,
) -> Result<TcpChannel, NetworkError> {
    let stream = limited(config, "connect", TcpStream::connect(addr)).await?;
    if let Ok(peer) = stream.peer_addr() {
        log::info!("connected to {}", peer);
    }
    Ok(TcpChannel::from_stream(stream, config))
}
