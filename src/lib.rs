#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod attack;
mod bitboard;
mod board;
mod common;
mod config;
mod coord;
mod placement;
pub mod prelude;
mod session;
mod ship;
#[cfg(feature = "std")]
pub mod cli;
#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
pub mod node;
#[cfg(feature = "std")]
pub mod protocol;
#[cfg(feature = "std")]
pub mod transport;

pub use attack::*;
pub use bitboard::{BitBoard, BitBoardError, GridMask};
pub use board::*;
pub use common::*;
pub use config::*;
pub use coord::*;
pub use placement::*;
pub use session::*;
pub use ship::*;
#[cfg(feature = "std")]
pub use logging::init_logging;
#[cfg(feature = "std")]
pub use node::{NodeError, NodeUpdate, PeerNode};
#[cfg(feature = "std")]
pub use protocol::{Message, ProtocolError};
#[cfg(feature = "std")]
pub use transport::tcp::{connect_as_client, connect_as_host, HostListener, TcpChannel};
#[cfg(feature = "std")]
pub use transport::{spawn_listener, Channel, NetConfig, NetEvent, NetworkError};
