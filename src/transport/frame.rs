#![cfg(feature = "std")]

//! Length-prefixed framing.
//!
//! ```text
//! +---------------------------+-------------------+
//! | Length (10 bytes, ASCII)  | JSON body         |
//! | decimal, space padded     | (Length bytes)    |
//! +---------------------------+-------------------+
//! ```

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::config::FRAME_HEADER_LEN;
use crate::protocol::{self, Message, ProtocolError};
use crate::transport::NetworkError;

/// Header for a body of `len` bytes: decimal, left-justified, space padded.
pub fn encode_header(len: usize) -> Result<[u8; FRAME_HEADER_LEN], NetworkError> {
    let text = format!("{:<width$}", len, width = FRAME_HEADER_LEN);
    if text.len() != FRAME_HEADER_LEN {
        return Err(NetworkError::SendFailed(format!(
            "length {} does not fit the frame header",
            len
        )));
    }
    let mut header = [b' '; FRAME_HEADER_LEN];
    header.copy_from_slice(text.as_bytes());
    Ok(header)
}

/// Parse a frame header into a body length in `1..=max_len`.
pub fn parse_header(header: &[u8], max_len: usize) -> Result<usize, NetworkError> {
    let text = std::str::from_utf8(header)
        .map_err(|_| NetworkError::ReceiveFailed("frame header is not ASCII".to_string()))?;
    let len: usize = text.trim().parse().map_err(|_| {
        NetworkError::ReceiveFailed(format!("invalid frame header {:?}", text))
    })?;
    if len == 0 {
        return Err(NetworkError::ReceiveFailed("empty frame".to_string()));
    }
    if len > max_len {
        return Err(NetworkError::ReceiveFailed(format!(
            "frame too large: {} bytes (max: {})",
            len, max_len
        )));
    }
    Ok(len)
}

fn read_error(e: std::io::Error) -> NetworkError {
    match e.kind() {
        std::io::ErrorKind::UnexpectedEof => {
            NetworkError::ReceiveFailed("connection closed by peer".to_string())
        }
        std::io::ErrorKind::ConnectionReset => {
            NetworkError::ReceiveFailed("connection reset by peer".to_string())
        }
        _ => NetworkError::ReceiveFailed(format!("read error: {}", e)),
    }
}

fn write_error(e: std::io::Error) -> NetworkError {
    match e.kind() {
        std::io::ErrorKind::BrokenPipe | std::io::ErrorKind::ConnectionReset => {
            NetworkError::SendFailed("connection closed by peer".to_string())
        }
        _ => NetworkError::SendFailed(format!("write error: {}", e)),
    }
}

/// Reading half of a framed connection.
pub struct FrameReader<R> {
    inner: R,
    max_len: usize,
}

impl<R> FrameReader<R>
where
    R: AsyncRead + Unpin + Send,
{
    pub fn new(inner: R, max_len: usize) -> Self {
        Self { inner, max_len }
    }

    /// Read one complete body. `read_exact` loops over partial reads.
    pub async fn read_frame(&mut self) -> Result<Vec<u8>, NetworkError> {
        let mut header = [0u8; FRAME_HEADER_LEN];
        self.inner.read_exact(&mut header).await.map_err(read_error)?;
        let len = parse_header(&header, self.max_len)?;
        let mut body = vec![0u8; len];
        self.inner.read_exact(&mut body).await.map_err(read_error)?;
        Ok(body)
    }

    /// Next message the protocol understands. Unknown commands are logged
    /// and skipped; malformed bodies end the connection.
    pub async fn read_message(&mut self) -> Result<Message, NetworkError> {
        loop {
            let body = self.read_frame().await?;
            match protocol::decode(&body) {
                Ok(msg) => return Ok(msg),
                Err(ProtocolError::UnknownCommand(command)) => {
                    log::warn!("skipping unknown command {:?}", command);
                }
                Err(e) => return Err(NetworkError::ReceiveFailed(e.to_string())),
            }
        }
    }
}

/// Writing half of a framed connection.
pub struct FrameWriter<W> {
    inner: W,
    max_len: usize,
}

impl<W> FrameWriter<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(inner: W, max_len: usize) -> Self {
        Self { inner, max_len }
    }

    pub async fn write_frame(&mut self, body: &[u8]) -> Result<(), NetworkError> {
        if body.is_empty() {
            return Err(NetworkError::SendFailed("empty frame".to_string()));
        }
        if body.len() > self.max_len {
            return Err(NetworkError::SendFailed(format!(
                "frame too large: {} bytes (max: {})",
                body.len(),
                self.max_len
            )));
        }
        let header = encode_header(body.len())?;
        self.inner.write_all(&header).await.map_err(write_error)?;
        self.inner.write_all(body).await.map_err(write_error)?;
        self.inner.flush().await.map_err(write_error)
    }

    pub async fn write_message(&mut self, msg: &Message) -> Result<(), NetworkError> {
        let body = protocol::encode(msg).map_err(|e| NetworkError::SendFailed(e.to_string()))?;
        log::debug!("sending {} ({} bytes)", msg.command(), body.len());
        self.write_frame(&body).await
    }
}
