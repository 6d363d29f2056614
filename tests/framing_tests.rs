#![cfg(feature = "std")]

use broadside::protocol::Message;
use broadside::transport::{FrameReader, FrameWriter, NetworkError};
use broadside::{Coordinate, PlayerId, MAX_FRAME_LEN};
use tokio::io::{duplex, AsyncWriteExt};

#[tokio::test(flavor = "multi_thread")]
async fn test_frame_roundtrip_over_one_byte_pipe() {
    // A one-byte buffer forces every read to come back short.
    let (a, b) = duplex(1);
    let mut writer = FrameWriter::new(a, MAX_FRAME_LEN);
    let mut reader = FrameReader::new(b, MAX_FRAME_LEN);

    let sent = vec![
        Message::attack(PlayerId::Two, Coordinate::from_key("J10").unwrap()),
        Message::StartGame,
    ];
    let to_send = sent.clone();
    let send = tokio::spawn(async move {
        for msg in &to_send {
            writer.write_message(msg).await.unwrap();
        }
    });

    let mut received = Vec::new();
    for _ in 0..sent.len() {
        received.push(reader.read_message().await.unwrap());
    }
    send.await.unwrap();
    assert_eq!(received, sent);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_header_is_ascii_and_padded() {
    let (a, mut b) = duplex(64);
    let mut writer = FrameWriter::new(a, MAX_FRAME_LEN);
    writer.write_frame(b"{}").await.unwrap();
    drop(writer);

    let mut raw = Vec::new();
    tokio::io::AsyncReadExt::read_to_end(&mut b, &mut raw).await.unwrap();
    assert_eq!(raw, b"2         {}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_command_is_skipped() {
    let (mut a, b) = duplex(256);
    let mut reader = FrameReader::new(b, MAX_FRAME_LEN);
    let bodies: [&[u8]; 2] = [br#"{"command":"PING"}"#, br#"{"command":"START_GAME"}"#];
    for body in bodies {
        a.write_all(format!("{:<10}", body.len()).as_bytes()).await.unwrap();
        a.write_all(body).await.unwrap();
    }
    assert_eq!(reader.read_message().await.unwrap(), Message::StartGame);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_bad_frames_fail_the_receive() {
    let cases: [&[u8]; 4] = [
        b"abcdefghij{}",
        b"0         ",
        b"99999999  {}",
        b"5         {}",
    ];
    for raw in cases {
        let (mut a, b) = duplex(64);
        let mut reader = FrameReader::new(b, 1024);
        a.write_all(raw).await.unwrap();
        drop(a);
        assert!(
            matches!(reader.read_frame().await, Err(NetworkError::ReceiveFailed(_))),
            "accepted {:?}",
            String::from_utf8_lossy(raw)
        );
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_malformed_body_fails_the_receive() {
    let (mut a, b) = duplex(64);
    let mut reader = FrameReader::new(b, MAX_FRAME_LEN);
    a.write_all(b"8         not json").await.unwrap();
    assert!(matches!(
        reader.read_message().await,
        Err(NetworkError::ReceiveFailed(_))
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_oversized_send_is_refused() {
    let (a, _b) = duplex(64);
    let mut writer = FrameWriter::new(a, 4);
    assert!(matches!(
        writer.write_frame(b"12345").await,
        Err(NetworkError::SendFailed(_))
    ));
    assert!(matches!(
        writer.write_frame(b"").await,
        Err(NetworkError::SendFailed(_))
    ));
}
