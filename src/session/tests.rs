//! Unit tests for the protocol session state machine.
//!
//! Each test drives a session over one half of a `tokio::io::duplex` pipe and
//! plays the server on the other half.

use std::time::Duration;

use rstest::{fixture, rstest};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream, duplex};
use tracing_test::traced_test;

use super::*;
use crate::{
    codec::{DataFrame, decode_compress_frame},
    protocol::SEQUENCE_MAX,
};

const PIPE_CAPACITY: usize = 64 * 1024;

type TestSession = ProtocolSession<DuplexStream>;

fn batch(line: &str) -> RecordBatch { RecordBatch::new().with_field("line", line) }

fn ack(sequence: u32) -> [u8; 6] {
    let mut frame = [b'1', b'A', 0, 0, 0, 0];
    frame[2..].copy_from_slice(&sequence.to_be_bytes());
    frame
}

fn session_pair(config: SessionConfig) -> (TestSession, DuplexStream) {
    let (client, server) = duplex(PIPE_CAPACITY);
    (ProtocolSession::new(client, config), server)
}

#[fixture]
fn default_pair() -> (TestSession, DuplexStream) { session_pair(SessionConfig::default()) }

/// Read one COMPRESS frame from the server side and decode its contents.
async fn read_frames(server: &mut DuplexStream) -> Vec<DataFrame> {
    let mut header = [0u8; 6];
    server.read_exact(&mut header).await.expect("frame header");
    assert_eq!(&header[..2], b"1C");
    let len = u32::from_be_bytes([header[2], header[3], header[4], header[5]]) as usize;

    let mut frame = header.to_vec();
    frame.resize(6 + len, 0);
    server
        .read_exact(&mut frame[6..])
        .await
        .expect("frame payload");
    let (frames, used) = decode_compress_frame(&frame).expect("decode compress frame");
    assert_eq!(used, frame.len());
    frames
}

#[rstest]
#[tokio::test]
async fn send_writes_one_compressed_data_frame(default_pair: (TestSession, DuplexStream)) {
    let (mut session, mut server) = default_pair;

    let sequence = session.send(&batch("hello")).await.expect("send");
    assert_eq!(sequence, 1);

    let frames = read_frames(&mut server).await;
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].sequence, 1);
    assert_eq!(frames[0].batch, batch("hello"));
    assert_eq!(session.status(), SessionStatus::Connected);
}

#[rstest]
#[tokio::test]
async fn sequence_numbers_increase_per_send(default_pair: (TestSession, DuplexStream)) {
    let (mut session, mut server) = default_pair;
    let batches = [batch("a"), batch("b"), batch("c")];

    let last = session.send_all(&batches).await.expect("send all");
    assert_eq!(last, 3);
    assert_eq!(session.sequence(), 3);

    for expected in 1..=3 {
        let frames = read_frames(&mut server).await;
        assert_eq!(frames[0].sequence, expected);
    }
}

#[tokio::test(start_paused = true)]
async fn third_send_blocks_until_ack_with_window_of_two() {
    let (mut session, mut server) = session_pair(SessionConfig::default().window_size(2));

    let client = async {
        for line in ["one", "two", "three"] {
            session.send(&batch(line)).await.expect("send");
        }
        session
    };

    let peer = async {
        assert_eq!(read_frames(&mut server).await[0].sequence, 1);
        assert_eq!(read_frames(&mut server).await[0].sequence, 2);

        // The client is now blocked on the window; nothing else arrives.
        let mut byte = [0u8; 1];
        let idle = tokio::time::timeout(Duration::from_secs(1), server.read(&mut byte)).await;
        assert!(idle.is_err(), "third frame must wait for an ack");

        server.write_all(&ack(1)).await.expect("write ack");
        assert_eq!(read_frames(&mut server).await[0].sequence, 3);
        server
    };

    let (session, _server) = tokio::join!(client, peer);
    assert_eq!(session.last_ack(), 1);
    assert_eq!(session.status(), SessionStatus::Connected);
}

#[tokio::test]
async fn stale_acks_keep_the_session_waiting() {
    let (mut session, mut server) = session_pair(SessionConfig::default().window_size(1));
    session.send(&batch("first")).await.expect("first send");

    // Window of one: sending 2 needs ack 1. Ack 0 is ignored, so a second
    // ack frame must be read.
    server.write_all(&ack(0)).await.expect("stale ack");
    server.write_all(&ack(1)).await.expect("ack");
    session.send(&batch("second")).await.expect("second send");

    assert_eq!(session.last_ack(), 1);
    read_frames(&mut server).await;
    assert_eq!(read_frames(&mut server).await[0].sequence, 2);
}

#[tokio::test]
async fn unexpected_frame_type_closes_session() {
    let (mut session, mut server) = session_pair(SessionConfig::default().window_size(1));
    session.send(&batch("first")).await.expect("first send");

    server.write_all(b"1D\0\0\0\x01").await.expect("write bogus frame");
    let err = session.send(&batch("second")).await.expect_err("bogus ack");
    assert!(matches!(
        err,
        SessionError::Protocol(ProtocolViolation::UnexpectedFrame(FrameType::Data))
    ));
    assert_eq!(session.status(), SessionStatus::Closed);

    let err = session.send(&batch("third")).await.expect_err("closed");
    assert!(matches!(err, SessionError::Closed));
}

#[tokio::test]
async fn truncated_ack_is_protocol_error() {
    let (mut session, mut server) = session_pair(SessionConfig::default().window_size(1));
    session.send(&batch("first")).await.expect("first send");

    server.write_all(b"1A\0").await.expect("partial ack");
    drop(server);

    let err = session.send(&batch("second")).await.expect_err("truncated ack");
    assert!(
        matches!(
            err,
            SessionError::Protocol(ProtocolViolation::Malformed(
                crate::codec::MalformedFrameError::Truncated { .. }
            ))
        ),
        "unexpected error: {err:?}"
    );
    assert_eq!(session.status(), SessionStatus::Closed);
}

#[tokio::test]
async fn peer_close_while_waiting_is_protocol_error() {
    let (mut session, server) = session_pair(SessionConfig::default().window_size(1));
    session.send(&batch("first")).await.expect("first send");
    drop(server);

    let err = session.send(&batch("second")).await.expect_err("peer gone");
    assert!(
        matches!(
            err,
            SessionError::Protocol(ProtocolViolation::ConnectionClosed)
                | SessionError::Transport(_)
        ),
        "unexpected error: {err:?}"
    );
    assert_eq!(session.status(), SessionStatus::Closed);
}

#[tokio::test]
async fn ack_ahead_of_sender_opens_window() {
    let (mut session, mut server) = session_pair(SessionConfig::default().window_size(2));
    session.send(&batch("one")).await.expect("first send");
    session.send(&batch("two")).await.expect("second send");

    server.write_all(&ack(5)).await.expect("ack");
    session.send(&batch("three")).await.expect("third send");
    assert_eq!(session.last_ack(), 5);

    // Nothing is in flight past the ack, so this send must not read.
    session.send(&batch("four")).await.expect("fourth send");
    for expected in 1..=4 {
        assert_eq!(read_frames(&mut server).await[0].sequence, expected);
    }
}

#[tokio::test(start_paused = true)]
async fn large_window_accepts_distant_ack() {
    let (session, mut server) = session_pair(
        SessionConfig::default()
            .window_size(600_000_000)
            .ack_timeout(Some(Duration::from_millis(500))),
    );
    let mut session = session.with_counter(SequenceCounter::starting_at(600_000_000));

    server.write_all(&ack(600_000_000)).await.expect("ack");
    let sequence = session.send(&batch("late")).await.expect("send");

    assert_eq!(sequence, 600_000_001);
    assert_eq!(session.last_ack(), 600_000_000);
    assert_eq!(read_frames(&mut server).await[0].sequence, 600_000_001);
}

#[tokio::test(start_paused = true)]
async fn window_keeps_counting_across_sequence_wrap() {
    let (session, mut server) = session_pair(
        SessionConfig::default()
            .window_size(2)
            .ack_timeout(Some(Duration::from_secs(1))),
    );
    let mut session = session.with_counter(SequenceCounter::starting_at(SEQUENCE_MAX - 1));

    // Each ack is read by the send that finds the window full: SEQUENCE_MAX,
    // then 1 (two frames carried from the old pass), then 3.
    for sequence in [SEQUENCE_MAX - 2, SEQUENCE_MAX, 1] {
        server.write_all(&ack(sequence)).await.expect("ack");
    }
    for line in ["max", "one", "two", "three"] {
        session.send(&batch(line)).await.expect("send");
    }

    assert_eq!(session.last_ack(), 1);
    assert_eq!(session.sequence(), 3);
    for expected in [SEQUENCE_MAX, 1, 2, 3] {
        assert_eq!(read_frames(&mut server).await[0].sequence, expected);
    }
}

#[tokio::test(start_paused = true)]
async fn cancelled_ack_wait_closes_session() {
    let (mut session, _server) = session_pair(SessionConfig::default().window_size(1));
    session.send(&batch("first")).await.expect("first send");

    let pending_batch = batch("second");
    let pending = tokio::time::timeout(Duration::from_secs(1), session.send(&pending_batch));
    assert!(pending.await.is_err(), "send should still be waiting");
    assert_eq!(session.status(), SessionStatus::Closed);

    let err = session.send(&batch("third")).await.expect_err("cancelled");
    assert!(matches!(err, SessionError::Closed));
    assert!(session.get_ref().is_none(), "transport should be released");
}

#[tokio::test(start_paused = true)]
async fn cancelled_write_closes_session() {
    let (client, _server) = duplex(8);
    let mut session = ProtocolSession::new(client, SessionConfig::default());

    let pending_batch = batch("stuck");
    let pending = tokio::time::timeout(Duration::from_secs(1), session.send(&pending_batch));
    assert!(pending.await.is_err(), "write should not fit in the pipe");
    assert_eq!(session.status(), SessionStatus::Closed);

    session.close().await;
    assert!(session.get_ref().is_none());
    assert_eq!(session.sequence(), 0);
}

#[tokio::test(start_paused = true)]
async fn ack_timeout_closes_session() {
    let timeout = Duration::from_secs(5);
    let (mut session, _server) = session_pair(
        SessionConfig::default()
            .window_size(1)
            .ack_timeout(Some(timeout)),
    );
    session.send(&batch("first")).await.expect("first send");

    let err = session.send(&batch("second")).await.expect_err("no ack");
    assert!(matches!(err, SessionError::Timeout(limit) if limit == timeout));
    assert_eq!(session.status(), SessionStatus::Closed);
    assert_eq!(session.sequence(), 1, "failed send does not consume a number");
}

#[rstest]
#[tokio::test]
async fn close_is_idempotent(default_pair: (TestSession, DuplexStream)) {
    let (mut session, mut server) = default_pair;

    session.close().await;
    session.close().await;
    assert_eq!(session.status(), SessionStatus::Closed);
    assert!(session.get_ref().is_none(), "transport should be released");

    let mut rest = Vec::new();
    server.read_to_end(&mut rest).await.expect("read to eof");
    assert!(rest.is_empty());

    let err = session.send(&batch("late")).await.expect_err("closed");
    assert!(matches!(err, SessionError::Closed));
}

#[rstest]
#[tokio::test]
async fn default_window_matches_protocol_default(default_pair: (TestSession, DuplexStream)) {
    let (session, _server) = default_pair;
    assert_eq!(session.window_size(), 5000);
    assert_eq!(session.last_ack(), 0);
    assert_eq!(session.sequence(), 0);
}

#[tokio::test]
#[traced_test]
async fn send_emits_span_with_sequence() {
    let (session, _server) = session_pair(SessionConfig::default());
    let mut session = session.with_tracing_config(TracingConfig::default().with_send_timing(true));

    session.send(&batch("traced")).await.expect("send");

    assert!(logs_contain("lumberjack.send"));
    assert!(logs_contain("sequence=1"));
    assert!(logs_contain("elapsed_us"));
}
