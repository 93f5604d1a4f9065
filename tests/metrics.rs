#![cfg(feature = "metrics")]
//! Tests for `lumberjack` metrics.
//!
//! Sessions run on a current-thread runtime inside
//! `metrics::with_local_recorder` so every update lands in the debugging
//! recorder.

use std::time::Duration;

use lumberjack::{
    ProtocolSession,
    RecordBatch,
    SessionConfig,
    metrics::{ACKS_RECEIVED, ERRORS_TOTAL, FRAMES_SENT, SESSIONS_ACTIVE, WINDOW_WAITS},
};
use lumberjack_testing::{AckPolicy, AckServer, MetricsSnapshot, debugging_recorder};
use rstest::rstest;
use tokio::io::duplex;

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("build runtime")
        .block_on(future)
}

fn block_on_paused<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .expect("build runtime")
        .block_on(future)
}

#[test]
fn window_of_one_counts_frames_acks_and_waits() {
    let (snapshotter, recorder) = debugging_recorder();

    let open_sessions = metrics::with_local_recorder(&recorder, || {
        block_on(async {
            let (client, server) = duplex(64 * 1024);
            let server = AckServer::spawn(server, AckPolicy::EveryFrame);
            let mut session = ProtocolSession::new(client, SessionConfig::default().window_size(1));

            for line in ["a", "b", "c"] {
                session
                    .send(&RecordBatch::new().with_field("line", line))
                    .await
                    .expect("send");
            }
            let open = MetricsSnapshot::take(&snapshotter).gauge(SESSIONS_ACTIVE);
            session.close().await;
            server.finish().await.expect("server result");
            open
        })
    });

    let snapshot = MetricsSnapshot::take(&snapshotter);
    assert_eq!(open_sessions, Some(1.0));
    assert_eq!(snapshot.gauge(SESSIONS_ACTIVE), Some(0.0));
    assert_eq!(snapshot.counter(FRAMES_SENT), 3);
    assert_eq!(snapshot.counter(WINDOW_WAITS), 2);
    assert_eq!(snapshot.counter(ACKS_RECEIVED), 2);
    assert_eq!(snapshot.counter(ERRORS_TOTAL), 0);
}

#[rstest]
#[case(1)]
#[case(3)]
fn error_counter_tracks_fatal_failures(#[case] sessions: u64) {
    let (snapshotter, recorder) = debugging_recorder();

    metrics::with_local_recorder(&recorder, || {
        block_on_paused(async {
            for _ in 0..sessions {
                let (client, server) = duplex(1024);
                let _server = AckServer::spawn(server, AckPolicy::Never);
                let config = SessionConfig::default()
                    .window_size(1)
                    .ack_timeout(Some(Duration::from_secs(1)));
                let mut session = ProtocolSession::new(client, config);
                let batch = RecordBatch::new().with_field("line", "unanswered");

                session.send(&batch).await.expect("first send");
                assert!(session.send(&batch).await.is_err(), "ack never arrives");
                assert!(session.send(&batch).await.is_err(), "session is closed");
            }
        });
    });

    assert_eq!(MetricsSnapshot::take(&snapshotter).counter(ERRORS_TOTAL), sessions);
}
