//! TLS connection tests using certificates generated at test time.

use lumberjack::{ClientError, ProtocolSession, RecordBatch, TlsConfig};
use lumberjack_testing::{AckPolicy, AckServer, TestPki};

fn trusting(pki: &TestPki) -> TlsConfig {
    TlsConfig::from_ca_pem(pki.ca_pem().as_bytes()).expect("load test CA")
}

#[tokio::test]
async fn tls_round_trip_with_generated_ca() {
    let pki = TestPki::localhost();
    let (addr, server) = AckServer::listen_tls(pki.acceptor(), AckPolicy::EveryFrame)
        .await
        .expect("listen");

    let mut session = ProtocolSession::builder()
        .tls_config(trusting(&pki))
        .window_size(2)
        .connect(addr, "localhost")
        .await
        .expect("TLS connect");

    for i in 0..5 {
        let batch = RecordBatch::new().with_field("line", format!("secure {i}"));
        session.send(&batch).await.expect("send");
    }
    assert!(session.last_ack() >= 3);
    session.close().await;

    let frames = server.finish().await.expect("server result");
    assert_eq!(frames.len(), 5);
    assert_eq!(frames[4].batch.get("line"), Some("secure 4"));
}

#[tokio::test]
async fn untrusted_certificate_fails_handshake() {
    let server_pki = TestPki::localhost();
    let other_pki = TestPki::localhost();
    let (addr, server) = AckServer::listen_tls(server_pki.acceptor(), AckPolicy::EveryFrame)
        .await
        .expect("listen");

    let err = ProtocolSession::builder()
        .tls_config(trusting(&other_pki))
        .connect(addr, "localhost")
        .await
        .expect_err("certificate is not trusted");
    assert!(matches!(err, ClientError::Tls(_)), "unexpected error: {err:?}");

    assert!(server.finish().await.is_err(), "server handshake should fail");
}

#[tokio::test]
async fn server_name_mismatch_fails_handshake() {
    let pki = TestPki::localhost();
    let (addr, _server) = AckServer::listen_tls(pki.acceptor(), AckPolicy::EveryFrame)
        .await
        .expect("listen");

    let err = ProtocolSession::builder()
        .tls_config(trusting(&pki))
        .connect(addr, "logs.example.com")
        .await
        .expect_err("name does not match certificate");
    assert!(matches!(err, ClientError::Tls(_)), "unexpected error: {err:?}");
}
