//! Test utilities for the `lumberjack` client.
//!
//! Provides an acknowledging server that runs over in-memory streams, TCP or
//! TLS, throwaway certificates and metrics snapshot helpers.
//!
//! ```rust
//! use lumberjack::{ProtocolSession, RecordBatch, SessionConfig};
//! use lumberjack_testing::{AckPolicy, AckServer};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (client, server) = tokio::io::duplex(64 * 1024);
//! let server = AckServer::spawn(server, AckPolicy::EveryFrame);
//! let mut session = ProtocolSession::new(client, SessionConfig::default());
//! session
//!     .send(&RecordBatch::new().with_field("line", "hi"))
//!     .await
//!     .unwrap();
//! session.close().await;
//! assert_eq!(server.finish().await.unwrap().len(), 1);
//! # }
//! ```

pub mod ack_server;
pub mod metrics;
pub mod tls;

pub use ack_server::{AckPolicy, AckServer, ack_frame, read_compress_frame, serve};
pub use metrics::{MetricsSnapshot, debugging_recorder};
pub use tls::TestPki;
