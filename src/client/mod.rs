//! Connection establishment for Lumberjack sessions.
//!
//! [`ClientBuilder`] opens a TCP connection with the configured
//! [`SocketOptions`], performs a TLS handshake that validates the server
//! certificate against a [`TlsConfig`] trust store, and hands the stream to a
//! [`ProtocolSession`](crate::ProtocolSession).

mod builder;
mod config;
mod error;
mod tls;

pub use builder::{ClientBuilder, DEFAULT_CONNECT_TIMEOUT, TlsSession};
pub use config::SocketOptions;
pub use error::{ClientError, TlsConfigError};
pub use tls::TlsConfig;
