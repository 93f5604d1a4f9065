//! Error types for establishing Lumberjack connections.

use std::{io, time::Duration};

use crate::session::SessionError;

/// Errors raised while building a [`TlsConfig`](super::TlsConfig).
#[derive(Debug, thiserror::Error)]
pub enum TlsConfigError {
    /// The CA bundle could not be read or is not valid PEM.
    #[error("failed to read CA certificates: {0}")]
    Pem(#[from] rustls::pki_types::pem::Error),
    /// The CA bundle contained no certificates.
    #[error("no CA certificates found")]
    NoCertificates,
    /// rustls rejected a certificate or the protocol configuration.
    #[error("invalid TLS configuration: {0}")]
    Rustls(#[from] rustls::Error),
}

/// Errors emitted by [`ClientBuilder`](super::ClientBuilder).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Opening or configuring the TCP socket failed.
    #[error("transport error: {0}")]
    Io(#[from] io::Error),
    /// The TLS handshake failed, including certificate validation errors.
    #[error("TLS handshake failed: {0}")]
    Tls(#[source] io::Error),
    /// The name used for certificate validation is not a DNS name or IP
    /// address.
    #[error("invalid server name: {0:?}")]
    InvalidServerName(String),
    /// The TCP connect or TLS handshake did not finish in time.
    #[error("connection not established within {0:?}")]
    ConnectTimeout(Duration),
    /// The trust store could not be built.
    #[error(transparent)]
    TlsConfig(#[from] TlsConfigError),
    /// The session failed after the connection was established.
    #[error(transparent)]
    Session(#[from] SessionError),
}
