//! Builder for configuring and connecting a Lumberjack session.

use std::{net::SocketAddr, time::Duration};

use rustls::pki_types::ServerName;
use tokio::net::{TcpSocket, TcpStream};
use tokio_rustls::client::TlsStream;
use tracing::Instrument;

use super::{ClientError, SocketOptions, TlsConfig};
use crate::session::{
    ProtocolSession,
    SessionConfig,
    SessionStream,
    TracingConfig,
    tracing_helpers::{connect_span, emit_timing_event, start_timer},
};

/// Default limit for the TCP connect and the TLS handshake, each.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Session over a TLS-wrapped TCP connection.
pub type TlsSession = ProtocolSession<TlsStream<TcpStream>>;

/// Builder for [`ProtocolSession`] connections.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use lumberjack::client::ClientBuilder;
///
/// let builder = ClientBuilder::new()
///     .window_size(1000)
///     .ack_timeout(Duration::from_secs(30))
///     .nodelay(true);
/// assert_eq!(builder.session_config_value().window_size_value(), 1000);
/// ```
#[derive(Clone, Debug)]
pub struct ClientBuilder {
    session_config: SessionConfig,
    socket_options: SocketOptions,
    tls_config: Option<TlsConfig>,
    connect_timeout: Duration,
    tracing_config: TracingConfig,
}

impl Default for ClientBuilder {
    fn default() -> Self { Self::new() }
}

impl ClientBuilder {
    /// Create a builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            session_config: SessionConfig::default(),
            socket_options: SocketOptions::default(),
            tls_config: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            tracing_config: TracingConfig::default(),
        }
    }

    /// Replace the session configuration.
    #[must_use]
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Set the acknowledgement window; 0 selects the default of 5000.
    #[must_use]
    pub fn window_size(mut self, window_size: u32) -> Self {
        self.session_config = self.session_config.window_size(window_size);
        self
    }

    /// Fail a send that waits longer than `timeout` for an ACK.
    #[must_use]
    pub fn ack_timeout(mut self, timeout: Duration) -> Self {
        self.session_config = self.session_config.ack_timeout(Some(timeout));
        self
    }

    /// Replace the socket options applied before connecting.
    #[must_use]
    pub fn socket_options(mut self, socket_options: SocketOptions) -> Self {
        self.socket_options = socket_options;
        self
    }

    /// Configure `TCP_NODELAY` for the connection.
    #[must_use]
    pub fn nodelay(mut self, enabled: bool) -> Self {
        self.socket_options = self.socket_options.nodelay(enabled);
        self
    }

    /// Configure `SO_KEEPALIVE` for the connection.
    #[must_use]
    pub fn keepalive(mut self, idle: Option<Duration>) -> Self {
        self.socket_options = self.socket_options.keepalive(idle);
        self
    }

    /// Use `tls` instead of the Mozilla root set.
    #[must_use]
    pub fn tls_config(mut self, tls: TlsConfig) -> Self {
        self.tls_config = Some(tls);
        self
    }

    /// Limit the TCP connect and the TLS handshake.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Configure tracing spans for the connection and the session.
    #[must_use]
    pub fn tracing_config(mut self, config: TracingConfig) -> Self {
        self.tracing_config = config;
        self
    }

    /// Session settings that connected sessions will use.
    #[must_use]
    pub fn session_config_value(&self) -> &SessionConfig { &self.session_config }

    /// Configured connect timeout.
    #[must_use]
    pub fn connect_timeout_value(&self) -> Duration { self.connect_timeout }

    /// Connect over TLS, validating the certificate against `server_name`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::InvalidServerName`] if `server_name` is not a DNS
    ///   name or IP address.
    /// - [`ClientError::TlsConfig`] if the default trust store cannot be
    ///   built.
    /// - [`ClientError::Io`], [`ClientError::Tls`] or
    ///   [`ClientError::ConnectTimeout`] if the connection fails.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::net::SocketAddr;
    ///
    /// use lumberjack::{ProtocolSession, RecordBatch, client::ClientError};
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), ClientError> {
    /// let addr: SocketAddr = "127.0.0.1:5043".parse().expect("valid socket address");
    /// let mut session = ProtocolSession::builder()
    ///     .connect(addr, "logs.example.com")
    ///     .await?;
    /// session
    ///     .send(&RecordBatch::new().with_field("line", "hello"))
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(
        self,
        addr: SocketAddr,
        server_name: &str,
    ) -> Result<TlsSession, ClientError> {
        let name = ServerName::try_from(server_name.to_owned())
            .map_err(|_| ClientError::InvalidServerName(server_name.to_owned()))?;
        let tls = match self.tls_config.clone() {
            Some(tls) => tls,
            None => TlsConfig::with_webpki_roots()?,
        };

        let span = connect_span(&self.tracing_config, &addr.to_string());
        let timer = start_timer(self.tracing_config.connect_timing);
        let limit = self.connect_timeout;
        let stream = async {
            let tcp = self.connect_tcp(addr).await?;
            let stream = tokio::time::timeout(limit, tls.connector().connect(name, tcp))
                .await
                .map_err(|_| ClientError::ConnectTimeout(limit))?
                .map_err(ClientError::Tls)?;
            tracing::debug!(server_name, "TLS handshake complete");
            emit_timing_event(timer);
            Ok::<_, ClientError>(stream)
        }
        .instrument(span)
        .await?;

        Ok(self.into_session(stream))
    }

    /// Connect over plain TCP.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Io`] or [`ClientError::ConnectTimeout`] if
    /// the connection fails.
    pub async fn connect_plaintext(
        self,
        addr: SocketAddr,
    ) -> Result<ProtocolSession<TcpStream>, ClientError> {
        let span = connect_span(&self.tracing_config, &addr.to_string());
        let timer = start_timer(self.tracing_config.connect_timing);
        let stream = async {
            let stream = self.connect_tcp(addr).await?;
            emit_timing_event(timer);
            Ok::<_, ClientError>(stream)
        }
        .instrument(span)
        .await?;

        Ok(self.into_session(stream))
    }

    async fn connect_tcp(&self, addr: SocketAddr) -> Result<TcpStream, ClientError> {
        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        self.socket_options.apply(&socket)?;
        let stream = tokio::time::timeout(self.connect_timeout, socket.connect(addr))
            .await
            .map_err(|_| ClientError::ConnectTimeout(self.connect_timeout))??;
        Ok(stream)
    }

    fn into_session<T: SessionStream>(self, stream: T) -> ProtocolSession<T> {
        ProtocolSession::new(stream, self.session_config).with_tracing_config(self.tracing_config)
    }
}

impl TlsSession {
    /// Start configuring a new connection.
    ///
    /// # Examples
    ///
    /// ```
    /// use lumberjack::ProtocolSession;
    ///
    /// let builder = ProtocolSession::builder().window_size(100);
    /// let _ = builder;
    /// ```
    #[must_use]
    pub fn builder() -> ClientBuilder { ClientBuilder::new() }
}
