//! Protocol session over a byte-stream transport.
//!
//! A [`ProtocolSession`] numbers each record batch, encodes it as a DATA
//! frame, wraps it in a COMPRESS frame and writes it to the transport. When
//! the acknowledgement window is full, `send` blocks reading ACK frames until
//! the server catches up. There is no background reader: ACKs are only read
//! while a send is waiting for the window to open.
//!
//! ```text
//!            window full              window open
//! Connected ─────────────▶ AwaitingAck ──────────▶ Connected
//!     │                        │
//!     │ close / fatal error    │ fatal error
//!     ▼                        ▼
//!   Closed ◀───────────────────┘
//! ```

use std::fmt;

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;
use tracing::Instrument;

use crate::{
    codec::{AckFrame, LumberjackCodec, encode_compress_frame, encode_data_frame},
    metrics::{self, ActiveSession},
    protocol::{FrameType, PROTOCOL_VERSION},
    record::RecordBatch,
    sequence::SequenceCounter,
    window::WindowController,
};

mod config;
mod error;
pub(crate) mod tracing_config;
pub(crate) mod tracing_helpers;

pub use config::SessionConfig;
pub use error::{ProtocolViolation, SessionError};
pub use tracing_config::TracingConfig;
use tracing_helpers::{ack_span, close_span, emit_timing_event, send_span, start_timer};

/// Trait alias for transports a session can drive.
pub trait SessionStream: AsyncRead + AsyncWrite + Unpin {}
impl<T> SessionStream for T where T: AsyncRead + AsyncWrite + Unpin {}

/// Lifecycle state of a [`ProtocolSession`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    /// Ready to send.
    Connected,
    /// A send is blocked reading ACK frames.
    AwaitingAck,
    /// Closed explicitly, by a fatal error or by dropping an unfinished
    /// `send`; the session cannot be reused.
    Closed,
}

/// Client side of a Lumberjack connection.
///
/// Sends are serialised by `&mut self`. A session that returns a fatal
/// [`SessionError`] is closed and must be discarded.
///
/// Dropping a `send` future before it completes may leave a partial frame
/// on the transport, so the session treats it as closed from then on.
///
/// # Examples
///
/// ```
/// use lumberjack::{ProtocolSession, RecordBatch, SessionConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), lumberjack::SessionError> {
/// let (client, _server) = tokio::io::duplex(64 * 1024);
/// let mut session = ProtocolSession::new(client, SessionConfig::default());
/// let sequence = session
///     .send(&RecordBatch::new().with_field("line", "hello"))
///     .await?;
/// assert_eq!(sequence, 1);
/// session.close().await;
/// # Ok(())
/// # }
/// ```
pub struct ProtocolSession<T: SessionStream> {
    framed: Option<Framed<T, LumberjackCodec>>,
    counter: SequenceCounter,
    window: WindowController,
    config: SessionConfig,
    tracing_config: TracingConfig,
    status: SessionStatus,
    /// Set for the duration of `send`; still set afterwards only if the
    /// future was dropped before finishing.
    sending: bool,
    active: Option<ActiveSession>,
}

impl<T: SessionStream> fmt::Debug for ProtocolSession<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtocolSession")
            .field("status", &self.status)
            .field("sequence", &self.counter.current())
            .field("last_ack", &self.window.last_ack())
            .field("window_size", &self.window.window_size())
            .finish_non_exhaustive()
    }
}

impl<T: SessionStream> ProtocolSession<T> {
    /// Start a session over an already established transport.
    pub fn new(stream: T, config: SessionConfig) -> Self {
        Self {
            framed: Some(Framed::new(stream, LumberjackCodec)),
            counter: SequenceCounter::new(),
            window: WindowController::new(config.window_size_value()),
            config,
            tracing_config: TracingConfig::default(),
            status: SessionStatus::Connected,
            sending: false,
            active: Some(ActiveSession::new()),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_counter(mut self, counter: SequenceCounter) -> Self {
        self.counter = counter;
        self
    }

    /// Replace the tracing configuration.
    #[must_use]
    pub fn with_tracing_config(mut self, tracing_config: TracingConfig) -> Self {
        self.tracing_config = tracing_config;
        self
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        if self.sending {
            SessionStatus::Closed
        } else {
            self.status
        }
    }

    /// Last sequence number successfully sent, or 0 before the first send.
    #[must_use]
    pub fn sequence(&self) -> u32 { self.counter.current() }

    /// Highest sequence number acknowledged by the server.
    #[must_use]
    pub fn last_ack(&self) -> u32 { self.window.last_ack() }

    /// Configured window size.
    #[must_use]
    pub fn window_size(&self) -> u32 { self.window.window_size() }

    /// Settings this session was created with.
    #[must_use]
    pub fn config(&self) -> &SessionConfig { &self.config }

    /// Borrow the underlying transport, if the session is still open.
    #[must_use]
    pub fn get_ref(&self) -> Option<&T> { self.framed.as_ref().map(Framed::get_ref) }

    /// Send one record batch and return its sequence number.
    ///
    /// Blocks reading ACK frames first if the window is full. Each call
    /// writes and flushes exactly one COMPRESS frame.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Codec`] if the batch cannot be encoded; the session
    ///   stays usable and the sequence number is not consumed.
    /// - [`SessionError::Protocol`], [`SessionError::Transport`] or
    ///   [`SessionError::Timeout`] on failure while waiting or writing; the
    ///   session is closed.
    /// - [`SessionError::Closed`] if the session was already closed or an
    ///   earlier `send` was cancelled.
    pub async fn send(&mut self, batch: &RecordBatch) -> Result<u32, SessionError> {
        if self.sending {
            tracing::warn!("previous send was cancelled; closing session");
            self.abort();
        }
        if self.status == SessionStatus::Closed {
            return Err(SessionError::Closed);
        }
        self.sending = true;

        let mut counter = self.counter;
        let sequence = counter.next();
        let span = send_span(&self.tracing_config, sequence);
        let timer = start_timer(self.tracing_config.send_timing);

        let result = self
            .send_frame(batch, sequence)
            .instrument(span.clone())
            .await;

        match &result {
            Ok(()) => self.counter = counter,
            Err(err) => {
                metrics::inc_errors();
                if err.is_fatal() {
                    span.in_scope(|| tracing::warn!(error = %err, "closing session"));
                    self.abort();
                } else {
                    self.status = SessionStatus::Connected;
                }
            }
        }
        self.sending = false;
        span.in_scope(|| emit_timing_event(timer));
        result.map(|()| sequence)
    }

    /// Send each batch in order, returning the last sequence number used.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first error from [`send`](Self::send).
    pub async fn send_all<'a, I>(&mut self, batches: I) -> Result<u32, SessionError>
    where
        I: IntoIterator<Item = &'a RecordBatch>,
    {
        let mut last = self.counter.current();
        for batch in batches {
            last = self.send(batch).await?;
        }
        Ok(last)
    }

    /// Close the session and release the transport.
    ///
    /// Pending bytes are flushed and the write half is shut down. Closing an
    /// already closed session does nothing.
    pub async fn close(&mut self) {
        if self.sending {
            self.abort();
        }
        let Some(mut framed) = self.framed.take() else {
            self.status = SessionStatus::Closed;
            return;
        };

        let span = close_span(&self.tracing_config);
        let timer = start_timer(self.tracing_config.close_timing);
        async {
            if let Err(err) = framed.close().await {
                tracing::debug!(error = %err, "transport error while closing");
            }
            emit_timing_event(timer);
        }
        .instrument(span)
        .await;

        self.status = SessionStatus::Closed;
        self.active = None;
    }

    async fn send_frame(&mut self, batch: &RecordBatch, sequence: u32) -> Result<(), SessionError> {
        let data = encode_data_frame(batch, sequence)?;
        let frame = encode_compress_frame(&[data])?;
        tracing::Span::current().record("frame.bytes", frame.len());

        if sequence <= self.counter.current() {
            self.window.start_new_cycle();
        }
        self.wait_for_window(sequence).await?;

        let framed = self.framed.as_mut().ok_or(SessionError::Closed)?;
        framed.send(frame).await?;
        metrics::inc_frames_sent();
        Ok(())
    }

    async fn wait_for_window(&mut self, sequence: u32) -> Result<(), SessionError> {
        if !self.window.is_full(sequence) {
            return Ok(());
        }

        metrics::inc_window_waits();
        self.status = SessionStatus::AwaitingAck;
        let span = ack_span(&self.tracing_config, sequence, self.window.last_ack());
        let timer = start_timer(self.tracing_config.ack_timing);

        async {
            while self.window.is_full(sequence) {
                let ack = self.read_ack().await?;
                let last_ack = self.window.record_ack(ack.sequence);
                tracing::debug!(
                    ack = ack.sequence,
                    last_ack,
                    in_flight = self.window.in_flight(sequence),
                    "ack received"
                );
            }
            emit_timing_event(timer);
            Ok::<(), SessionError>(())
        }
        .instrument(span)
        .await?;

        self.status = SessionStatus::Connected;
        Ok(())
    }

    async fn read_ack(&mut self) -> Result<AckFrame, SessionError> {
        let framed = self.framed.as_mut().ok_or(SessionError::Closed)?;
        let next = framed.next();
        let item = match self.config.ack_timeout_value() {
            Some(limit) => tokio::time::timeout(limit, next)
                .await
                .map_err(|_| SessionError::Timeout(limit))?,
            None => next.await,
        };

        let ack = item.ok_or(ProtocolViolation::ConnectionClosed)??;
        metrics::inc_acks_received();
        if ack.frame_type != FrameType::Ack {
            return Err(ProtocolViolation::UnexpectedFrame(ack.frame_type).into());
        }
        if ack.version != PROTOCOL_VERSION {
            tracing::debug!(version = ack.version, "ack uses a different protocol version");
        }
        Ok(ack)
    }

    /// Drop the transport without a graceful shutdown.
    fn abort(&mut self) {
        self.framed = None;
        self.sending = false;
        self.status = SessionStatus::Closed;
        self.active = None;
    }
}

#[cfg(test)]
mod tests;
