//! Error types for protocol sessions.

use std::{io, time::Duration};

use thiserror::Error;

use crate::{
    codec::{CodecError, MalformedFrameError},
    protocol::FrameType,
};

/// Unexpected traffic from the server.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProtocolViolation {
    /// The server closed the stream while an ACK was awaited.
    #[error("connection closed while awaiting ack")]
    ConnectionClosed,

    /// The server sent bytes that do not form an ACK frame.
    #[error("malformed ack frame: {0}")]
    Malformed(#[from] MalformedFrameError),

    /// The server sent a known frame type other than ACK.
    #[error("expected ack frame, got {0}")]
    UnexpectedFrame(FrameType),
}

/// Errors emitted by [`ProtocolSession`](crate::ProtocolSession).
///
/// Every variant except [`SessionError::Codec`] is fatal: the session closes
/// itself and must be recreated.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A record batch could not be encoded or compressed.
    #[error("codec error: {0}")]
    Codec(#[source] CodecError),

    /// The server violated the protocol.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolViolation),

    /// Reading or writing the transport failed.
    #[error("transport error: {0}")]
    Transport(#[source] io::Error),

    /// No ACK arrived within the configured timeout.
    #[error("no ack received within {0:?}")]
    Timeout(Duration),

    /// The session was closed by an earlier error or by
    /// [`close`](crate::ProtocolSession::close).
    #[error("session is closed")]
    Closed,
}

impl SessionError {
    /// Whether this error closed the session.
    ///
    /// # Examples
    ///
    /// ```
    /// use lumberjack::SessionError;
    ///
    /// assert!(SessionError::Closed.is_fatal());
    /// ```
    #[must_use]
    pub fn is_fatal(&self) -> bool { !matches!(self, Self::Codec(_)) }
}

impl From<CodecError> for SessionError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Io(err) => Self::Transport(err),
            CodecError::MalformedFrame(err) => Self::Protocol(ProtocolViolation::Malformed(err)),
            other => Self::Codec(other),
        }
    }
}
