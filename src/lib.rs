#![doc(html_root_url = "https://docs.rs/lumberjack/latest")]
//! Client for the Lumberjack v1 log shipping protocol.
//!
//! Record batches are encoded as DATA frames, zlib-compressed into COMPRESS
//! frames and written to a byte stream. The server acknowledges frames by
//! sequence number, and a sliding window bounds how many frames may be in
//! flight before the sender blocks for an ACK.
//!
//! The layers, leaf first:
//!
//! - [`codec`]: frame encoding and decoding, plus a `tokio_util` codec.
//! - [`sequence`]: wrapping sequence numbers.
//! - [`window`]: acknowledgement window bookkeeping.
//! - [`session`]: the [`ProtocolSession`] state machine over any async stream.
//! - [`client`]: TCP and TLS connection setup.

pub mod client;
pub mod codec;
pub mod metrics;
pub mod protocol;
pub mod record;
pub mod sequence;
pub mod session;
pub mod window;

pub use client::{ClientBuilder, ClientError, SocketOptions, TlsConfig, TlsConfigError};
pub use codec::{CodecError, LumberjackCodec};
pub use record::RecordBatch;
pub use sequence::SequenceCounter;
pub use session::{
    ProtocolSession,
    ProtocolViolation,
    SessionConfig,
    SessionError,
    SessionStatus,
    TracingConfig,
};
pub use window::WindowController;
