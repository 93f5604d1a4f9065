//! Error types for the frame codec.
//!
//! # Error Categories
//!
//! - [`EncodingError`]: record data that cannot be expressed in the wire format.
//! - [`CompressionError`]: zlib failures while building or unpacking COMPRESS frames.
//! - [`MalformedFrameError`]: inbound bytes that do not form a valid frame.
//! - [`CodecError`]: top-level enum wrapping all categories plus I/O errors.

use std::{fmt, io};

use thiserror::Error;

use crate::protocol::FrameType;

/// Length-prefixed items of a DATA frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameField {
    /// Number of key/value pairs in the frame header.
    PairCount,
    /// A field key.
    Key,
    /// A field value.
    Value,
}

impl fmt::Display for FrameField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PairCount => "pair count",
            Self::Key => "key",
            Self::Value => "value",
        })
    }
}

/// Record data that cannot be represented on the wire.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EncodingError {
    /// A length does not fit in the 32-bit prefix.
    #[error("{field} length {len} exceeds the 32-bit length prefix")]
    LengthOverflow {
        /// Which item overflowed.
        field: FrameField,
        /// Length that could not be encoded.
        len: usize,
    },
}

/// Failures reported by the zlib compressor or decompressor.
#[derive(Debug, Error)]
pub enum CompressionError {
    /// Deflating the DATA frames failed.
    #[error("failed to deflate payload: {0}")]
    Deflate(#[source] io::Error),

    /// Inflating a COMPRESS payload failed.
    #[error("failed to inflate payload: {0}")]
    Inflate(#[source] io::Error),

    /// The compressed payload is too large for the 32-bit length prefix.
    #[error("compressed payload of {len} bytes exceeds the 32-bit length prefix")]
    PayloadTooLarge {
        /// Size of the compressed payload.
        len: usize,
    },
}

/// Inbound bytes that do not form a valid frame.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MalformedFrameError {
    /// Fewer bytes are available than the frame layout requires.
    #[error("truncated frame: need {needed} bytes, have {available}")]
    Truncated {
        /// Bytes required to finish the current item.
        needed: usize,
        /// Bytes actually available.
        available: usize,
    },

    /// The frame type byte is not a known tag.
    #[error("unknown frame type byte {byte:#04x}")]
    UnknownFrameType {
        /// Byte found in the frame type position.
        byte: u8,
    },

    /// A known frame type appeared where another was required.
    #[error("expected {expected} frame, got {actual}")]
    UnexpectedFrameType {
        /// Frame type the decoder was reading.
        expected: FrameType,
        /// Frame type found on the wire.
        actual: FrameType,
    },

    /// A key or value is not valid UTF-8.
    #[error("{field} is not valid UTF-8")]
    InvalidUtf8 {
        /// Which item failed to decode.
        field: FrameField,
    },
}

/// Top-level codec error taxonomy.
///
/// # Examples
///
/// ```
/// use lumberjack::codec::{CodecError, MalformedFrameError, decode_ack_frame};
///
/// let err = decode_ack_frame(b"1A").expect_err("two bytes is not an ack");
/// assert!(matches!(
///     err,
///     CodecError::MalformedFrame(MalformedFrameError::Truncated { needed: 6, available: 2 })
/// ));
/// ```
#[derive(Debug, Error)]
pub enum CodecError {
    /// Outbound record data could not be encoded.
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// zlib compression or decompression failed.
    #[error("compression error: {0}")]
    Compression(#[from] CompressionError),

    /// Inbound bytes did not form a valid frame.
    #[error("malformed frame: {0}")]
    MalformedFrame(#[from] MalformedFrameError),

    /// Transport I/O error surfaced through a `tokio_util` codec.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
