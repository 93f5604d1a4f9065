//! Wire-level constants for the Lumberjack protocol.
//!
//! Every frame starts with [`PROTOCOL_VERSION`] followed by a single ASCII
//! [`FrameType`] tag. All multi-byte integers are big-endian.

use std::fmt;

/// Protocol version byte written at the start of every outbound frame.
pub const PROTOCOL_VERSION: u8 = b'1';

/// Largest sequence number issued before the counter wraps back to 1.
pub const SEQUENCE_MAX: u32 = (1 << 30) - 1;

/// Maximum number of unacknowledged frames allowed by default.
pub const DEFAULT_WINDOW_SIZE: u32 = 5000;

/// zlib compression level applied to COMPRESS frame payloads.
pub const COMPRESSION_LEVEL: u32 = 6;

/// Size of the version and frame-type prefix shared by all frames.
pub const FRAME_TAG_SIZE: usize = 2;

/// Size of a complete ACK frame: tag plus a 4-byte sequence number.
pub const ACK_FRAME_SIZE: usize = FRAME_TAG_SIZE + 4;

/// Size of a DATA frame header: tag, sequence number and pair count.
pub const DATA_FRAME_HEADER_SIZE: usize = FRAME_TAG_SIZE + 4 + 4;

/// Size of a COMPRESS frame header: tag plus the payload length.
pub const COMPRESS_FRAME_HEADER_SIZE: usize = FRAME_TAG_SIZE + 4;

/// Single-byte frame type tags.
///
/// The client only ever sends [`FrameType::Compress`] frames wrapping
/// [`FrameType::Data`] frames. [`FrameType::WindowSize`] is reserved by the
/// protocol and recognised on decode, but never transmitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameType {
    /// `D`: one record batch and its sequence number.
    Data,
    /// `C`: zlib-compressed concatenation of DATA frames.
    Compress,
    /// `A`: acknowledgement sent by the server.
    Ack,
    /// `W`: window size announcement.
    WindowSize,
}

impl FrameType {
    /// Return the on-wire tag for this frame type.
    ///
    /// # Examples
    ///
    /// ```
    /// use lumberjack::protocol::FrameType;
    ///
    /// assert_eq!(FrameType::Ack.as_byte(), b'A');
    /// ```
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::Data => b'D',
            Self::Compress => b'C',
            Self::Ack => b'A',
            Self::WindowSize => b'W',
        }
    }

    /// Parse an on-wire tag, returning `None` for unknown bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use lumberjack::protocol::FrameType;
    ///
    /// assert_eq!(FrameType::from_byte(b'C'), Some(FrameType::Compress));
    /// assert_eq!(FrameType::from_byte(b'x'), None);
    /// ```
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'D' => Some(Self::Data),
            b'C' => Some(Self::Compress),
            b'A' => Some(Self::Ack),
            b'W' => Some(Self::WindowSize),
            _ => None,
        }
    }
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", char::from(self.as_byte()))
    }
}
