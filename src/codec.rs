//! Frame encoding and decoding for the Lumberjack wire format.
//!
//! Outbound traffic is a sequence of COMPRESS frames, each wrapping one or
//! more zlib-compressed DATA frames. Inbound traffic consists of fixed-size
//! ACK frames.
//!
//! ```text
//! DATA      '1' 'D' seq:u32 count:u32 (klen:u32 key vlen:u32 value)*
//! COMPRESS  '1' 'C' len:u32 zlib(DATA...)
//! ACK       '1' 'A' seq:u32
//! ```
//!
//! Lengths are UTF-8 byte counts, never character counts.
//!
//! # Error Handling
//!
//! Failures are reported through [`CodecError`]. See the [`error`] module for
//! the individual categories.

use bytes::{BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::{
    protocol::{
        ACK_FRAME_SIZE,
        COMPRESS_FRAME_HEADER_SIZE,
        DATA_FRAME_HEADER_SIZE,
        FrameType,
        PROTOCOL_VERSION,
    },
    record::RecordBatch,
};

mod compress;
mod decode;
pub mod error;

pub use decode::{decode_ack_frame, decode_compress_frame, decode_data_frame};
pub use error::{
    CodecError,
    CompressionError,
    EncodingError,
    FrameField,
    MalformedFrameError,
};

/// An acknowledgement received from the server.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AckFrame {
    /// Protocol version byte sent by the server.
    pub version: u8,
    /// Frame type tag; [`FrameType::Ack`] for well-behaved servers.
    pub frame_type: FrameType,
    /// Highest sequence number the server has processed.
    pub sequence: u32,
}

/// A decoded DATA frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataFrame {
    /// Protocol version byte.
    pub version: u8,
    /// Sequence number assigned by the sender.
    pub sequence: u32,
    /// Record fields in wire order.
    pub batch: RecordBatch,
}

/// Encode `batch` as a DATA frame carrying `sequence`.
///
/// # Errors
///
/// Returns [`CodecError::Encoding`] if the pair count or any key or value is
/// longer than a 32-bit length prefix can describe.
///
/// # Examples
///
/// ```
/// use lumberjack::{RecordBatch, codec::encode_data_frame};
///
/// let frame = encode_data_frame(&RecordBatch::new(), 7).expect("encode");
/// assert_eq!(&frame[..], b"1D\0\0\0\x07\0\0\0\0");
/// ```
pub fn encode_data_frame(batch: &RecordBatch, sequence: u32) -> Result<Bytes, CodecError> {
    let pair_count = wire_length(batch.len(), FrameField::PairCount)?;
    let mut dst =
        BytesMut::with_capacity(DATA_FRAME_HEADER_SIZE + 8 * batch.len() + batch.payload_len());
    put_tag(&mut dst, FrameType::Data);
    dst.put_u32(sequence);
    dst.put_u32(pair_count);
    for (key, value) in batch.iter() {
        put_field(&mut dst, key, FrameField::Key)?;
        put_field(&mut dst, value, FrameField::Value)?;
    }
    Ok(dst.freeze())
}

/// Concatenate `frames`, compress them and wrap the result in a COMPRESS
/// frame.
///
/// The compressor is created and released within this call.
///
/// # Errors
///
/// Returns [`CodecError::Compression`] if zlib reports an error or the
/// compressed payload does not fit a 32-bit length prefix.
pub fn encode_compress_frame<B: AsRef<[u8]>>(frames: &[B]) -> Result<Bytes, CodecError> {
    let total: usize = frames.iter().map(|frame| frame.as_ref().len()).sum();
    let mut plain = Vec::with_capacity(total);
    for frame in frames {
        plain.extend_from_slice(frame.as_ref());
    }

    let compressed = compress::deflate(&plain)?;
    let len = u32::try_from(compressed.len()).map_err(|_| CompressionError::PayloadTooLarge {
        len: compressed.len(),
    })?;

    let mut dst = BytesMut::with_capacity(COMPRESS_FRAME_HEADER_SIZE + compressed.len());
    put_tag(&mut dst, FrameType::Compress);
    dst.put_u32(len);
    dst.put_slice(&compressed);
    Ok(dst.freeze())
}

fn put_tag(dst: &mut BytesMut, frame_type: FrameType) {
    dst.put_u8(PROTOCOL_VERSION);
    dst.put_u8(frame_type.as_byte());
}

fn put_field(dst: &mut BytesMut, text: &str, field: FrameField) -> Result<(), EncodingError> {
    let bytes = text.as_bytes();
    dst.put_u32(wire_length(bytes.len(), field)?);
    dst.put_slice(bytes);
    Ok(())
}

fn wire_length(len: usize, field: FrameField) -> Result<u32, EncodingError> {
    u32::try_from(len).map_err(|_| EncodingError::LengthOverflow { field, len })
}

/// `tokio_util` codec for a client connection.
///
/// Decodes inbound [`AckFrame`]s and writes pre-encoded outbound frames
/// verbatim, so each `send` on a `Framed` transport is one frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct LumberjackCodec;

impl Decoder for LumberjackCodec {
    type Item = AckFrame;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < ACK_FRAME_SIZE {
            src.reserve(ACK_FRAME_SIZE - src.len());
            return Ok(None);
        }
        let frame = src.split_to(ACK_FRAME_SIZE);
        decode_ack_frame(&frame).map(Some)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            // Clean close at a frame boundary.
            None if src.is_empty() => Ok(None),
            None => Err(MalformedFrameError::Truncated {
                needed: ACK_FRAME_SIZE,
                available: src.len(),
            }
            .into()),
        }
    }
}

impl Encoder<Bytes> for LumberjackCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.extend_from_slice(&item);
        Ok(())
    }
}
