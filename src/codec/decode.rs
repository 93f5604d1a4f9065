//! Decoders for inbound and captured frames.

use super::{
    AckFrame,
    CodecError,
    DataFrame,
    FrameField,
    MalformedFrameError,
    compress,
};
use crate::{
    protocol::{ACK_FRAME_SIZE, FrameType},
    record::RecordBatch,
};

/// Upper bound on pairs preallocated from an untrusted count.
const MAX_PREALLOCATED_PAIRS: usize = 1024;

/// Cursor over a byte slice that reports truncation as a
/// [`MalformedFrameError`].
struct FrameReader<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> FrameReader<'a> {
    fn new(src: &'a [u8]) -> Self { Self { src, pos: 0 } }

    fn take(&mut self, len: usize) -> Result<&'a [u8], MalformedFrameError> {
        let end = self.pos.saturating_add(len);
        let slice = self
            .src
            .get(self.pos..end)
            .ok_or(MalformedFrameError::Truncated {
                needed: end,
                available: self.src.len(),
            })?;
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], MalformedFrameError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u32(&mut self) -> Result<u32, MalformedFrameError> { Ok(u32::from_be_bytes(self.array()?)) }

    /// Read the version and type bytes, returning both.
    fn tag(&mut self) -> Result<(u8, FrameType), MalformedFrameError> {
        let [version, byte] = self.array()?;
        let frame_type =
            FrameType::from_byte(byte).ok_or(MalformedFrameError::UnknownFrameType { byte })?;
        Ok((version, frame_type))
    }

    /// Read the tag and require `expected`, returning the version byte.
    fn expect_tag(&mut self, expected: FrameType) -> Result<u8, MalformedFrameError> {
        let (version, actual) = self.tag()?;
        if actual != expected {
            return Err(MalformedFrameError::UnexpectedFrameType { expected, actual });
        }
        Ok(version)
    }

    fn text(&mut self, field: FrameField) -> Result<String, MalformedFrameError> {
        let len = self.u32()? as usize;
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| MalformedFrameError::InvalidUtf8 { field })
    }

    fn consumed(&self) -> usize { self.pos }
}

/// Parse an ACK frame from the first six bytes of `src`.
///
/// Any known frame type is accepted here; callers decide whether a non-ACK
/// tag is acceptable.
///
/// # Errors
///
/// Returns [`CodecError::MalformedFrame`] if fewer than six bytes are
/// available or the type byte is not a known tag.
///
/// # Examples
///
/// ```
/// use lumberjack::{codec::decode_ack_frame, protocol::FrameType};
///
/// let ack = decode_ack_frame(b"1A\0\0\0\x2a").expect("valid ack");
/// assert_eq!(ack.frame_type, FrameType::Ack);
/// assert_eq!(ack.sequence, 42);
/// ```
pub fn decode_ack_frame(src: &[u8]) -> Result<AckFrame, CodecError> {
    // Length is checked first so a short frame is never misread as a bad tag.
    if src.len() < ACK_FRAME_SIZE {
        return Err(MalformedFrameError::Truncated {
            needed: ACK_FRAME_SIZE,
            available: src.len(),
        }
        .into());
    }
    let mut reader = FrameReader::new(src);
    let (version, frame_type) = reader.tag()?;
    let sequence = reader.u32()?;
    Ok(AckFrame {
        version,
        frame_type,
        sequence,
    })
}

/// Parse one DATA frame from the start of `src`.
///
/// Returns the frame and the number of bytes it occupied.
///
/// # Errors
///
/// Returns [`CodecError::MalformedFrame`] on truncation, a non-DATA tag or a
/// field that is not valid UTF-8.
pub fn decode_data_frame(src: &[u8]) -> Result<(DataFrame, usize), CodecError> {
    let mut reader = FrameReader::new(src);
    let version = reader.expect_tag(FrameType::Data)?;
    let sequence = reader.u32()?;
    let count = reader.u32()? as usize;

    let mut fields = Vec::with_capacity(count.min(MAX_PREALLOCATED_PAIRS));
    for _ in 0..count {
        let key = reader.text(FrameField::Key)?;
        let value = reader.text(FrameField::Value)?;
        fields.push((key, value));
    }

    let frame = DataFrame {
        version,
        sequence,
        batch: fields.into_iter().collect::<RecordBatch>(),
    };
    Ok((frame, reader.consumed()))
}

/// Parse one COMPRESS frame from the start of `src` and decode every DATA
/// frame inside it.
///
/// Returns the frames and the number of bytes the COMPRESS frame occupied.
///
/// # Errors
///
/// Returns [`CodecError::MalformedFrame`] for truncated or mistyped frames and
/// [`CodecError::Compression`] if the payload is not a valid zlib stream.
pub fn decode_compress_frame(src: &[u8]) -> Result<(Vec<DataFrame>, usize), CodecError> {
    let mut reader = FrameReader::new(src);
    reader.expect_tag(FrameType::Compress)?;
    let len = reader.u32()? as usize;
    let payload = reader.take(len)?;
    let plain = compress::inflate(payload)?;

    let mut frames = Vec::new();
    let mut rest = plain.as_slice();
    while !rest.is_empty() {
        let (frame, used) = decode_data_frame(rest)?;
        frames.push(frame);
        rest = rest.get(used..).unwrap_or_default();
    }
    Ok((frames, reader.consumed()))
}
