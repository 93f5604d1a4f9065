//! zlib helpers for COMPRESS frame payloads.
//!
//! Output buffers grow with the input; there is no fixed-size scratch buffer,
//! so incompressible batches of any size survive intact.

use std::io::{Read, Write};

use flate2::{Compression, read::ZlibDecoder, write::ZlibEncoder};

use super::error::CompressionError;
use crate::protocol::COMPRESSION_LEVEL;

/// Deflate `input` into a zlib stream at [`COMPRESSION_LEVEL`].
pub(super) fn deflate(input: &[u8]) -> Result<Vec<u8>, CompressionError> {
    // zlib adds at most a few bytes per 16 KiB block on incompressible input.
    let capacity = input.len() / 2 + 64;
    let mut encoder = ZlibEncoder::new(
        Vec::with_capacity(capacity),
        Compression::new(COMPRESSION_LEVEL),
    );
    encoder.write_all(input).map_err(CompressionError::Deflate)?;
    encoder.finish().map_err(CompressionError::Deflate)
}

/// Inflate a complete zlib stream.
pub(super) fn inflate(input: &[u8]) -> Result<Vec<u8>, CompressionError> {
    let mut decoder = ZlibDecoder::new(input);
    let mut output = Vec::with_capacity(input.len().saturating_mul(2));
    decoder
        .read_to_end(&mut output)
        .map_err(CompressionError::Inflate)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::{deflate, inflate};

    #[test]
    fn output_carries_zlib_header() {
        let compressed = deflate(b"hello").expect("deflate");
        // CMF byte for deflate with a 32 KiB window.
        assert_eq!(compressed.first(), Some(&0x78));
    }

    #[test]
    fn large_incompressible_input_is_not_truncated() {
        // xorshift noise defeats deflate, so the output exceeds the input.
        let mut state = 0x2545_f491_u32;
        let input: Vec<u8> = (0..64 * 1024)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                state.to_le_bytes()[0]
            })
            .collect();

        let compressed = deflate(&input).expect("deflate");
        assert!(compressed.len() > 5120);
        assert_eq!(inflate(&compressed).expect("inflate"), input);
    }

    #[test]
    fn inflate_rejects_garbage() {
        assert!(inflate(b"not a zlib stream").is_err());
    }
}
