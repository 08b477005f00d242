// src/compression/mod.rs
//! Payload decompression
//!
//! RPM payloads are a CPIO stream wrapped in one of a few compressors.
//! The compressor is detected from the payload's leading bytes rather than
//! the header tag, which older packages sometimes get wrong.

use crate::error::{Error, Result};
use std::io::{self, Read};

/// Payload compression formats seen in the wild
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionFormat {
    /// Raw CPIO
    None,
    Gzip,
    Xz,
    /// Legacy `.lzma` (alone) streams used by some older distributions
    Lzma,
    Zstd,
}

impl CompressionFormat {
    /// Detect compression format from magic bytes
    ///
    /// - Gzip: `1f 8b`
    /// - XZ: `fd 37 7a 58 5a 00`
    /// - Zstd: `28 b5 2f fd`
    /// - LZMA alone: `5d 00 00`
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.starts_with(&[0x1f, 0x8b]) {
            Self::Gzip
        } else if data.starts_with(&[0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00]) {
            Self::Xz
        } else if data.starts_with(&[0x28, 0xb5, 0x2f, 0xfd]) {
            Self::Zstd
        } else if data.starts_with(&[0x5d, 0x00, 0x00]) {
            Self::Lzma
        } else {
            Self::None
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
            Self::Xz => "xz",
            Self::Lzma => "lzma",
            Self::Zstd => "zstd",
        }
    }
}

impl std::fmt::Display for CompressionFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Create a decompressing reader for the given format
///
/// For `CompressionFormat::None` the reader is returned unchanged.
pub fn create_decoder<'a, R: Read + 'a>(
    reader: R,
    format: CompressionFormat,
) -> Result<Box<dyn Read + 'a>> {
    match format {
        CompressionFormat::None => Ok(Box::new(reader)),
        CompressionFormat::Gzip => Ok(Box::new(flate2::read::GzDecoder::new(reader))),
        CompressionFormat::Xz => Ok(Box::new(xz2::read::XzDecoder::new(reader))),
        CompressionFormat::Lzma => {
            let stream = xz2::stream::Stream::new_lzma_decoder(u64::MAX)
                .map_err(|e| decoder_error(format, io::Error::other(e)))?;
            Ok(Box::new(xz2::read::XzDecoder::new_stream(reader, stream)))
        }
        CompressionFormat::Zstd => {
            let decoder = zstd::Decoder::new(reader).map_err(|e| decoder_error(format, e))?;
            Ok(Box::new(decoder))
        }
    }
}

/// Decoder for a payload, detecting the format from its first bytes
pub fn payload_decoder(payload: &[u8]) -> Result<Box<dyn Read + '_>> {
    let format = CompressionFormat::from_magic_bytes(payload);
    tracing::debug!("Detected payload compression: {}", format);
    create_decoder(payload, format)
}

fn decoder_error(format: CompressionFormat, source: io::Error) -> Error {
    Error::ParseError(format!("Failed to create {} decoder: {}", format, source))
}

#[cfg(test)]
mod tests {
    use super::*;

    // gzip of "hello"
    const GZIP_HELLO: &[u8] = &[
        0x1f, 0x8b, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0xcb, 0x48, 0xcd, 0xc9, 0xc9,
        0x07, 0x00, 0x86, 0xa6, 0x10, 0x36, 0x05, 0x00, 0x00, 0x00,
    ];

    #[test]
    fn test_format_from_magic_bytes() {
        assert_eq!(
            CompressionFormat::from_magic_bytes(&[0x1f, 0x8b, 0x08, 0x00]),
            CompressionFormat::Gzip
        );
        assert_eq!(
            CompressionFormat::from_magic_bytes(&[0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00]),
            CompressionFormat::Xz
        );
        assert_eq!(
            CompressionFormat::from_magic_bytes(&[0x28, 0xb5, 0x2f, 0xfd]),
            CompressionFormat::Zstd
        );
        assert_eq!(
            CompressionFormat::from_magic_bytes(&[0x5d, 0x00, 0x00, 0x80]),
            CompressionFormat::Lzma
        );
        assert_eq!(
            CompressionFormat::from_magic_bytes(b"070701"),
            CompressionFormat::None
        );
        assert_eq!(CompressionFormat::from_magic_bytes(&[0x1f]), CompressionFormat::None);
    }

    #[test]
    fn test_payload_decoder_gzip() {
        let mut out = Vec::new();
        payload_decoder(GZIP_HELLO)
            .unwrap()
            .read_to_end(&mut out)
            .unwrap();
        assert_eq!(out, b"hello");
    }

    #[test]
    fn test_payload_decoder_raw() {
        let mut out = Vec::new();
        payload_decoder(b"070701raw").unwrap().read_to_end(&mut out).unwrap();
        assert_eq!(out, b"070701raw");
    }

    #[test]
    fn test_zstd_round_trip() {
        let compressed = zstd::encode_all(&b"payload"[..], 3).unwrap();
        let mut out = Vec::new();
        payload_decoder(&compressed)
            .unwrap()
            .read_to_end(&mut out)
            .unwrap();
        assert_eq!(out, b"payload");
    }
}
