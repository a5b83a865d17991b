//! Embedded payload decoding
//!
//! An importer blob is base64 text. Decoded, a title blob looks like:
//!
//! ```text
//! [0x00..0x20)  header, contains the ASCII text "CompressedTitle"
//! [0x20..EOF)   zlib stream holding the title XML
//! ```
//!
//! The rest of the header is not understood and is never validated.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use flate2::{Decompress, FlushDecompress, Status};
use tracing::trace;

use crate::error::PayloadError;

/// Size of the fixed header in front of the compressed body
pub const HEADER_LEN: usize = 0x20;
/// Text that identifies a title blob inside the header
pub const DEFAULT_MARKER: &str = "CompressedTitle";

const INFLATE_CHUNK: usize = 16 * 1024;

// Padding is optional and stray trailing bits are tolerated.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Raw bytes of one base64-decoded importer blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    bytes: Vec<u8>,
}

impl EncodedPayload {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Decode node text. ASCII whitespace (line wrapping) is skipped.
    pub fn from_base64(text: &str) -> Result<Self, PayloadError> {
        let compact = Self::filter_base64_text(text);
        let bytes = LENIENT_BASE64.decode(compact.as_bytes())?;
        trace!("decoded {} base64 chars into {} bytes", compact.len(), bytes.len());
        Ok(Self { bytes })
    }

    fn filter_base64_text(text: &str) -> String {
        text.chars().filter(|c| !c.is_ascii_whitespace()).collect()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The header region; shorter than `header_len` if the payload is short
    pub fn header(&self, header_len: usize) -> &[u8] {
        &self.bytes[..header_len.min(self.bytes.len())]
    }

    /// Everything after the header region
    pub fn body(&self, header_len: usize) -> &[u8] {
        &self.bytes[header_len.min(self.bytes.len())..]
    }

    /// Whether `marker` occurs entirely inside the header region.
    pub fn has_marker(&self, marker: &str, header_len: usize) -> bool {
        let marker = marker.as_bytes();
        if marker.is_empty() {
            return true;
        }
        self.header(header_len)
            .windows(marker.len())
            .any(|window| window == marker)
    }

    /// Strip the header and inflate the zlib body.
    ///
    /// The stream must reach its end marker; a cut-off stream is an error
    /// rather than a short title.
    pub fn inflate(&self, header_len: usize) -> Result<Vec<u8>, PayloadError> {
        let body = self.body(header_len);
        let mut inflater = Decompress::new(true);
        let mut out = Vec::with_capacity(body.len().saturating_mul(4).max(INFLATE_CHUNK));

        loop {
            if out.len() == out.capacity() {
                out.reserve(INFLATE_CHUNK);
            }

            let (in_before, out_before) = (inflater.total_in(), inflater.total_out());
            let input = &body[in_before as usize..];
            let status = inflater.decompress_vec(input, &mut out, FlushDecompress::None)?;

            if status == Status::StreamEnd {
                trace!("inflated {} bytes into {} bytes", inflater.total_in(), out.len());
                return Ok(out);
            }

            let stalled = inflater.total_in() == in_before && inflater.total_out() == out_before;
            if stalled && out.len() < out.capacity() {
                return Err(PayloadError::Truncated {
                    consumed: inflater.total_in(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn deflate(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn title_header() -> Vec<u8> {
        let mut header = b"\x00\x00\x00\x01CompressedTitle".to_vec();
        header.resize(HEADER_LEN, 0);
        header
    }

    #[test]
    fn test_base64_ignores_line_wrapping() {
        let payload = EncodedPayload::from_base64("SGVs\n  bG8s\r\nIHdvcmxk\tIQ==\n").unwrap();
        assert_eq!(payload.as_bytes(), b"Hello, world!");
    }

    #[test]
    fn test_base64_padding_is_optional() {
        let payload = EncodedPayload::from_base64("SGVsbG8").unwrap();
        assert_eq!(payload.as_bytes(), b"Hello");
    }

    #[test]
    fn test_base64_rejects_invalid_characters() {
        let err = EncodedPayload::from_base64("not*base64!").unwrap_err();
        assert!(matches!(err, PayloadError::Base64(_)));
    }

    #[test]
    fn test_marker_in_header() {
        let payload = EncodedPayload::from_bytes(title_header());
        assert!(payload.has_marker(DEFAULT_MARKER, HEADER_LEN));
        assert!(!payload.has_marker("CompressedMovie", HEADER_LEN));
    }

    #[test]
    fn test_marker_after_header_is_ignored() {
        let mut bytes = vec![0u8; HEADER_LEN];
        bytes.extend_from_slice(DEFAULT_MARKER.as_bytes());
        let payload = EncodedPayload::from_bytes(bytes);
        assert!(!payload.has_marker(DEFAULT_MARKER, HEADER_LEN));
    }

    #[test]
    fn test_marker_straddling_boundary_is_ignored() {
        let mut bytes = vec![0u8; HEADER_LEN - 5];
        bytes.extend_from_slice(DEFAULT_MARKER.as_bytes());
        let payload = EncodedPayload::from_bytes(bytes);
        assert!(!payload.has_marker(DEFAULT_MARKER, HEADER_LEN));
    }

    #[test]
    fn test_short_payload() {
        let payload = EncodedPayload::from_bytes(b"CompressedTitle".to_vec());
        assert!(payload.has_marker(DEFAULT_MARKER, HEADER_LEN));
        assert!(payload.body(HEADER_LEN).is_empty());
        assert!(payload.inflate(HEADER_LEN).is_err());
    }

    #[test]
    fn test_inflate_returns_original_xml() {
        let xml = b"<?xml version=\"1.0\"?><Title><Text>Hello</Text></Title>";
        let mut bytes = title_header();
        bytes.extend_from_slice(&deflate(xml));

        let payload = EncodedPayload::from_base64(&STANDARD.encode(&bytes)).unwrap();
        assert_eq!(payload.inflate(HEADER_LEN).unwrap(), xml.to_vec());
    }

    #[test]
    fn test_inflate_large_title() {
        let xml: Vec<u8> = (0..200_000u32)
            .flat_map(|i| format!("<Glyph n=\"{i}\"/>").into_bytes())
            .collect();
        let mut bytes = title_header();
        bytes.extend_from_slice(&deflate(&xml));

        let payload = EncodedPayload::from_bytes(bytes);
        assert_eq!(payload.inflate(HEADER_LEN).unwrap(), xml);
    }

    #[test]
    fn test_inflate_garbage_fails() {
        let mut bytes = title_header();
        bytes.extend_from_slice(b"this is not a zlib stream at all");
        let payload = EncodedPayload::from_bytes(bytes);
        assert!(payload.inflate(HEADER_LEN).is_err());
    }

    #[test]
    fn test_inflate_truncated_stream_fails() {
        let xml = b"<Title>some title text that compresses</Title>".repeat(20);
        let compressed = deflate(&xml);
        let mut bytes = title_header();
        bytes.extend_from_slice(&compressed[..compressed.len() / 2]);

        let payload = EncodedPayload::from_bytes(bytes);
        assert!(payload.inflate(HEADER_LEN).is_err());
    }
}
