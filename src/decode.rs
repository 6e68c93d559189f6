//! Decode pipeline applied to fully re-assembled story payloads.
//!
//! A completed payload is a compressed JSON document. The feed wraps some
//! streams in a gzip header and others in a plain zlib header, so inflation
//! sniffs the wrapper before selecting a decoder (the upstream protocol
//! documents this as "maximum window bits with gzip header detection").
//! Each stage fails independently and permanently: re-running the pipeline
//! over the same bytes cannot succeed where the first attempt failed.

use std::{
    io::{self, Read},
    str,
};

use flate2::read::{GzDecoder, ZlibDecoder};
use thiserror::Error;

/// Parsed news story document.
///
/// The pipeline imposes no structure beyond "valid JSON"; consumers decide
/// which fields of the story body they care about.
pub type Story = serde_json::Value;

/// Leading bytes of a gzip member header.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Errors produced while decoding a completed story payload.
#[derive(Debug, Error)]
pub enum DecodeFailure {
    /// The payload is not a valid zlib or gzip stream.
    #[error("failed to decompress story payload: {0}")]
    Decompression(#[from] io::Error),
    /// The decompressed bytes are not valid UTF-8.
    #[error("decompressed story is not valid UTF-8: {0}")]
    Encoding(#[from] str::Utf8Error),
    /// The decompressed text is not valid JSON.
    #[error("failed to parse story document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Decode a re-assembled payload into a story document.
///
/// Runs inflate, UTF-8 validation, and JSON parsing in order, classifying
/// each failure separately.
///
/// # Examples
///
/// ```
/// use std::io::Write;
///
/// use flate2::{Compression, write::ZlibEncoder};
///
/// let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
/// encoder.write_all(br#"{"headline": "markets rally"}"#).unwrap();
/// let payload = encoder.finish().unwrap();
///
/// let story = newswire::decode_story(&payload).expect("payload decodes");
/// assert_eq!(story["headline"], "markets rally");
/// ```
///
/// # Errors
///
/// Returns a [`DecodeFailure`] naming the stage that failed.
pub fn decode_story(payload: &[u8]) -> Result<Story, DecodeFailure> {
    let inflated = inflate(payload)?;
    let text = str::from_utf8(&inflated)?;
    Ok(serde_json::from_str(text)?)
}

fn inflate(payload: &[u8]) -> io::Result<Vec<u8>> {
    let mut inflated = Vec::new();
    if payload.starts_with(&GZIP_MAGIC) {
        GzDecoder::new(payload).read_to_end(&mut inflated)?;
    } else {
        ZlibDecoder::new(payload).read_to_end(&mut inflated)?;
    }
    Ok(inflated)
}
