//! Facade tying field extraction, reassembly, and decoding together.
//!
//! [`StoryPipeline`] is the single entry point most consumers want: feed it
//! one update field map at a time and receive either a decoded story, a
//! "still buffering" signal, or a structured failure carrying the
//! originating GUID when it is known. Failures never poison the pipeline;
//! processing continues with the next update.

use std::{fmt, io, num::NonZeroUsize, str, time::Instant};

use thiserror::Error;

use crate::{
    decode::{DecodeFailure, Story},
    fields::{FIELD_GUID, FieldError},
    story::{
        FragmentEvent,
        Guid,
        ReassemblyConfig,
        ReassemblyError,
        Reassembler,
        SequenceError,
    },
};

/// Classified failure kinds surfaced by the pipeline.
///
/// One variant per failure the protocol can produce, so callers can log,
/// count, or alert on each kind without string matching.
#[derive(Debug, Error)]
pub enum StoryErrorKind {
    /// A required inbound field was missing or carried the wrong type.
    #[error("malformed update: {0}")]
    Malformed(FieldError),
    /// The fragment body was not valid base64.
    #[error("fragment body is not valid base64: {0}")]
    Decode(base64::DecodeError),
    /// The fragment failed continuity validation against in-flight state.
    #[error("fragment out of sequence: {0}")]
    OutOfSequence(SequenceError),
    /// The first fragment declared a total size beyond the configured cap.
    #[error("declared story size {declared} exceeds the {limit} byte cap")]
    StoryTooLarge {
        /// Declared total payload size.
        declared: usize,
        /// Configured size cap.
        limit: NonZeroUsize,
    },
    /// The accumulated payload grew past the declared total size.
    #[error("accumulated {accumulated} bytes against a declared {declared}")]
    SizeOverflow {
        /// Bytes accumulated after the offending merge.
        accumulated: usize,
        /// Total size declared by the first fragment.
        declared: usize,
    },
    /// The completed payload is not a valid zlib or gzip stream.
    #[error("failed to decompress story payload: {0}")]
    Decompression(io::Error),
    /// The decompressed story text is not valid UTF-8.
    #[error("story text is not valid UTF-8: {0}")]
    Encoding(str::Utf8Error),
    /// The decompressed story text is not valid JSON.
    #[error("failed to parse story document: {0}")]
    Parse(serde_json::Error),
}

/// Structured failure emitted for one update event.
///
/// Carries the originating story GUID whenever the update got far enough to
/// reveal one, so operators can correlate failures with the stories they
/// affected.
#[derive(Debug)]
pub struct StoryError {
    /// Story the failing update belonged to, when known.
    pub guid: Option<Guid>,
    /// Classified failure.
    pub kind: StoryErrorKind,
}

impl fmt::Display for StoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.guid {
            Some(guid) => write!(f, "update for story {guid} failed: {kind}", kind = self.kind),
            None => write!(f, "update failed: {kind}", kind = self.kind),
        }
    }
}

impl std::error::Error for StoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> { Some(&self.kind) }
}

impl From<ReassemblyError> for StoryError {
    fn from(err: ReassemblyError) -> Self {
        let guid = err.guid().cloned();
        let kind = match err {
            ReassemblyError::OutOfSequence(sequence) => StoryErrorKind::OutOfSequence(sequence),
            ReassemblyError::StoryTooLarge {
                declared, limit, ..
            } => StoryErrorKind::StoryTooLarge { declared, limit },
            ReassemblyError::SizeOverflow {
                accumulated,
                declared,
                ..
            } => StoryErrorKind::SizeOverflow {
                accumulated,
                declared,
            },
        };
        Self { guid, kind }
    }
}

impl From<DecodeFailure> for StoryErrorKind {
    fn from(failure: DecodeFailure) -> Self {
        match failure {
            DecodeFailure::Decompression(err) => Self::Decompression(err),
            DecodeFailure::Encoding(err) => Self::Encoding(err),
            DecodeFailure::Parse(err) => Self::Parse(err),
        }
    }
}

/// Reassembly and decode pipeline for one update stream.
///
/// # Examples
///
/// ```
/// use std::io::Write;
///
/// use base64::{Engine as _, engine::general_purpose::STANDARD};
/// use flate2::{Compression, write::ZlibEncoder};
/// use newswire::StoryPipeline;
/// use serde_json::json;
///
/// let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
/// encoder.write_all(br#"{"headline": "markets rally"}"#).unwrap();
/// let payload = encoder.finish().unwrap();
///
/// let fields = json!({
///     "GUID": "story-1",
///     "MRN_SRC": "NS:RTRS",
///     "FRAG_NUM": 1,
///     "TOT_SIZE": payload.len(),
///     "FRAGMENT": STANDARD.encode(&payload),
/// });
/// let mut pipeline = StoryPipeline::default();
/// let story = pipeline
///     .on_update(fields.as_object().unwrap())
///     .expect("update processes")
///     .expect("single-fragment story completes");
/// assert_eq!(story["headline"], "markets rally");
/// ```
#[derive(Debug, Default)]
pub struct StoryPipeline {
    reassembler: Reassembler,
}

impl StoryPipeline {
    /// Create a pipeline with explicit reassembly bounds.
    #[must_use]
    pub fn new(config: ReassemblyConfig) -> Self {
        Self {
            reassembler: Reassembler::new(config),
        }
    }

    /// Process one update's field map using the current time.
    ///
    /// Returns `Ok(Some(story))` when the update completed a story,
    /// `Ok(None)` while fragments are still outstanding, or a [`StoryError`]
    /// describing why this update was rejected. Errors are local to the
    /// update: the pipeline remains usable and other in-flight stories are
    /// unaffected.
    ///
    /// # Errors
    ///
    /// Returns [`StoryError`] with the failure kind and the originating
    /// GUID when known.
    pub fn on_update(
        &mut self,
        fields: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Option<Story>, StoryError> {
        self.on_update_at(fields, Instant::now())
    }

    /// Process one update's field map using an explicit clock reading.
    ///
    /// # Errors
    ///
    /// Returns [`StoryError`] with the failure kind and the originating
    /// GUID when known.
    pub fn on_update_at(
        &mut self,
        fields: &serde_json::Map<String, serde_json::Value>,
        now: Instant,
    ) -> Result<Option<Story>, StoryError> {
        let result = self.process_at(fields, now);
        #[cfg(feature = "metrics")]
        match &result {
            Ok(Some(_)) => crate::metrics::inc_stories(),
            Ok(None) => {}
            Err(_) => crate::metrics::inc_update_errors(),
        }
        result
    }

    fn process_at(
        &mut self,
        fields: &serde_json::Map<String, serde_json::Value>,
        now: Instant,
    ) -> Result<Option<Story>, StoryError> {
        let event = FragmentEvent::from_fields(fields).map_err(|err| StoryError {
            // Extraction failed, so the GUID is only known if that one
            // field happens to be well-formed.
            guid: fields
                .get(FIELD_GUID)
                .and_then(serde_json::Value::as_str)
                .map(Guid::from),
            kind: match err {
                FieldError::Base64(err) => StoryErrorKind::Decode(err),
                other => StoryErrorKind::Malformed(other),
            },
        })?;
        #[cfg(feature = "metrics")]
        crate::metrics::inc_fragments();

        let Some(assembled) = self.reassembler.accept_at(event, now)? else {
            return Ok(None);
        };

        let guid = assembled.guid().clone();
        match assembled.decode() {
            Ok(story) => {
                log::debug!("decoded story {guid}: {len} bytes", len = assembled.payload().len());
                Ok(Some(story))
            }
            Err(failure) => Err(StoryError {
                guid: Some(guid),
                kind: failure.into(),
            }),
        }
    }

    /// Remove in-flight stories that exceeded the configured lifetime.
    ///
    /// Returns the identifiers of expired stories so callers can surface
    /// them to observability sinks.
    pub fn purge_expired(&mut self) -> Vec<Guid> { self.reassembler.purge_expired() }

    /// Number of in-flight stories currently buffered.
    #[must_use]
    pub fn in_flight_len(&self) -> usize { self.reassembler.in_flight_len() }
}
