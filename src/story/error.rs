//! Error types emitted by the reassembly layer.
//!
//! Each protocol violation gets its own variant so callers can distinguish
//! and react to failure kinds instead of receiving an opaque catch-all.

use std::num::NonZeroUsize;

use thiserror::Error;

use super::{FragmentNumber, Guid};

/// Reasons a continuation fragment fails the continuity checks.
///
/// These are grouped under [`ReassemblyError::OutOfSequence`] because the
/// protocol treats them identically: the fragment is dropped and any
/// existing in-flight state is left untouched.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SequenceError {
    /// A continuation fragment arrived for a story with no in-flight entry.
    #[error("no in-flight story for {guid}")]
    MissingStory {
        /// Story the fragment claimed to continue.
        guid: Guid,
    },
    /// The fragment names a different source than the first fragment did.
    #[error("source mismatch for {guid}: expected {expected}, found {found}")]
    SourceMismatch {
        /// Story being assembled.
        guid: Guid,
        /// Source recorded from the first fragment.
        expected: String,
        /// Source carried by the offending fragment.
        found: String,
    },
    /// The fragment number is not the direct successor of the last merge.
    #[error("fragment number mismatch for {guid}: expected {expected}, found {found}")]
    NumberMismatch {
        /// Story being assembled.
        guid: Guid,
        /// Number the series expected next.
        expected: FragmentNumber,
        /// Number carried by the fragment that was received.
        found: FragmentNumber,
    },
    /// The fragment number cannot advance past `u32::MAX`.
    #[error("fragment number overflow after {last}")]
    NumberOverflow {
        /// Last number accepted before overflow occurred.
        last: FragmentNumber,
    },
}

impl SequenceError {
    /// Story the failing fragment belonged to, when known.
    #[must_use]
    pub fn guid(&self) -> Option<&Guid> {
        match self {
            Self::MissingStory { guid }
            | Self::SourceMismatch { guid, .. }
            | Self::NumberMismatch { guid, .. } => Some(guid),
            Self::NumberOverflow { .. } => None,
        }
    }
}

/// Errors produced by [`Reassembler`](crate::story::Reassembler).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ReassemblyError {
    /// The fragment failed continuity validation; in-flight state is
    /// untouched.
    #[error("fragment out of sequence: {0}")]
    OutOfSequence(#[from] SequenceError),
    /// The first fragment declares a total size beyond the configured cap.
    #[error("story {guid} declares {declared} bytes, over the {limit} byte cap")]
    StoryTooLarge {
        /// Story whose declaration exceeded the cap.
        guid: Guid,
        /// Declared total payload size.
        declared: usize,
        /// Configured size cap.
        limit: NonZeroUsize,
    },
    /// The accumulated payload grew past the declared total size. The
    /// corrupted in-flight entry has been removed.
    #[error("story {guid} overflowed its declared size: {accumulated} > {declared} bytes")]
    SizeOverflow {
        /// Story whose buffer overflowed.
        guid: Guid,
        /// Bytes accumulated after the offending merge.
        accumulated: usize,
        /// Total size declared by the first fragment.
        declared: usize,
    },
}

impl ReassemblyError {
    /// Story the failing fragment belonged to, when known.
    #[must_use]
    pub fn guid(&self) -> Option<&Guid> {
        match self {
            Self::OutOfSequence(sequence) => sequence.guid(),
            Self::StoryTooLarge { guid, .. } | Self::SizeOverflow { guid, .. } => Some(guid),
        }
    }
}
