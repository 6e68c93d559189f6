//! Input types accepted by the reassembler.
//!
//! A fragment event arrives in one of two shapes: the first fragment, which
//! declares the total payload size, and continuation fragments, which carry
//! only their position. Splitting the shapes keeps the declared size a plain
//! field instead of an option every consumer must re-check.

use super::{FragmentNumber, Guid};

/// The opening fragment of a story.
///
/// Carries the declared total size of the fully concatenated (pre-decode)
/// payload, which the feed only sends on the first fragment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FirstFragment {
    /// Story this fragment opens.
    pub guid: Guid,
    /// Originating feed source; continuations must repeat it.
    pub source: String,
    /// Expected byte length of the fully concatenated payload.
    pub declared_size: usize,
    /// Raw fragment bytes, already base64-decoded.
    pub chunk: Vec<u8>,
}

/// A follow-up fragment of an already opened story.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContinuationFragment {
    /// Story this fragment continues.
    pub guid: Guid,
    /// Originating feed source.
    pub source: String,
    /// One-based position within the story; always greater than one here.
    pub number: FragmentNumber,
    /// Raw fragment bytes, already base64-decoded.
    pub chunk: Vec<u8>,
}

/// One fragment-bearing update event, dispatched on its position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FragmentEvent {
    /// Fragment number one, declaring the story's total size.
    First(FirstFragment),
    /// Any later fragment.
    Continuation(ContinuationFragment),
}

impl FragmentEvent {
    /// Story the fragment belongs to.
    #[must_use]
    pub const fn guid(&self) -> &Guid {
        match self {
            Self::First(first) => &first.guid,
            Self::Continuation(continuation) => &continuation.guid,
        }
    }

    /// Raw fragment bytes carried by the event.
    #[must_use]
    pub fn chunk(&self) -> &[u8] {
        match self {
            Self::First(first) => &first.chunk,
            Self::Continuation(continuation) => &continuation.chunk,
        }
    }
}
