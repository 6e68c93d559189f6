//! Continuity tracker used to re-assemble stories from fragments.
//!
//! `FragmentSeries` is intentionally small so the reassembler can embed one
//! per in-flight story without allocation overhead beyond the source name.

use super::{FragmentNumber, Guid, SequenceError};

/// Track the expected ordering of fragments for a single story.
///
/// The series keeps only lightweight metadata (story GUID, originating
/// source, last accepted fragment number). Completion is not its concern:
/// the reassembler decides that by comparing accumulated bytes against the
/// declared total size.
///
/// # Examples
///
/// ```
/// use newswire::story::{FragmentNumber, FragmentSeries, Guid};
/// let mut series = FragmentSeries::new(Guid::from("story-1"), "NS:RTRS".to_owned());
/// let second = FragmentNumber::new(2).expect("non-zero");
/// assert!(series.accept("NS:RTRS", second).is_ok());
/// assert_eq!(series.last_number(), second);
/// ```
#[derive(Clone, Debug)]
pub struct FragmentSeries {
    guid: Guid,
    source: String,
    last_number: FragmentNumber,
}

impl FragmentSeries {
    /// Create a series that has consumed the first fragment of `guid` from
    /// `source`.
    #[must_use]
    pub const fn new(guid: Guid, source: String) -> Self {
        Self {
            guid,
            source,
            last_number: FragmentNumber::first(),
        }
    }

    /// Return the story identifier tracked by this series.
    #[must_use]
    pub const fn guid(&self) -> &Guid { &self.guid }

    /// Return the source recorded from the first fragment.
    #[must_use]
    pub fn source(&self) -> &str { &self.source }

    /// Return the last fragment number merged into the story.
    #[must_use]
    pub const fn last_number(&self) -> FragmentNumber { self.last_number }

    /// Accept a continuation fragment and advance the expected number.
    ///
    /// Fragment numbers must increase by exactly one per fragment; gaps,
    /// repeats, and backwards jumps are all rejected without mutating the
    /// series.
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError::SourceMismatch`] when the fragment names a
    /// different source than the first fragment did,
    /// [`SequenceError::NumberMismatch`] when the fragment is not the direct
    /// successor of the last accepted one, and
    /// [`SequenceError::NumberOverflow`] when the number cannot advance
    /// further.
    pub fn accept(&mut self, source: &str, number: FragmentNumber) -> Result<(), SequenceError> {
        if source != self.source {
            return Err(SequenceError::SourceMismatch {
                guid: self.guid.clone(),
                expected: self.source.clone(),
                found: source.to_owned(),
            });
        }

        let Some(expected) = self.last_number.checked_next() else {
            return Err(SequenceError::NumberOverflow {
                last: self.last_number,
            });
        };

        if number != expected {
            return Err(SequenceError::NumberMismatch {
                guid: self.guid.clone(),
                expected,
                found: number,
            });
        }

        self.last_number = number;
        Ok(())
    }
}
