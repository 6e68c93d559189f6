//! Inbound helper that stitches fragments back into complete stories.
//!
//! [`Reassembler`] tracks in-flight stories keyed by [`Guid`] in an explicit
//! map, merges fragments in strict arrival order via
//! [`FragmentSeries`](crate::story::FragmentSeries), and detects completion
//! by comparing accumulated bytes against the size declared on the first
//! fragment. Partial stories whose final fragment never arrives are purged
//! after a fixed timeout so the in-flight set cannot grow without bound.

use std::{
    collections::{HashMap, hash_map::Entry},
    time::Instant,
};

use super::{
    ContinuationFragment,
    FirstFragment,
    FragmentEvent,
    FragmentSeries,
    Guid,
    ReassemblyConfig,
    ReassemblyError,
    SequenceError,
};
use crate::decode::{DecodeFailure, Story, decode_story};

#[derive(Debug)]
struct InFlightStory {
    series: FragmentSeries,
    buffer: Vec<u8>,
    declared_size: usize,
    started_at: Instant,
}

impl InFlightStory {
    fn new(series: FragmentSeries, chunk: Vec<u8>, declared_size: usize, started_at: Instant) -> Self {
        Self {
            series,
            buffer: chunk,
            declared_size,
            started_at,
        }
    }

    fn push(&mut self, chunk: &[u8]) { self.buffer.extend_from_slice(chunk); }

    fn len(&self) -> usize { self.buffer.len() }

    fn started_at(&self) -> Instant { self.started_at }

    fn into_buffer(self) -> Vec<u8> { self.buffer }
}

/// Container for a fully re-assembled story payload.
///
/// The payload is the ordered concatenation of every fragment's bytes,
/// still compressed. [`decode`](Self::decode) runs the decode pipeline
/// over it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReassembledStory {
    guid: Guid,
    payload: Vec<u8>,
}

impl ReassembledStory {
    /// Construct a new [`ReassembledStory`].
    #[must_use]
    pub const fn new(guid: Guid, payload: Vec<u8>) -> Self { Self { guid, payload } }

    /// Identifier shared by the fragments that formed this story.
    #[must_use]
    pub const fn guid(&self) -> &Guid { &self.guid }

    /// Borrow the re-assembled payload.
    #[must_use]
    pub fn payload(&self) -> &[u8] { self.payload.as_slice() }

    /// Consume the story, returning the owned payload bytes.
    #[must_use]
    pub fn into_payload(self) -> Vec<u8> { self.payload }

    /// Run the decode pipeline (inflate, UTF-8 validate, JSON parse) over
    /// the payload.
    ///
    /// # Errors
    ///
    /// Returns any [`DecodeFailure`] raised while decoding the payload.
    pub fn decode(&self) -> Result<Story, DecodeFailure> { decode_story(self.payload()) }
}

/// Stateful fragment re-assembler with timeout-based eviction.
///
/// Processing is strictly single-consumer: `accept` takes `&mut self` and
/// runs each event to completion, so no locking is required as long as one
/// owner feeds the stream. Callers that fan events in from several sources
/// must serialise access themselves.
///
/// # Examples
///
/// ```
/// use newswire::story::{
///     FirstFragment,
///     FragmentEvent,
///     Guid,
///     ReassemblyConfig,
///     Reassembler,
/// };
///
/// let mut reassembler = Reassembler::new(ReassemblyConfig::default());
/// let event = FragmentEvent::First(FirstFragment {
///     guid: Guid::from("story-1"),
///     source: "NS:RTRS".to_owned(),
///     declared_size: 5,
///     chunk: b"hello".to_vec(),
/// });
/// let story = reassembler
///     .accept(event)
///     .expect("fragment accepted")
///     .expect("single fragment completes the story");
/// assert_eq!(story.payload(), b"hello");
/// assert_eq!(reassembler.in_flight_len(), 0);
/// ```
#[derive(Debug)]
pub struct Reassembler {
    config: ReassemblyConfig,
    stories: HashMap<Guid, InFlightStory>,
}

impl Default for Reassembler {
    fn default() -> Self { Self::new(ReassemblyConfig::default()) }
}

impl Reassembler {
    /// Create a re-assembler bounded by `config`.
    #[must_use]
    pub fn new(config: ReassemblyConfig) -> Self {
        Self {
            config,
            stories: HashMap::new(),
        }
    }

    /// Process a fragment event using the current time.
    ///
    /// Returns `Ok(Some(_))` when the fragment completes its story,
    /// `Ok(None)` while more fragments are required, or an error when the
    /// fragment violates ordering or size invariants. Errors are local to
    /// the offending event: other in-flight stories are never affected, and
    /// continuity failures leave even the offending story's state untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ReassemblyError`] when a fragment arrives out of sequence
    /// or the accumulated payload violates the declared total size.
    pub fn accept(
        &mut self,
        event: FragmentEvent,
    ) -> Result<Option<ReassembledStory>, ReassemblyError> {
        self.accept_at(event, Instant::now())
    }

    /// Process a fragment event using an explicit clock reading.
    ///
    /// Accepting an explicit `now` simplifies deterministic testing and
    /// allows callers to co-ordinate eviction sweeps with their own timers.
    ///
    /// # Errors
    ///
    /// Returns [`ReassemblyError`] when the fragment violates ordering or
    /// size invariants.
    pub fn accept_at(
        &mut self,
        event: FragmentEvent,
        now: Instant,
    ) -> Result<Option<ReassembledStory>, ReassemblyError> {
        for guid in self.purge_expired_at(now) {
            log::warn!("evicted expired in-flight story {guid}");
        }

        match event {
            FragmentEvent::First(first) => self.accept_first(first, now),
            FragmentEvent::Continuation(continuation) => self.accept_continuation(&continuation),
        }
    }

    fn accept_first(
        &mut self,
        fragment: FirstFragment,
        now: Instant,
    ) -> Result<Option<ReassembledStory>, ReassemblyError> {
        let FirstFragment {
            guid,
            source,
            declared_size,
            chunk,
        } = fragment;

        if declared_size > self.config.max_story_size.get() {
            return Err(ReassemblyError::StoryTooLarge {
                guid,
                declared: declared_size,
                limit: self.config.max_story_size,
            });
        }

        // A story that fits in one fragment never touches the in-flight set.
        if chunk.len() == declared_size {
            return Ok(Some(ReassembledStory::new(guid, chunk)));
        }

        if chunk.len() > declared_size {
            return Err(ReassemblyError::SizeOverflow {
                guid,
                accumulated: chunk.len(),
                declared: declared_size,
            });
        }

        let series = FragmentSeries::new(guid.clone(), source);
        let in_flight = InFlightStory::new(series, chunk, declared_size, now);
        if self.stories.insert(guid.clone(), in_flight).is_some() {
            // The prior entry never completed; treat it as abandoned.
            log::warn!("replacing stale in-flight story {guid}");
            #[cfg(feature = "metrics")]
            crate::metrics::inc_replaced();
        } else {
            #[cfg(feature = "metrics")]
            crate::metrics::inc_in_flight();
        }
        Ok(None)
    }

    fn accept_continuation(
        &mut self,
        fragment: &ContinuationFragment,
    ) -> Result<Option<ReassembledStory>, ReassemblyError> {
        let Entry::Occupied(mut entry) = self.stories.entry(fragment.guid.clone()) else {
            return Err(SequenceError::MissingStory {
                guid: fragment.guid.clone(),
            }
            .into());
        };

        // Continuity failures must not corrupt the entry, so validate before
        // merging anything.
        entry
            .get_mut()
            .series
            .accept(&fragment.source, fragment.number)?;
        entry.get_mut().push(&fragment.chunk);

        let accumulated = entry.get().len();
        let declared = entry.get().declared_size;
        log::debug!(
            "merged fragment {number} for story {guid}: {accumulated}/{declared} bytes",
            number = fragment.number,
            guid = fragment.guid,
        );

        if accumulated == declared {
            let finished = entry.remove();
            #[cfg(feature = "metrics")]
            crate::metrics::dec_in_flight();
            return Ok(Some(ReassembledStory::new(
                fragment.guid.clone(),
                finished.into_buffer(),
            )));
        }
        if accumulated > declared {
            entry.remove();
            #[cfg(feature = "metrics")]
            crate::metrics::dec_in_flight();
            return Err(ReassemblyError::SizeOverflow {
                guid: fragment.guid.clone(),
                accumulated,
                declared,
            });
        }
        Ok(None)
    }

    /// Remove any in-flight stories that exceeded the configured lifetime.
    ///
    /// Returns the identifiers of stories that were evicted.
    pub fn purge_expired(&mut self) -> Vec<Guid> { self.purge_expired_at(Instant::now()) }

    /// Remove any in-flight stories that exceeded the configured lifetime
    /// using an explicit clock reading.
    ///
    /// Returns the identifiers of stories that were evicted.
    pub fn purge_expired_at(&mut self, now: Instant) -> Vec<Guid> {
        let mut evicted = Vec::new();
        let ttl = self.config.reassembly_ttl;

        self.stories.retain(|guid, story| {
            let expired = now.saturating_duration_since(story.started_at()) >= ttl;
            if expired {
                evicted.push(guid.clone());
            }
            !expired
        });

        #[cfg(feature = "metrics")]
        for _ in &evicted {
            crate::metrics::inc_evicted();
            crate::metrics::dec_in_flight();
        }

        evicted
    }

    /// Number of in-flight stories currently buffered.
    #[must_use]
    pub fn in_flight_len(&self) -> usize { self.stories.len() }
}
