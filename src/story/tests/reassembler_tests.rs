//! Tests for inbound reassembly ordering, limits, and eviction.

use std::{
    num::NonZeroUsize,
    time::{Duration, Instant},
};

use crate::story::{
    ContinuationFragment,
    FirstFragment,
    FragmentEvent,
    FragmentNumber,
    Guid,
    ReassemblyConfig,
    ReassemblyError,
    Reassembler,
    SequenceError,
};

fn config() -> ReassemblyConfig {
    ReassemblyConfig {
        max_story_size: NonZeroUsize::new(64).expect("non-zero"),
        reassembly_ttl: Duration::from_secs(30),
    }
}

fn first(guid: &str, declared_size: usize, chunk: &[u8]) -> FragmentEvent {
    FragmentEvent::First(FirstFragment {
        guid: Guid::from(guid),
        source: "NS:RTRS".to_owned(),
        declared_size,
        chunk: chunk.to_vec(),
    })
}

fn continuation(guid: &str, number: u32, chunk: &[u8]) -> FragmentEvent {
    continuation_from(guid, "NS:RTRS", number, chunk)
}

fn continuation_from(guid: &str, source: &str, number: u32, chunk: &[u8]) -> FragmentEvent {
    FragmentEvent::Continuation(ContinuationFragment {
        guid: Guid::from(guid),
        source: source.to_owned(),
        number: FragmentNumber::new(number).expect("non-zero"),
        chunk: chunk.to_vec(),
    })
}

fn setup_with_first_fragment(guid: &str, declared_size: usize, chunk: &[u8]) -> Reassembler {
    let mut reassembler = Reassembler::new(config());
    assert!(
        reassembler
            .accept(first(guid, declared_size, chunk))
            .expect("first fragment accepted")
            .is_none()
    );
    reassembler
}

#[test]
fn single_fragment_story_completes_without_buffering() {
    let mut reassembler = Reassembler::new(config());

    let story = reassembler
        .accept(first("guid-1", 10, b"0123456789"))
        .expect("fragment accepted")
        .expect("story completes in one fragment");

    assert_eq!(story.guid(), &Guid::from("guid-1"));
    assert_eq!(story.payload(), b"0123456789");
    assert_eq!(reassembler.in_flight_len(), 0);
}

#[test]
fn multi_fragment_story_concatenates_in_order() {
    let mut reassembler = setup_with_first_fragment("guid-2", 20, b"01234");
    assert_eq!(reassembler.in_flight_len(), 1);

    assert!(
        reassembler
            .accept(continuation("guid-2", 2, b"56789"))
            .expect("second fragment accepted")
            .is_none()
    );

    let story = reassembler
        .accept(continuation("guid-2", 3, b"abcdefghij"))
        .expect("final fragment accepted")
        .expect("story completes at declared size");

    assert_eq!(story.payload(), b"0123456789abcdefghij");
    assert_eq!(reassembler.in_flight_len(), 0);
}

#[test]
fn continuation_without_in_flight_entry_is_out_of_sequence() {
    let mut reassembler = Reassembler::new(config());

    let err = reassembler
        .accept(continuation("guid-3", 2, b"data"))
        .expect_err("continuation without a first fragment must be rejected");

    assert_eq!(
        err,
        ReassemblyError::OutOfSequence(SequenceError::MissingStory {
            guid: Guid::from("guid-3"),
        })
    );
}

#[test]
fn skipped_fragment_number_leaves_entry_untouched() {
    let mut reassembler = setup_with_first_fragment("guid-4", 15, b"01234");

    let err = reassembler
        .accept(continuation("guid-4", 3, b"56789"))
        .expect_err("gap must be rejected");
    assert!(matches!(
        err,
        ReassemblyError::OutOfSequence(SequenceError::NumberMismatch { .. })
    ));
    assert_eq!(reassembler.in_flight_len(), 1);

    // The entry is still exactly where fragment one left it.
    let story = reassembler
        .accept(continuation("guid-4", 2, b"56789abcde"))
        .expect("in-sequence fragment accepted")
        .expect("story completes");
    assert_eq!(story.payload(), b"0123456789abcde");
}

#[test]
fn source_mismatch_leaves_entry_untouched() {
    let mut reassembler = setup_with_first_fragment("guid-5", 10, b"01234");

    let err = reassembler
        .accept(continuation_from("guid-5", "NS:OTHER", 2, b"56789"))
        .expect_err("source mismatch must be rejected");
    assert!(matches!(
        err,
        ReassemblyError::OutOfSequence(SequenceError::SourceMismatch { .. })
    ));
    assert_eq!(reassembler.in_flight_len(), 1);

    let story = reassembler
        .accept(continuation("guid-5", 2, b"56789"))
        .expect("matching source accepted")
        .expect("story completes");
    assert_eq!(story.payload(), b"0123456789");
}

#[test]
fn overflowing_declared_size_removes_corrupted_entry() {
    let mut reassembler = setup_with_first_fragment("guid-6", 8, b"0123");

    let err = reassembler
        .accept(continuation("guid-6", 2, b"456789"))
        .expect_err("overflow must be rejected");
    assert_eq!(
        err,
        ReassemblyError::SizeOverflow {
            guid: Guid::from("guid-6"),
            accumulated: 10,
            declared: 8,
        }
    );
    assert_eq!(reassembler.in_flight_len(), 0);

    // The corrupted entry is gone, so a retry of fragment two has nothing
    // to merge into.
    let err = reassembler
        .accept(continuation("guid-6", 2, b"45"))
        .expect_err("entry was removed");
    assert!(matches!(
        err,
        ReassemblyError::OutOfSequence(SequenceError::MissingStory { .. })
    ));
}

#[test]
fn oversized_single_fragment_is_rejected_without_buffering() {
    let mut reassembler = Reassembler::new(config());

    let err = reassembler
        .accept(first("guid-7", 4, b"0123456789"))
        .expect_err("chunk longer than the declared size must be rejected");
    assert!(matches!(err, ReassemblyError::SizeOverflow { .. }));
    assert_eq!(reassembler.in_flight_len(), 0);
}

#[test]
fn declared_size_beyond_cap_is_rejected() {
    let mut reassembler = Reassembler::new(config());

    let err = reassembler
        .accept(first("guid-8", 65, b"0123"))
        .expect_err("declared size beyond the cap must be rejected");
    assert_eq!(
        err,
        ReassemblyError::StoryTooLarge {
            guid: Guid::from("guid-8"),
            declared: 65,
            limit: NonZeroUsize::new(64).expect("non-zero"),
        }
    );
    assert_eq!(reassembler.in_flight_len(), 0);
}

#[test]
fn repeated_first_fragment_replaces_stale_entry() {
    let mut reassembler = setup_with_first_fragment("guid-9", 10, b"aaaaa");

    // The feed abandoned the first attempt; a fresh fragment one wins.
    assert!(
        reassembler
            .accept(first("guid-9", 10, b"01234"))
            .expect("replacement first fragment accepted")
            .is_none()
    );
    assert_eq!(reassembler.in_flight_len(), 1);

    let story = reassembler
        .accept(continuation("guid-9", 2, b"56789"))
        .expect("second fragment accepted")
        .expect("story completes");
    assert_eq!(story.payload(), b"0123456789");
}

#[test]
fn interleaved_stories_assemble_independently() {
    let mut reassembler = Reassembler::new(config());

    assert!(
        reassembler
            .accept(first("guid-a", 6, b"aaa"))
            .expect("first accepted")
            .is_none()
    );
    assert!(
        reassembler
            .accept(first("guid-b", 4, b"bb"))
            .expect("first accepted")
            .is_none()
    );
    assert_eq!(reassembler.in_flight_len(), 2);

    let story_b = reassembler
        .accept(continuation("guid-b", 2, b"bb"))
        .expect("fragment accepted")
        .expect("story b completes");
    assert_eq!(story_b.payload(), b"bbbb");
    assert_eq!(reassembler.in_flight_len(), 1);

    let story_a = reassembler
        .accept(continuation("guid-a", 2, b"aaa"))
        .expect("fragment accepted")
        .expect("story a completes");
    assert_eq!(story_a.payload(), b"aaaaaa");
    assert_eq!(reassembler.in_flight_len(), 0);
}

#[test]
fn purge_evicts_only_expired_stories() {
    let mut reassembler = Reassembler::new(ReassemblyConfig {
        max_story_size: NonZeroUsize::new(64).expect("non-zero"),
        reassembly_ttl: Duration::from_secs(2),
    });
    let now = Instant::now();

    assert!(
        reassembler
            .accept_at(first("guid-old", 10, b"01234"), now)
            .expect("first fragment accepted")
            .is_none()
    );
    assert!(
        reassembler
            .accept_at(first("guid-new", 10, b"01234"), now + Duration::from_secs(1))
            .expect("first fragment accepted")
            .is_none()
    );

    let evicted = reassembler.purge_expired_at(now + Duration::from_secs(2));
    assert_eq!(evicted, vec![Guid::from("guid-old")]);
    assert_eq!(reassembler.in_flight_len(), 1);
}

#[test]
fn accept_purges_expired_stories_before_merging() {
    let mut reassembler = Reassembler::new(ReassemblyConfig {
        max_story_size: NonZeroUsize::new(64).expect("non-zero"),
        reassembly_ttl: Duration::from_secs(2),
    });
    let now = Instant::now();

    assert!(
        reassembler
            .accept_at(first("guid-stale", 10, b"01234"), now)
            .expect("first fragment accepted")
            .is_none()
    );

    // By the time the continuation arrives the entry has expired, so the
    // fragment has nothing to merge into.
    let err = reassembler
        .accept_at(
            continuation("guid-stale", 2, b"56789"),
            now + Duration::from_secs(3),
        )
        .expect_err("expired story must be gone");
    assert!(matches!(
        err,
        ReassemblyError::OutOfSequence(SequenceError::MissingStory { .. })
    ));
    assert_eq!(reassembler.in_flight_len(), 0);
}

#[test]
fn zero_length_continuation_is_accepted() {
    let mut reassembler = setup_with_first_fragment("guid-z", 5, b"012");

    assert!(
        reassembler
            .accept(continuation("guid-z", 2, b""))
            .expect("empty fragment accepted")
            .is_none()
    );

    let story = reassembler
        .accept(continuation("guid-z", 3, b"34"))
        .expect("final fragment accepted")
        .expect("story completes");
    assert_eq!(story.payload(), b"01234");
}
