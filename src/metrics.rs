//! Metric helpers for `newswire`.
//!
//! This module defines metric names and simple helper functions
//! wrapping the [`metrics`](https://docs.rs/metrics) crate.

use metrics::{counter, gauge};

/// Name of the counter tracking accepted fragment events.
pub const FRAGMENTS_ACCEPTED: &str = "newswire_fragments_accepted_total";
/// Name of the counter tracking fully decoded stories.
pub const STORIES_DECODED: &str = "newswire_stories_decoded_total";
/// Name of the counter tracking rejected updates.
pub const UPDATE_ERRORS: &str = "newswire_update_errors_total";
/// Name of the gauge tracking in-flight story buffers.
pub const IN_FLIGHT_ACTIVE: &str = "newswire_in_flight_stories_active";
/// Name of the counter tracking stories evicted by the reassembly timeout.
pub const IN_FLIGHT_EVICTED: &str = "newswire_in_flight_evicted_total";
/// Name of the counter tracking stale in-flight entries replaced by a fresh
/// first fragment.
pub const IN_FLIGHT_REPLACED: &str = "newswire_in_flight_replaced_total";

/// Record an accepted fragment event.
pub fn inc_fragments() { counter!(FRAGMENTS_ACCEPTED).increment(1); }

/// Record a fully decoded story.
pub fn inc_stories() { counter!(STORIES_DECODED).increment(1); }

/// Record a rejected update.
pub fn inc_update_errors() { counter!(UPDATE_ERRORS).increment(1); }

/// Increment the in-flight stories gauge.
pub fn inc_in_flight() { gauge!(IN_FLIGHT_ACTIVE).increment(1.0); }

/// Decrement the in-flight stories gauge.
pub fn dec_in_flight() { gauge!(IN_FLIGHT_ACTIVE).decrement(1.0); }

/// Record an eviction of an expired in-flight story.
pub fn inc_evicted() { counter!(IN_FLIGHT_EVICTED).increment(1); }

/// Record a stale in-flight entry replaced by a fresh first fragment.
pub fn inc_replaced() { counter!(IN_FLIGHT_REPLACED).increment(1); }
