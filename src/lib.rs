#![doc(html_root_url = "https://docs.rs/newswire/latest")]
//! Public API for the `newswire` library.
//!
//! This crate provides building blocks for consuming fragmented news
//! stories from market-data update streams: typed field extraction,
//! in-order fragment reassembly keyed by story GUID, and the decode
//! pipeline that turns a completed payload into a JSON document.

pub mod decode;
pub mod fields;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod pipeline;
pub mod story;

pub use decode::{DecodeFailure, Story, decode_story};
pub use fields::{
    FIELD_FRAG_NUM,
    FIELD_FRAGMENT,
    FIELD_GUID,
    FIELD_SOURCE,
    FIELD_TOT_SIZE,
    FieldError,
    UpdateMessage,
};
#[cfg(feature = "metrics")]
pub use metrics::{FRAGMENTS_ACCEPTED, IN_FLIGHT_ACTIVE, STORIES_DECODED, UPDATE_ERRORS};
pub use pipeline::{StoryError, StoryErrorKind, StoryPipeline};
pub use story::{
    ContinuationFragment,
    FirstFragment,
    FragmentEvent,
    FragmentNumber,
    FragmentSeries,
    Guid,
    ReassembledStory,
    Reassembler,
    ReassemblyConfig,
    ReassemblyError,
    SequenceError,
};
