//! Configuration used by story reassembly.

use std::{num::NonZeroUsize, time::Duration};

/// Default cap on the fully reassembled (pre-decode) story payload.
pub const DEFAULT_MAX_STORY_SIZE: NonZeroUsize = match NonZeroUsize::new(8 * 1024 * 1024) {
    Some(size) => size,
    None => panic!("default story size cap must be non-zero"),
};

/// Default lifetime of an in-flight story awaiting further fragments.
pub const DEFAULT_REASSEMBLY_TTL: Duration = Duration::from_secs(60);

/// Settings that bound reassembly resource usage.
///
/// The source protocol has no eviction policy for stalled multi-fragment
/// stories, so an abandoned story would otherwise buffer forever. The TTL
/// bounds that growth; the size cap guards against a hostile or corrupt
/// declared total size.
#[derive(Clone, Copy, Debug)]
pub struct ReassemblyConfig {
    /// Hard cap on the declared (and therefore accumulated) story payload.
    pub max_story_size: NonZeroUsize,
    /// Duration after which incomplete in-flight stories are evicted.
    pub reassembly_ttl: Duration,
}

impl Default for ReassemblyConfig {
    fn default() -> Self {
        Self {
            max_story_size: DEFAULT_MAX_STORY_SIZE,
            reassembly_ttl: DEFAULT_REASSEMBLY_TTL,
        }
    }
}
