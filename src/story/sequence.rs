//! One-based fragment positioning within logical stories.
//!
//! Provides [`FragmentNumber`], a type-safe wrapper around `NonZeroU32` that
//! offers overflow-safe successor operations for tracking fragment order.

use std::num::NonZeroU32;

use derive_more::{Display, From};

/// One-based ordinal describing a fragment's position within its story.
///
/// The feed numbers fragments from 1 and increments by exactly one per
/// fragment, so zero is unrepresentable by construction.
///
/// # Examples
///
/// ```
/// use newswire::story::FragmentNumber;
/// let first = FragmentNumber::first();
/// assert!(first.is_first());
/// assert_eq!(first.checked_next().map(FragmentNumber::get), Some(2));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From)]
#[display("{_0}")]
pub struct FragmentNumber(NonZeroU32);

impl FragmentNumber {
    /// Return the number carried by the first fragment of every story.
    #[must_use]
    pub const fn first() -> Self { Self(NonZeroU32::MIN) }

    /// Construct a fragment number, returning `None` for zero.
    #[must_use]
    pub const fn new(value: u32) -> Option<Self> {
        match NonZeroU32::new(value) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// Return the underlying numeric value.
    #[must_use]
    pub const fn get(self) -> u32 { self.0.get() }

    /// Report whether this fragment opens a story.
    #[must_use]
    pub const fn is_first(self) -> bool { self.0.get() == 1 }

    /// Return the successor number, or `None` on overflow.
    #[must_use]
    pub fn checked_next(self) -> Option<Self> { self.0.checked_add(1).map(Self) }
}
