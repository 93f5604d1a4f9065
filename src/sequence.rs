//! Wrapping sequence numbers for outbound DATA frames.

use crate::protocol::SEQUENCE_MAX;

/// Issues sequence numbers in `1..=SEQUENCE_MAX`, wrapping back to 1.
///
/// The counter is owned by a single session and is not synchronised.
///
/// # Examples
///
/// ```
/// use lumberjack::{SequenceCounter, protocol::SEQUENCE_MAX};
///
/// let mut counter = SequenceCounter::new();
/// assert_eq!(counter.next(), 1);
///
/// let mut counter = SequenceCounter::starting_at(SEQUENCE_MAX);
/// assert_eq!(counter.next(), 1);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SequenceCounter {
    current: u32,
}

impl SequenceCounter {
    /// Create a counter that has not issued any number yet.
    #[must_use]
    pub const fn new() -> Self { Self { current: 0 } }

    /// Create a counter whose last issued number is `current`.
    ///
    /// Values above [`SEQUENCE_MAX`] are treated as [`SEQUENCE_MAX`].
    #[must_use]
    pub fn starting_at(current: u32) -> Self {
        Self {
            current: current.min(SEQUENCE_MAX),
        }
    }

    /// Last issued sequence number, or 0 before the first call to
    /// [`next`](Self::next).
    #[must_use]
    pub const fn current(&self) -> u32 { self.current }

    /// Issue the next sequence number.
    #[expect(
        clippy::should_implement_trait,
        reason = "the counter never ends, so Iterator would only add noise"
    )]
    pub fn next(&mut self) -> u32 {
        if self.current >= SEQUENCE_MAX {
            self.current = 0;
        }
        self.current += 1;
        self.current
    }
}
