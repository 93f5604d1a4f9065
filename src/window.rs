//! Sliding acknowledgement window.
//!
//! The sender may run ahead of the receiver by at most `window_size` frames.
//! Once that many frames are unacknowledged it must block until an ACK
//! frame moves the window forward. There is no retransmission; the window
//! only provides backpressure.
//!
//! Within one pass through `1..=SEQUENCE_MAX` the arithmetic is linear:
//! `last_ack` is the running maximum of the ACKs seen, and an ACK at or
//! beyond a sequence leaves nothing in flight. When the sequence counter
//! wraps, the session calls [`WindowController::start_new_cycle`] so frames
//! still unacknowledged from the old pass keep counting against the window.

use crate::protocol::{DEFAULT_WINDOW_SIZE, SEQUENCE_MAX};

/// Frames sent before `sequence` that `last_ack` does not cover.
///
/// Zero when `last_ack` is at or beyond `sequence`.
#[must_use]
pub fn frames_in_flight(sequence: u32, last_ack: u32) -> u32 {
    sequence.saturating_sub(last_ack.saturating_add(1))
}

/// Whether the sender must wait for an ACK before sending `sequence`.
///
/// True once `sequence - (last_ack + 1) >= window_size`.
///
/// # Examples
///
/// ```
/// use lumberjack::window::should_wait_for_ack;
///
/// assert!(!should_wait_for_ack(5000, 0, 5000));
/// assert!(should_wait_for_ack(5001, 0, 5000));
/// assert!(!should_wait_for_ack(3, 1, 2));
/// assert!(!should_wait_for_ack(3, 5, 2), "ack ahead of the sender");
/// ```
#[must_use]
pub fn should_wait_for_ack(sequence: u32, last_ack: u32, window_size: u32) -> bool {
    frames_in_flight(sequence, last_ack) >= window_size
}

/// Tracks the highest acknowledged sequence against a fixed window size.
///
/// # Examples
///
/// ```
/// use lumberjack::WindowController;
///
/// let mut window = WindowController::new(2);
/// assert!(window.is_full(3));
/// assert_eq!(window.record_ack(1), 1);
/// assert!(!window.is_full(3));
/// assert_eq!(window.record_ack(0), 1, "older acks are ignored");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowController {
    last_ack: u32,
    window_size: u32,
    /// Set after the sender wraps while `last_ack` still belongs to the
    /// previous pass through the sequence space.
    behind: bool,
}

impl WindowController {
    /// Create a controller with no acknowledgements yet.
    ///
    /// `window_size` is clamped to `1..=SEQUENCE_MAX`.
    #[must_use]
    pub fn new(window_size: u32) -> Self {
        Self {
            last_ack: 0,
            window_size: window_size.clamp(1, SEQUENCE_MAX),
            behind: false,
        }
    }

    /// Highest acknowledged sequence number.
    #[must_use]
    pub const fn last_ack(&self) -> u32 { self.last_ack }

    /// Configured maximum number of frames in flight.
    #[must_use]
    pub const fn window_size(&self) -> u32 { self.window_size }

    /// Frames sent before `sequence` that are still unacknowledged.
    #[must_use]
    pub fn in_flight(&self, sequence: u32) -> u32 {
        if self.behind {
            let carried = SEQUENCE_MAX.saturating_sub(self.last_ack);
            carried.saturating_add(sequence.saturating_sub(1))
        } else {
            frames_in_flight(sequence, self.last_ack)
        }
    }

    /// Whether sending `sequence` must wait for an acknowledgement.
    #[must_use]
    pub fn is_full(&self, sequence: u32) -> bool { self.in_flight(sequence) >= self.window_size }

    /// Apply an acknowledgement and return the resulting `last_ack`.
    ///
    /// Re-applying the same or an older value leaves the window unchanged.
    /// After [`start_new_cycle`](Self::start_new_cycle), a non-zero ACK
    /// below `last_ack` belongs to the new pass and replaces it.
    pub fn record_ack(&mut self, ack: u32) -> u32 {
        if self.behind && ack != 0 && ack < self.last_ack {
            self.behind = false;
            self.last_ack = ack;
        } else {
            self.last_ack = self.last_ack.max(ack);
        }
        self.last_ack
    }

    /// Note that the sender wrapped from `SEQUENCE_MAX` back to 1.
    pub fn start_new_cycle(&mut self) {
        if self.last_ack >= SEQUENCE_MAX {
            self.last_ack = 0;
            self.behind = false;
        } else {
            self.behind = true;
        }
    }
}

impl Default for WindowController {
    fn default() -> Self { Self::new(DEFAULT_WINDOW_SIZE) }
}
