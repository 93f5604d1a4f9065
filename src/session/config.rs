//! Flow-control settings for a protocol session.

use std::time::Duration;

use crate::protocol::{DEFAULT_WINDOW_SIZE, SEQUENCE_MAX};

/// Settings consumed by [`ProtocolSession`](crate::ProtocolSession).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use lumberjack::SessionConfig;
///
/// let config = SessionConfig::default()
///     .window_size(100)
///     .ack_timeout(Some(Duration::from_secs(30)));
/// assert_eq!(config.window_size_value(), 100);
/// assert_eq!(config.ack_timeout_value(), Some(Duration::from_secs(30)));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    window_size: u32,
    ack_timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            ack_timeout: None,
        }
    }
}

impl SessionConfig {
    /// Set the maximum number of unacknowledged frames.
    ///
    /// Zero selects the default of 5000. Values above `SEQUENCE_MAX` are
    /// capped to it.
    ///
    /// # Examples
    ///
    /// ```
    /// use lumberjack::{SessionConfig, protocol::SEQUENCE_MAX};
    ///
    /// assert_eq!(SessionConfig::default().window_size(0).window_size_value(), 5000);
    /// assert_eq!(
    ///     SessionConfig::default().window_size(u32::MAX).window_size_value(),
    ///     SEQUENCE_MAX
    /// );
    /// ```
    #[must_use]
    pub fn window_size(mut self, window_size: u32) -> Self {
        self.window_size = if window_size == 0 {
            DEFAULT_WINDOW_SIZE
        } else {
            window_size.min(SEQUENCE_MAX)
        };
        self
    }

    /// Bound how long a send may block waiting for an ACK frame.
    ///
    /// `None` waits indefinitely.
    #[must_use]
    pub fn ack_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.ack_timeout = timeout;
        self
    }

    /// Return the configured window size.
    #[must_use]
    pub const fn window_size_value(&self) -> u32 { self.window_size }

    /// Return the configured ACK timeout.
    #[must_use]
    pub const fn ack_timeout_value(&self) -> Option<Duration> { self.ack_timeout }
}
