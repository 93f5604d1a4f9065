//! Metric helpers for `lumberjack`.
//!
//! This module defines metric names and simple helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. Without the `metrics` feature
//! the helpers compile to no-ops.

#[cfg(feature = "metrics")]
use metrics::{counter, gauge};

/// Name of the gauge tracking open sessions.
pub const SESSIONS_ACTIVE: &str = "lumberjack_sessions_active";
/// Name of the counter tracking COMPRESS frames written.
pub const FRAMES_SENT: &str = "lumberjack_frames_sent_total";
/// Name of the counter tracking ACK frames read.
pub const ACKS_RECEIVED: &str = "lumberjack_acks_received_total";
/// Name of the counter tracking sends that blocked on a full window.
pub const WINDOW_WAITS: &str = "lumberjack_window_waits_total";
/// Name of the counter tracking failed sends.
pub const ERRORS_TOTAL: &str = "lumberjack_errors_total";

/// Increment the open sessions gauge.
pub fn inc_sessions() {
    #[cfg(feature = "metrics")]
    gauge!(SESSIONS_ACTIVE).increment(1.0);
}

/// Decrement the open sessions gauge.
pub fn dec_sessions() {
    #[cfg(feature = "metrics")]
    gauge!(SESSIONS_ACTIVE).decrement(1.0);
}

/// Record a COMPRESS frame written to the transport.
pub fn inc_frames_sent() {
    #[cfg(feature = "metrics")]
    counter!(FRAMES_SENT).increment(1);
}

/// Record an ACK frame read from the transport.
pub fn inc_acks_received() {
    #[cfg(feature = "metrics")]
    counter!(ACKS_RECEIVED).increment(1);
}

/// Record a send that had to wait for the window to open.
pub fn inc_window_waits() {
    #[cfg(feature = "metrics")]
    counter!(WINDOW_WAITS).increment(1);
}

/// Record a failed send.
pub fn inc_errors() {
    #[cfg(feature = "metrics")]
    counter!(ERRORS_TOTAL).increment(1);
}

/// RAII guard incrementing [`SESSIONS_ACTIVE`] on creation and decrementing
/// it on drop.
#[derive(Debug)]
pub(crate) struct ActiveSession;

impl ActiveSession {
    pub(crate) fn new() -> Self {
        inc_sessions();
        Self
    }
}

impl Drop for ActiveSession {
    fn drop(&mut self) { dec_sessions(); }
}
