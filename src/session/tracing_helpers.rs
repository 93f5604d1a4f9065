//! Span and timing helpers shared by the session and the connector.

use std::time::Instant;

use tracing::{Level, Span};

use super::tracing_config::TracingConfig;

/// Create a tracing span at a dynamically selected level.
///
/// Each branch calls the matching `tracing::<level>_span!` macro so span
/// metadata stays static while the level is chosen at runtime.
macro_rules! dynamic_span {
    ($level:expr, $name:expr $(, $($field:tt)*)?) => {
        match $level {
            Level::ERROR => tracing::error_span!($name $(, $($field)*)?),
            Level::WARN  => tracing::warn_span!($name $(, $($field)*)?),
            Level::INFO  => tracing::info_span!($name $(, $($field)*)?),
            Level::DEBUG => tracing::debug_span!($name $(, $($field)*)?),
            Level::TRACE => tracing::trace_span!($name $(, $($field)*)?),
        }
    };
}

/// Span for establishing a connection.
#[expect(
    clippy::cognitive_complexity,
    reason = "five match arms from dynamic_span! expansion"
)]
pub(crate) fn connect_span(config: &TracingConfig, peer_addr: &str) -> Span {
    dynamic_span!(
        config.connect_level,
        "lumberjack.connect",
        peer.addr = peer_addr
    )
}

/// Span for one `send`; `frame.bytes` is recorded once the frame is built.
#[expect(
    clippy::cognitive_complexity,
    reason = "five match arms from dynamic_span! expansion"
)]
pub(crate) fn send_span(config: &TracingConfig, sequence: u32) -> Span {
    dynamic_span!(
        config.send_level,
        "lumberjack.send",
        sequence = sequence,
        frame.bytes = tracing::field::Empty
    )
}

/// Span for a blocking wait on a full window.
#[expect(
    clippy::cognitive_complexity,
    reason = "five match arms from dynamic_span! expansion"
)]
pub(crate) fn ack_span(config: &TracingConfig, sequence: u32, last_ack: u32) -> Span {
    dynamic_span!(
        config.ack_level,
        "lumberjack.ack_wait",
        sequence = sequence,
        last_ack = last_ack
    )
}

/// Span for closing a session.
#[expect(
    clippy::cognitive_complexity,
    reason = "five match arms from dynamic_span! expansion"
)]
pub(crate) fn close_span(config: &TracingConfig) -> Span {
    dynamic_span!(config.close_level, "lumberjack.close")
}

/// Start a timer when timing is enabled for an operation.
pub(crate) fn start_timer(enabled: bool) -> Option<Instant> { enabled.then(Instant::now) }

/// Emit an `elapsed_us` event if the timer was started.
pub(crate) fn emit_timing_event(start: Option<Instant>) {
    if let Some(start) = start {
        let elapsed_us = start.elapsed().as_micros();
        tracing::debug!(elapsed_us = elapsed_us, "operation.timing");
    }
}
