//! Tracing configuration for Lumberjack client operations.
//!
//! [`TracingConfig`] controls which operations emit tracing spans at which
//! level and whether per-operation elapsed-time events are recorded.

use tracing::Level;

/// Controls tracing span levels and per-operation timing.
///
/// By default, lifecycle operations (`connect`, `close`) emit spans at
/// `INFO` level. High-frequency operations (`send`, `ack`) emit spans at
/// `DEBUG` level. Timing is disabled for all operations by default.
///
/// Spans are always created at the configured level. When no `tracing`
/// subscriber is installed, span creation is a no-op. When timing is enabled
/// for an operation, an event recording `elapsed_us` is emitted when the
/// operation completes.
///
/// # Examples
///
/// ```
/// use lumberjack::TracingConfig;
/// use tracing::Level;
///
/// let config = TracingConfig::default()
///     .with_send_timing(true)
///     .with_ack_level(Level::TRACE);
/// let _ = config;
/// ```
#[expect(
    clippy::struct_excessive_bools,
    reason = "four independent on/off timing flags, one per operation"
)]
#[derive(Clone, Debug)]
pub struct TracingConfig {
    pub(crate) connect_level: Level,
    pub(crate) send_level: Level,
    pub(crate) ack_level: Level,
    pub(crate) close_level: Level,
    pub(crate) connect_timing: bool,
    pub(crate) send_timing: bool,
    pub(crate) ack_timing: bool,
    pub(crate) close_timing: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            connect_level: Level::INFO,
            send_level: Level::DEBUG,
            ack_level: Level::DEBUG,
            close_level: Level::INFO,
            connect_timing: false,
            send_timing: false,
            ack_timing: false,
            close_timing: false,
        }
    }
}

impl TracingConfig {
    /// Set the tracing level for the `connect` operation.
    #[must_use]
    pub fn with_connect_level(mut self, level: Level) -> Self {
        self.connect_level = level;
        self
    }

    /// Enable or disable timing for the `connect` operation.
    #[must_use]
    pub fn with_connect_timing(mut self, enabled: bool) -> Self {
        self.connect_timing = enabled;
        self
    }

    /// Set the tracing level for `send`.
    #[must_use]
    pub fn with_send_level(mut self, level: Level) -> Self {
        self.send_level = level;
        self
    }

    /// Enable or disable timing for `send`.
    ///
    /// The recorded time includes any wait for the window to open.
    #[must_use]
    pub fn with_send_timing(mut self, enabled: bool) -> Self {
        self.send_timing = enabled;
        self
    }

    /// Set the tracing level for ACK waits.
    #[must_use]
    pub fn with_ack_level(mut self, level: Level) -> Self {
        self.ack_level = level;
        self
    }

    /// Enable or disable timing for ACK waits.
    #[must_use]
    pub fn with_ack_timing(mut self, enabled: bool) -> Self {
        self.ack_timing = enabled;
        self
    }

    /// Set the tracing level for `close`.
    #[must_use]
    pub fn with_close_level(mut self, level: Level) -> Self {
        self.close_level = level;
        self
    }

    /// Enable or disable timing for `close`.
    #[must_use]
    pub fn with_close_timing(mut self, enabled: bool) -> Self {
        self.close_timing = enabled;
        self
    }

    /// Set every operation to the same tracing level.
    #[must_use]
    pub fn with_all_levels(mut self, level: Level) -> Self {
        self.connect_level = level;
        self.send_level = level;
        self.ack_level = level;
        self.close_level = level;
        self
    }

    /// Enable or disable timing for every operation.
    #[must_use]
    pub fn with_all_timing(mut self, enabled: bool) -> Self {
        self.connect_timing = enabled;
        self.send_timing = enabled;
        self.ack_timing = enabled;
        self.close_timing = enabled;
        self
    }
}
