//! Helpers for asserting on metrics recorded by `lumberjack`.

use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};

/// Create a debugging recorder and its snapshotter.
#[must_use]
pub fn debugging_recorder() -> (Snapshotter, DebuggingRecorder) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    (snapshotter, recorder)
}

/// Metric values captured at one point in time, keyed by metric name.
#[derive(Debug)]
pub struct MetricsSnapshot {
    values: Vec<(String, DebugValue)>,
}

impl MetricsSnapshot {
    /// Capture the recorder's current values.
    #[must_use]
    pub fn take(snapshotter: &Snapshotter) -> Self {
        let values = snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .map(|(key, _, _, value)| (key.key().name().to_owned(), value))
            .collect();
        Self { values }
    }

    /// Value of the counter `name`, or 0 if it was never incremented.
    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        self.values
            .iter()
            .find_map(|(key, value)| match value {
                DebugValue::Counter(count) if key == name => Some(*count),
                _ => None,
            })
            .unwrap_or(0)
    }

    /// Value of the gauge `name`, if it was ever set.
    #[must_use]
    pub fn gauge(&self, name: &str) -> Option<f64> {
        self.values.iter().find_map(|(key, value)| match value {
            DebugValue::Gauge(gauge) if key == name => Some(gauge.into_inner()),
            _ => None,
        })
    }
}
