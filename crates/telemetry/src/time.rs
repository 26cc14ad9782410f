// Path: crates/telemetry/src/time.rs
use crate::sinks::OracleMetricsSink;
use std::time::Instant;

/// Observes the latency of a dispatched service call when dropped.
///
/// Wall-clock time is only reported to metrics and never feeds back into state.
pub struct Timer<'a> {
    sink: &'a dyn OracleMetricsSink,
    method: &'a str,
    start: Instant,
}

impl<'a> Timer<'a> {
    /// Starts timing a call to `method`.
    pub fn new(sink: &'a dyn OracleMetricsSink, method: &'a str) -> Self {
        Self {
            sink,
            method,
            start: Instant::now(),
        }
    }
}

impl Drop for Timer<'_> {
    fn drop(&mut self) {
        self.sink
            .observe_dispatch_latency(self.method, self.start.elapsed().as_secs_f64());
    }
}
