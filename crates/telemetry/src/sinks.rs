// Path: crates/telemetry/src/sinks.rs
//! Defines abstract traits for metrics reporting, decoupling core logic from the backend.

use once_cell::sync::OnceCell;

// --- Static Sink Access ---

/// A no-op sink for use in tests or when telemetry is disabled.
#[derive(Debug, Clone, Copy)]
pub struct NopSink;

/// A lazily-initialized static reference to the global `MetricsSink` implementation.
pub static SINK: OnceCell<&'static dyn MetricsSink> = OnceCell::new();
static NOP_SINK: NopSink = NopSink;

/// Returns a static reference to the configured error metrics sink.
/// If no sink has been initialized, it returns a no-op sink.
pub fn error_metrics() -> &'static dyn ErrorMetricsSink {
    match SINK.get() {
        Some(sink) => sink.as_error_metrics(),
        None => &NOP_SINK,
    }
}

/// Returns a static reference to the configured oracle metrics sink.
/// If no sink has been initialized, it returns a no-op sink.
pub fn oracle_metrics() -> &'static dyn OracleMetricsSink {
    match SINK.get() {
        Some(sink) => sink.as_oracle_metrics(),
        None => &NOP_SINK,
    }
}

// --- Trait Definitions ---

/// A sink for metrics of the request lifecycle.
pub trait OracleMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments the counter of admitted requests.
    fn inc_requests_created(&self);
    /// Increments the counter of accepted reports.
    fn inc_reports_received(&self);
    /// Increments the counter of resolved requests, labeled by resolve status.
    fn inc_resolved(&self, status: &'static str);
    /// Increments the counter of requests removed by the expiration sweep.
    fn inc_expired(&self, count: u64);
    /// Increments the counter of validators deactivated for missing a report.
    fn inc_deactivations(&self);
    /// Observes the latency of a dispatched service call, labeled by method.
    fn observe_dispatch_latency(&self, method: &str, duration_secs: f64);
    /// Increments a counter for errors returned from a dispatched call.
    fn inc_dispatch_error(&self, method: &str, reason: &'static str);
}
impl OracleMetricsSink for NopSink {
    fn inc_requests_created(&self) {}
    fn inc_reports_received(&self) {}
    fn inc_resolved(&self, _status: &'static str) {}
    fn inc_expired(&self, _count: u64) {}
    fn inc_deactivations(&self) {}
    fn observe_dispatch_latency(&self, _method: &str, _duration_secs: f64) {}
    fn inc_dispatch_error(&self, _method: &str, _reason: &'static str) {}
}

/// A sink for recording structured error metrics.
pub trait ErrorMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments a counter for a specific error, categorized by its kind and variant.
    fn inc_error(&self, kind: &'static str, variant: &'static str);
}
impl ErrorMetricsSink for NopSink {
    fn inc_error(&self, _kind: &'static str, _variant: &'static str) {}
}

/// A unified sink that implements all domain-specific traits, providing a single
/// point of implementation for metrics backends like Prometheus.
pub trait MetricsSink: OracleMetricsSink + ErrorMetricsSink {
    /// Views this sink as an `OracleMetricsSink`.
    fn as_oracle_metrics(&self) -> &dyn OracleMetricsSink;
    /// Views this sink as an `ErrorMetricsSink`.
    fn as_error_metrics(&self) -> &dyn ErrorMetricsSink;
}

// Blanket implementation to allow any type that implements all sub-traits
// to be used as a `MetricsSink`.
impl<T> MetricsSink for T
where
    T: OracleMetricsSink + ErrorMetricsSink,
{
    fn as_oracle_metrics(&self) -> &dyn OracleMetricsSink {
        self
    }
    fn as_error_metrics(&self) -> &dyn ErrorMetricsSink {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_sink_falls_back_to_nop() {
        // Nothing in this crate's unit tests sets SINK, so calls must be no-ops.
        oracle_metrics().inc_requests_created();
        oracle_metrics().inc_resolved("success");
        error_metrics().inc_error("oracle", "ORACLE_NOT_ENOUGH_FEE");
        assert!(format!("{:?}", oracle_metrics()).contains("NopSink"));
    }
}
