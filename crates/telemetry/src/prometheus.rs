// Path: crates/telemetry/src/prometheus.rs
//! A concrete implementation of the metrics sinks using the Prometheus crate.

use crate::sinks::*;
use once_cell::sync::OnceCell;
use prometheus::{
    exponential_buckets, register_histogram_vec, register_int_counter, register_int_counter_vec,
    HistogramVec, IntCounter, IntCounterVec,
};

// --- Metric Statics ---
// We use OnceCell to hold the metric collectors. They will be initialized
// exactly once by the `install` function.

static REQUESTS_CREATED_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static REPORTS_RECEIVED_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static REQUESTS_RESOLVED_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static REQUESTS_EXPIRED_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static VALIDATOR_DEACTIVATIONS_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static DISPATCH_LATENCY_SECONDS: OnceCell<HistogramVec> = OnceCell::new();
static DISPATCH_ERRORS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static ERRORS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();

/// The Prometheus-backed metrics sink returned by `install`.
#[derive(Debug, Clone, Copy)]
pub struct PrometheusSink;

/// Runs `$body` with the collector bound to `$m`, or does nothing if `install()`
/// has not been called. Metrics must never take down block processing.
macro_rules! with_metric {
    ($metric:ident, |$m:ident| $body:expr) => {
        if let Some($m) = $metric.get() {
            $body;
        }
    };
}

impl OracleMetricsSink for PrometheusSink {
    fn inc_requests_created(&self) {
        with_metric!(REQUESTS_CREATED_TOTAL, |m| m.inc());
    }
    fn inc_reports_received(&self) {
        with_metric!(REPORTS_RECEIVED_TOTAL, |m| m.inc());
    }
    fn inc_resolved(&self, status: &'static str) {
        with_metric!(REQUESTS_RESOLVED_TOTAL, |m| m.with_label_values(&[status]).inc());
    }
    fn inc_expired(&self, count: u64) {
        with_metric!(REQUESTS_EXPIRED_TOTAL, |m| m.inc_by(count));
    }
    fn inc_deactivations(&self) {
        with_metric!(VALIDATOR_DEACTIVATIONS_TOTAL, |m| m.inc());
    }
    fn observe_dispatch_latency(&self, method: &str, duration_secs: f64) {
        with_metric!(DISPATCH_LATENCY_SECONDS, |m| m
            .with_label_values(&[method])
            .observe(duration_secs));
    }
    fn inc_dispatch_error(&self, method: &str, reason: &'static str) {
        with_metric!(DISPATCH_ERRORS_TOTAL, |m| m
            .with_label_values(&[method, reason])
            .inc());
    }
}

impl ErrorMetricsSink for PrometheusSink {
    fn inc_error(&self, kind: &'static str, variant: &'static str) {
        with_metric!(ERRORS_TOTAL, |m| m.with_label_values(&[kind, variant]).inc());
    }
}

fn already_initialized<T>(_: T) -> prometheus::Error {
    prometheus::Error::AlreadyReg
}

/// Initializes all Prometheus metrics collectors and returns a static reference to the sink.
/// This function must be called only once at application startup; a second call fails
/// with `AlreadyReg`.
pub fn install() -> Result<&'static dyn MetricsSink, prometheus::Error> {
    REQUESTS_CREATED_TOTAL
        .set(register_int_counter!(
            "oracle_requests_created_total",
            "Total number of admitted data requests."
        )?)
        .map_err(already_initialized)?;
    REPORTS_RECEIVED_TOTAL
        .set(register_int_counter!(
            "oracle_reports_received_total",
            "Total number of accepted validator reports."
        )?)
        .map_err(already_initialized)?;
    REQUESTS_RESOLVED_TOTAL
        .set(register_int_counter_vec!(
            "oracle_requests_resolved_total",
            "Total number of resolved requests, by resolve status.",
            &["status"]
        )?)
        .map_err(already_initialized)?;
    REQUESTS_EXPIRED_TOTAL
        .set(register_int_counter!(
            "oracle_requests_expired_total",
            "Total number of requests removed by the expiration sweep."
        )?)
        .map_err(already_initialized)?;
    VALIDATOR_DEACTIVATIONS_TOTAL
        .set(register_int_counter!(
            "oracle_validator_deactivations_total",
            "Total number of validators deactivated for missing a report."
        )?)
        .map_err(already_initialized)?;
    DISPATCH_LATENCY_SECONDS
        .set(register_histogram_vec!(
            "oracle_dispatch_latency_seconds",
            "Latency of dispatched calls to the oracle service.",
            &["method"],
            exponential_buckets(0.0001, 2.0, 16)?
        )?)
        .map_err(already_initialized)?;
    DISPATCH_ERRORS_TOTAL
        .set(register_int_counter_vec!(
            "oracle_dispatch_errors_total",
            "Total errors returned from oracle service calls.",
            &["method", "reason"]
        )?)
        .map_err(already_initialized)?;
    ERRORS_TOTAL
        .set(register_int_counter_vec!(
            "oracle_errors_total",
            "Total number of errors, categorized by type and variant.",
            &["kind", "variant"]
        )?)
        .map_err(already_initialized)?;

    static SINK: PrometheusSink = PrometheusSink;
    Ok(&SINK)
}
