//! Prometheus metrics collection for syndicate-chat.
//!
//! Exposed over HTTP by [`crate::http`]. Recording helpers are no-ops until
//! [`init`] has run, so library users and unit tests never need to set it up.
//!
//! - `chat_operation_total{operation}` - Service operations by name
//! - `chat_operation_duration_seconds{operation}` - Operation latency histogram
//! - `chat_operation_errors_total{operation,error}` - Failed operations
//! - `chat_events_dropped_total` - Events a lagging subscriber never saw

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters (monotonic increasing)
// ========================================================================

/// Messages appended to any ledger.
pub static MESSAGES_POSTED: OnceLock<IntCounter> = OnceLock::new();

/// Messages discarded by the retention cap.
pub static MESSAGES_TRIMMED: OnceLock<IntCounter> = OnceLock::new();

/// Events published, by kind.
pub static EVENTS_PUBLISHED: OnceLock<IntCounterVec> = OnceLock::new();

/// Events skipped by subscribers that fell behind.
pub static EVENTS_DROPPED: OnceLock<IntCounter> = OnceLock::new();

/// Operations processed by name.
pub static OPERATION_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();

/// Operation errors by name and error code.
pub static OPERATION_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

// ========================================================================
// Gauges and histograms
// ========================================================================

/// Rooms currently held by the registry.
pub static ACTIVE_ROOMS: OnceLock<IntGauge> = OnceLock::new();

/// Operation latency by name.
pub static OPERATION_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Call once at startup before serving `/metrics`. Later calls are harmless.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            if $metric.get().is_none() {
                match $init {
                    Ok(m) => {
                        if let Err(e) = r.register(Box::new(m.clone())) {
                            tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                        }
                        let _ = $metric.set(m);
                    }
                    Err(e) => {
                        tracing::error!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                    }
                }
            }
        };
    }

    register!(MESSAGES_POSTED, IntCounter::new("chat_messages_posted_total", "Messages posted"));
    register!(MESSAGES_TRIMMED, IntCounter::new("chat_messages_trimmed_total", "Messages discarded by retention"));
    register!(EVENTS_PUBLISHED, IntCounterVec::new(Opts::new("chat_events_published_total", "Room events published by kind"), &["kind"]));
    register!(EVENTS_DROPPED, IntCounter::new("chat_events_dropped_total", "Events dropped for lagging subscribers"));
    register!(OPERATION_COUNTER, IntCounterVec::new(Opts::new("chat_operation_total", "Chat operations by name"), &["operation"]));
    register!(OPERATION_ERRORS, IntCounterVec::new(Opts::new("chat_operation_errors_total", "Chat operation errors"), &["operation", "error"]));
    register!(ACTIVE_ROOMS, IntGauge::new("chat_active_rooms", "Rooms held by the registry"));
    register!(OPERATION_LATENCY, HistogramVec::new(
        HistogramOpts::new("chat_operation_duration_seconds", "Chat operation latency by name")
            .buckets(vec![0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1]),
        &["operation"]));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Recording helpers
// ============================================================================

#[inline]
pub fn record_message_posted() {
    if let Some(c) = MESSAGES_POSTED.get() {
        c.inc();
    }
}

#[inline]
pub fn record_messages_trimmed(count: usize) {
    if let Some(c) = MESSAGES_TRIMMED.get() {
        c.inc_by(count as u64);
    }
}

#[inline]
pub fn record_event_published(kind: &str) {
    if let Some(c) = EVENTS_PUBLISHED.get() {
        c.with_label_values(&[kind]).inc();
    }
}

#[inline]
pub fn record_events_dropped(count: u64) {
    if let Some(c) = EVENTS_DROPPED.get() {
        c.inc_by(count);
    }
}

#[inline]
pub fn record_room_created() {
    if let Some(g) = ACTIVE_ROOMS.get() {
        g.inc();
    }
}

#[inline]
pub fn reset_active_rooms() {
    if let Some(g) = ACTIVE_ROOMS.get() {
        g.set(0);
    }
}

/// Record an operation execution with latency.
#[inline]
pub fn record_operation(operation: &str, duration_secs: f64) {
    if let Some(c) = OPERATION_COUNTER.get() {
        c.with_label_values(&[operation]).inc();
    }
    if let Some(h) = OPERATION_LATENCY.get() {
        h.with_label_values(&[operation]).observe(duration_secs);
    }
}

/// Record an operation error.
#[inline]
pub fn record_operation_error(operation: &str, error: &str) {
    if let Some(c) = OPERATION_ERRORS.get() {
        c.with_label_values(&[operation, error]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_lifecycle() {
        init();
        init();

        record_message_posted();
        record_event_published("message");
        record_operation("post_message", 0.0001);
        record_operation_error("post_message", "message_too_long");

        let output = gather_metrics();
        assert!(output.contains("chat_messages_posted_total"));
        assert!(output.contains("chat_events_published_total"));
        assert!(output.contains("chat_operation_errors_total"));
    }
}
