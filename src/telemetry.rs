//! Telemetry utilities for operation timing and tracing spans.

use std::time::Instant;

/// Guard for timing a service operation and recording metrics.
///
/// Records operation latency when dropped.
pub struct OperationTimer {
    operation: &'static str,
    start: Instant,
}

impl OperationTimer {
    /// Start timing an operation.
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_operation(self.operation, duration);
    }
}

/// Standardized span constructors for chat observability.
pub mod spans {
    use tracing::{Span, debug_span};

    /// Span for an operation against one room.
    pub fn room_operation(operation: &'static str, room: &str) -> Span {
        debug_span!("room_op", op = operation, room = %room)
    }

    /// Span for a registry-wide operation.
    pub fn global_operation(operation: &'static str) -> Span {
        debug_span!("global_op", op = operation)
    }
}
