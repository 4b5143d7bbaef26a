//! Request telemetry knobs fixed at startup.

use std::{sync::OnceLock, time::Duration};

use crate::config::observability::ObservabilityConfig;

static REQUEST_TELEMETRY: OnceLock<RequestTelemetry> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct RequestTelemetry {
    /// Requests taking longer than this are flagged as slow.
    pub(super) slow_after: Duration,

    /// Honour the caller's `traceparent` header.
    pub(super) continue_caller_trace: bool,
}

impl Default for RequestTelemetry {
    fn default() -> Self {
        Self {
            slow_after: Duration::from_millis(750),
            continue_caller_trace: false,
        }
    }
}

impl From<&ObservabilityConfig> for RequestTelemetry {
    fn from(config: &ObservabilityConfig) -> Self {
        Self {
            slow_after: Duration::from_millis(config.slow_request_ms),
            // Without an exporter there is no trace to continue.
            continue_caller_trace: config.otel_enabled && config.trace_propagation,
        }
    }
}

/// First call wins; later calls are ignored.
pub(super) fn install(config: &ObservabilityConfig) {
    _ = REQUEST_TELEMETRY.set(RequestTelemetry::from(config));
}

pub(super) fn current() -> RequestTelemetry {
    REQUEST_TELEMETRY.get().copied().unwrap_or_default()
}
