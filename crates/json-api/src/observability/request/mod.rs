//! Per-request span, request id and access log.

mod parent_context;
mod request_ids;
mod spans;

use std::time::{Duration, Instant};

use salvo::{http::StatusCode, prelude::*};
use tracing::{Instrument as _, error, field, info, warn};
use tracing_opentelemetry::OpenTelemetrySpanExt as _;

use emporium_app::auth::Identity;

use super::{metrics, settings};

/// Scraped by infrastructure every few seconds.
const UNLOGGED_PATHS: [&str; 2] = ["/metrics", "/healthcheck"];

#[handler]
pub(crate) async fn request_logging(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    if UNLOGGED_PATHS.contains(&req.uri().path()) {
        ctrl.call_next(req, depot, res).await;
        return;
    }

    let started = Instant::now();
    let telemetry = settings::current();
    let request_id = request_ids::resolve(req.headers());
    let method = req.method().as_str().to_owned();
    let route = spans::request_span_name(&method, req.uri().path());
    let _in_flight = metrics::InFlight::start();

    request_ids::echo(res, &request_id);

    let span = tracing::info_span!(
        parent: None,
        "http.request",
        otel.name = %route.otel_span_name,
        otel.kind = "server",
        request_id = %request_id,
        method = %method,
        path = %req.uri().path(),
        remote_addr = %req.remote_addr(),
        user_uuid = field::Empty,
        role = field::Empty,
        status = field::Empty,
        duration_ms = field::Empty,
    );

    if telemetry.continue_caller_trace
        && let Some(parent) = parent_context::remote_parent(req.headers())
        && let Err(source) = span.set_parent(parent)
    {
        warn!("failed to attach caller trace to request span: {source}");
    }

    ctrl.call_next(req, depot, res)
        .instrument(span.clone())
        .await;

    // Identity is injected by the auth hoop further down the chain.
    if let Ok(identity) = depot.obtain::<Identity>() {
        span.record("user_uuid", field::display(identity.user));
        span.record("role", identity.role.as_str());
    }

    let status = res.status_code.unwrap_or(StatusCode::OK);
    let elapsed = started.elapsed();

    metrics::observe_request(&method, &route.otel_path, status, elapsed.as_secs_f64());

    span.record("status", status.as_u16());
    span.record("duration_ms", elapsed.as_millis());

    span.in_scope(|| log_completion(status, elapsed, telemetry.slow_after));
}

fn log_completion(status: StatusCode, elapsed: Duration, slow_after: Duration) {
    let duration_ms = elapsed.as_millis();
    let code = status.as_u16();

    if status.is_server_error() {
        error!(status = code, duration_ms, "request failed");
    } else if status.is_client_error() {
        warn!(status = code, duration_ms, "request rejected");
    } else {
        info!(status = code, duration_ms, "request completed");
    }

    if elapsed > slow_after {
        warn!(
            duration_ms,
            threshold_ms = slow_after.as_millis(),
            "slow request"
        );
    }
}
