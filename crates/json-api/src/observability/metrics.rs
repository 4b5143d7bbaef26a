//! Prometheus registry for HTTP traffic and marketplace activity.

use std::sync::LazyLock;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TEXT_FORMAT,
    TextEncoder, core::Collector,
};
use salvo::{
    Response, handler,
    http::{
        StatusCode,
        header::{CONTENT_TYPE, HeaderValue},
    },
};
use tracing::error;

const LATENCY_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Business events worth counting alongside raw traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MarketEvent {
    CartItemAdded,
    PromoApplied,
    CheckoutStarted,
    PaymentConfirmed,
    LineApproved,
}

impl MarketEvent {
    fn label(self) -> &'static str {
        match self {
            Self::CartItemAdded => "cart_item_added",
            Self::PromoApplied => "promo_applied",
            Self::CheckoutStarted => "checkout_started",
            Self::PaymentConfirmed => "payment_confirmed",
            Self::LineApproved => "line_approved",
        }
    }
}

#[derive(Debug)]
struct Metrics {
    registry: Registry,
    requests: IntCounterVec,
    latency: HistogramVec,
    in_flight: IntGauge,
    market_events: IntCounterVec,
}

static METRICS: LazyLock<Option<Metrics>> = LazyLock::new(|| {
    Metrics::build()
        .inspect_err(|source| error!("metrics disabled, registry setup failed: {source}"))
        .ok()
});

impl Metrics {
    fn build() -> prometheus::Result<Self> {
        let registry = Registry::new_custom(Some("emporium".to_owned()), None)?;

        let requests = register(
            &registry,
            IntCounterVec::new(
                Opts::new("http_requests_total", "Handled requests by route and status."),
                &["method", "route", "status_class", "status_code"],
            )?,
        )?;

        let latency = register(
            &registry,
            HistogramVec::new(
                HistogramOpts::new(
                    "http_request_duration_seconds",
                    "Time spent handling a request, by route.",
                )
                .buckets(LATENCY_BUCKETS.to_vec()),
                &["method", "route"],
            )?,
        )?;

        let in_flight = register(
            &registry,
            IntGauge::new("http_requests_in_flight", "Requests currently being handled.")?,
        )?;

        let market_events = register(
            &registry,
            IntCounterVec::new(
                Opts::new(
                    "market_events_total",
                    "Cart, promotion, checkout and fulfilment events.",
                ),
                &["event"],
            )?,
        )?;

        Ok(Self {
            registry,
            requests,
            latency,
            in_flight,
            market_events,
        })
    }
}

fn register<C>(registry: &Registry, collector: C) -> prometheus::Result<C>
where
    C: Collector + Clone + 'static,
{
    registry.register(Box::new(collector.clone()))?;

    Ok(collector)
}

/// Decrements the in-flight gauge when the request finishes.
#[derive(Debug)]
pub(super) struct InFlight(Option<&'static IntGauge>);

impl InFlight {
    pub(super) fn start() -> Self {
        let gauge = METRICS.as_ref().map(|metrics| &metrics.in_flight);

        if let Some(gauge) = gauge {
            gauge.inc();
        }

        Self(gauge)
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if let Some(gauge) = self.0 {
            gauge.dec();
        }
    }
}

pub(super) fn observe_request(method: &str, route: &str, status: StatusCode, elapsed_secs: f64) {
    let Some(metrics) = METRICS.as_ref() else {
        return;
    };

    metrics
        .requests
        .with_label_values(&[method, route, status_class(status), status.as_str()])
        .inc();

    metrics
        .latency
        .with_label_values(&[method, route])
        .observe(elapsed_secs);
}

pub(crate) fn record_event(event: MarketEvent) {
    if let Some(metrics) = METRICS.as_ref() {
        metrics
            .market_events
            .with_label_values(&[event.label()])
            .inc();
    }
}

fn status_class(status: StatusCode) -> &'static str {
    if status.is_success() {
        "2xx"
    } else if status.is_client_error() {
        "4xx"
    } else if status.is_server_error() {
        "5xx"
    } else if status.is_redirection() {
        "3xx"
    } else {
        "1xx"
    }
}

/// Prometheus text exposition.
#[handler]
pub(crate) async fn metrics_handler(res: &mut Response) {
    let Some(metrics) = METRICS.as_ref() else {
        res.status_code(StatusCode::SERVICE_UNAVAILABLE);
        return;
    };

    let mut body = Vec::new();

    if let Err(source) = TextEncoder::new().encode(&metrics.registry.gather(), &mut body) {
        error!("failed to encode metrics: {source}");
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        return;
    }

    res.render(String::from_utf8_lossy(&body).into_owned());
    res.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(TEXT_FORMAT));
}
