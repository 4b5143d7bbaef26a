//! W3C trace context carried on inbound requests.

use opentelemetry::{
    Context,
    propagation::{Extractor, TextMapPropagator as _},
    trace::TraceContextExt as _,
};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use salvo::http::{HeaderMap, HeaderName};

struct Headers<'a>(&'a HeaderMap);

impl Extractor for Headers<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(HeaderName::as_str).collect()
    }
}

/// The remote parent named by `traceparent`, if the header is well formed.
///
/// Extraction starts from an empty context so a request without the header
/// never attaches to whatever span happens to be current.
pub(super) fn remote_parent(headers: &HeaderMap) -> Option<Context> {
    let context =
        TraceContextPropagator::new().extract_with_context(&Context::new(), &Headers(headers));

    let valid = context.span().span_context().is_valid();

    valid.then_some(context)
}

#[cfg(test)]
mod tests {
    use salvo::http::HeaderValue;

    use super::*;

    const TRACEPARENT: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

    fn headers(traceparent: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("traceparent", HeaderValue::from_static(traceparent));
        headers
    }

    #[test]
    fn well_formed_traceparent_becomes_the_parent() {
        let parent = remote_parent(&headers(TRACEPARENT));

        let trace_id = parent.map(|context| context.span().span_context().trace_id().to_string());

        assert_eq!(trace_id.as_deref(), Some("4bf92f3577b34da6a3ce929d0e0e4736"));
    }

    #[test]
    fn absent_or_garbled_traceparent_is_ignored() {
        assert!(remote_parent(&HeaderMap::new()).is_none(), "no header");
        assert!(remote_parent(&headers("00-garbage-01")).is_none(), "bad header");
    }
}
