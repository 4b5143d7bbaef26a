//! `x-request-id` handling.

use salvo::{
    http::{HeaderMap, HeaderValue},
    prelude::Response,
};
use uuid::Uuid;

pub(super) const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_CALLER_ID_LEN: usize = 128;

/// The caller's request id when it is short printable ASCII, otherwise a fresh v7 UUID.
pub(super) fn resolve(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| acceptable(id))
        .map_or_else(|| Uuid::now_v7().to_string(), str::to_owned)
}

fn acceptable(id: &str) -> bool {
    !id.is_empty() && id.len() <= MAX_CALLER_ID_LEN && id.bytes().all(|byte| byte.is_ascii_graphic())
}

pub(super) fn echo(res: &mut Response, request_id: &str) {
    if let Ok(value) = HeaderValue::from_str(request_id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
}
