//! Minimal W3C trace-context helpers: outgoing calls get a fresh `traceparent`,
//! incoming ones have their trace id recorded on the request span.

use http::{HeaderMap, HeaderName, HeaderValue};

/// W3C Trace Context header name
pub const TRACEPARENT: &str = "traceparent";

pub fn extract_trace_parent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(TRACEPARENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

/// Insert a sampled `traceparent` header with random trace and span ids.
pub fn inject_trace_context(headers: &mut HeaderMap) {
    let trace_id = format!("{:032x}", rand::random::<u128>());
    let span_id = format!("{:016x}", rand::random::<u64>());
    let traceparent = format!("00-{trace_id}-{span_id}-01");

    if let Ok(value) = HeaderValue::from_str(&traceparent) {
        headers.insert(HeaderName::from_static(TRACEPARENT), value);
    }
}

/// Trace id of a version-00 `traceparent`, if well-formed.
pub fn parse_trace_id(traceparent: &str) -> Option<&str> {
    let mut parts = traceparent.split('-');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some("00"), Some(trace_id), Some(_), Some(_)) if trace_id.len() == 32 => Some(trace_id),
        _ => None,
    }
}
