use axum::{
    body::Body,
    http::header,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use futures::{future, Stream, StreamExt};
use std::convert::Infallible;

/// Relay a stream of text chunks as a `text/plain` response body, flushing
/// each chunk as it arrives. The first error is logged and ends the body.
pub fn text_stream_response<S, E>(chunks: S) -> Response
where
    S: Stream<Item = Result<String, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let body = chunks.scan((), |_, item| {
        future::ready(match item {
            Ok(text) => Some(Ok::<_, Infallible>(Bytes::from(text))),
            Err(e) => {
                tracing::error!(error = %e, "text stream failed; closing response body");
                None
            }
        })
    });

    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        ],
        Body::from_stream(body),
    )
        .into_response()
}
