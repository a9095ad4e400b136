//! Outgoing HTTP client used by every provider adapter.

use crate::http::trace_context;
use tracing::{field::Empty, Instrument};

/// `reqwest::Client` wrapper: every call runs inside an `outgoing_http` span
/// and carries a `traceparent` header.
#[derive(Clone, Debug)]
pub struct TracedClient {
    inner: reqwest::Client,
}

impl TracedClient {
    pub fn new(inner: reqwest::Client) -> Self {
        Self { inner }
    }

    /// Start a request; finish it with [`TracedClient::send`].
    pub fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.inner.request(method, url)
    }

    pub async fn send(&self, builder: reqwest::RequestBuilder) -> reqwest::Result<reqwest::Response> {
        let req = builder.build()?;
        self.execute(req).await
    }

    pub async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let span = tracing::info_span!(
            "outgoing_http",
            http.method = %req.method(),
            http.url = %redact_query(req.url()),
            http.status_code = Empty,
            error = Empty,
        );

        trace_context::inject_trace_context(req.headers_mut());

        async {
            let result = self.inner.execute(req).await;
            let current = tracing::Span::current();
            match &result {
                Ok(resp) => {
                    current.record("http.status_code", resp.status().as_u16());
                    tracing::debug!(status = resp.status().as_u16(), "outgoing request completed");
                    if resp.status().is_client_error() || resp.status().is_server_error() {
                        current.record("error", true);
                    }
                }
                Err(e) => {
                    current.record("error", true);
                    tracing::debug!(error = %e, "outgoing request failed");
                }
            }
            result
        }
        .instrument(span)
        .await
    }
}

/// Query strings may carry keys; keep them out of the logs.
fn redact_query(url: &reqwest::Url) -> String {
    let mut shown = url.clone();
    shown.set_query(None);
    shown.to_string()
}

impl From<reqwest::Client> for TracedClient {
    fn from(c: reqwest::Client) -> Self {
        Self::new(c)
    }
}

impl Default for TracedClient {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}
