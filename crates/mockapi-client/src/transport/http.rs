//! Blocking HTTP transport backed by a single reusable `ureq` agent.

use crate::error::Result;
use crate::transport::{Method, Request, Response, Transport};

/// HTTP transport.
///
/// The agent is configured to hand back error statuses as ordinary
/// responses; the client decides what counts as a failure.
pub struct HttpTransport {
    agent: ureq::Agent,
}

impl HttpTransport {
    /// Create a transport with a fresh agent.
    #[must_use]
    pub fn new() -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent }
    }

    fn with_headers<B>(
        request: &Request,
        mut builder: ureq::RequestBuilder<B>,
    ) -> ureq::RequestBuilder<B> {
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }
        builder
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &Request) -> Result<Response> {
        let url = request.url.as_str();

        let result = match (request.method, request.body.as_ref()) {
            (Method::Get, _) => Self::with_headers(request, self.agent.get(url)).call(),
            (Method::Delete, _) => Self::with_headers(request, self.agent.delete(url)).call(),
            (Method::Post, Some(body)) => {
                Self::with_headers(request, self.agent.post(url)).send_json(body)
            }
            (Method::Put, Some(body)) => {
                Self::with_headers(request, self.agent.put(url)).send_json(body)
            }
            (Method::Post, None) => Self::with_headers(request, self.agent.post(url)).send_empty(),
            (Method::Put, None) => Self::with_headers(request, self.agent.put(url)).send_empty(),
        };

        let mut response = result?;
        let status = response.status();
        let body = response.body_mut().read_to_string()?;

        Ok(Response {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}
