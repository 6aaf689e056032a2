#![deny(missing_docs)]

//! # HTTP Transport
//!
//! The single I/O seam of the client runtime. Tests substitute a recording mock;
//! `UreqTransport` performs real blocking requests.

use crate::error::AppResult;

/// An outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Upper-cased HTTP method.
    pub method: String,
    /// Absolute URL including the query string.
    pub url: String,
    /// Header name/value pairs, in insertion order.
    pub headers: Vec<(String, String)>,
    /// Serialised JSON body.
    pub body: Option<String>,
}

impl HttpRequest {
    /// The first header named `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A received response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Reason phrase.
    pub status_text: String,
    /// Raw body text.
    pub body: String,
}

/// Sends one request and waits for the whole response.
///
/// Implementations report every received status as `Ok`; only failures to
/// complete the exchange are errors.
pub trait Transport {
    /// Performs the exchange.
    fn send(&self, request: &HttpRequest) -> AppResult<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &HttpRequest) -> AppResult<HttpResponse> {
        (**self).send(request)
    }
}

#[cfg(feature = "client")]
pub use self::ureq_transport::UreqTransport;

#[cfg(feature = "client")]
mod ureq_transport {
    use super::{HttpRequest, HttpResponse, Transport};
    use crate::error::{AppError, AppResult};
    use ureq::http;
    use ureq::Agent;

    /// Blocking transport backed by a `ureq` agent.
    #[derive(Debug, Clone)]
    pub struct UreqTransport {
        agent: Agent,
    }

    impl Default for UreqTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl UreqTransport {
        /// An agent that reports 4xx/5xx as responses rather than errors.
        pub fn new() -> Self {
            let agent: Agent = Agent::config_builder()
                .http_status_as_error(false)
                .build()
                .into();
            Self { agent }
        }
    }

    impl Transport for UreqTransport {
        fn send(&self, request: &HttpRequest) -> AppResult<HttpResponse> {
            let mut builder = http::Request::builder()
                .method(request.method.as_str())
                .uri(request.url.as_str());
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }

            let invalid = |e: http::Error| AppError::Transport(format!("Invalid request: {}", e));
            let failed = |e: ureq::Error| {
                AppError::Transport(format!("Request to {} failed: {}", request.url, e))
            };
            let mut response = match &request.body {
                Some(body) => self
                    .agent
                    .run(builder.body(body.clone()).map_err(invalid)?)
                    .map_err(failed)?,
                None => self
                    .agent
                    .run(builder.body(()).map_err(invalid)?)
                    .map_err(failed)?,
            };

            let status = response.status();
            let body = response
                .body_mut()
                .read_to_string()
                .map_err(|e| AppError::Transport(format!("Failed to read response body: {}", e)))?;
            Ok(HttpResponse {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            })
        }
    }
}
