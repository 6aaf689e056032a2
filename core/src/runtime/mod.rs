#![deny(missing_docs)]

//! # Client Runtime
//!
//! Executes the generated call functions in-process, driven by the same
//! `ClientModule` the renderer consumes. Each call:
//! 1. Checks the configuration (before any I/O).
//! 2. Validates and serialises the query, then the body.
//! 3. Sends one request through the `Transport`.
//! 4. Fails on a non-2xx/3xx status, otherwise validates the response if a schema is declared.

pub mod query;
pub mod transport;

use crate::error::{AppError, AppResult, ValidationTarget};
use crate::module::ClientModule;
use crate::validator::SchemaRegistry;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

pub use query::to_query_string;
pub use transport::{HttpRequest, HttpResponse, Transport};
#[cfg(feature = "client")]
pub use transport::UreqTransport;

/// Caller-supplied configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    /// Bearer token; the `Authorization` header is omitted when absent or blank.
    pub access_token: Option<String>,
    /// Base URL every path template is appended to.
    pub api_url: Option<String>,
}

impl ClientConfig {
    /// Creates a configuration.
    pub fn new(access_token: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            api_url: Some(api_url.into()),
        }
    }

    /// The validated base URL with trailing slashes removed.
    ///
    /// # Errors
    ///
    /// * `AppError::Config` when the URL is missing, blank, unparsable, or not `http(s)`.
    pub fn base_url(&self) -> AppResult<String> {
        let raw = self
            .api_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::Config("API base URL is not configured".to_string()))?;
        let parsed = Url::parse(raw)
            .map_err(|e| AppError::Config(format!("Invalid API base URL '{}': {}", raw, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::Config(format!(
                "API base URL must use http or https: '{}'",
                raw
            )));
        }
        Ok(raw.trim_end_matches('/').to_string())
    }

    fn bearer(&self) -> Option<String> {
        self.access_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| format!("Bearer {}", t))
    }
}

/// Arguments of one call. Fields without a declared schema are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallInput {
    /// The query object.
    pub query: Option<Value>,
    /// The request body.
    pub body: Option<Value>,
}

impl CallInput {
    /// No inputs.
    pub fn none() -> Self {
        Self::default()
    }

    /// Only a query object.
    pub fn query(query: Value) -> Self {
        Self {
            query: Some(query),
            body: None,
        }
    }

    /// Only a body.
    pub fn body(body: Value) -> Self {
        Self {
            query: None,
            body: Some(body),
        }
    }

    /// Both inputs.
    pub fn query_and_body(query: Value, body: Value) -> Self {
        Self {
            query: Some(query),
            body: Some(body),
        }
    }
}

/// An in-process client over a generated module.
pub struct Client<'m, T: Transport> {
    module: &'m ClientModule,
    registry: SchemaRegistry,
    config: ClientConfig,
    transport: T,
}

impl<'m, T: Transport> Client<'m, T> {
    /// Creates a client.
    pub fn new(module: &'m ClientModule, config: ClientConfig, transport: T) -> Self {
        Self {
            module,
            registry: module.registry(),
            config,
            transport,
        }
    }

    /// The transport, e.g. to inspect a recording mock.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Calls the function at `route` (tree keys, e.g. `["widgets", "byId"]`) for `method`.
    pub fn call(&self, route: &[&str], method: &str, input: CallInput) -> AppResult<Value> {
        let endpoint = self.module.tree.endpoint(route, method).ok_or_else(|| {
            AppError::General(format!(
                "No endpoint {} at {}",
                method.to_uppercase(),
                route.join(".")
            ))
        })?;

        // 1. Configuration
        let mut url = format!("{}{}", self.config.base_url()?, endpoint.path);

        // 2. Query
        if let Some(name) = &endpoint.query {
            let query = input.query.unwrap_or(Value::Null);
            let parsed = self.validate(name, &query, ValidationTarget::Query)?;
            let search = to_query_string(&parsed);
            if !search.is_empty() {
                url.push('?');
                url.push_str(&search);
            }
        }

        // 3. Body
        let body = match &endpoint.body {
            Some(name) => {
                let body = input.body.unwrap_or(Value::Null);
                let parsed = self.validate(name, &body, ValidationTarget::Body)?;
                Some(serde_json::to_string(&parsed).map_err(|e| {
                    AppError::General(format!("Failed to serialise request body: {}", e))
                })?)
            }
            None => None,
        };

        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if let Some(bearer) = self.config.bearer() {
            headers.push(("Authorization".to_string(), bearer));
        }
        let request = HttpRequest {
            method: endpoint.http_method(),
            url,
            headers,
            body,
        };

        // 4. Exchange
        debug!("{} {}", request.method, request.url);
        let response = self.transport.send(&request)?;
        let success = (200..400).contains(&response.status);
        let data = parse_body(&response.body, success)?;

        if !success {
            warn!(
                "Request failed: {} {} -> {} {}: {}",
                request.method, endpoint.path, response.status, response.status_text, data
            );
            return Err(AppError::RequestFailed {
                status: response.status,
                status_text: response.status_text,
                body: data,
            });
        }

        match &endpoint.response {
            Some(name) => self.validate(name, &data, ValidationTarget::Response),
            None => Ok(data),
        }
    }

    fn validate(&self, name: &str, value: &Value, target: ValidationTarget) -> AppResult<Value> {
        let validator = self
            .registry
            .get(name)
            .ok_or_else(|| AppError::General(format!("Unknown schema `{}`", name)))?;
        validator
            .parse(value, &self.registry)
            .map_err(|issue| issue.into_error(target))
    }
}

/// Empty bodies are `null`. A failed response that is not JSON keeps its text
/// for diagnostics; a successful one is a response validation error.
fn parse_body(text: &str, success: bool) -> AppResult<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(_) if !success => Ok(Value::String(text.to_string())),
        Err(e) => Err(AppError::Validation {
            target: ValidationTarget::Response,
            path: "$".to_string(),
            message: format!("invalid JSON: {}", e),
        }),
    }
}
