//! The transport seam between the services and the network.
//!
//! # Design
//! Services only see the `Transport` trait: one method per HTTP verb, each
//! taking a path relative to the base URL and returning the decoded
//! envelope. `HttpTransport` is the blocking implementation on `ureq`. Like
//! the rest of the crate it keeps request building and response parsing as
//! pure functions (`build_request` / `parse_response`), with `execute` as the
//! only place that touches the network.

use std::time::Duration;

use crate::config::ClientConfig;
use crate::envelope::ResponseEnvelope;
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, RequestOptions};

/// Executes API calls and decodes their envelopes.
///
/// Implementations must fail with a `TransportError` whenever the HTTP status
/// is not 200 or 201.
pub trait Transport: Send + Sync {
    fn get(&self, path: &str, options: &RequestOptions) -> Result<ResponseEnvelope, TransportError>;

    fn post(&self, path: &str, options: &RequestOptions) -> Result<ResponseEnvelope, TransportError>;

    fn put(&self, path: &str, options: &RequestOptions) -> Result<ResponseEnvelope, TransportError>;

    /// Replace the prefix prepended to every path.
    ///
    /// Takes `&mut self`, so it can only be called before the transport is
    /// shared. Services hold an `Arc<dyn Transport>` and never change the base
    /// URL; build a new `ApiService` to point at a different server.
    fn set_base_url(&mut self, url: &str);
}

/// Blocking HTTP transport.
#[derive(Clone)]
pub struct HttpTransport {
    base_url: String,
    user_agent: String,
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Self {
        Self::from_config(&ClientConfig {
            base_url: base_url.to_string(),
            ..ClientConfig::default()
        })
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            base_url: trim_base_url(&config.base_url),
            user_agent: config.user_agent.clone(),
            agent: build_agent(config.timeout),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Describe the call as a plain `HttpRequest`.
    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        options: &RequestOptions,
    ) -> Result<HttpRequest, TransportError> {
        let mut headers = vec![
            ("user-agent".to_string(), self.user_agent.clone()),
            ("accept".to_string(), "application/json".to_string()),
        ];
        headers.extend(options.headers.iter().cloned());

        let body = if options.form_params.is_empty() {
            None
        } else {
            headers.push((
                "content-type".to_string(),
                "application/x-www-form-urlencoded".to_string(),
            ));
            let encoded = serde_urlencoded::to_string(&options.form_params)
                .map_err(|e| TransportError::Encode(e.to_string()))?;
            Some(encoded)
        };

        Ok(HttpRequest {
            method,
            url: format!("{}{path}", self.base_url),
            headers,
            body,
        })
    }

    /// Decode a 200/201 response body into an envelope.
    pub fn parse_response(url: &str, response: HttpResponse) -> Result<ResponseEnvelope, TransportError> {
        if !matches!(response.status, 200 | 201) {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: response.status,
                body: response.body,
            });
        }
        serde_json::from_str(&response.body).map_err(|e| TransportError::Decode(e.to_string()))
    }

    /// Run the request over the network.
    ///
    /// Status codes are returned as data; `parse_response` decides what
    /// counts as a failure.
    pub fn execute(&self, req: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let result = match (req.method, req.body.as_deref()) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(&req.url), &req.headers).call(),
            (HttpMethod::Post, Some(body)) => {
                with_headers(self.agent.post(&req.url), &req.headers).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => with_headers(self.agent.post(&req.url), &req.headers).send_empty(),
            (HttpMethod::Put, Some(body)) => {
                with_headers(self.agent.put(&req.url), &req.headers).send(body.as_bytes())
            }
            (HttpMethod::Put, None) => with_headers(self.agent.put(&req.url), &req.headers).send_empty(),
        };
        let mut response = result.inspect_err(|e| tracing::debug!(url = %req.url, error = %e, "request failed"))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| Some((name.as_str().to_string(), value.to_str().ok()?.to_string())))
            .collect();
        let body = response.body_mut().read_to_string()?;

        Ok(HttpResponse { status, headers, body })
    }

    #[tracing::instrument(skip(self, method, options), level = "debug", fields(method = method.as_str()))]
    fn round_trip(
        &self,
        method: HttpMethod,
        path: &str,
        options: &RequestOptions,
    ) -> Result<ResponseEnvelope, TransportError> {
        let req = self.build_request(method, path, options)?;
        let response = self.execute(&req)?;
        tracing::debug!(status = response.status, "response received");
        Self::parse_response(&req.url, response)
    }
}

impl Transport for HttpTransport {
    fn get(&self, path: &str, options: &RequestOptions) -> Result<ResponseEnvelope, TransportError> {
        self.round_trip(HttpMethod::Get, path, options)
    }

    fn post(&self, path: &str, options: &RequestOptions) -> Result<ResponseEnvelope, TransportError> {
        self.round_trip(HttpMethod::Post, path, options)
    }

    fn put(&self, path: &str, options: &RequestOptions) -> Result<ResponseEnvelope, TransportError> {
        self.round_trip(HttpMethod::Put, path, options)
    }

    fn set_base_url(&mut self, url: &str) {
        self.base_url = trim_base_url(url);
    }
}

fn trim_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(Some(timeout))
        .build()
        .new_agent()
}

fn with_headers<B>(mut builder: ureq::RequestBuilder<B>, headers: &[(String, String)]) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}
