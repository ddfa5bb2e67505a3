//! HTTP request and response types shared by the services and the transport.
//!
//! # Design
//! Services describe a call as a path plus `RequestOptions` (headers and form
//! fields). The transport turns that into an `HttpRequest`, executes it, and
//! hands the resulting `HttpResponse` to its parser. All types are plain owned
//! data so they can be built and inspected in tests without any I/O.

use serde::Serialize;
use serde_json::Value;

use crate::error::TransportError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
        }
    }
}

/// Headers and form fields attached to a call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
    pub form_params: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Flatten a serializable record into form fields.
    ///
    /// `None` fields are skipped and booleans are sent as `1`/`0`. Nested
    /// values are not supported by the API and are rejected.
    pub fn form<T: Serialize>(mut self, record: &T) -> Result<Self, TransportError> {
        let value = serde_json::to_value(record).map_err(|e| TransportError::Encode(e.to_string()))?;
        let Value::Object(fields) = value else {
            return Err(TransportError::Encode("form data must be a map of fields".to_string()));
        };
        for (name, value) in fields {
            let text = match value {
                Value::Null => continue,
                Value::String(s) => s,
                Value::Bool(b) => u8::from(b).to_string(),
                Value::Number(n) => n.to_string(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(TransportError::Encode(format!("field `{name}` is not a scalar")));
                }
            };
            self.form_params.push((name, text));
        }
        Ok(self)
    }

    /// Value of the first header named `name`, compared case-insensitively.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}
