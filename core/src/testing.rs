//! Recording transport for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::Value;

use crate::envelope::ResponseEnvelope;
use crate::error::TransportError;
use crate::http::{HttpMethod, RequestOptions};
use crate::transport::Transport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: HttpMethod,
    pub path: String,
    pub options: RequestOptions,
}

/// Answers calls from a queue and records what was asked.
#[derive(Default)]
pub struct StubTransport {
    responses: Mutex<VecDeque<Result<ResponseEnvelope, TransportError>>>,
    calls: Mutex<Vec<RecordedCall>>,
    pub base_url: String,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an envelope given as JSON.
    pub fn respond(self, envelope: Value) -> Self {
        let envelope = serde_json::from_value(envelope).expect("test envelope must be valid");
        self.responses.lock().unwrap().push_back(Ok(envelope));
        self
    }

    /// Queue a non-2xx status.
    pub fn fail(self, status: u16) -> Self {
        self.responses.lock().unwrap().push_back(Err(TransportError::Status {
            url: "http://stub".to_string(),
            status,
            body: String::new(),
        }));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, method: HttpMethod, path: &str, options: &RequestOptions) -> Result<ResponseEnvelope, TransportError> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            path: path.to_string(),
            options: options.clone(),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("no response queued".to_string())))
    }
}

impl Transport for StubTransport {
    fn get(&self, path: &str, options: &RequestOptions) -> Result<ResponseEnvelope, TransportError> {
        self.record(HttpMethod::Get, path, options)
    }

    fn post(&self, path: &str, options: &RequestOptions) -> Result<ResponseEnvelope, TransportError> {
        self.record(HttpMethod::Post, path, options)
    }

    fn put(&self, path: &str, options: &RequestOptions) -> Result<ResponseEnvelope, TransportError> {
        self.record(HttpMethod::Put, path, options)
    }

    fn set_base_url(&mut self, url: &str) {
        self.base_url = url.to_string();
    }
}
