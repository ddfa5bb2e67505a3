//! The entry point SDK callers use.
//!
//! # Design
//! `ApiService` checks the shape of each call, then hands off to
//! `ConsumerService` or `PrayerService`. Every guard runs before the
//! transport is touched, so an `InvalidArgument` error means nothing was
//! sent.

use std::sync::Arc;

use serde_json::Value;

use crate::config::ClientConfig;
use crate::consumer::ConsumerService;
use crate::error::ApiError;
use crate::prayer::PrayerService;
use crate::transport::{HttpTransport, Transport};
use crate::types::{ConsumerRecord, ConsumerUpdate, KeyType, PrayerId, PrayerStats};

#[derive(Clone)]
pub struct ApiService {
    consumers: ConsumerService,
    prayers: PrayerService,
}

impl ApiService {
    pub fn new(consumers: ConsumerService, prayers: PrayerService) -> Self {
        Self { consumers, prayers }
    }

    /// Both services over one shared transport.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self::new(ConsumerService::new(transport.clone()), PrayerService::new(transport))
    }

    /// Facade over an `HttpTransport` built from `config`.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::with_transport(Arc::new(HttpTransport::from_config(config)))
    }

    /// Register a new consumer and return its API key.
    pub fn register_consumer(&self, client_id: &str, data: &ConsumerRecord) -> Result<String, ApiError> {
        if client_id.is_empty() {
            return Err(ApiError::invalid("you are missing the Year of Prayer client id"));
        }
        if !self.consumers.validate(data) {
            return Err(ApiError::invalid("the data you provided is invalid"));
        }
        let consumer = self.consumers.register(client_id, data)?;
        match consumer.get("api_key").and_then(Value::as_str) {
            Some(key) if !key.is_empty() => Ok(key.to_string()),
            _ => Err(ApiError::UnexpectedResponse("registered consumer has no api_key".to_string())),
        }
    }

    /// Update a consumer's stored fields. The API key itself can never be
    /// changed.
    pub fn update_consumer(&self, api_key: &str, data: &ConsumerUpdate) -> Result<bool, ApiError> {
        if api_key.is_empty() {
            return Err(ApiError::invalid("you need to provide a valid API key"));
        }
        if data.is_empty() {
            return Err(ApiError::invalid("you need to provide data for the consumer update"));
        }
        if data.api_key.is_some() {
            return Err(ApiError::invalid("you cannot update the API key"));
        }
        self.consumers.update(api_key, data)
    }

    /// Record that the consumer is praying for the day `prayer_id`.
    pub fn praying(&self, api_key: &str, prayer_id: &str) -> Result<bool, ApiError> {
        let prayer = PrayerId::new(prayer_id);
        if api_key.is_empty() {
            return Err(ApiError::invalid("the apiKey you provided is invalid"));
        }
        if !self.prayers.validate(&prayer) {
            return Err(ApiError::invalid("the prayerId you provided is invalid"));
        }
        self.prayers.praying(api_key, &prayer)
    }

    /// Stats for `prayer_id`. `key_type` is `"consumer"` when
    /// `authorize_key` is a consumer API key and `"client"` when it is a
    /// client application id.
    pub fn prayer_stats(&self, authorize_key: &str, key_type: &str, prayer_id: &str) -> Result<PrayerStats, ApiError> {
        let prayer = PrayerId::new(prayer_id);
        if authorize_key.is_empty() {
            return Err(ApiError::invalid("the authorizeKey you provided is invalid"));
        }
        let key_type: KeyType = key_type.parse()?;
        if !self.prayers.validate(&prayer) {
            return Err(ApiError::invalid("the prayerId you provided is invalid"));
        }
        self.prayers.prayer_stats(authorize_key, key_type, &prayer)
    }
}
