//! Client SDK for the Year of Prayer API.
//!
//! # Overview
//! Registers consumers (device installations), updates their preferences,
//! records that a consumer is praying for a day's prayer, and fetches prayer
//! stats. `ApiService` is the entry point; it validates every call before
//! handing it to `ConsumerService` or `PrayerService`, which build the
//! authenticated request and unwrap the API's response envelope.
//!
//! # Design
//! - The network sits behind the `Transport` trait. `HttpTransport` is the
//!   blocking `ureq` implementation; tests substitute their own.
//! - Services are stateless and share one `Arc<dyn Transport>`. Each call is
//!   a single round trip with no retries and no caching.
//! - Caller mistakes are `ApiError::InvalidArgument` and are raised before
//!   anything is sent. Transport failures are passed through untouched.
//!
//! ```no_run
//! use yop_core::{ApiService, ClientConfig, ConsumerRecord};
//!
//! let api = ApiService::from_config(&ClientConfig::from_env()?);
//! let api_key = api.register_consumer("my-client-id", &ConsumerRecord::new("device-uuid"))?;
//! api.praying(&api_key, "01-11")?;
//! # Ok::<(), yop_core::ApiError>(())
//! ```

pub mod api;
pub mod config;
pub mod consumer;
pub mod envelope;
pub mod error;
pub mod http;
pub mod prayer;
#[cfg(test)]
mod testing;
pub mod transport;
pub mod types;

pub use api::ApiService;
pub use config::ClientConfig;
pub use consumer::ConsumerService;
pub use envelope::{EnvelopePayload, EnvelopeStatus, ResponseEnvelope};
pub use error::{ApiError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, RequestOptions};
pub use prayer::PrayerService;
pub use transport::{HttpTransport, Transport};
pub use types::{Authorization, ConsumerRecord, ConsumerUpdate, KeyType, PrayerId, PrayerStats};
