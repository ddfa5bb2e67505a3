//! Error types for the Year of Prayer client.
//!
//! # Design
//! `InvalidArgument` is raised before any request leaves the process. Every
//! failure of the round trip itself is a `TransportError`, passed through the
//! services unchanged. A response that arrived with a 2xx status but carries
//! `"status": "error"` is not a transport failure: operations that only
//! report success map it to `false`, operations that need the payload return
//! `ErrorEnvelope`.

use thiserror::Error;

/// Errors returned by the API facade and the services behind it.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Caller input was rejected before any network call.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a well-formed error envelope.
    #[error("the API reported an error: {message}")]
    ErrorEnvelope { message: String },

    /// A success envelope whose data does not have the expected shape.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Client configuration could not be read.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        ApiError::InvalidArgument(msg.into())
    }
}

/// Failures of a single HTTP round trip.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The server returned a status other than 200 or 201.
    #[error("unable to reach {url}: received a status code of {status}")]
    Status { url: String, status: u16, body: String },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The response body is not a valid envelope.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The request body could not be encoded.
    #[error("failed to encode request: {0}")]
    Encode(String),
}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        TransportError::Network(err.to_string())
    }
}
