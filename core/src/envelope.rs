//! The API's standard response wrapper.
//!
//! Every endpoint answers with
//! `{"status": "success"|"error", "success": {...}, "error": {...}}`. The
//! server encodes an empty payload as `[]`, so both payload slots accept an
//! object, an empty array, `null`, or nothing at all.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Error,
}

/// One side of the envelope: a human readable message plus arbitrary data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvelopePayload {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub status: EnvelopeStatus,
    #[serde(default, deserialize_with = "optional_payload")]
    pub success: Option<EnvelopePayload>,
    #[serde(default, deserialize_with = "optional_payload")]
    pub error: Option<EnvelopePayload>,
}

impl ResponseEnvelope {
    pub fn is_success(&self) -> bool {
        self.status == EnvelopeStatus::Success
    }

    /// Message of the error payload, or a generic one when the server sent none.
    pub fn error_message(&self) -> String {
        self.error
            .as_ref()
            .and_then(|p| p.message.clone())
            .unwrap_or_else(|| "no error message provided".to_string())
    }

    /// Decode `success.data` into `T`.
    ///
    /// An error envelope becomes `ApiError::ErrorEnvelope`; a success envelope
    /// whose data does not fit `T` becomes `ApiError::UnexpectedResponse`.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        if !self.is_success() {
            let message = self.error_message();
            tracing::warn!(%message, "API answered with an error envelope");
            return Err(ApiError::ErrorEnvelope { message });
        }
        let data = self.success.map(|p| p.data).unwrap_or(Value::Null);
        serde_json::from_value(data).map_err(|e| ApiError::UnexpectedResponse(e.to_string()))
    }
}

fn optional_payload<'de, D>(deserializer: D) -> Result<Option<EnvelopePayload>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        // Tried first: a derived struct would also accept a sequence.
        Empty(Vec<Value>),
        Payload(EnvelopePayload),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Payload(payload)) => Some(payload),
        Some(Raw::Empty(_)) | None => None,
    })
}
