//! Consumer registration and updates.

use std::sync::Arc;

use serde_json::Value;

use crate::error::ApiError;
use crate::http::RequestOptions;
use crate::transport::Transport;
use crate::types::{ConsumerRecord, ConsumerUpdate, API_KEY_HEADER, CLIENT_ID_HEADER};

pub const REGISTER_PATH: &str = "/consumers/register";
pub const UPDATE_PATH: &str = "/consumers/update";

#[derive(Clone)]
pub struct ConsumerService {
    transport: Arc<dyn Transport>,
}

impl ConsumerService {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// A record can be registered once it has a device uuid. Everything else
    /// is defaulted by the server.
    pub fn validate(&self, record: &ConsumerRecord) -> bool {
        !record.device_uuid.is_empty()
    }

    /// Register a new consumer on behalf of the client `client_id`.
    ///
    /// Returns the stored record as the server sent it, including the freshly
    /// assigned `api_key`. Its shape is not checked here.
    #[tracing::instrument(skip_all, level = "debug")]
    pub fn register(&self, client_id: &str, record: &ConsumerRecord) -> Result<Value, ApiError> {
        let options = RequestOptions::new().header(CLIENT_ID_HEADER, client_id).form(record)?;
        let envelope = self.transport.post(REGISTER_PATH, &options)?;
        envelope.into_data()
    }

    /// Send the set fields of `update`. Returns whether the server accepted
    /// them; an error envelope is `Ok(false)`, not an error.
    #[tracing::instrument(skip_all, level = "debug")]
    pub fn update(&self, api_key: &str, update: &ConsumerUpdate) -> Result<bool, ApiError> {
        let options = RequestOptions::new().header(API_KEY_HEADER, api_key).form(update)?;
        let envelope = self.transport.put(UPDATE_PATH, &options)?;
        if !envelope.is_success() {
            tracing::warn!(message = %envelope.error_message(), "consumer update rejected");
        }
        Ok(envelope.is_success())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::error::TransportError;
    use crate::http::HttpMethod;
    use crate::testing::StubTransport;

    fn factory() -> ConsumerRecord {
        ConsumerRecord {
            client_id: Some("909ae8a3-88b7-4e8e-920c-291caefa72c5".to_string()),
            device_model: Some("Web Browser".to_string()),
            device_platform: Some("NA".to_string()),
            device_version: Some("NA".to_string()),
            device_uuid: "920a5209-1648-4ccc-9782-269a6cfb1d59".to_string(),
            push_token: Some("78d71cd1-6c07-4a4d-a926-e49d17a0de39".to_string()),
            push_at: Some("10:00:00".to_string()),
            push_lang: Some("eng".to_string()),
            time_zone: Some(String::new()),
            receive_push: Some(false),
            api_key: None,
        }
    }

    fn service(stub: StubTransport) -> (ConsumerService, Arc<StubTransport>) {
        let stub = Arc::new(stub);
        (ConsumerService::new(stub.clone()), stub)
    }

    #[test]
    fn validate_requires_device_uuid() {
        let (service, _) = service(StubTransport::new());
        let mut record = factory();
        assert!(service.validate(&record));

        record.device_uuid = String::new();
        assert!(!service.validate(&record));
    }

    #[test]
    fn register_returns_the_stored_record() {
        let mut expected = factory();
        expected.api_key = Some("AWizardOfAKey123".to_string());
        let (service, stub) = service(StubTransport::new().respond(json!({
            "status": "success",
            "error": [],
            "success": {
                "message": "Thank You! The consumer has been registered with our API.",
                "data": serde_json::to_value(&expected).unwrap()
            }
        })));

        let consumer = service.register("myClientId", &factory()).unwrap();
        assert_eq!(consumer, serde_json::to_value(&expected).unwrap());

        let calls = stub.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, HttpMethod::Post);
        assert_eq!(calls[0].path, "/consumers/register");
        assert_eq!(
            calls[0].options.headers,
            vec![("yop-client-application-id".to_string(), "myClientId".to_string())]
        );
        let form = &calls[0].options.form_params;
        assert!(form.contains(&("device_uuid".to_string(), "920a5209-1648-4ccc-9782-269a6cfb1d59".to_string())));
        assert!(form.contains(&("receive_push".to_string(), "0".to_string())));
        assert!(form.contains(&("time_zone".to_string(), String::new())));
        assert!(!form.iter().any(|(k, _)| k == "api_key"));
    }

    #[test]
    fn register_passes_unfamiliar_records_through() {
        let stored = json!({ "device_uuid": "u", "client_id": 17, "receive_push": "yes", "api_key": "K" });
        let (service, _) = service(StubTransport::new().respond(json!({
            "status": "success",
            "error": [],
            "success": { "message": "ok", "data": stored }
        })));

        assert_eq!(service.register("myClientId", &factory()).unwrap(), stored);
    }

    #[test]
    fn register_propagates_transport_failure() {
        let (service, _) = service(StubTransport::new().fail(500));
        let err = service.register("myClientId", &factory()).unwrap_err();
        assert!(matches!(err, ApiError::Transport(TransportError::Status { status: 500, .. })));
    }

    #[test]
    fn register_reports_error_envelope() {
        let (service, _) = service(StubTransport::new().respond(json!({
            "status": "error",
            "success": [],
            "error": { "message": "Missing device uuid.", "data": [] }
        })));
        let err = service.register("myClientId", &factory()).unwrap_err();
        assert!(matches!(err, ApiError::ErrorEnvelope { message } if message == "Missing device uuid."));
    }

    #[test]
    fn update_sends_only_set_fields() {
        let (service, stub) = service(StubTransport::new().respond(json!({
            "status": "success",
            "error": [],
            "success": { "message": "Updated.", "data": [] }
        })));
        let update = ConsumerUpdate {
            push_at: Some("21:00:00".to_string()),
            ..ConsumerUpdate::default()
        };

        assert!(service.update("myUniqueKey123", &update).unwrap());

        let calls = stub.calls();
        assert_eq!(calls[0].method, HttpMethod::Put);
        assert_eq!(calls[0].path, "/consumers/update");
        assert_eq!(calls[0].options.header_value("yop-api-key"), Some("myUniqueKey123"));
        assert_eq!(
            calls[0].options.form_params,
            vec![("push_at".to_string(), "21:00:00".to_string())]
        );
    }

    #[test]
    fn update_returns_false_on_error_envelope() {
        let (service, _) = service(StubTransport::new().respond(json!({
            "status": "error",
            "success": [],
            "error": { "message": "Invalid API key.", "data": [] }
        })));
        let update = ConsumerUpdate {
            push_at: Some("21:00:00".to_string()),
            ..ConsumerUpdate::default()
        };

        assert!(!service.update("myNewUniqueKey789", &update).unwrap());
    }

    #[test]
    fn update_propagates_transport_failure() {
        let (service, _) = service(StubTransport::new().fail(401));
        let err = service.update("key", &ConsumerUpdate::default()).unwrap_err();
        assert!(matches!(err, ApiError::Transport(TransportError::Status { status: 401, .. })));
    }
}
