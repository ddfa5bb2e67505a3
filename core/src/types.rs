//! Domain types for the Year of Prayer API.
//!
//! # Design
//! Consumer records travel as form fields on the way out and as JSON on the
//! way back. Only `device_uuid` is required; the server fills in defaults for
//! everything else, so all other fields are optional and omitted when unset.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// Header carrying a consumer's API key.
pub const API_KEY_HEADER: &str = "yop-api-key";

/// Header carrying a client application's id.
pub const CLIENT_ID_HEADER: &str = "yop-client-application-id";

/// A registered (or to be registered) device installation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_version: Option<String>,
    pub device_uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_token: Option<String>,
    /// Time of day for the push notification, e.g. `10:00:00`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(default, with = "flag", skip_serializing_if = "Option::is_none")]
    pub receive_push: Option<bool>,
    /// Assigned by the server on registration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl ConsumerRecord {
    pub fn new(device_uuid: impl Into<String>) -> Self {
        Self {
            device_uuid: device_uuid.into(),
            ..Self::default()
        }
    }
}

/// Fields to change on an existing consumer. Unset fields are left alone.
///
/// `api_key` exists only so that field bags decoded from elsewhere can be
/// rejected when they try to rewrite the key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(default, with = "flag", skip_serializing_if = "Option::is_none")]
    pub receive_push: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl ConsumerUpdate {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A prayer identifier in `MM-DD` form. Not validated on construction; see
/// `PrayerService::validate`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrayerId {
    pub id: String,
}

impl PrayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for PrayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Who is asking for prayer stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    Consumer,
    Client,
}

impl KeyType {
    pub fn as_str(self) -> &'static str {
        match self {
            KeyType::Consumer => "consumer",
            KeyType::Client => "client",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyType {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "consumer" => Ok(KeyType::Consumer),
            "client" => Ok(KeyType::Client),
            _ => Err(ApiError::invalid("the keyType you provided is invalid")),
        }
    }
}

/// Credentials attached to a request. Exactly one header is ever sent.
#[derive(Clone, PartialEq, Eq)]
pub enum Authorization {
    ApiKey(String),
    ClientId(String),
}

impl Authorization {
    pub fn new(key_type: KeyType, key: &str) -> Self {
        match key_type {
            KeyType::Consumer => Authorization::ApiKey(key.to_string()),
            KeyType::Client => Authorization::ClientId(key.to_string()),
        }
    }

    /// Header name and value for this credential.
    pub fn header(&self) -> (&'static str, &str) {
        match self {
            Authorization::ApiKey(key) => (API_KEY_HEADER, key.as_str()),
            Authorization::ClientId(id) => (CLIENT_ID_HEADER, id.as_str()),
        }
    }
}

// Credentials stay out of logs.
impl fmt::Debug for Authorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Authorization::ApiKey(_) => f.write_str("ApiKey(..)"),
            Authorization::ClientId(_) => f.write_str("ClientId(..)"),
        }
    }
}

/// Stats for one prayer, kept exactly as the server sent them.
///
/// Consumers get their own counts on top of the aggregate; clients only get
/// the aggregate. The accessors read the known fields without requiring a
/// particular shape: counts may arrive as numbers or as numeric text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrayerStats {
    pub data: Value,
}

impl PrayerStats {
    pub fn prayer_request_id(&self) -> Option<&str> {
        self.data.get("prayer_request_id")?.as_str()
    }

    pub fn total_prayers(&self) -> Option<u64> {
        count(self.data.get("total_prayers")?)
    }

    pub fn your_prayers(&self) -> Option<u64> {
        count(self.data.get("your_prayers")?)
    }

    pub fn your_last_prayer_on(&self) -> Option<&str> {
        self.data.get("your_last_prayer_on")?.as_str()
    }

    /// Any other field, as sent.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    pub fn into_inner(self) -> Value {
        self.data
    }
}

fn count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// `receive_push` arrives as a bool, `0`/`1`, or `"0"`/`"1"`.
mod flag {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<bool>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(b) => serializer.serialize_u8(u8::from(*b)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bool(bool),
            Int(i64),
            Text(String),
        }

        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Raw::Bool(b)) => Ok(Some(b)),
            Some(Raw::Int(0)) => Ok(Some(false)),
            Some(Raw::Int(1)) => Ok(Some(true)),
            Some(Raw::Text(s)) => match s.as_str() {
                "0" | "false" => Ok(Some(false)),
                "1" | "true" => Ok(Some(true)),
                "" => Ok(None),
                other => Err(D::Error::custom(format!("invalid flag value `{other}`"))),
            },
            Some(Raw::Int(n)) => Err(D::Error::custom(format!("invalid flag value `{n}`"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn consumer_record_accepts_numeric_flag() {
        let record: ConsumerRecord = serde_json::from_value(json!({
            "device_uuid": "920a5209-1648-4ccc-9782-269a6cfb1d59",
            "push_at": "10:00:00",
            "time_zone": "",
            "receive_push": 0,
            "api_key": "frogger123@",
            "created_at": "2016-01-12 11:12:00"
        }))
        .unwrap();

        assert_eq!(record.receive_push, Some(false));
        assert_eq!(record.time_zone.as_deref(), Some(""));
        assert_eq!(record.api_key.as_deref(), Some("frogger123@"));
    }

    #[test]
    fn flag_accepts_bool_and_text() {
        let on: ConsumerUpdate = serde_json::from_value(json!({ "receive_push": true })).unwrap();
        let off: ConsumerUpdate = serde_json::from_value(json!({ "receive_push": "0" })).unwrap();
        let bad: Result<ConsumerUpdate, _> = serde_json::from_value(json!({ "receive_push": 7 }));

        assert_eq!(on.receive_push, Some(true));
        assert_eq!(off.receive_push, Some(false));
        assert!(bad.is_err());
    }

    #[test]
    fn consumer_record_serializes_flag_as_number() {
        let record = ConsumerRecord {
            receive_push: Some(true),
            ..ConsumerRecord::new("uuid-1")
        };
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({ "device_uuid": "uuid-1", "receive_push": 1 })
        );
    }

    #[test]
    fn consumer_record_requires_device_uuid() {
        let result: Result<ConsumerRecord, _> = serde_json::from_value(json!({ "device_model": "iOS" }));
        assert!(result.is_err());
    }

    #[test]
    fn consumer_update_is_empty() {
        assert!(ConsumerUpdate::default().is_empty());
        let update = ConsumerUpdate {
            push_at: Some("12:00:00".to_string()),
            ..ConsumerUpdate::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn key_type_parses_known_values_only() {
        assert_eq!("consumer".parse::<KeyType>().unwrap(), KeyType::Consumer);
        assert_eq!("client".parse::<KeyType>().unwrap(), KeyType::Client);
        assert!(matches!("Client".parse::<KeyType>(), Err(ApiError::InvalidArgument(_))));
        assert!(matches!("".parse::<KeyType>(), Err(ApiError::InvalidArgument(_))));
    }

    #[test]
    fn authorization_picks_header_by_key_type() {
        let consumer = Authorization::new(KeyType::Consumer, "MonKeyTree");
        let client = Authorization::new(KeyType::Client, "my-client-id");
        assert_eq!(consumer.header(), (API_KEY_HEADER, "MonKeyTree"));
        assert_eq!(client.header(), (CLIENT_ID_HEADER, "my-client-id"));
        assert_eq!(format!("{consumer:?}"), "ApiKey(..)");
    }

    #[test]
    fn prayer_stats_keeps_unknown_fields() {
        let stats: PrayerStats = serde_json::from_value(json!({
            "prayer_request_id": "11-10",
            "total_prayers": 3,
            "title": "Pray for the nations"
        }))
        .unwrap();

        assert_eq!(stats.prayer_request_id(), Some("11-10"));
        assert_eq!(stats.total_prayers(), Some(3));
        assert_eq!(stats.your_prayers(), None);
        assert_eq!(stats.get("title"), Some(&json!("Pray for the nations")));
    }

    #[test]
    fn prayer_stats_counts_may_be_text() {
        let data = json!({
            "prayer_request_id": "12-28",
            "total_prayers": "3",
            "your_prayers": "1",
            "your_last_prayer_on": null
        });
        let stats: PrayerStats = serde_json::from_value(data.clone()).unwrap();

        assert_eq!(stats.total_prayers(), Some(3));
        assert_eq!(stats.your_prayers(), Some(1));
        assert_eq!(stats.your_last_prayer_on(), None);
        assert_eq!(serde_json::to_value(&stats).unwrap(), data);
    }
}
