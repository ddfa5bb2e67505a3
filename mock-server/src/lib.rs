//! In-memory stand-in for the Year of Prayer API.
//!
//! Serves the four endpoints the SDK uses with the same envelope format and
//! auth headers as the real service. State lives in a single `RwLock` and is
//! lost when the process exits.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const API_KEY_HEADER: &str = "yop-api-key";
pub const CLIENT_ID_HEADER: &str = "yop-client-application-id";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Consumer {
    pub client_id: String,
    pub device_model: Option<String>,
    pub device_platform: Option<String>,
    pub device_version: Option<String>,
    pub device_uuid: String,
    pub push_token: Option<String>,
    pub push_at: String,
    pub push_lang: String,
    pub time_zone: Option<String>,
    pub receive_push: u8,
    pub api_key: String,
}

/// Form fields accepted by register and update. Everything arrives as text.
#[derive(Debug, Default, Deserialize)]
pub struct ConsumerForm {
    pub client_id: Option<String>,
    pub device_model: Option<String>,
    pub device_platform: Option<String>,
    pub device_version: Option<String>,
    pub device_uuid: Option<String>,
    pub push_token: Option<String>,
    pub push_at: Option<String>,
    pub push_lang: Option<String>,
    pub time_zone: Option<String>,
    pub receive_push: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Clone, Debug)]
struct Prayer {
    prayer_request_id: String,
    api_key: String,
    prayed_on: String,
}

#[derive(Debug, Default)]
pub struct Store {
    consumers: HashMap<String, Consumer>,
    prayers: Vec<Prayer>,
}

pub type Db = Arc<RwLock<Store>>;

type Reply = (StatusCode, Json<Value>);

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/consumers/register", post(register_consumer))
        .route("/consumers/update", put(update_consumer))
        .route("/prayers/{id}", get(prayer_stats))
        .route("/prayers/{id}/praying", post(praying))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn success(status: StatusCode, message: &str, data: Value) -> Reply {
    (
        status,
        Json(json!({
            "status": "success",
            "error": [],
            "success": { "message": message, "data": data }
        })),
    )
}

fn failure(status: StatusCode, message: &str) -> Reply {
    (
        status,
        Json(json!({
            "status": "error",
            "success": [],
            "error": { "message": message, "data": [] }
        })),
    )
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name)?.to_str().ok().filter(|v| !v.is_empty())
}

fn parse_flag(raw: &str) -> u8 {
    u8::from(matches!(raw, "1" | "true"))
}

/// Strict calendar check: month 1..=12, day 1..=days in month (29 for February).
pub fn valid_prayer_id(id: &str) -> bool {
    let Some((month, day)) = id.split_once('-') else {
        return false;
    };
    if month.len() != 2 || day.len() != 2 || !month.bytes().chain(day.bytes()).all(|b| b.is_ascii_digit()) {
        return false;
    }
    let (Ok(month), Ok(day)) = (month.parse::<u32>(), day.parse::<u32>()) else {
        return false;
    };
    let days = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => 29,
        _ => return false,
    };
    (1..=days).contains(&day)
}

async fn register_consumer(State(db): State<Db>, headers: HeaderMap, Form(input): Form<ConsumerForm>) -> Reply {
    let Some(client_id) = header(&headers, CLIENT_ID_HEADER) else {
        return failure(StatusCode::UNAUTHORIZED, "You must provide a valid client application id.");
    };
    let Some(device_uuid) = input.device_uuid.filter(|v| !v.is_empty()) else {
        return failure(StatusCode::OK, "You must provide a device uuid.");
    };

    let consumer = Consumer {
        client_id: input.client_id.unwrap_or_else(|| client_id.to_string()),
        device_model: input.device_model,
        device_platform: input.device_platform,
        device_version: input.device_version,
        device_uuid,
        push_token: input.push_token,
        push_at: input.push_at.unwrap_or_else(|| "08:00:00".to_string()),
        push_lang: input.push_lang.unwrap_or_else(|| "eng".to_string()),
        time_zone: input.time_zone,
        receive_push: input.receive_push.as_deref().map(parse_flag).unwrap_or(0),
        api_key: Uuid::new_v4().simple().to_string(),
    };
    db.write().await.consumers.insert(consumer.api_key.clone(), consumer.clone());
    tracing::info!(device_uuid = %consumer.device_uuid, "consumer registered");

    let data = serde_json::to_value(&consumer).unwrap_or(Value::Null);
    success(
        StatusCode::CREATED,
        "Thank You! The consumer has been registered with our API.",
        data,
    )
}

async fn update_consumer(State(db): State<Db>, headers: HeaderMap, Form(input): Form<ConsumerForm>) -> Reply {
    let Some(api_key) = header(&headers, API_KEY_HEADER) else {
        return failure(StatusCode::UNAUTHORIZED, "You must provide a valid API key.");
    };
    let mut store = db.write().await;
    let Some(consumer) = store.consumers.get_mut(api_key) else {
        return failure(StatusCode::OK, "Invalid API key.");
    };

    // `api_key` is never updatable and is ignored.
    if let Some(v) = input.client_id {
        consumer.client_id = v;
    }
    if let Some(v) = input.device_model {
        consumer.device_model = Some(v);
    }
    if let Some(v) = input.device_platform {
        consumer.device_platform = Some(v);
    }
    if let Some(v) = input.device_version {
        consumer.device_version = Some(v);
    }
    if let Some(v) = input.device_uuid.filter(|v| !v.is_empty()) {
        consumer.device_uuid = v;
    }
    if let Some(v) = input.push_token {
        consumer.push_token = Some(v);
    }
    if let Some(v) = input.push_at {
        consumer.push_at = v;
    }
    if let Some(v) = input.push_lang {
        consumer.push_lang = v;
    }
    if let Some(v) = input.time_zone {
        consumer.time_zone = Some(v);
    }
    if let Some(v) = input.receive_push {
        consumer.receive_push = parse_flag(&v);
    }

    let data = serde_json::to_value(&*consumer).unwrap_or(Value::Null);
    success(StatusCode::OK, "Thank You! The consumer has been updated.", data)
}

async fn praying(State(db): State<Db>, Path(id): Path<String>, headers: HeaderMap) -> Reply {
    let Some(api_key) = header(&headers, API_KEY_HEADER) else {
        return failure(StatusCode::UNAUTHORIZED, "You must provide a valid API key.");
    };
    if !valid_prayer_id(&id) {
        return failure(StatusCode::NOT_FOUND, "The prayer request does not exist.");
    }
    let mut store = db.write().await;
    if !store.consumers.contains_key(api_key) {
        return failure(StatusCode::OK, "Invalid API key.");
    }

    store.prayers.push(Prayer {
        prayer_request_id: id.clone(),
        api_key: api_key.to_string(),
        prayed_on: chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string(),
    });
    tracing::info!(prayer = %id, "prayer recorded");
    success(StatusCode::OK, "Thank You! The consumer has indicated a prayer.", json!([]))
}

async fn prayer_stats(State(db): State<Db>, Path(id): Path<String>, headers: HeaderMap) -> Reply {
    if !valid_prayer_id(&id) {
        return failure(StatusCode::NOT_FOUND, "The prayer request does not exist.");
    }
    let store = db.read().await;
    let prayers: Vec<&Prayer> = store.prayers.iter().filter(|p| p.prayer_request_id == id).collect();
    let mut data = json!({
        "prayer_request_id": id,
        "total_prayers": prayers.len(),
    });

    if let Some(api_key) = header(&headers, API_KEY_HEADER) {
        if !store.consumers.contains_key(api_key) {
            return failure(StatusCode::OK, "Invalid API key.");
        }
        let mine: Vec<&Prayer> = prayers.iter().copied().filter(|p| p.api_key == api_key).collect();
        data["your_prayers"] = json!(mine.len());
        data["your_last_prayer_on"] = json!(mine.iter().map(|p| p.prayed_on.as_str()).max());
    } else if header(&headers, CLIENT_ID_HEADER).is_none() {
        return failure(StatusCode::UNAUTHORIZED, "You must provide an API key or client application id.");
    }

    success(
        StatusCode::OK,
        "Thank You! Attached is the data for the prayer request.",
        data,
    )
}
