//! Prayer identifiers, praying, and prayer stats.
//!
//! # Design
//! A prayer is identified by its calendar day as `MM-DD`. There is no year,
//! so February always allows 29 days. Only upper bounds are checked: `00-00`
//! passes validation and is left for the server to reject.

use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::error::ApiError;
use crate::http::RequestOptions;
use crate::transport::Transport;
use crate::types::{Authorization, KeyType, PrayerId, PrayerStats, API_KEY_HEADER};

static PRAYER_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{2}-[0-9]{2}$").expect("prayer id pattern is valid"));

#[derive(Clone)]
pub struct PrayerService {
    transport: Arc<dyn Transport>,
}

impl PrayerService {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Whether `prayer` is `MM-DD` with the month and day under their limits.
    pub fn validate(&self, prayer: &PrayerId) -> bool {
        if !PRAYER_ID_PATTERN.is_match(prayer.as_str()) {
            return false;
        }
        let Some((month, day)) = prayer.as_str().split_once('-') else {
            return false;
        };
        match (month.parse::<u32>(), day.parse::<u32>()) {
            (Ok(month), Ok(day)) => valid_month(month) && valid_day(month, day),
            _ => false,
        }
    }

    /// Tell the API the consumer holding `api_key` is praying for `prayer`.
    #[tracing::instrument(skip_all, level = "debug", fields(prayer = %prayer))]
    pub fn praying(&self, api_key: &str, prayer: &PrayerId) -> Result<bool, ApiError> {
        let options = RequestOptions::new().header(API_KEY_HEADER, api_key);
        let envelope = self.transport.post(&format!("/prayers/{prayer}/praying"), &options)?;
        if !envelope.is_success() {
            tracing::warn!(message = %envelope.error_message(), "praying was not recorded");
        }
        Ok(envelope.is_success())
    }

    /// Fetch the stats for `prayer`. Consumers get their own counts as
    /// well as the totals; clients get the totals only.
    #[tracing::instrument(skip_all, level = "debug", fields(prayer = %prayer, key_type = %key_type))]
    pub fn prayer_stats(
        &self,
        authorize_key: &str,
        key_type: KeyType,
        prayer: &PrayerId,
    ) -> Result<PrayerStats, ApiError> {
        let auth = Authorization::new(key_type, authorize_key);
        let (name, value) = auth.header();
        let options = RequestOptions::new().header(name, value);
        let envelope = self.transport.get(&format!("/prayers/{prayer}"), &options)?;
        envelope.into_data()
    }
}

fn valid_month(month: u32) -> bool {
    month <= 12
}

fn valid_day(month: u32, day: u32) -> bool {
    let total_days = match month {
        4 | 6 | 9 | 11 => 30,
        2 => 29,
        _ => 31,
    };
    day <= total_days
}
