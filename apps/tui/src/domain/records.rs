use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::{DataQuality, RadioType, SecurityClass, ViewMode};

/// One row of `/api/v1/access-points`: a radio aggregated across observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessPoint {
    #[serde(alias = "mac", alias = "bssid_mac")]
    pub bssid: String,
    #[serde(default, alias = "name", alias = "network_name")]
    pub ssid: Option<String>,
    #[serde(default, alias = "manuf", alias = "vendor")]
    pub manufacturer: Option<String>,
    #[serde(default, alias = "type", alias = "network_type")]
    pub radio_type: Option<String>,
    #[serde(default, alias = "freq")]
    pub frequency: Option<u32>,
    #[serde(default, alias = "encryption")]
    pub capabilities: Option<String>,
    #[serde(default, alias = "level")]
    pub signal: Option<i32>,
    #[serde(default, alias = "observation_count", alias = "obs_count")]
    pub observations: Option<u64>,
    #[serde(default, alias = "firstseen", alias = "first_time", deserialize_with = "flexible_timestamp")]
    pub first_seen: Option<DateTime<Utc>>,
    #[serde(default, alias = "lastseen", alias = "last_time", deserialize_with = "flexible_timestamp")]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(default, alias = "lat")]
    pub latitude: Option<f64>,
    #[serde(default, alias = "lon", alias = "lng")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub data_quality: Option<DataQuality>,
}

/// One row of `/api/v1/networks`: a single sighting of a radio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(alias = "mac", alias = "bssid_mac")]
    pub bssid: String,
    #[serde(default, alias = "name", alias = "network_name")]
    pub ssid: Option<String>,
    #[serde(default, alias = "type", alias = "network_type")]
    pub radio_type: Option<String>,
    #[serde(default, alias = "freq")]
    pub frequency: Option<u32>,
    #[serde(default, alias = "encryption")]
    pub capabilities: Option<String>,
    #[serde(default, alias = "level", alias = "rssi")]
    pub signal: Option<i32>,
    #[serde(default, alias = "time", alias = "timestamp", deserialize_with = "flexible_timestamp")]
    pub observed_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "lat")]
    pub latitude: Option<f64>,
    #[serde(default, alias = "lon", alias = "lng")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub altitude: Option<f64>,
    #[serde(default)]
    pub accuracy: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    AccessPoint(AccessPoint),
    Observation(Observation),
}

impl Record {
    pub const fn view_mode(&self) -> ViewMode {
        match self {
            Self::AccessPoint(_) => ViewMode::AccessPoints,
            Self::Observation(_) => ViewMode::Observations,
        }
    }

    pub fn bssid(&self) -> &str {
        match self {
            Self::AccessPoint(ap) => &ap.bssid,
            Self::Observation(obs) => &obs.bssid,
        }
    }

    pub fn ssid(&self) -> Option<&str> {
        match self {
            Self::AccessPoint(ap) => ap.ssid.as_deref(),
            Self::Observation(obs) => obs.ssid.as_deref(),
        }
    }

    pub const fn signal(&self) -> Option<i32> {
        match self {
            Self::AccessPoint(ap) => ap.signal,
            Self::Observation(obs) => obs.signal,
        }
    }

    pub const fn frequency(&self) -> Option<u32> {
        match self {
            Self::AccessPoint(ap) => ap.frequency,
            Self::Observation(obs) => obs.frequency,
        }
    }

    pub fn capabilities(&self) -> Option<&str> {
        match self {
            Self::AccessPoint(ap) => ap.capabilities.as_deref(),
            Self::Observation(obs) => obs.capabilities.as_deref(),
        }
    }

    pub fn radio_type(&self) -> RadioType {
        let type_text = match self {
            Self::AccessPoint(ap) => ap.radio_type.as_deref(),
            Self::Observation(obs) => obs.radio_type.as_deref(),
        };
        RadioType::infer(type_text, self.frequency())
    }

    pub fn security(&self) -> SecurityClass {
        SecurityClass::classify(self.capabilities().unwrap_or_default())
    }

    pub const fn coordinates(&self) -> (Option<f64>, Option<f64>) {
        match self {
            Self::AccessPoint(ap) => (ap.latitude, ap.longitude),
            Self::Observation(obs) => (obs.latitude, obs.longitude),
        }
    }

    /// Most recent time the radio was heard.
    pub const fn last_seen(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::AccessPoint(ap) => ap.last_seen,
            Self::Observation(obs) => obs.observed_at,
        }
    }

    pub const fn first_seen(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::AccessPoint(ap) => ap.first_seen,
            Self::Observation(obs) => obs.observed_at,
        }
    }

    /// Deserialize a backend row for the given view.
    pub fn from_json(view: ViewMode, value: serde_json::Value) -> Result<Self, serde_json::Error> {
        match view {
            ViewMode::AccessPoints => serde_json::from_value(value).map(Self::AccessPoint),
            ViewMode::Observations => serde_json::from_value(value).map(Self::Observation),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    Float(f64),
    Text(String),
}

/// Accepts RFC 3339 strings or Unix epoch milliseconds.
fn flexible_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawTimestamp>::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };

    let parsed = match raw {
        RawTimestamp::Millis(ms) => Utc.timestamp_millis_opt(ms).single(),
        #[allow(clippy::cast_possible_truncation)]
        RawTimestamp::Float(ms) => Utc.timestamp_millis_opt(ms as i64).single(),
        RawTimestamp::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            match text.parse::<i64>() {
                Ok(ms) => Utc.timestamp_millis_opt(ms).single(),
                Err(_) => DateTime::parse_from_rfc3339(text)
                    .map(|dt| dt.with_timezone(&Utc))
                    .ok(),
            }
        }
    };

    parsed
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom("invalid timestamp"))
}
