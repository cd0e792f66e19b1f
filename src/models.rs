use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError};

/// Largest radius, in meters, the place API accepts.
pub const MAX_RADIUS: u32 = 50_000;

/// Raw query string of `GET /api/search`.
///
/// Both naming conventions seen in front-end callers are accepted; the short
/// names win when a caller sends both.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub keywords: Option<String>,
    pub query: Option<String>,
    pub lng: Option<String>,
    pub longitude: Option<String>,
    pub lat: Option<String>,
    pub latitude: Option<String>,
    pub radius: Option<String>,
    pub category: Option<String>,
}

/// A search after alias resolution and defaulting.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct SearchParams {
    pub keywords: String,
    #[validate(custom = "validate_longitude")]
    pub lng: String,
    #[validate(custom = "validate_latitude")]
    pub lat: String,
    #[validate(range(max = "MAX_RADIUS"))]
    pub radius: u32,
    pub category: Option<String>,
}

fn validate_longitude(value: &str) -> Result<(), ValidationError> {
    validate_coordinate(value, 180.0, "longitude_out_of_range")
}

fn validate_latitude(value: &str) -> Result<(), ValidationError> {
    validate_coordinate(value, 90.0, "latitude_out_of_range")
}

fn validate_coordinate(value: &str, limit: f64, code: &'static str) -> Result<(), ValidationError> {
    match value.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() && parsed.abs() <= limit => Ok(()),
        Ok(_) => Err(ValidationError::new(code)),
        Err(_) => Err(ValidationError::new("not_a_number")),
    }
}

/// Body of every search response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub status: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
}

impl Envelope {
    pub fn success(data: Value) -> Self {
        Self {
            status: 1,
            data: Some(data),
            info: None,
            raw: None,
        }
    }

    pub fn failure(info: impl Into<String>) -> Self {
        Self {
            status: 0,
            data: None,
            info: Some(info.into()),
            raw: None,
        }
    }

    pub fn with_raw(mut self, raw: Value) -> Self {
        self.raw = Some(raw);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub upstream_configured: bool,
    pub uptime_seconds: u64,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}
