//! Caller-side client for `GET /api/search`.
//!
//! Only the fields a caller sets are sent; the proxy fills in its own
//! defaults for the rest.

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Address of the deployed proxy.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5732";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("search request failed with HTTP status {0}")]
    Status(u16),

    #[error("search request could not be sent: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("search response is not valid JSON: {0}")]
    Parse(String),
}

/// Parameters for a nearby search, serialized in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PoiQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl PoiQuery {
    pub fn near(lng: impl Into<String>, lat: impl Into<String>) -> Self {
        Self {
            lng: Some(lng.into()),
            lat: Some(lat.into()),
            ..Self::default()
        }
    }

    pub fn keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = Some(keywords.into());
        self
    }

    pub fn radius(mut self, radius: u32) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

#[derive(Clone)]
pub struct SearchClient {
    client: Client,
    base_url: String,
}

impl Default for SearchClient {
    fn default() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }
}

impl SearchClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Runs a search and returns the proxy's JSON body untouched.
    pub async fn search_poi(&self, query: &PoiQuery) -> Result<Value, ClientError> {
        let url = format!("{}/api/search", self.base_url);
        let resp = self.client.get(&url).query(query).send().await?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), url = %url, "search_poi: proxy returned an error");
            return Err(ClientError::Status(status.as_u16()));
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| ClientError::Parse(e.to_string()))
    }
}
