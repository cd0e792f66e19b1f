use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::Value;
use thiserror::Error;

use crate::models::Envelope;

/// Failures reaching the place API or reading its reply.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream request timed out")]
    Timeout,

    #[error("upstream request failed: {0}")]
    Network(String),

    #[error("upstream returned HTTP {status}")]
    Status { status: u16 },

    #[error("upstream returned an unreadable body: {0}")]
    InvalidBody(String),
}

// The request URL carries the provider key, so it never reaches a message.
impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        if err.is_timeout() {
            UpstreamError::Timeout
        } else if err.is_decode() {
            UpstreamError::InvalidBody(err.to_string())
        } else if let Some(status) = err.status() {
            UpstreamError::Status {
                status: status.as_u16(),
            }
        } else {
            UpstreamError::Network(err.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Missing longitude or latitude")]
    MissingParameter,

    #[error("Invalid request: {0}")]
    InvalidParameter(String),

    #[error("Missing {0}")]
    MissingConfiguration(&'static str),

    #[error("Invalid upstream endpoint: {0}")]
    InvalidEndpoint(String),

    #[error(transparent)]
    UpstreamTransport(#[from] UpstreamError),

    #[error("{info}")]
    UpstreamRejected { info: String, raw: Value },
}

impl SearchError {
    pub fn envelope(&self) -> Envelope {
        let envelope = Envelope::failure(self.to_string());
        match self {
            SearchError::UpstreamRejected { raw, .. } => envelope.with_raw(raw.clone()),
            _ => envelope,
        }
    }
}

impl ResponseError for SearchError {
    fn status_code(&self) -> StatusCode {
        match self {
            SearchError::MissingParameter | SearchError::InvalidParameter(_) => {
                StatusCode::BAD_REQUEST
            }
            SearchError::MissingConfiguration(_)
            | SearchError::InvalidEndpoint(_)
            | SearchError::UpstreamTransport(_)
            | SearchError::UpstreamRejected { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.envelope())
    }
}
