use actix_web::{web, HttpResponse, Result};
use chrono::Utc;

use crate::models::{Envelope, HealthResponse};
use crate::AppState;

pub async fn health_check(state: web::Data<AppState>) -> Result<HttpResponse> {
    let upstream_configured = state.config.upstream.api_key.is_some();

    let response = HealthResponse {
        status: if upstream_configured { "healthy" } else { "misconfigured" }.to_string(),
        upstream_configured,
        uptime_seconds: state.start_time.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    };

    Ok(HttpResponse::Ok().json(response))
}

pub async fn not_found() -> Result<HttpResponse> {
    Ok(HttpResponse::NotFound().json(Envelope::failure("Endpoint not found")))
}
