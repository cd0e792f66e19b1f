use actix_web::{web, HttpResponse, ResponseError, Result};
use tracing::Instrument;
use uuid::Uuid;

use crate::models::{Envelope, SearchQuery};
use crate::services::search_nearby;
use crate::AppState;

pub async fn search(
    state: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse> {
    let span = tracing::info_span!("search", request_id = %Uuid::new_v4());

    let result = search_nearby(&query, &state.config, state.upstream.as_ref())
        .instrument(span.clone())
        .await;

    match result {
        Ok(payload) => Ok(HttpResponse::Ok().json(Envelope::success(payload))),
        Err(e) => {
            let status = e.status_code();
            let envelope = e.envelope();
            span.in_scope(|| {
                tracing::error!(
                    status = %status,
                    raw = ?envelope.raw,
                    "Search failed: {}",
                    e
                )
            });
            Ok(HttpResponse::build(status).json(envelope))
        }
    }
}
