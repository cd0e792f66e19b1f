use crate::handlers;
use crate::models::Envelope;
use actix_web::{error::InternalError, web, HttpResponse, Scope};

pub fn config() -> Scope {
    web::scope("/api")
        .app_data(query_config())
        .route("/health", web::get().to(handlers::health_check))
        .route("/search", web::get().to(handlers::search))
}

// Malformed query strings get the same envelope as other bad requests.
fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let response =
            HttpResponse::BadRequest().json(Envelope::failure(format!("Invalid request: {}", err)));
        InternalError::from_response(err, response).into()
    })
}
