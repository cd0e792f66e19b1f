use actix_web::{middleware::Logger, web, App, HttpServer};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use poi_search_proxy::config::Config;
use poi_search_proxy::handlers::not_found;
use poi_search_proxy::middleware::build_cors;
use poi_search_proxy::routes::api;
use poi_search_proxy::services::HttpUpstream;
use poi_search_proxy::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(config) => {
            info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if config.upstream.api_key.is_none() {
        warn!("AMAP_KEY is not set; every search will fail until it is configured");
    }

    let upstream = match HttpUpstream::new(Duration::from_millis(config.upstream.timeout_ms)) {
        Ok(upstream) => upstream,
        Err(e) => {
            error!("Failed to build upstream HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Starting POI search proxy on port {} (upstream {:?})",
        config.server.port, config.upstream
    );

    let state = AppState {
        config: config.clone(),
        upstream: Arc::new(upstream),
        start_time: Instant::now(),
    };

    // Create HTTP server
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(build_cors(&state.config.security))
            .wrap(Logger::default())
            .service(api::config())
            .default_service(web::route().to(not_found))
    })
    .bind(format!("{}:{}", config.server.host, config.server.port))?;

    info!(
        "Server started successfully at http://{}:{}",
        config.server.host, config.server.port
    );

    // Run the server
    server.workers(config.server.workers).run().await
}
