pub mod client;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;
use std::time::Instant;

use config::Config;
use services::UpstreamClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub upstream: Arc<dyn UpstreamClient>,
    pub start_time: Instant,
}
