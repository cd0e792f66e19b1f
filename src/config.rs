use serde::{Deserialize, Serialize};
use std::env;

use crate::models::MAX_RADIUS;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub search: SearchDefaults,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// AMap web service key. `None` makes every search fail with a 500.
    pub api_key: Option<String>,
    pub endpoint: String,
    pub timeout_ms: u64,
}

/// Values filled in when the inbound request leaves them out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchDefaults {
    pub radius: u32,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub allowed_origins: Vec<String>,
}

// Keeps the key out of log lines.
impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5732,
                workers: num_cpus::get(),
            },
            upstream: UpstreamConfig {
                api_key: None,
                endpoint: "https://restapi.amap.com/v3/place/around".to_string(),
                timeout_ms: 8000,
            },
            search: SearchDefaults {
                radius: 2000,
                category: None,
            },
            security: SecurityConfig {
                allowed_origins: vec!["*".to_string()],
            },
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        // Server configuration
        if let Some(host) = lookup("HOST") {
            config.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.server.port = port.parse()?;
        }
        if let Some(workers) = lookup("WORKERS") {
            config.server.workers = workers.parse()?;
        }

        // Upstream configuration
        config.upstream.api_key = lookup("AMAP_KEY")
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        if let Some(endpoint) = lookup("AMAP_ENDPOINT") {
            config.upstream.endpoint = endpoint;
        }
        if let Some(timeout_ms) = lookup("UPSTREAM_TIMEOUT_MS") {
            config.upstream.timeout_ms = timeout_ms.parse()?;
        }

        // Search defaults
        if let Some(radius) = lookup("DEFAULT_RADIUS") {
            config.search.radius = radius.parse()?;
            if config.search.radius > MAX_RADIUS {
                anyhow::bail!(
                    "DEFAULT_RADIUS must be at most {} meters, got {}",
                    MAX_RADIUS,
                    config.search.radius
                );
            }
        }
        config.search.category = lookup("DEFAULT_CATEGORY")
            .map(|category| category.trim().to_string())
            .filter(|category| !category.is_empty());

        // Security configuration
        if let Some(allowed_origins) = lookup("ALLOWED_ORIGINS") {
            config.security.allowed_origins = allowed_origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        Ok(config)
    }
}
