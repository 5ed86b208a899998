//! Runtime configuration
//!
//! Every knob can be overridden through `DTRACK_*` environment
//! variables with `__` separating nested keys, e.g.
//! `DTRACK_SERVER__PORT=9090` or `DTRACK_AUTH__JWT_SECRET=...`.

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Bind address in `host:port` form
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub root: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string; the in-memory backend is used when
    /// unset (or when the `postgres` feature is not compiled in).
    pub url: Option<String>,
}

impl AppConfig {
    /// Load configuration from defaults overlaid with environment
    /// variables.
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080_i64)?
            .set_default("server.request_timeout_secs", 30_i64)?
            .set_default("auth.jwt_secret", "insecure-dev-secret")?
            .set_default("auth.access_ttl_minutes", 60_i64)?
            .set_default("auth.refresh_ttl_days", 30_i64)?
            .set_default("storage.root", "storage/uploads")?
            .add_source(Environment::with_prefix("DTRACK").separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_load() {
        let config = AppConfig::load().unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.address(), "0.0.0.0:8080");
        assert_eq!(config.auth.access_ttl_minutes, 60);
        assert!(config.database.url.is_none());
    }
}
