//! Connection settings and runtime environment.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{OrmError, OrmResult};

/// Environment variable holding the connection settings as a JSON document.
pub const CONNECTION_ENV: &str = "CORE_CONNECTION";

fn default_port() -> u16 {
    5432
}

fn default_pool_max_size() -> usize {
    16
}

/// PostgreSQL connection settings.
///
/// ```json
/// {"user": "app", "host": "localhost", "database": "core", "password": "secret", "port": 5432}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PgConfig {
    pub user: String,
    pub host: String,
    pub database: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: usize,
    /// Per-statement timeout for [`crate::DbConnector`]
    #[serde(default)]
    pub statement_timeout_ms: Option<u64>,
}

impl PgConfig {
    /// Read `CORE_CONNECTION`, loading `.env` first when present.
    pub fn from_env() -> OrmResult<Self> {
        // A missing .env file is fine; the variable may come from the process.
        let _ = dotenvy::dotenv();
        let raw = std::env::var(CONNECTION_ENV)
            .map_err(|_| OrmError::Config("PostgreSQL connection not found".to_string()))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> OrmResult<Self> {
        serde_json::from_str(raw)
            .map_err(|e| OrmError::Config(format!("invalid {CONNECTION_ENV} document: {e}")))
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> OrmResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            OrmError::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        toml::from_str(&raw).map_err(|e| {
            OrmError::Config(format!("failed to parse config file {}: {e}", path.display()))
        })
    }

    pub fn statement_timeout(&self) -> Option<Duration> {
        self.statement_timeout_ms.map(Duration::from_millis)
    }

    /// Driver-level configuration.
    pub fn to_pg_config(&self) -> tokio_postgres::Config {
        let mut cfg = tokio_postgres::Config::new();
        cfg.user(&self.user)
            .host(&self.host)
            .dbname(&self.database)
            .port(self.port);
        if let Some(password) = &self.password {
            cfg.password(password);
        }
        cfg
    }
}

/// Deployment environment, used to gate destructive test helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppEnv {
    #[default]
    Development,
    Test,
    Production,
}

impl AppEnv {
    /// `APP_ENV`, then `NODE_ENV`, defaulting to development.
    pub fn from_env() -> Self {
        std::env::var("APP_ENV")
            .or_else(|_| std::env::var("NODE_ENV"))
            .map(|v| Self::parse(&v))
            .unwrap_or_default()
    }

    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "test" => AppEnv::Test,
            "production" | "prod" => AppEnv::Production,
            _ => AppEnv::Development,
        }
    }

    pub fn is_test(self) -> bool {
        self == AppEnv::Test
    }
}
