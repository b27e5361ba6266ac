//! Configuration loaded from environment variables.

use std::env;

use anyhow::{Context, Result};

/// Which storage backend to use for content items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Durable Postgres storage (default).
    Postgres,
    /// In-process storage. Single-instance only; nothing survives restart.
    Memory,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// Storage backend (default: postgres).
    pub storage: StorageBackend,

    /// PostgreSQL connection URL. Required when storage is postgres.
    pub database_url: Option<String>,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,

    /// Endpoint the regeneration pipeline listens on. When None,
    /// publication events are logged and dropped.
    pub regen_endpoint: Option<String>,

    /// Shared secret for signing regeneration event payloads.
    pub regen_secret: Option<String>,

    /// Preview token lifetime in seconds (default: 3600).
    pub preview_token_ttl_secs: i64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let storage = match env::var("STORAGE")
            .unwrap_or_else(|_| "postgres".to_string())
            .to_lowercase()
            .as_str()
        {
            "memory" => StorageBackend::Memory,
            "postgres" => StorageBackend::Postgres,
            other => anyhow::bail!("STORAGE must be 'postgres' or 'memory', got '{other}'"),
        };

        let database_url = env::var("DATABASE_URL").ok();
        if storage == StorageBackend::Postgres && database_url.is_none() {
            anyhow::bail!("DATABASE_URL environment variable is required for postgres storage");
        }

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_else(|_| vec!["*".to_string()]);

        let regen_endpoint = env::var("REGEN_ENDPOINT").ok().filter(|s| !s.is_empty());
        let regen_secret = env::var("REGEN_SECRET").ok().filter(|s| !s.is_empty());

        let preview_token_ttl_secs = env::var("PREVIEW_TOKEN_TTL_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .context("PREVIEW_TOKEN_TTL_SECS must be a valid integer")?;

        Ok(Self {
            port,
            storage,
            database_url,
            database_max_connections,
            cors_allowed_origins,
            regen_endpoint,
            regen_secret,
            preview_token_ttl_secs,
        })
    }
}
