//! Configuration management for the luggage pickup booking platform
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with LUGGAGE_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT authentication configuration
    pub jwt: JwtConfig,

    /// Completion image storage
    pub uploads: UploadsConfig,

    /// Admin realtime notifications
    pub notifications: NotificationsConfig,

    /// Initial super admin account
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

/// Which Data Store implementation backs the server
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub backend: StorageBackend,

    /// PostgreSQL connection URL (unused by the memory backend)
    #[serde(default)]
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret key for signing JWT tokens
    pub secret: String,

    /// Admin token expiration in seconds
    pub admin_token_expiry: i64,

    /// Driver token expiration in seconds
    pub driver_token_expiry: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadsConfig {
    /// Directory completion images are written to
    pub dir: String,

    /// URL prefix the directory is served under
    pub public_path: String,

    /// Maximum images per completion
    pub max_images: usize,

    /// Maximum size of one image in bytes
    pub max_image_bytes: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationsConfig {
    /// Events buffered per admin subscriber before it starts lagging
    pub channel_capacity: usize,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct BootstrapConfig {
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub admin_name: Option<String>,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("LUGGAGE_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 5000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.backend", "postgres")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("jwt.admin_token_expiry", 86400)?
            .set_default("jwt.driver_token_expiry", 2592000)?
            .set_default("uploads.dir", "uploads")?
            .set_default("uploads.public_path", "/uploads")?
            .set_default("uploads.max_images", 5)?
            .set_default("uploads.max_image_bytes", 5 * 1024 * 1024)?
            .set_default("notifications.channel_capacity", 256)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (LUGGAGE_ prefix)
            .add_source(
                Environment::with_prefix("LUGGAGE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Configuration for tests and local runs without external services
    pub fn in_memory(jwt_secret: &str, uploads_dir: &str) -> Self {
        Self {
            environment: "test".to_string(),
            server: ServerConfig::default(),
            database: DatabaseConfig {
                backend: StorageBackend::Memory,
                url: String::new(),
                max_connections: 1,
                min_connections: 1,
            },
            jwt: JwtConfig {
                secret: jwt_secret.to_string(),
                admin_token_expiry: 3600,
                driver_token_expiry: 3600,
            },
            uploads: UploadsConfig {
                dir: uploads_dir.to_string(),
                public_path: "/uploads".to_string(),
                max_images: shared::MAX_COMPLETION_IMAGES,
                max_image_bytes: 5 * 1024 * 1024,
            },
            notifications: NotificationsConfig {
                channel_capacity: 64,
            },
            bootstrap: BootstrapConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            host: "0.0.0.0".to_string(),
        }
    }
}
