//! Service configuration
//!
//! Values are layered: built-in defaults, then an optional configuration
//! file, then `PROFILE_*` environment variables. Nested keys use a double
//! underscore, e.g. `PROFILE_DATABASE__URL` or `PROFILE_MESSAGING__TAGS_QUEUE`.

use common::database::{DatabaseConfig, redact_url};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::{messaging::MessagingConfig, object_store::ObjectStorageConfig};

/// Environment variable naming the configuration file
pub const CONFIG_FILE_ENV: &str = "PROFILE_CONFIG";

const DEFAULT_CONFIG_FILE: &str = "config";

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

/// Complete service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub object_storage: ObjectStorageConfig,
    pub messaging: MessagingConfig,
    pub logging: LoggingConfig,
    pub cors: CorsConfig,
}

impl Settings {
    /// Load settings from the file named by `PROFILE_CONFIG` (or `config.*`)
    /// and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let file =
            std::env::var(CONFIG_FILE_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::from_sources(&file)
    }

    /// Load settings from a specific file (which may be missing) and the environment
    pub fn from_sources(file: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::with_name(file).required(false))
            .add_source(
                Environment::with_prefix("PROFILE")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Reject settings the service cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid =
            |msg: &str| -> Result<(), ConfigError> { Err(ConfigError::Message(msg.to_string())) };

        if self.server.port == 0 {
            return invalid("server.port must be non-zero");
        }
        if self.database.url.is_empty() {
            return invalid("database.url is required");
        }
        if self.messaging.url.is_empty() {
            return invalid("messaging.url is required");
        }

        let queues = [
            &self.messaging.tags_queue,
            &self.messaging.photos_queue,
            &self.messaging.ankets_queue,
        ];
        if queues.iter().any(|queue| queue.is_empty()) {
            return invalid("queue names must not be empty");
        }
        if queues[0] == queues[1] || queues[0] == queues[2] || queues[1] == queues[2] {
            return invalid("queue names must be distinct");
        }
        if self.messaging.publish_timeout_ms == 0 {
            return invalid("messaging.publish_timeout_ms must be non-zero");
        }

        if self.object_storage.endpoint.is_empty() || self.object_storage.bucket.is_empty() {
            return invalid("object_storage.endpoint and object_storage.bucket are required");
        }
        if self.object_storage.url_expiry_seconds == 0 {
            return invalid("object_storage.url_expiry_seconds must be non-zero");
        }

        Ok(())
    }

    /// One-line description without credentials
    pub fn summary(&self) -> String {
        format!(
            "listen={} database={} broker={} storage={}/{}",
            self.server.address(),
            self.database.redacted_url(),
            redact_url(&self.messaging.url),
            self.object_storage.endpoint,
            self.object_storage.bucket,
        )
    }
}
