use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

use crate::rate_limit::{DEFAULT_MAX_CLIENTS, DEFAULT_SUBMISSION_LIMIT, DEFAULT_TTL};

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub app: AppConfig,
}

impl ApiConfig {
    pub fn load() -> Result<Self> {
        let configured_path =
            std::env::var("DOORLOG_API_CONFIG").unwrap_or_else(|_| "config/api.toml".to_string());
        assert!(
            !configured_path.is_empty(),
            "Configuration path must be non-empty"
        );
        assert!(
            configured_path.len() < 4096,
            "Configuration path length exceeds hard limit"
        );

        let mut builder = Config::builder()
            .add_source(File::new(&configured_path, FileFormat::Toml).required(true));

        if let Ok(env_override) = std::env::var("DOORLOG_API_ENV") {
            if !env_override.is_empty() {
                let env_file = format!("config/api.{}.toml", env_override);
                if Path::new(&env_file).exists() {
                    builder = builder.add_source(File::new(&env_file, FileFormat::Toml));
                }
            }
        }

        // SMTP credentials come in through the environment, never the file:
        // DOORLOG__EMAIL__USERNAME, DOORLOG__EMAIL__PASSWORD, DOORLOG__EMAIL__TO
        builder = builder.add_source(Environment::with_prefix("DOORLOG").separator("__"));

        let settings = builder
            .build()
            .map_err(|err| map_config_error(err, &configured_path))?;
        let config: Self = settings
            .try_deserialize()
            .context("Failed to deserialize API configuration")?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        assert!(
            self.server.port > 0,
            "Server port must be greater than zero"
        );
        self.storage.ensure_bounds()?;
        self.rate_limit.ensure_bounds()?;
        self.email.ensure_bounds()?;
        self.app.ensure_bounds()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: Option<IpAddr>,
    pub port: u16,
}

impl ServerConfig {
    pub fn address(&self) -> SocketAddr {
        let host = self.host.unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert!(self.port != 0, "HTTP port cannot be zero");
        assert!(self.port < 65535, "HTTP port must be below 65535");
        SocketAddr::new(host, self.port)
    }
}

/// Which persistence backend gets wired in at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    File,
    Database,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    #[serde(default = "StorageConfig::default_data_dir")]
    pub data_dir: PathBuf,
    pub database: Option<DatabaseConfig>,
}

impl StorageConfig {
    fn ensure_bounds(&self) -> Result<()> {
        if self.backend == StorageBackend::Database {
            let database = self
                .database
                .as_ref()
                .context("Database backend selected but [storage.database] is missing")?;
            assert!(!database.url.is_empty(), "Database URL must be specified");
            assert!(
                database.max_connections >= database.min_connections.unwrap_or(1),
                "Max connections must be >= min connections"
            );
            assert!(
                database.max_connections <= 128,
                "Connection pool oversized"
            );
        }
        Ok(())
    }

    fn default_data_dir() -> PathBuf {
        PathBuf::from("data")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub max_submissions: u32,
    pub max_clients: usize,
    pub ttl_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_submissions: DEFAULT_SUBMISSION_LIMIT,
            max_clients: DEFAULT_MAX_CLIENTS,
            ttl_seconds: DEFAULT_TTL.as_secs(),
        }
    }
}

impl RateLimitConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    fn ensure_bounds(&self) -> Result<()> {
        assert!(self.max_submissions > 0, "Submission limit must be positive");
        assert!(self.max_clients > 0, "Client capacity must be positive");
        assert!(
            self.max_clients <= 1_000_000,
            "Client capacity exceeds defensive limit"
        );
        assert!(self.ttl_seconds > 0, "Rate limit TTL must be positive");
        assert!(
            self.ttl_seconds <= 7 * 86_400,
            "Rate limit TTL cannot exceed one week"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub to: Option<String>,
    pub from_name: String,
    pub timeout_seconds: u64,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            username: None,
            password: None,
            to: None,
            from_name: "Door Access System".to_string(),
            timeout_seconds: 20,
        }
    }
}

impl EmailConfig {
    pub fn timeout(&self) -> Duration {
        assert!(self.timeout_seconds >= 1, "SMTP timeout must be at least 1s");
        assert!(
            self.timeout_seconds <= 60,
            "SMTP timeout cannot exceed 60 seconds"
        );
        Duration::from_secs(self.timeout_seconds)
    }

    fn ensure_bounds(&self) -> Result<()> {
        assert!(!self.smtp_host.is_empty(), "SMTP host must be non-empty");
        assert!(self.smtp_port > 0, "SMTP port must be greater than zero");
        let _ = self.timeout();
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Public base URL used to build the viewer link in admin emails.
    pub base_url: String,
    /// Whole-hour UTC offset for all displayed timestamps.
    pub utc_offset_hours: i32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            utc_offset_hours: 9,
        }
    }
}

impl AppConfig {
    fn ensure_bounds(&self) -> Result<()> {
        assert!(!self.base_url.is_empty(), "Base URL must be non-empty");
        assert!(
            (-12..=14).contains(&self.utc_offset_hours),
            "UTC offset must be a real-world offset"
        );
        Ok(())
    }
}

fn map_config_error(err: ConfigError, path: &str) -> ConfigError {
    match err {
        ConfigError::NotFound(_) => ConfigError::NotFound(path.to_string()),
        other => other,
    }
}
