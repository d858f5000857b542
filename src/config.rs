//! Application configuration
//!
//! Loaded from a TOML file (default `~/.config/ratebook/config.toml`).
//! Every section and field is optional; missing values take the defaults
//! below.
//!
//! ```toml
//! [server]
//! api_host = "0.0.0.0"
//! api_port = 8080
//!
//! [database]
//! url = "sqlite://./ratebook.db?mode=rwc"
//!
//! [database.pool]
//! max_connections = 10
//!
//! [logging]
//! level = "info"
//! format = "json"
//!
//! [security]
//! enabled = true
//! jwt_secret = "change-me"
//!
//! [resolver]
//! fixed_fee = 30.0
//! percentage = true
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::domain::FallbackTariff;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::infrastructure::DatabaseConfig;
use crate::shared::errors::ConfigError;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    /// Values of the default tariff returned when nothing matches
    pub resolver: FallbackTariff,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub api_host: String,
    pub api_port: u16,
    /// Seconds in-flight requests get to finish after a shutdown signal
    pub shutdown_timeout: u64,
    /// Install the Prometheus recorder and serve `/metrics`
    pub metrics_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0".to_string(),
            api_port: 8080,
            shutdown_timeout: 30,
            metrics_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Require a bearer JWT on `/api/v1`
    pub enabled: bool,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_expiration_hours: i64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            jwt_secret: String::new(),
            jwt_issuer: "ratebook".to_string(),
            jwt_expiration_hours: 24,
        }
    }
}

impl SecurityConfig {
    /// Token settings when the identity layer is enabled
    pub fn jwt_config(&self) -> Option<JwtConfig> {
        self.enabled.then(|| JwtConfig {
            secret: self.jwt_secret.clone(),
            expiration_hours: self.jwt_expiration_hours,
            issuer: self.jwt_issuer.clone(),
        })
    }
}

impl AppConfig {
    /// Read the file at `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`load`](Self::load), but a file that exists and cannot be read
    /// falls back to the defaults, returned next to the read error. Parse and
    /// validation failures stay fatal.
    pub fn load_or_default(path: &Path) -> Result<(Self, Option<ConfigError>), ConfigError> {
        match Self::load(path) {
            Ok(config) => Ok((config, None)),
            Err(e @ ConfigError::Io(_)) => Ok((Self::default(), Some(e))),
            Err(e) => Err(e),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.enabled && self.security.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "security.jwt_secret must be set when security.enabled = true".to_string(),
            ));
        }
        if !matches!(self.logging.format.to_lowercase().as_str(), "text" | "json") {
            return Err(ConfigError::Invalid(format!(
                "logging.format must be 'text' or 'json', got '{}'",
                self.logging.format
            )));
        }
        let f = &self.resolver;
        if f.weight_min >= f.weight_max || f.fixed_fee < 0.0 {
            return Err(ConfigError::Invalid(
                "resolver needs weight_min < weight_max and a non-negative fixed_fee".to_string(),
            ));
        }
        if self.database.pool.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.pool.max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// `~/.config/ratebook/config.toml`, or `./config.toml` without a home
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .map(|dir| dir.join("ratebook").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.api_port, 8080);
        assert_eq!(config.logging.format, "text");
        assert!(!config.security.enabled);
        assert_eq!(config.resolver, FallbackTariff::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn sections_override_fields() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            api_port = 9100

            [database]
            url = "sqlite://./test.db?mode=rwc"

            [database.pool]
            max_connections = 4

            [security]
            enabled = true
            jwt_secret = "s3cret"

            [resolver]
            name = "house rate"
            fixed_fee = 12.5
            "#,
        )
        .unwrap();

        assert_eq!(config.server.api_port, 9100);
        assert_eq!(config.server.api_host, "0.0.0.0");
        assert_eq!(config.database.pool.max_connections, 4);
        assert_eq!(config.database.pool.min_connections, 1);
        assert_eq!(config.resolver.name, "house rate");
        assert_eq!(config.resolver.fixed_fee, 12.5);
        assert_eq!(config.resolver.weight_max, 500.0);

        let jwt = config.security.jwt_config().unwrap();
        assert_eq!(jwt.secret, "s3cret");
        assert_eq!(jwt.issuer, "ratebook");
    }

    #[test]
    fn enabled_security_needs_secret() {
        let config: AppConfig = toml::from_str("[security]\nenabled = true\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn bad_toml_is_parse_error() {
        let name = format!("ratebook-config-{}", std::process::id());
        let dir = std::env::temp_dir().join(name);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "[server\napi_port = ").unwrap();

        assert!(matches!(AppConfig::load(&path), Err(ConfigError::Parse(_))));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn invalid_file_is_not_replaced_by_defaults() {
        let name = format!("ratebook-invalid-{}", std::process::id());
        let dir = std::env::temp_dir().join(name);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");

        std::fs::write(&path, "[security]\nenabled = true\n").unwrap();
        assert!(matches!(
            AppConfig::load_or_default(&path),
            Err(ConfigError::Invalid(_))
        ));

        std::fs::write(&path, "[resolver]\nweight_min = 10.0\nweight_max = 1.0\n").unwrap();
        assert!(matches!(
            AppConfig::load_or_default(&path),
            Err(ConfigError::Invalid(_))
        ));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn unreadable_file_falls_back_to_defaults() {
        // A directory exists but cannot be read as a file
        let name = format!("ratebook-unreadable-{}", std::process::id());
        let dir = std::env::temp_dir().join(name);
        std::fs::create_dir_all(&dir).unwrap();

        let (config, err) = AppConfig::load_or_default(&dir).unwrap();
        assert!(matches!(err, Some(ConfigError::Io(_))));
        assert!(!config.security.enabled);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = AppConfig::load(Path::new("/definitely/not/here/config.toml")).unwrap();
        assert_eq!(config.server.api_port, 8080);
    }
}
