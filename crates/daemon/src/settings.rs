//! Server configuration
//!
//! Sources, lowest precedence first: built-in defaults, an optional
//! `qprint.toml` in the working directory, then `QPRINT_*` environment
//! variables (a `.env` file is loaded into the environment beforehand).

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use qprint_core::error::{AppError, Result};
use serde::Deserialize;

const CONFIG_FILE: &str = "qprint.toml";
const ENV_PREFIX: &str = "QPRINT";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE_URL: &str = "~/.qprint/qprint.db";
const DEFAULT_UPLOAD_DIR: &str = "~/.qprint/uploads";
const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
const DEFAULT_SESSION_TTL_HOURS: u64 = 24;
const DEFAULT_REAPER_INTERVAL_SECS: u64 = 300;
const DEFAULT_MAX_DB_CONNECTIONS: u32 = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: u64,
    pub session_ttl_hours: u64,
    pub reaper_interval_secs: u64,
    pub max_db_connections: u32,
}

impl ServerConfig {
    /// Load, tilde-expand and validate the configuration
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let settings = Config::builder()
            .set_default("host", DEFAULT_HOST)
            .and_then(|b| b.set_default("port", i64::from(DEFAULT_PORT)))
            .and_then(|b| b.set_default("database_url", DEFAULT_DATABASE_URL))
            .and_then(|b| b.set_default("upload_dir", DEFAULT_UPLOAD_DIR))
            .and_then(|b| b.set_default("max_upload_bytes", DEFAULT_MAX_UPLOAD_BYTES as i64))
            .and_then(|b| b.set_default("session_ttl_hours", DEFAULT_SESSION_TTL_HOURS as i64))
            .and_then(|b| b.set_default("reaper_interval_secs", DEFAULT_REAPER_INTERVAL_SECS as i64))
            .and_then(|b| b.set_default("max_db_connections", i64::from(DEFAULT_MAX_DB_CONNECTIONS)))
            .map_err(config_error)?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .map_err(config_error)?;

        let config: ServerConfig = settings.try_deserialize().map_err(config_error)?;
        let config = config.expanded();
        config.validate()?;
        Ok(config)
    }

    /// Expand a leading `~` in the storage paths
    fn expanded(mut self) -> Self {
        self.database_url = expand_database_url(&self.database_url);
        let upload_dir = self.upload_dir.to_string_lossy().into_owned();
        self.upload_dir = PathBuf::from(shellexpand::tilde(&upload_dir).into_owned());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(AppError::Config("host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(AppError::Config("port must be non-zero".to_string()));
        }
        if self.database_url.trim().is_empty() {
            return Err(AppError::Config("database_url must not be empty".to_string()));
        }
        if self.upload_dir.as_os_str().is_empty() {
            return Err(AppError::Config("upload_dir must not be empty".to_string()));
        }
        if self.max_upload_bytes == 0 || usize::try_from(self.max_upload_bytes).is_err() {
            return Err(AppError::Config(
                "max_upload_bytes must be a positive size".to_string(),
            ));
        }
        if self.session_ttl_hours == 0 {
            return Err(AppError::Config("session_ttl_hours must be positive".to_string()));
        }
        if self.reaper_interval_secs == 0 {
            return Err(AppError::Config(
                "reaper_interval_secs must be positive".to_string(),
            ));
        }
        if self.max_db_connections == 0 {
            return Err(AppError::Config(
                "max_db_connections must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn max_upload_bytes(&self) -> usize {
        usize::try_from(self.max_upload_bytes).unwrap_or(usize::MAX)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_hours * 3600)
    }

    pub fn reaper_interval(&self) -> Duration {
        Duration::from_secs(self.reaper_interval_secs)
    }

    /// Filesystem path of the database file, if the URL names one
    pub fn database_path(&self) -> Option<&Path> {
        let path = self
            .database_url
            .strip_prefix("sqlite://")
            .or_else(|| self.database_url.strip_prefix("sqlite:"))
            .unwrap_or(&self.database_url);
        let path = path.split('?').next().unwrap_or(path);
        (!path.is_empty() && !path.contains(":memory:")).then(|| Path::new(path))
    }
}

fn config_error(err: config::ConfigError) -> AppError {
    AppError::Config(err.to_string())
}

fn expand_database_url(url: &str) -> String {
    for prefix in ["sqlite://", "sqlite:"] {
        if let Some(rest) = url.strip_prefix(prefix) {
            return format!("{}{}", prefix, shellexpand::tilde(rest));
        }
    }
    shellexpand::tilde(url).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ServerConfig {
        ServerConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_url: "/tmp/qprint/qprint.db".to_string(),
            upload_dir: PathBuf::from("/tmp/qprint/uploads"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
            reaper_interval_secs: DEFAULT_REAPER_INTERVAL_SECS,
            max_db_connections: DEFAULT_MAX_DB_CONNECTIONS,
        }
    }

    #[test]
    fn test_valid_config() {
        let config = sample();
        assert!(config.validate().is_ok());
        assert_eq!(config.session_ttl(), Duration::from_secs(24 * 3600));
        assert_eq!(config.max_upload_bytes(), 10 * 1024 * 1024);
    }

    #[test]
    fn test_rejects_zero_limits() {
        let mut config = sample();
        config.port = 0;
        assert!(matches!(config.validate(), Err(AppError::Config(_))));

        let mut config = sample();
        config.max_upload_bytes = 0;
        assert!(config.validate().is_err());

        let mut config = sample();
        config.reaper_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_database_path() {
        let mut config = sample();
        assert_eq!(config.database_path(), Some(Path::new("/tmp/qprint/qprint.db")));

        config.database_url = "sqlite:///var/lib/qprint.db?mode=rwc".to_string();
        assert_eq!(config.database_path(), Some(Path::new("/var/lib/qprint.db")));

        config.database_url = "sqlite::memory:".to_string();
        assert_eq!(config.database_path(), None);
    }

    #[test]
    fn test_tilde_expansion() {
        let expanded = expand_database_url("sqlite:~/q.db");
        assert!(expanded.starts_with("sqlite:"));
        assert!(!expanded.contains('~') || std::env::var("HOME").is_err());
    }
}
