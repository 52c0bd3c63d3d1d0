use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::ServiceError;

const DEFAULT_CONFIG_FILE: &str = "reviewer-service.toml";
const CONFIG_PATH_VAR: &str = "REVIEWER_SERVICE_CONFIG";
const ENV_PREFIX: &str = "REVIEWER_SERVICE";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_retries: u32,
    pub retry_delay_secs: u64,
}

impl AppConfig {
    /// Defaults, then the TOML file named by `REVIEWER_SERVICE_CONFIG`
    /// (or `reviewer-service.toml`), then `REVIEWER_SERVICE_*` variables.
    pub fn load() -> Result<Self, ServiceError> {
        let path = env::var(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ServiceError> {
        let settings = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080_i64)?
            .set_default("database.url", "sqlite://reviewer-service.db")?
            .set_default("database.max_connections", 10_i64)?
            .set_default("database.connect_retries", 5_i64)?
            .set_default("database.retry_delay_secs", 2_i64)?
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.server.host.trim().is_empty() {
            return Err(ServiceError::Config("server.host must be set".to_string()));
        }
        if self.server.port == 0 {
            return Err(ServiceError::Config("server.port must be non-zero".to_string()));
        }
        if self.database.url.trim().is_empty() {
            return Err(ServiceError::Config("database.url must be set".to_string()));
        }
        if self.database.max_connections == 0 {
            return Err(ServiceError::Config(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_defaults_without_file() {
        let config = AppConfig::load_from(Path::new("/nonexistent/reviewer-service.toml")).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.connect_retries, 5);
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nport = 9090\n\n[database]\nurl = \"sqlite::memory:\"\nmax_connections = 1"
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.database.max_connections, 1);
    }

    #[test]
    fn test_validation_rejects_empty_pool() {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[database]\nmax_connections = 0").unwrap();

        let result = AppConfig::load_from(file.path());
        assert!(matches!(result, Err(ServiceError::Config(_))));
    }
}
