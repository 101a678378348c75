//! Server configuration
//!
//! Every option can come from a command-line flag or the matching
//! environment variable; flags win.

use crate::storage::{Backend, DatabaseOptions};
use clap::{Args, Parser};
use qotd_core::{QotdError, Result};
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "qotd-server", version, about = "Quote of the day API server")]
pub struct Config {
    /// API server port
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Deployment environment reported by the health check
    #[arg(long, env = "ENVIRONMENT", default_value = "development")]
    pub environment: String,

    /// Path prefix for every route, e.g. `v1`
    #[arg(long, env = "API_VERSION", default_value = "v1")]
    pub api_version: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", default_value_t = false)]
    pub log_json: bool,

    #[command(flatten)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Args)]
pub struct StorageConfig {
    /// Database type (IN_MEMORY or SQLITE)
    #[arg(long = "db-type", env = "DB_TYPE", default_value = "IN_MEMORY")]
    pub db_type: String,

    /// SQLite DSN, e.g. `sqlite://data/qotd.db`
    #[arg(long = "db-dsn", env = "DB_DSN")]
    pub db_dsn: Option<String>,

    /// Upper bound on every database statement, in milliseconds
    #[arg(long = "db-query-timeout-ms", env = "DB_QUERY_TIMEOUT_MS", default_value_t = 3000)]
    pub query_timeout_ms: u64,

    #[arg(long = "db-max-connections", env = "DB_MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_type: "IN_MEMORY".to_string(),
            db_dsn: None,
            query_timeout_ms: 3000,
            max_connections: 5,
        }
    }
}

impl Config {
    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    pub fn route_prefix(&self) -> String {
        route_prefix(&self.api_version)
    }

    /// Reject option combinations that cannot start a server
    pub fn validate(&self) -> Result<()> {
        let backend = self.storage.backend()?;
        if backend == Backend::Sqlite {
            self.storage.dsn()?;
        }
        if self.storage.query_timeout_ms == 0 {
            return Err(QotdError::Config(
                "query timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Route prefix for an API version with surrounding slashes trimmed, e.g.
/// `/v1`. Empty when no version is configured.
pub fn route_prefix(api_version: &str) -> String {
    let version = api_version.trim_matches('/');
    if version.is_empty() {
        String::new()
    } else {
        format!("/{}", version)
    }
}

impl StorageConfig {
    pub fn backend(&self) -> Result<Backend> {
        self.db_type.parse()
    }

    pub fn dsn(&self) -> Result<&str> {
        self.db_dsn
            .as_deref()
            .filter(|dsn| !dsn.is_empty())
            .ok_or_else(|| {
                QotdError::Config("DSN must be provided for the SQLITE database type".to_string())
            })
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn database_options(&self) -> DatabaseOptions {
        DatabaseOptions {
            query_timeout: self.query_timeout(),
            max_connections: self.max_connections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["qotd-server"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_flags() {
        let config = parse(&[
            "--port",
            "9090",
            "--db-type",
            "SQLITE",
            "--db-dsn",
            "sqlite::memory:",
            "--db-query-timeout-ms",
            "250",
        ]);
        assert_eq!(config.port, 9090);
        assert_eq!(config.storage.backend().unwrap(), Backend::Sqlite);
        assert_eq!(config.storage.query_timeout(), Duration::from_millis(250));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unsupported_backend() {
        let config = parse(&["--db-type", "POSTGRES"]);
        assert!(matches!(
            config.validate(),
            Err(QotdError::BackendUnsupported(_))
        ));
    }

    #[test]
    fn test_sqlite_requires_dsn() {
        let config = parse(&["--db-type", "SQLITE"]);
        assert!(matches!(config.validate(), Err(QotdError::Config(_))));
    }

    #[test]
    fn test_route_prefix() {
        let mut config = parse(&[]);
        assert_eq!(config.route_prefix(), "/v1");
        config.api_version = "/v2/".to_string();
        assert_eq!(config.route_prefix(), "/v2");
        config.api_version = String::new();
        assert_eq!(config.route_prefix(), "");
    }
}
