//! Startup orchestration.
//!
//! # Responsibilities
//! - Load configuration from a file, or fall back to defaults
//! - Apply command-line overrides and validate the result
//! - Overlay the `MYSQL_*` settings from the environment
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - `.env` is honoured but never overrides variables already set

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::config::validation::validate_config;
use crate::config::{load_config, load_mysql_from_env, ConfigError, MysqlConfig, ServerConfig};

/// Startup inputs gathered from the command line.
#[derive(Debug, Clone, Default)]
pub struct StartupOptions {
    pub config_path: Option<PathBuf>,
    pub port: Option<u16>,
}

/// Build the validated runtime configuration from the process environment.
pub fn prepare_config(options: &StartupOptions) -> Result<ServerConfig, ConfigError> {
    let _ = dotenvy::dotenv();
    prepare_config_with(options, load_mysql_from_env)
}

/// Build the validated runtime configuration with MySQL settings from `mysql`.
pub fn prepare_config_with<F>(options: &StartupOptions, mysql: F) -> Result<ServerConfig, ConfigError>
where
    F: FnOnce() -> Result<MysqlConfig, ConfigError>,
{
    let mut config = match &options.config_path {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };

    if let Some(port) = options.port {
        config.listener.bind_address = with_port(&config.listener.bind_address, port);
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    config.mysql = mysql()?;

    Ok(config)
}

fn with_port(bind_address: &str, port: u16) -> String {
    match bind_address.parse::<SocketAddr>() {
        Ok(mut addr) => {
            addr.set_port(port);
            addr.to_string()
        }
        Err(_) => format!("0.0.0.0:{}", port),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_override() {
        assert_eq!(with_port("0.0.0.0:8080", 9000), "0.0.0.0:9000");
        assert_eq!(with_port("127.0.0.1:1", 3000), "127.0.0.1:3000");
        assert_eq!(with_port("garbage", 3000), "0.0.0.0:3000");
    }

    use crate::config::loader::mysql_from_lookup;

    fn no_env() -> Result<MysqlConfig, ConfigError> {
        mysql_from_lookup(|_| None)
    }

    #[test]
    fn test_defaults_without_file() {
        let options = StartupOptions {
            config_path: None,
            port: Some(8181),
        };
        let config = prepare_config_with(&options, no_env).unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8181");
        assert_eq!(config.rate_limit.max_requests, 100);
        assert_eq!(config.mysql.port, None);
    }

    #[test]
    fn test_mysql_overlay_from_lookup() {
        let lookup = |name: &str| match name {
            "MYSQL_HOST" => Some("db.internal".to_string()),
            "MYSQL_PORT" => Some("3307".to_string()),
            _ => None,
        };
        let config = prepare_config_with(&StartupOptions::default(), || mysql_from_lookup(lookup)).unwrap();
        assert_eq!(config.mysql.host.as_deref(), Some("db.internal"));
        assert_eq!(config.mysql.port, Some(3307));
    }

    #[test]
    fn test_bad_mysql_port_rejected() {
        let lookup = |name: &str| (name == "MYSQL_PORT").then(|| "not-a-port".to_string());
        let err = prepare_config_with(&StartupOptions::default(), || mysql_from_lookup(lookup)).unwrap_err();
        assert!(matches!(err, ConfigError::Env { name: "MYSQL_PORT", .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let options = StartupOptions {
            config_path: Some(PathBuf::from("/definitely/not/here.toml")),
            port: None,
        };
        let err = prepare_config_with(&options, no_env).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
