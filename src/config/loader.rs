//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{MysqlConfig, ServerConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid environment variable {name}: '{value}'")]
    Env { name: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
///
/// MySQL settings are not read from the file; see [`load_mysql_from_env`].
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ServerConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Read the `MYSQL_*` variables from the process environment.
pub fn load_mysql_from_env() -> Result<MysqlConfig, ConfigError> {
    mysql_from_lookup(|name| std::env::var(name).ok())
}

/// Build MySQL settings from an arbitrary variable source.
///
/// Empty values count as unset. Numeric variables that are present but
/// unparseable are rejected.
pub fn mysql_from_lookup<F>(lookup: F) -> Result<MysqlConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    Ok(MysqlConfig {
        port: parse_var("MYSQL_PORT", get("MYSQL_PORT"))?,
        host: get("MYSQL_HOST"),
        user: get("MYSQL_USER"),
        password: get("MYSQL_PWD"),
        database: get("MYSQL_DATABASE"),
        conn_limit: parse_var("MYSQL_CONN_LIMIT", get("MYSQL_CONN_LIMIT"))?,
    })
}

fn parse_var<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
) -> Result<Option<T>, ConfigError> {
    match value {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Env { name, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_mysql_from_lookup() {
        let mysql = mysql_from_lookup(lookup(&[
            ("MYSQL_PORT", "3306"),
            ("MYSQL_HOST", "db.internal"),
            ("MYSQL_USER", "app"),
            ("MYSQL_PWD", "secret"),
            ("MYSQL_DATABASE", "main"),
            ("MYSQL_CONN_LIMIT", "10"),
        ]))
        .unwrap();

        assert_eq!(mysql.port, Some(3306));
        assert_eq!(mysql.host.as_deref(), Some("db.internal"));
        assert_eq!(mysql.password.as_deref(), Some("secret"));
        assert_eq!(mysql.conn_limit, Some(10));
    }

    #[test]
    fn test_mysql_missing_and_empty_vars() {
        let mysql = mysql_from_lookup(lookup(&[("MYSQL_HOST", "  ")])).unwrap();
        assert_eq!(mysql, MysqlConfig::default());
    }

    #[test]
    fn test_mysql_bad_port() {
        let err = mysql_from_lookup(lookup(&[("MYSQL_PORT", "abc")])).unwrap_err();
        match err {
            ConfigError::Env { name, value } => {
                assert_eq!(name, "MYSQL_PORT");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_config_rejects_invalid_file() {
        let path = std::env::temp_dir().join(format!("api-scaffold-{}.toml", uuid::Uuid::new_v4()));
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "[limits]\nmax_body_bytes = 0").unwrap();

        let result = load_config(&path);
        let _ = fs::remove_file(&path);

        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }
}
