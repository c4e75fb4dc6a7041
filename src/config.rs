use std::env;
use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
const DEFAULT_MAX_UPLOAD_FILES: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Deployment flavour. Controls token lifetimes and cookie hardening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub server_port: u16,
    pub server_host: String,
    pub environment: Environment,
    pub jwt_secret: String,
    pub jwt_refresh_secret: String,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_days: i64,
    pub upload_dir: PathBuf,
    pub upload_max_bytes: usize,
    pub upload_max_files: usize,
    pub upload_allowed_types: Vec<String>,
    pub run_migrations: bool,
    pub cors_allowed_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));

        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") => Environment::Production,
            Some("development") | None => Environment::Development,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "APP_ENV",
                    value: other.to_string(),
                })
            }
        };

        // 15 minutes in production; effectively session-long while developing.
        let default_access_ttl = if environment.is_production() {
            15
        } else {
            500 * 60
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            server_port: parse_or(&lookup, "SERVER_PORT", 8080)?,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            environment,
            jwt_secret: required("JWT_SECRET")?,
            jwt_refresh_secret: required("JWT_REFRESH_SECRET")?,
            access_token_ttl_minutes: parse_or(
                &lookup,
                "ACCESS_TOKEN_TTL_MINUTES",
                default_access_ttl,
            )?,
            refresh_token_ttl_days: parse_or(&lookup, "REFRESH_TOKEN_TTL_DAYS", 7)?,
            upload_dir: lookup("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public/uploads")),
            upload_max_bytes: parse_or(&lookup, "UPLOAD_MAX_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            upload_max_files: parse_or(&lookup, "UPLOAD_MAX_FILES", DEFAULT_MAX_UPLOAD_FILES)?,
            upload_allowed_types: lookup("UPLOAD_ALLOWED_TYPES")
                .map(|raw| {
                    raw.split(',')
                        .map(|t| t.trim().to_lowercase())
                        .filter(|t| !t.is_empty())
                        .collect()
                })
                .unwrap_or_else(|| vec!["image".to_string(), "video".to_string()]),
            run_migrations: parse_or(&lookup, "RUN_MIGRATIONS", true)?,
            cors_allowed_origin: lookup("CORS_ALLOWED_ORIGIN"),
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("DATABASE_URL", "postgres://test"),
        ("JWT_SECRET", "access-secret"),
        ("JWT_REFRESH_SECRET", "refresh-secret"),
    ];

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup_from(&REQUIRED)).unwrap();

        assert_eq!(config.database_url, "postgres://test");
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.server_host, "127.0.0.1");
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.access_token_ttl_minutes, 30_000);
        assert_eq!(config.refresh_token_ttl_days, 7);
        assert_eq!(config.upload_max_bytes, 5 * 1024 * 1024);
        assert_eq!(config.upload_max_files, 10);
        assert_eq!(config.upload_allowed_types, vec!["image", "video"]);
        assert!(config.run_migrations);
        assert_eq!(config.server_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_production_shortens_access_tokens() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("APP_ENV", "production"));
        pairs.push(("SERVER_PORT", "3000"));
        pairs.push(("UPLOAD_ALLOWED_TYPES", "image, application "));

        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();

        assert!(config.environment.is_production());
        assert_eq!(config.access_token_ttl_minutes, 15);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.upload_allowed_types, vec!["image", "application"]);
    }

    #[test]
    fn test_missing_and_invalid_values() {
        let err = Config::from_lookup(lookup_from(&REQUIRED[..1])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("JWT_SECRET"));

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SERVER_PORT", "eighty"));
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "SERVER_PORT",
                value: "eighty".into()
            }
        );
    }
}
