use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub catalog_api_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Zero disables the background refresh.
    pub catalog_refresh: Duration,
    pub upstream_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            catalog_api_url: require_env("CATALOG_API_URL")?,
            port: optional_env("PORT", 8080u16)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            catalog_refresh: Duration::from_secs(optional_env("CATALOG_REFRESH_SECS", 300)?),
            upstream_timeout: Duration::from_secs(optional_env("UPSTREAM_TIMEOUT_SECS", 30)?),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_env_falls_back_to_default() {
        let value: u64 = optional_env("TASKMATCH_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_optional_env_rejects_garbage() {
        std::env::set_var("TASKMATCH_TEST_BAD_PORT", "eighty");
        let result: Result<u16> = optional_env("TASKMATCH_TEST_BAD_PORT", 8080);
        std::env::remove_var("TASKMATCH_TEST_BAD_PORT");
        assert!(result.is_err());
    }
}
