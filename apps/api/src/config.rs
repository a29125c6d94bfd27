use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Loaded once at startup; missing required variables fail fast.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub openai_api_key: String,
    /// Per-call provider timeout in seconds.
    pub openai_timeout_secs: f64,
    /// Total attempt count for retriable provider failures.
    pub openai_max_retries: u32,
    pub openai_backoff_min_secs: f64,
    pub openai_backoff_max_secs: f64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_timeout_secs: parse_env("OPENAI_TIMEOUT_SECS", 15.0)?,
            openai_max_retries: parse_env("OPENAI_MAX_RETRIES", 4)?,
            openai_backoff_min_secs: parse_env("OPENAI_BACKOFF_MIN_SECS", 0.5)?,
            openai_backoff_max_secs: parse_env("OPENAI_BACKOFF_MAX_SECS", 4.0)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("'{key}' has an invalid value")),
        Err(_) => Ok(default),
    }
}
