use crate::LiloError;
use secrecy::SecretString;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub base_url: String,
    pub api_token: Option<SecretString>,
    pub max_retries: u32,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, LiloError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function, so tests never touch the process environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, LiloError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let base_url = get("LILO_BASE_URL")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "http://localhost:1337".into());
        let api_token = get("LILO_API_TOKEN")
            .filter(|s| !s.trim().is_empty())
            .map(|t| SecretString::new(t.into()));
        let max_retries = parse_or("LILO_MAX_RETRIES", get("LILO_MAX_RETRIES"), 3)?;
        let timeout_secs = parse_or("LILO_TIMEOUT_SECS", get("LILO_TIMEOUT_SECS"), 10u64)?;
        Ok(Self {
            base_url,
            api_token,
            max_retries,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T, LiloError> {
    match raw {
        None => Ok(default),
        Some(s) => s
            .trim()
            .parse()
            .map_err(|_| LiloError::Config(format!("{key} must be a non-negative integer, got {s:?}"))),
    }
}
