//! Centralized configuration management for backoffice

use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Result, Context};

use crate::session::Session;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the remote API, without trailing slash
    pub api_url: String,
    /// Bearer token sent with every request (optional)
    pub api_token: Option<String>,
    /// Signed-in user
    pub user: UserConfig,
    /// HTTP client configuration
    pub http: HttpConfig,
    /// Directory where sample import templates are written
    pub sample_dir: PathBuf,
}

/// Identity of the current user
#[derive(Debug, Clone)]
pub struct UserConfig {
    pub id: String,
    pub role: String,
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
}

impl Config {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self> {
        let api_url = std::env::var("BACKOFFICE_API_URL")
            .unwrap_or_else(|_| "http://localhost:3000/api".to_string());

        let api_token = std::env::var("BACKOFFICE_API_TOKEN")
            .ok()
            .filter(|token| !token.is_empty());

        let user = UserConfig {
            id: std::env::var("BACKOFFICE_USER_ID").unwrap_or_else(|_| "anonymous".to_string()),
            role: std::env::var("BACKOFFICE_USER_ROLE").unwrap_or_else(|_| "user".to_string()),
        };

        let http = HttpConfig {
            timeout_seconds: parse_env_var("BACKOFFICE_HTTP_TIMEOUT_SECONDS")?.unwrap_or(30),
            user_agent: std::env::var("BACKOFFICE_USER_AGENT")
                .unwrap_or_else(|_| "backoffice/0.1.0".to_string()),
        };

        let sample_dir = std::env::var("BACKOFFICE_SAMPLE_DIR")
            .unwrap_or_else(|_| ".".to_string())
            .into();

        Ok(Config {
            api_url: api_url.trim_end_matches('/').to_string(),
            api_token,
            user,
            http,
            sample_dir,
        })
    }

    /// Override the API base URL
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    /// Session of the configured user
    pub fn session(&self) -> Session {
        Session::new(&self.user.id, &self.user.role)
    }

    /// Get HTTP timeout as Duration
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        reqwest::Url::parse(&self.api_url)
            .with_context(|| format!("Invalid BACKOFFICE_API_URL: {}", self.api_url))?;

        std::fs::create_dir_all(&self.sample_dir)
            .with_context(|| format!("Cannot create sample directory: {}", self.sample_dir.display()))?;

        Ok(())
    }
}

/// Helper function to parse environment variable as a specific type
fn parse_env_var<T>(var_name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display + Send + Sync + std::error::Error + 'static,
{
    match std::env::var(var_name) {
        Ok(val) => val.parse().map(Some).with_context(|| {
            format!("Failed to parse environment variable {} = '{}'", var_name, val)
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::from_env().unwrap();
        assert_eq!(config.api_url, "http://localhost:3000/api");
        assert_eq!(config.http.timeout_seconds, 30);
        assert_eq!(config.user.role, "user");
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_api_url_override_strips_trailing_slash() {
        let config = Config::from_env().unwrap().with_api_url("https://erp.example.com/api/");
        assert_eq!(config.api_url, "https://erp.example.com/api");
        config.validate().unwrap();
    }

    #[test]
    fn test_invalid_api_url_fails_validation() {
        let config = Config::from_env().unwrap().with_api_url("not a url");
        assert!(config.validate().is_err());
    }
}
