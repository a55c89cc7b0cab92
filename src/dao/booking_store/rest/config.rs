use std::env;

/// Environment variable naming the PostgREST-style backend base URL.
pub const BACKEND_URL_ENV: &str = "TOUCHLINE_BACKEND_URL";
/// Environment variable holding the backend API key, if the deployment uses one.
pub const BACKEND_API_KEY_ENV: &str = "TOUCHLINE_BACKEND_API_KEY";

/// Connection settings for the REST booking store.
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// Base URL of the REST endpoint, without a trailing slash.
    pub base_url: String,
    /// Optional API key sent as both `apikey` and bearer token headers.
    pub api_key: Option<String>,
}

impl RestConfig {
    /// Read the configuration from the environment.
    ///
    /// Returns `None` when no backend URL is configured, which puts the
    /// application in no-backend mode.
    pub fn from_env() -> Option<Self> {
        let base_url = env::var(BACKEND_URL_ENV).ok().filter(|v| !v.is_empty())?;
        let api_key = env::var(BACKEND_API_KEY_ENV).ok().filter(|v| !v.is_empty());
        Some(Self { base_url, api_key })
    }
}
