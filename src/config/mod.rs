use std::time::Duration;

use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;

/// How new images picked in the project form reach the webhooks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoMode {
    /// Embed images in the payload as Base64 data URLs
    Inline,
    /// Push images to the image-hosting webhook and send their URLs
    Upload,
}

/// Configuration for the application
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Listing endpoint (GET, JSON array of projects)
    #[serde(default = "default_list_url")]
    pub list_url: String,
    /// Create endpoint (POST JSON)
    #[serde(default = "default_create_url")]
    pub create_url: String,
    /// Update endpoint (POST JSON)
    #[serde(default = "default_update_url")]
    pub update_url: String,
    /// Delete endpoint (GET with `id` query parameter)
    #[serde(default = "default_delete_url")]
    pub delete_url: String,
    /// Base URL of the image-hosting webhooks
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,
    #[serde(default = "default_photo_mode")]
    pub photo_mode: PhotoMode,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Where tracing output goes while the dashboard owns the terminal
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

fn default_list_url() -> String {
    "https://getall.asayman669.workers.dev".to_string()
}

fn default_create_url() -> String {
    "https://post.asayman669.workers.dev/".to_string()
}

fn default_update_url() -> String {
    "https://patch.asayman669.workers.dev/".to_string()
}

fn default_delete_url() -> String {
    "https://delete.asayman669.workers.dev/".to_string()
}

fn default_image_base_url() -> String {
    "https://tahmidn8n.solven.app".to_string()
}

fn default_photo_mode() -> PhotoMode {
    PhotoMode::Inline
}

fn default_max_retries() -> u32 {
    5
}

fn default_retry_delay_ms() -> u64 {
    2000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_log_file() -> String {
    "estate_admin.log".to_string()
}

const ENV_PREFIX: &str = "ESTATE_";

impl Config {
    /// Load configuration from environment variables
    ///
    /// This function will:
    /// 1. Load variables from .env file if it exists
    /// 2. Deserialize `ESTATE_*` environment variables into Config struct
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let config = envy::prefixed(ENV_PREFIX).from_env::<Config>()?;

        Ok(config)
    }

    /// Build a config from explicit key/value pairs (keys carry the prefix)
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::prefixed(ENV_PREFIX).from_iter::<_, Config>(pairs)?;
        Ok(config)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    Config::load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pair(key: &str, value: &str) -> (String, String) {
        (key.to_string(), value.to_string())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = Config::from_pairs(Vec::new()).unwrap();

        assert_eq!(config.list_url, "https://getall.asayman669.workers.dev");
        assert_eq!(config.photo_mode, PhotoMode::Inline);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.retry_delay(), Duration::from_secs(2));
        assert_eq!(config.log_file, "estate_admin.log");
    }

    #[test]
    fn prefixed_variables_override_defaults() {
        let config = Config::from_pairs(vec![
            pair("ESTATE_LIST_URL", "http://localhost:9000/list"),
            pair("ESTATE_PHOTO_MODE", "upload"),
            pair("ESTATE_MAX_RETRIES", "2"),
            pair("ESTATE_RETRY_DELAY_MS", "50"),
            pair("UNRELATED", "ignored"),
        ])
        .unwrap();

        assert_eq!(config.list_url, "http://localhost:9000/list");
        assert_eq!(config.photo_mode, PhotoMode::Upload);
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.retry_delay(), Duration::from_millis(50));
    }

    #[test]
    fn unknown_photo_mode_is_rejected() {
        let result = Config::from_pairs(vec![pair("ESTATE_PHOTO_MODE", "ftp")]);
        assert!(result.is_err());
    }
}
