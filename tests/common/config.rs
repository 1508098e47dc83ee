//! Test configuration helpers for loading .env settings and building clients

use xunlei_client::{ClientConfig, XunleiClient};

/// Error type for test configuration
#[derive(Debug)]
pub struct ConfigError(pub String);

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Config error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

/// Load control panel settings from environment variables
///
/// Required environment variables:
/// - `XUNLEI_HOST` - NAS hostname or IP
/// - `XUNLEI_PORT` - Web panel port
///
/// Optional environment variables:
/// - `XUNLEI_SSL` - "true" to use HTTPS (default: false)
/// - `XUNLEI_USERNAME` / `XUNLEI_PASSWORD` - Basic auth in front of the panel
/// - `XUNLEI_ROOT_DIR` - Root download folder name (default: first folder)
pub fn load_live_config() -> Result<ClientConfig, ConfigError> {
    dotenvy::dotenv().ok();

    let host = std::env::var("XUNLEI_HOST")
        .map_err(|_| ConfigError("XUNLEI_HOST not set in environment".to_string()))?;

    let port: u16 = std::env::var("XUNLEI_PORT")
        .map_err(|_| ConfigError("XUNLEI_PORT not set in environment".to_string()))?
        .parse()
        .map_err(|e| ConfigError(format!("XUNLEI_PORT is not a port number: {}", e)))?;

    let ssl = std::env::var("XUNLEI_SSL")
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    Ok(ClientConfig {
        host,
        port,
        ssl,
        username: std::env::var("XUNLEI_USERNAME").ok(),
        password: std::env::var("XUNLEI_PASSWORD").ok(),
        download_root_dir: std::env::var("XUNLEI_ROOT_DIR").ok(),
        ..Default::default()
    })
}

/// Connect to the live control panel described by .env
pub async fn create_live_client() -> Result<XunleiClient, ConfigError> {
    let config = load_live_config()?;
    XunleiClient::connect(config)
        .await
        .map_err(|e| ConfigError(format!("failed to connect: {}", e)))
}

/// Check if live panel settings are available
pub fn has_live_config() -> bool {
    dotenvy::dotenv().ok();
    std::env::var("XUNLEI_HOST").is_ok() && std::env::var("XUNLEI_PORT").is_ok()
}
