//! Configuration types for xunlei-client

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection settings for one control panel instance
///
/// Every field has a serde default, so a config file only needs the keys it
/// wants to change.
///
/// ```
/// use xunlei_client::ClientConfig;
///
/// let config = ClientConfig {
///     host: "192.168.1.21".to_string(),
///     port: 2345,
///     ..Default::default()
/// };
/// assert_eq!(config.endpoint(), "http://192.168.1.21:2345");
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Hostname or IP of the NAS (default: "127.0.0.1")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port of the NAS web panel (default: 5000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Use HTTPS instead of HTTP
    #[serde(default)]
    pub ssl: bool,

    /// Basic auth username for the NAS web panel
    #[serde(default)]
    pub username: Option<String>,

    /// Basic auth password for the NAS web panel
    #[serde(default)]
    pub password: Option<String>,

    /// Name of the download root folder (None or empty = first folder listed)
    #[serde(default)]
    pub download_root_dir: Option<String>,

    /// User-Agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Timeout for ordinary API calls (default: 30s)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// Timeout for magnet resource listing, which resolves metadata upstream (default: 60s)
    #[serde(default = "default_resource_timeout", with = "duration_serde")]
    pub resource_timeout: Duration,

    /// How long a pan-auth token is reused before refetching (default: 600s)
    #[serde(default = "default_token_ttl", with = "duration_serde")]
    pub token_ttl: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            ssl: false,
            username: None,
            password: None,
            download_root_dir: None,
            user_agent: default_user_agent(),
            request_timeout: default_request_timeout(),
            resource_timeout: default_resource_timeout(),
            token_ttl: default_token_ttl(),
        }
    }
}

impl ClientConfig {
    /// Base endpoint, `scheme://host:port`
    pub fn endpoint(&self) -> String {
        let scheme = if self.ssl { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }

    /// Check the settings that would otherwise only fail on first request
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::config("host must not be empty", "host"));
        }
        if self.port == 0 {
            return Err(Error::config("port must be non-zero", "port"));
        }
        if self.username.is_some() != self.password.is_some() {
            return Err(Error::config(
                "username and password must be set together",
                "username",
            ));
        }
        url::Url::parse(&self.endpoint())
            .map_err(|e| Error::config(format!("invalid endpoint: {}", e), "host"))?;
        Ok(())
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_resource_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_token_ttl() -> Duration {
    Duration::from_secs(600) // 10 minutes
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
