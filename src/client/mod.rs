//! Control panel client split into focused submodules.
//!
//! The `XunleiClient` struct and its methods are organized by domain:
//! - [`session`] - Auth token, device id, and the generic authenticated request
//! - [`directory`] - Root download folder resolution and sub-folder creation
//! - [`tasks`] - Completed / uncompleted task listings
//! - [`resources`] - Magnet resource lookup and tree flattening
//! - [`submit`] - Task submission workflow (de-dup, filtering, creation)
//! - [`control`] - Pause / resume / delete

mod control;
mod directory;
mod resources;
mod session;
mod submit;
mod tasks;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use resources::{MAX_RESOURCE_DEPTH, flatten};

use crate::config::ClientConfig;
use crate::error::Result;
use crate::types::Folder;
use std::time::Instant;

/// Path prefix under which the panel exposes its API
pub const GATEWAY_PREFIX: &str = "/webman/3rdparty/pan-xunlei-com/index.cgi";

/// A pan-auth token and when it was fetched
#[derive(Clone, Debug)]
pub(crate) struct CachedToken {
    pub(crate) value: String,
    pub(crate) fetched_at: Instant,
}

/// Client for one Xunlei control panel
///
/// The client caches the auth token, the device id and the root download
/// folder. Methods that may refresh those caches take `&mut self`, so one
/// instance serves one logical caller at a time; use separate instances (or
/// external locking) for parallel work. Nothing is shared between instances.
///
/// # Examples
///
/// ```no_run
/// use xunlei_client::{ClientConfig, SizeRangeFilter, SubmitOptions, SubmitOutcome, XunleiClient};
///
/// # async fn example() -> xunlei_client::Result<()> {
/// let config = ClientConfig {
///     host: "192.168.1.21".to_string(),
///     port: 2345,
///     ..Default::default()
/// };
/// let mut client = XunleiClient::connect(config).await?;
///
/// let options = SubmitOptions::default()
///     .with_sub_dir("movies")
///     .with_filter(SizeRangeFilter::default());
/// match client.submit_magnet("magnet:?xt=urn:btih:...", &options).await {
///     SubmitOutcome::Created => println!("queued"),
///     SubmitOutcome::AlreadyExists => println!("already there"),
///     SubmitOutcome::Failed => println!("failed, see logs"),
/// }
/// # Ok(())
/// # }
/// ```
pub struct XunleiClient {
    /// Connection settings
    pub(crate) config: ClientConfig,
    /// HTTP session (cookie store, default headers, basic auth applied per request)
    pub(crate) http: reqwest::Client,
    /// `scheme://host:port`
    pub(crate) endpoint: String,
    /// Cached pan-auth token
    pub(crate) token: Option<CachedToken>,
    /// Cached device id (the "space" every call is scoped to)
    pub(crate) device_id: Option<String>,
    /// Root download folder, fixed until `initialize` is called again
    pub(crate) root_folder: Option<Folder>,
}

impl XunleiClient {
    /// Build a client without touching the network
    ///
    /// Call [`initialize`](Self::initialize) (or use [`connect`](Self::connect))
    /// before submitting tasks.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("*/*"),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_static("zh-CN,zh;q=0.9"),
        );
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        headers.insert("dnt", reqwest::header::HeaderValue::from_static("1"));
        headers.insert(
            "device-space",
            reqwest::header::HeaderValue::from_static(""),
        );

        let http = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        let endpoint = config.endpoint();
        Ok(Self {
            config,
            http,
            endpoint,
            token: None,
            device_id: None,
            root_folder: None,
        })
    }

    /// Build a client, open the session, and resolve device and root folder
    ///
    /// The first token fetch also primes the session cookies. Uses
    /// `config.download_root_dir` to pick the root folder (first folder when
    /// unset).
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let root_dir = config.download_root_dir.clone();
        let mut client = Self::new(config)?;

        if client.auth_token().await.is_empty() {
            tracing::warn!(endpoint = %client.endpoint, "no pan-auth token during session bootstrap");
        }
        let device_id = client.device_id().await?;
        let folder = client.initialize(root_dir.as_deref()).await?;

        tracing::info!(
            device_id = %device_id,
            folder = %folder.name,
            folder_id = %folder.id,
            "connected to control panel"
        );
        Ok(client)
    }

    /// Check that the panel is reachable and usable
    ///
    /// Resolves the device id and, if not yet done, the root folder. Errors are
    /// logged and reported as `false`.
    pub async fn is_connected(&mut self) -> bool {
        tracing::info!(endpoint = %self.endpoint, "testing connection to control panel");
        if let Err(e) = self.device_id().await {
            tracing::error!(error = %e, "connection test failed");
            return false;
        }
        if self.root_folder.is_none() {
            let root_dir = self.config.download_root_dir.clone();
            if let Err(e) = self.initialize(root_dir.as_deref()).await {
                tracing::error!(error = %e, "connection test failed");
                return false;
            }
        }
        true
    }

    /// Connection settings this client was built with
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Base endpoint, `scheme://host:port`
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Full URL of a path under the gateway prefix
    pub(crate) fn api_url(&self, path: &str) -> String {
        format!("{}{}{}", self.endpoint, GATEWAY_PREFIX, path)
    }

    /// Start a request with session-wide basic auth applied
    pub(crate) fn http_request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, url);
        match (&self.config.username, &self.config.password) {
            (Some(user), Some(pass)) => builder.basic_auth(user, Some(pass)),
            _ => builder,
        }
    }
}

impl std::fmt::Debug for XunleiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XunleiClient")
            .field("endpoint", &self.endpoint)
            .field("device_id", &self.device_id)
            .field("root_folder", &self.root_folder)
            .field("has_token", &self.token.is_some())
            .finish()
    }
}
