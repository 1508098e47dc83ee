//! Auth token cache, device id, and the generic authenticated request.

use crate::error::{Error, Result};
use regex::Regex;
use reqwest::Method;
use serde_json::Value;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use super::{CachedToken, XunleiClient};

/// `error_code` the panel uses for a rejected pan-auth token
const AUTH_INVALID_CODE: i64 = 403;

/// Pattern the panel's entry page uses to embed the pan-auth token
fn token_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r#"function uiauth\(value\)\{ return "([^"]*)" \}"#).ok())
        .as_ref()
}

/// Pull the pan-auth token out of the panel's entry page
pub(crate) fn extract_token(page: &str) -> Option<String> {
    token_pattern()?
        .captures(page)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|token| !token.is_empty())
}

impl XunleiClient {
    /// Current pan-auth token
    ///
    /// Reuses the cached token while it is younger than `token_ttl`, otherwise
    /// fetches the panel entry page and extracts a fresh one. Returns an empty
    /// string when no token could be obtained; callers treat that as
    /// unauthenticated.
    pub async fn auth_token(&mut self) -> String {
        if let Some(cached) = &self.token
            && cached.fetched_at.elapsed() < self.config.token_ttl
        {
            return cached.value.clone();
        }

        match self.fetch_token().await {
            Some(value) => {
                self.token = Some(CachedToken {
                    value: value.clone(),
                    fetched_at: Instant::now(),
                });
                value
            }
            None => String::new(),
        }
    }

    /// Drop the cached token so the next call fetches a new one
    pub fn invalidate_token(&mut self) {
        if self.token.take().is_some() {
            tracing::debug!("pan-auth token invalidated");
        }
    }

    async fn fetch_token(&self) -> Option<String> {
        let url = self.api_url("/");
        tracing::info!(url = %url, "requesting pan-auth token");

        let response = match self.http_request(Method::GET, &url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(url = %url, error = %e, "failed to fetch pan-auth token");
                return None;
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(url = %url, error = %e, "failed to read pan-auth page");
                return None;
            }
        };

        if status != reqwest::StatusCode::OK {
            tracing::error!(status = status.as_u16(), body = %body, "pan-auth page request failed");
            return None;
        }

        let token = extract_token(&body);
        if token.is_none() {
            tracing::error!("pan-auth token pattern not found in response");
        }
        token
    }

    /// Device id every API call is scoped to
    ///
    /// Cached after the first successful lookup. Unlike the token, failure here
    /// is a hard error: nothing else works without it.
    pub async fn device_id(&mut self) -> Result<String> {
        if let Some(id) = &self.device_id {
            tracing::debug!(device_id = %id, "using cached device id");
            return Ok(id.clone());
        }

        tracing::info!("fetching device id from control panel");
        let data = self
            .request(Method::POST, "/device/info/watch", &[], None)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "failed to fetch device id"))?;

        let id = data
            .get("target")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                tracing::error!(response = %data, "device id missing from response");
                Error::MalformedResponse("device info response has no `target`".to_string())
            })?;

        tracing::info!(device_id = %id, "resolved device id");
        self.device_id = Some(id.clone());
        Ok(id)
    }

    /// Authenticated JSON call against a path under the gateway prefix
    ///
    /// # Errors
    ///
    /// - [`Error::Unauthenticated`] when no token could be obtained
    /// - [`Error::HttpStatus`] on any non-2xx response
    /// - [`Error::AuthInvalid`] when the body carries `error_code == 403`; the
    ///   cached token is dropped before returning
    /// - [`Error::Network`] / [`Error::Serialization`] for transport and decode failures
    pub async fn request(
        &mut self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let timeout = self.config.request_timeout;
        self.request_with_timeout(method, path, query, body, timeout)
            .await
    }

    /// [`request`](Self::request) with an explicit per-call timeout
    pub(crate) async fn request_with_timeout(
        &mut self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
        timeout: Duration,
    ) -> Result<Value> {
        let token = self.auth_token().await;
        if token.is_empty() {
            return Err(Error::Unauthenticated);
        }

        let url = self.api_url(path);
        tracing::debug!(method = %method, url = %url, ?query, "sending request");

        let mut builder = self
            .http_request(method.clone(), &url)
            .header("pan-auth", token)
            .timeout(timeout);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            tracing::debug!(body = %body, "request body");
            builder = builder.json(body);
        }

        let response = builder.send().await.inspect_err(|e| {
            tracing::error!(method = %method, url = %url, error = %e, "request failed");
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                method = %method,
                url = %url,
                status = status.as_u16(),
                body = %body,
                "request returned error status"
            );
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                url,
                body,
            });
        }

        let bytes = response.bytes().await?;
        let result: Value = serde_json::from_slice(&bytes)?;
        tracing::debug!(status = status.as_u16(), response = %result, "response received");

        if result.get("error_code").and_then(Value::as_i64) == Some(AUTH_INVALID_CODE) {
            let message = result
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("pan-auth rejected")
                .to_string();
            tracing::warn!(url = %url, error = %message, "pan-auth token rejected");
            self.invalidate_token();
            return Err(Error::AuthInvalid(message));
        }

        Ok(result)
    }
}
