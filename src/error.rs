//! Error types for xunlei-client
//!
//! This module provides the error handling for the library:
//! - A top-level [`Error`] covering configuration, transport, envelope and
//!   torrent decoding failures
//! - A nested [`TorrentError`] for `.torrent` decoding problems
//! - Machine-readable error codes and retry classification, so callers can
//!   decide whether to refresh auth, retry, or give up
//!
//! Routine negative outcomes of task submission (duplicate, no resources,
//! creation rejected) are not errors; they are reported through
//! [`SubmitOutcome`](crate::types::SubmitOutcome).

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for xunlei-client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for xunlei-client
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "host")
        key: Option<String>,
    },

    /// A named resource (e.g. the requested root folder) does not exist
    #[error("{requested} not found (available: {})", available.join(", "))]
    NotFound {
        /// What was asked for
        requested: String,
        /// The alternatives the service offered instead
        available: Vec<String>,
    },

    /// Sub-directory names must be a single, non-empty path component
    #[error("invalid sub-directory {0:?}: multilevel sub-directories are not supported")]
    InvalidSubDir(String),

    /// An operation needs the root folder but the client was never connected
    #[error("client not initialized: call connect() first")]
    NotInitialized,

    /// The control panel did not hand out an auth token
    #[error("unauthenticated: failed to obtain a pan-auth token")]
    Unauthenticated,

    /// The service rejected the cached token (`error_code == 403`)
    ///
    /// The cached token has already been dropped when this is returned; the
    /// next call fetches a fresh one.
    #[error("pan-auth token rejected: {0}")]
    AuthInvalid(String),

    /// Non-2xx response from the control panel
    #[error("HTTP {status} from {url}: {body}")]
    HttpStatus {
        /// Response status code
        status: u16,
        /// Request URL
        url: String,
        /// Response body (for diagnostics)
        body: String,
    },

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Response decoded fine but lacks a field the workflow depends on
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Torrent file could not be decoded
    #[error("torrent error: {0}")]
    Torrent(#[from] TorrentError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Torrent decoding errors
#[derive(Debug, Error)]
pub enum TorrentError {
    /// Bencode syntax error at a byte offset
    #[error("invalid bencode at byte {offset}: {reason}")]
    Bencode {
        /// Byte offset where decoding failed
        offset: usize,
        /// What was wrong
        reason: &'static str,
    },

    /// A required metainfo key is missing or has the wrong type
    #[error("missing or invalid key {0:?}")]
    MissingKey(&'static str),

    /// The torrent file could not be read
    #[error("failed to read torrent {}: {source}", path.display())]
    Read {
        /// Path of the torrent file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Build a configuration error for a specific key
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::NotFound { .. } => "not_found",
            Error::InvalidSubDir(_) => "invalid_sub_dir",
            Error::NotInitialized => "not_initialized",
            Error::Unauthenticated => "unauthenticated",
            Error::AuthInvalid(_) => "auth_invalid",
            Error::HttpStatus { .. } => "http_status",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
            Error::MalformedResponse(_) => "malformed_response",
            Error::Torrent(_) => "torrent_error",
            Error::Io(_) => "io_error",
        }
    }

    /// True when the failure is about credentials rather than the request
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Unauthenticated | Error::AuthInvalid(_))
    }

    /// True when repeating the same call later may succeed
    ///
    /// Auth failures are not retryable as-is; see [`is_auth_error`](Self::is_auth_error).
    /// Nothing in this crate retries on its own; this only classifies.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Error::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_lists_available_alternatives() {
        let err = Error::NotFound {
            requested: "download root dir 'movies'".into(),
            available: vec!["downloads".into(), "media".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("'movies'"));
        assert!(msg.contains("downloads, media"));
        assert_eq!(err.error_code(), "not_found");
    }

    #[test]
    fn auth_errors_are_classified() {
        assert!(Error::Unauthenticated.is_auth_error());
        assert!(Error::AuthInvalid("expired".into()).is_auth_error());
        assert!(!Error::NotInitialized.is_auth_error());
        assert!(!Error::Unauthenticated.is_retryable());
        assert!(!Error::AuthInvalid("expired".into()).is_retryable());
    }

    #[test]
    fn retry_classification_for_http_status() {
        let server_err = Error::HttpStatus {
            status: 502,
            url: "http://nas/x".into(),
            body: String::new(),
        };
        let client_err = Error::HttpStatus {
            status: 404,
            url: "http://nas/x".into(),
            body: String::new(),
        };
        assert!(server_err.is_retryable());
        assert!(!client_err.is_retryable());
        assert!(!Error::InvalidSubDir("a/b".into()).is_retryable());
    }

    #[test]
    fn torrent_error_converts_into_error() {
        let err: Error = TorrentError::MissingKey("info").into();
        assert_eq!(err.error_code(), "torrent_error");
        assert!(err.to_string().contains("\"info\""));
    }

    #[test]
    fn config_helper_sets_key() {
        match Error::config("host must not be empty", "host") {
            Error::Config { message, key } => {
                assert_eq!(message, "host must not be empty");
                assert_eq!(key.as_deref(), Some("host"));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
