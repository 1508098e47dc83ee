//! # xunlei-client
//!
//! Async client library for the Xunlei offline download panel that runs on
//! NAS boxes (Synology, Docker images of the "pan-xunlei-com" app).
//!
//! ## What it does
//!
//! - **Session handling** - pan-auth token scraping with a time-based cache,
//!   device id lookup, optional HTTP basic auth in front of the panel
//! - **Magnet submission** - resolves what a link contains, skips names that
//!   already exist, filters files by size (or any custom rule) and creates the
//!   task, optionally inside a fresh sub-folder
//! - **Torrent files** - converts `.torrent` files to magnet links carrying
//!   every tracker, then submits them like any magnet
//! - **Task control** - list completed / uncompleted tasks, pause, resume,
//!   delete
//!
//! ## Quick Start
//!
//! ```no_run
//! use xunlei_client::{ClientConfig, SubmitOptions, XunleiClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig {
//!         host: "192.168.1.21".to_string(),
//!         port: 2345,
//!         download_root_dir: Some("downloads".to_string()),
//!         ..Default::default()
//!     };
//!
//!     let mut client = XunleiClient::connect(config).await?;
//!
//!     let outcome = client
//!         .submit_magnet("magnet:?xt=urn:btih:...", &SubmitOptions::default())
//!         .await;
//!     println!("submission: {outcome}");
//!
//!     for task in client.uncompleted_tasks().await? {
//!         println!("{} {}% {}", task.name, task.progress, task.phase.as_upstream());
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Control panel client (decomposed into focused submodules)
pub mod client;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// File selection filters
pub mod filter;
/// Torrent decoding and magnet conversion
pub mod torrent;
/// Core types
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use client::{GATEWAY_PREFIX, MAX_RESOURCE_DEPTH, XunleiClient, flatten};
pub use config::ClientConfig;
pub use error::{Error, Result, TorrentError};
pub use filter::{DEFAULT_MAX_FILE_SIZE, DEFAULT_MIN_FILE_SIZE, FileFilter, SizeRangeFilter};
pub use torrent::{Metainfo, torrent_to_magnet};
pub use types::{
    Folder, ResolvedResource, Resource, SubmitOptions, SubmitOutcome, Task, TaskAction, TaskFile,
    TaskId, TaskPhase,
};
