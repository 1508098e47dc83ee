//! Common test utilities for xunlei-client integration tests

#[allow(dead_code)]
pub mod config;
#[allow(dead_code)]
pub mod panel;

#[allow(unused_imports)]
pub use config::*;
#[allow(unused_imports)]
pub use panel::*;
