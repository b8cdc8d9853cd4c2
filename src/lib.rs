//! Sitewalker: browser-driven end-to-end test harness
//!
//! This library drives a real browser through the marketing site over the
//! W3C WebDriver protocol and asserts on visible content, with bounded
//! retries at both the interaction and the whole-test level.

pub mod error;
pub mod config;

pub mod webdriver;
pub mod session;
pub mod interact;
pub mod harness;
pub mod pages;

// Re-exports
pub use error::{Error, Result};

/// Sitewalker library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
