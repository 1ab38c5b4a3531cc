//! Shared library for the Kitsu catalog browser.
//!
//! This crate provides common functionality used by the browser crate:
//! - Configuration management
//! - Catalog domain models
//! - User preference storage (favorites, theme)
//! - Logging infrastructure

pub mod config;
pub mod logging;
pub mod models;
pub mod preferences;

// Re-export commonly used types
pub use config::Config;
pub use logging::LogConfig;
pub use models::*;
pub use preferences::PreferenceStore;

/// Common result type using anyhow::Error
pub type Result<T> = anyhow::Result<T>;
