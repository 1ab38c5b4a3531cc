//! Configuration management for the catalog browser.
//!
//! This module handles loading and parsing configuration from TOML files,
//! with sensible defaults for all settings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the catalog base URL
pub const BASE_URL_ENV: &str = "KITSU_API_BASE_URL";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Data directory settings
    pub data: DataConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Catalog API settings
    pub catalog: CatalogConfig,

    /// Synopsis translation settings
    pub translation: TranslationConfig,

    /// Pagination and layout settings
    pub pagination: PaginationConfig,

    /// User preference store settings
    pub preferences: PreferencesConfig,
}

/// Data directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Root data directory path
    pub root_dir: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log directory path (relative to data directory or absolute)
    pub log_dir: String,

    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Enable console output
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

/// Catalog API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Kitsu API base URL
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// Entities requested per page
    pub page_size: u32,

    /// Also store entities from list queries in the entity cache
    pub cache_listings: bool,
}

/// Translation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Translate synopses at all
    pub enabled: bool,

    /// Translation endpoint (LibreTranslate compatible)
    pub endpoint: String,

    /// Source language code
    pub source_language: String,

    /// Target language code
    pub target_language: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

/// Pagination configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Distance from the bottom (px) under which the next page is requested
    pub scroll_threshold_px: f64,

    /// Entity count above which views switch to a virtualized layout
    pub virtualization_threshold: usize,

    /// Fixed row height (px) of the virtualized layout
    pub row_height_px: u32,
}

/// Preference store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferencesConfig {
    /// SQLite file path (relative to data directory or absolute)
    pub path: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            root_dir: "data".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            default_level: "info".to_string(),
            console: true,
            file: true,
            json_format: false,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://kitsu.io/api/edge".to_string(),
            timeout_seconds: 10,
            page_size: 20,
            cache_listings: false,
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://libretranslate.com/translate".to_string(),
            source_language: "en".to_string(),
            target_language: "es".to_string(),
            timeout_seconds: 5,
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            scroll_threshold_px: 200.0,
            virtualization_threshold: 50,
            row_height_px: 400,
        }
    }
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            path: "preferences.db".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns the default configuration.
    /// `KITSU_API_BASE_URL` overrides the catalog base URL either way.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let mut config = if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            Self::default()
        } else {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;

            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

            tracing::info!(
                path = %path.display(),
                "Configuration loaded successfully"
            );
            config
        };

        config.apply_overrides(std::env::var(BASE_URL_ENV).ok());
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration saved successfully"
        );

        Ok(())
    }

    /// Apply an externally supplied catalog base URL (blank values are ignored)
    pub fn apply_overrides(&mut self, base_url: Option<String>) {
        if let Some(url) = base_url.filter(|url| !url.trim().is_empty()) {
            tracing::debug!(base_url = %url, "Overriding catalog base URL");
            self.catalog.base_url = url.trim().to_string();
        }
    }

    /// Get the path for the data directory
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data.root_dir)
    }

    /// Get the path for the log directory
    pub fn log_dir(&self) -> PathBuf {
        self.resolve(&self.logging.log_dir)
    }

    /// Get the path for the preference database
    pub fn preferences_path(&self) -> PathBuf {
        self.resolve(&self.preferences.path)
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir().join(path)
        }
    }
}
