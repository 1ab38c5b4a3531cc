//! User preference storage backed by SQLite.
//!
//! A small key-value store keyed by opaque strings, plus typed helpers for the
//! two preferences the browser keeps across sessions: favorites and theme.

use crate::models::Theme;
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tracing::{debug, info};

/// Key holding the JSON array of favorite entity ids
pub const FAVORITES_KEY: &str = "animecbf-favorites";

/// Key holding the theme preference
pub const THEME_KEY: &str = "animecbf-theme";

/// Persistent key-value preference store
pub struct PreferenceStore {
    conn: Connection,
}

impl PreferenceStore {
    /// Open or create a preference database at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create preference directory: {}", parent.display())
            })?;
        }

        debug!(path = %path.display(), "Opening preference store");

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open preference store at {}", path.display()))?;

        let store = Self { conn };
        if store.version()? == 0 {
            info!("Creating preference store schema");
            store
                .conn
                .execute_batch(include_str!("../schema.sql"))
                .context("Failed to create preference store schema")?;
        }

        Ok(store)
    }

    /// Schema version (from the user_version pragma)
    pub fn version(&self) -> Result<i32> {
        let version: i32 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?;
        Ok(version)
    }

    /// Get the value stored under a key
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("Failed to read preference {}", key))
    }

    /// Store a value, replacing any previous one
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO preferences (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                                updated_at = CURRENT_TIMESTAMP",
                params![key, value],
            )
            .with_context(|| format!("Failed to write preference {}", key))?;

        debug!(key = key, "Preference stored");
        Ok(())
    }

    /// Check whether a key has a value
    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Remove a key. Returns whether anything was removed.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM preferences WHERE key = ?1", params![key])
            .with_context(|| format!("Failed to remove preference {}", key))?;
        Ok(removed > 0)
    }

    /// Favorite entity ids in the order they were added
    pub fn favorites(&self) -> Result<Vec<String>> {
        match self.get(FAVORITES_KEY)? {
            Some(raw) => serde_json::from_str(&raw).context("Failed to parse favorites"),
            None => Ok(Vec::new()),
        }
    }

    /// Add an entity to favorites. Returns false if it was already there.
    pub fn add_favorite(&self, id: &str) -> Result<bool> {
        let mut favorites = self.favorites()?;
        if favorites.iter().any(|fav| fav == id) {
            return Ok(false);
        }

        favorites.push(id.to_string());
        self.save_favorites(&favorites)?;
        info!(id = id, "Added favorite");
        Ok(true)
    }

    /// Remove an entity from favorites. Returns false if it was not there.
    pub fn remove_favorite(&self, id: &str) -> Result<bool> {
        let mut favorites = self.favorites()?;
        let before = favorites.len();
        favorites.retain(|fav| fav != id);
        if favorites.len() == before {
            return Ok(false);
        }

        self.save_favorites(&favorites)?;
        info!(id = id, "Removed favorite");
        Ok(true)
    }

    pub fn is_favorite(&self, id: &str) -> Result<bool> {
        Ok(self.favorites()?.iter().any(|fav| fav == id))
    }

    /// Theme preference, `system` when unset or unreadable
    pub fn theme(&self) -> Result<Theme> {
        Ok(self
            .get(THEME_KEY)?
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default())
    }

    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        self.set(THEME_KEY, &theme.to_string())
    }

    fn save_favorites(&self, favorites: &[String]) -> Result<()> {
        let raw = serde_json::to_string(favorites).context("Failed to serialize favorites")?;
        self.set(FAVORITES_KEY, &raw)
    }
}
