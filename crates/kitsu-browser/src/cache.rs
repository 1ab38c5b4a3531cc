//! Session entity cache.
//!
//! Keeps the last fetched copy of every entity by identifier for the life of
//! the process. There is no eviction; `clear` is the only invalidation.

use shared::CatalogEntity;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// In-memory entity cache shared across views
#[derive(Debug, Default)]
pub struct EntityCache {
    entries: Mutex<HashMap<String, Arc<CatalogEntity>>>,
}

impl EntityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cached entity if it exists
    pub fn get(&self, id: &str) -> Option<Arc<CatalogEntity>> {
        let entity = self.entries().get(id).cloned();
        if entity.is_some() {
            debug!(id = id, "Entity cache hit");
        } else {
            debug!(id = id, "Entity cache miss");
        }
        entity
    }

    /// Store an entity, replacing any previous copy wholesale.
    ///
    /// Entities without an identifier are ignored and yield `None`; otherwise
    /// the shared handle now held by the cache is returned.
    pub fn put(&self, entity: CatalogEntity) -> Option<Arc<CatalogEntity>> {
        if entity.id.is_empty() {
            debug!("Ignoring entity without an id");
            return None;
        }

        let entity = Arc::new(entity);
        self.entries().insert(entity.id.clone(), Arc::clone(&entity));
        debug!(id = %entity.id, "Entity cached");
        Some(entity)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Drop every cached entity
    pub fn clear(&self) {
        let mut entries = self.entries();
        let count = entries.len();
        entries.clear();
        info!(entries = count, "Entity cache cleared");
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Arc<CatalogEntity>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
