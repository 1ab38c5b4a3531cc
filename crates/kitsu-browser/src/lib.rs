//! Kitsu catalog browser library.
//!
//! Data-access layer for browsing the Kitsu anime catalog: a typed API client
//! with classified errors, memoized synopsis translation, a session entity
//! cache, and per-view pagination state.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod display;
pub mod error;
pub mod pagination;
pub mod translation;

#[cfg(test)]
pub(crate) mod test_support;

pub use api::{KitsuClient, TransportError};
pub use cache::EntityCache;
pub use catalog::{CatalogPage, CatalogService, PageLinks, QueryParams};
pub use error::{classify, CatalogError, Failure, Recovery};
pub use pagination::{
    Completion, LoadPhase, PageRequest, PageStatus, PaginationController, RenderPolicy,
    RenderStrategy, ViewKind,
};
pub use translation::Translator;
