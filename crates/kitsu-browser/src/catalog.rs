//! Catalog query service.
//!
//! Builds paginated, filtered queries against `/anime`, classifies failures,
//! and runs every synopsis through the translator before handing results to
//! views. Single entities go through the session [`EntityCache`] first.

use crate::api::{AnimeDetailResponse, AnimeListResponse, KitsuClient, TransportError};
use crate::cache::EntityCache;
use crate::error::{classify, CatalogError, Failure};
use crate::translation::Translator;
use futures::future::join_all;
use serde_json::Value;
use shared::config::CatalogConfig;
use shared::{CatalogEntity, Subtype};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub use crate::api::ListLinks as PageLinks;

/// Entities per page when the caller does not say otherwise
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Parameters of one catalog list query.
///
/// Limit and offset fully determine which slice of the catalog is requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParams {
    pub subtype: Option<Subtype>,
    pub text: Option<String>,
    pub limit: u32,
    pub offset: u32,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            subtype: None,
            text: None,
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl QueryParams {
    /// A zero limit falls back to the default page size
    pub fn new(limit: u32, offset: u32) -> Self {
        Self {
            limit: if limit == 0 { DEFAULT_PAGE_SIZE } else { limit },
            offset,
            ..Default::default()
        }
    }

    pub fn with_subtype(mut self, subtype: Subtype) -> Self {
        self.subtype = Some(subtype);
        self
    }

    /// Set the free-text filter (an empty string clears it)
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.text = if text.is_empty() { None } else { Some(text) };
        self
    }

    /// Query string pairs in the JSON:API syntax Kitsu expects
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page[limit]", self.limit.to_string()),
            ("page[offset]", self.offset.to_string()),
        ];

        if let Some(subtype) = self.subtype {
            pairs.push(("filter[subtype]", subtype.as_api_str().to_string()));
        }

        if let Some(text) = &self.text {
            pairs.push(("filter[text]", text.clone()));
        }

        pairs
    }
}

/// One page of query results
#[derive(Debug, Clone)]
pub struct CatalogPage {
    pub entities: Vec<CatalogEntity>,
    /// Total matches reported upstream
    pub total_count: Option<u64>,
    pub links: PageLinks,
}

/// Catalog query service
pub struct CatalogService {
    client: KitsuClient,
    translator: Arc<Translator>,
    cache: Arc<EntityCache>,
    page_size: u32,
    cache_listings: bool,
}

impl CatalogService {
    /// Create a new catalog service
    pub fn new(client: KitsuClient, translator: Arc<Translator>, cache: Arc<EntityCache>) -> Self {
        Self {
            client,
            translator,
            cache,
            page_size: DEFAULT_PAGE_SIZE,
            cache_listings: false,
        }
    }

    /// Create a catalog service from configuration
    pub fn from_config(
        config: &CatalogConfig,
        translator: Arc<Translator>,
        cache: Arc<EntityCache>,
    ) -> Result<Self, TransportError> {
        let client = KitsuClient::new(
            &config.base_url,
            Duration::from_secs(config.timeout_seconds),
        )?;

        Ok(Self::new(client, translator, cache)
            .with_page_size(config.page_size)
            .with_listing_cache(config.cache_listings))
    }

    /// Default page size for the presets
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = if page_size == 0 { DEFAULT_PAGE_SIZE } else { page_size };
        self
    }

    /// Also write entities from list queries into the entity cache
    pub fn with_listing_cache(mut self, enabled: bool) -> Self {
        self.cache_listings = enabled;
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn cache(&self) -> &Arc<EntityCache> {
        &self.cache
    }

    pub fn translator(&self) -> &Arc<Translator> {
        &self.translator
    }

    /// Run a list query
    pub async fn query(&self, params: &QueryParams) -> Result<CatalogPage, CatalogError> {
        self.fetch_page(params).await.map_err(classify)
    }

    /// TV series page
    pub async fn list_series(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<CatalogPage, CatalogError> {
        self.query(&self.params(limit, offset).with_subtype(Subtype::Tv))
            .await
    }

    pub async fn list_movies(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<CatalogPage, CatalogError> {
        self.query(&self.params(limit, offset).with_subtype(Subtype::Movie))
            .await
    }

    /// Free-text search across every subtype
    pub async fn search_by_text(
        &self,
        text: &str,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<CatalogPage, CatalogError> {
        self.query(&self.params(limit, offset).with_text(text)).await
    }

    /// Unfiltered first page, used for the featured strip
    pub async fn featured(&self, limit: u32) -> Result<CatalogPage, CatalogError> {
        self.query(&QueryParams::new(limit, 0)).await
    }

    /// Fetch one entity, serving it from the entity cache when possible.
    ///
    /// A cache hit returns the very same shared entity without any network
    /// call. A miss fetches, translates and caches it. Failures leave the
    /// cache untouched.
    pub async fn get_by_id(&self, id: &str) -> Result<Arc<CatalogEntity>, CatalogError> {
        if id.trim().is_empty() {
            return Err(CatalogError::NotFound("Invalid anime id.".to_string()));
        }

        if let Some(entity) = self.cache.get(id) {
            return Ok(entity);
        }

        let entity = self.fetch_entity(id).await.map_err(classify)?;
        let entity = self.translate_entity(entity).await;

        info!(id = %entity.id, title = %entity.attributes.title, "Fetched anime details");
        self.cache.put(entity).ok_or_else(CatalogError::service)
    }

    fn params(&self, limit: Option<u32>, offset: Option<u32>) -> QueryParams {
        QueryParams::new(limit.unwrap_or(self.page_size), offset.unwrap_or(0))
    }

    async fn fetch_page(&self, params: &QueryParams) -> Result<CatalogPage, Failure> {
        let response = self.client.get(&["anime"], &params.to_query_pairs()).await?;
        let payload = parse_list(response.body)?;

        let entities: Vec<CatalogEntity> =
            payload.data.into_iter().map(CatalogEntity::from).collect();
        let entities = self.translate_all(entities).await;

        info!(
            subtype = ?params.subtype,
            text = ?params.text,
            offset = params.offset,
            limit = params.limit,
            received = entities.len(),
            "Fetched catalog page"
        );

        if self.cache_listings {
            for entity in &entities {
                self.cache.put(entity.clone());
            }
        }

        Ok(CatalogPage {
            entities,
            total_count: payload.meta.and_then(|meta| meta.count),
            links: payload.links.unwrap_or_default(),
        })
    }

    async fn fetch_entity(&self, id: &str) -> Result<CatalogEntity, Failure> {
        let response = self.client.get(&["anime", id], &[]).await?;
        let payload: AnimeDetailResponse = serde_json::from_value(response.body)
            .map_err(|e| Failure::MalformedPayload(e.to_string()))?;

        // A success without a resource means there is nothing by that id.
        match payload.data {
            Some(resource) if !resource.id.is_empty() => Ok(resource.into()),
            _ => Err(CatalogError::not_found().into()),
        }
    }

    /// Translate every synopsis concurrently; output order matches input order
    async fn translate_all(&self, entities: Vec<CatalogEntity>) -> Vec<CatalogEntity> {
        join_all(entities.into_iter().map(|entity| self.translate_entity(entity))).await
    }

    async fn translate_entity(&self, mut entity: CatalogEntity) -> CatalogEntity {
        if entity.needs_translation() {
            let translated = self.translator.translate(&entity.attributes.synopsis).await;
            if !entity.apply_translation(translated) {
                debug!(id = %entity.id, "Synopsis left untranslated");
            }
        }
        entity
    }
}

fn parse_list(body: Value) -> Result<AnimeListResponse, Failure> {
    if !body.get("data").map_or(false, Value::is_array) {
        return Err(Failure::MalformedPayload(
            "response has no data array".to_string(),
        ));
    }

    serde_json::from_value(body).map_err(|e| Failure::MalformedPayload(e.to_string()))
}
