//! Per-view pagination state.
//!
//! A [`PaginationController`] owns the accumulated entity list of one view and
//! decides when the next page is requested. The controller never performs I/O
//! itself: it hands out [`PageRequest`]s and is told about their outcome via
//! [`PaginationController::complete`]. Every request carries a generation
//! number; completions from a superseded generation are dropped.
//!
//! ```text
//! Idle -> Loading -> Ready <-> LoadingMore
//!            \          \          /
//!             +---------> Error <-+
//! ```

use crate::catalog::{CatalogPage, CatalogService, QueryParams, DEFAULT_PAGE_SIZE};
use crate::error::CatalogError;
use shared::config::PaginationConfig;
use shared::{CatalogEntity, Subtype};
use tracing::{debug, info, warn};

/// Distance from the bottom (px) under which the next page is requested
pub const DEFAULT_SCROLL_THRESHOLD: f64 = 200.0;

/// Which catalog listing a controller backs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Series,
    Movies,
    Search,
}

impl ViewKind {
    /// Subtype fixed by the view, if any
    pub fn subtype(&self) -> Option<Subtype> {
        match self {
            ViewKind::Series => Some(Subtype::Tv),
            ViewKind::Movies => Some(Subtype::Movie),
            ViewKind::Search => None,
        }
    }
}

/// Which loading phase a request belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    /// First page after a filter change
    Initial,
    /// Subsequent page appended to the list
    More,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageStatus {
    Idle,
    Loading,
    Ready,
    LoadingMore,
    /// Last load failed; `retry` is the phase a retry re-enters
    Error {
        error: CatalogError,
        retry: LoadPhase,
    },
}

/// A page load handed out by the controller
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub generation: u64,
    pub phase: LoadPhase,
    pub params: QueryParams,
}

/// Outcome of feeding a result back into the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// The request was superseded; its result was discarded
    Stale,
}

/// When to switch from a plain grid to a virtualized layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderPolicy {
    /// Entity count above which the layout is virtualized
    pub threshold: usize,
    /// Fixed row height (px) of the virtualized layout
    pub row_height: u32,
}

impl Default for RenderPolicy {
    fn default() -> Self {
        Self {
            threshold: 50,
            row_height: 400,
        }
    }
}

impl RenderPolicy {
    pub fn strategy_for(&self, count: usize) -> RenderStrategy {
        if count > self.threshold {
            RenderStrategy::Virtualized {
                row_height: self.row_height,
            }
        } else {
            RenderStrategy::Grid
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStrategy {
    Grid,
    Virtualized { row_height: u32 },
}

/// Pagination state for one view
#[derive(Debug)]
pub struct PaginationController {
    view: ViewKind,
    text: Option<String>,
    page_size: u32,
    entities: Vec<CatalogEntity>,
    /// Offset of the next page to request
    offset: u32,
    has_more: bool,
    status: PageStatus,
    generation: u64,
    last_request: Option<PageRequest>,
    scroll_threshold: f64,
    render_policy: RenderPolicy,
}

impl PaginationController {
    /// Create an idle controller for `view`
    pub fn new(view: ViewKind, page_size: u32) -> Self {
        Self {
            view,
            text: None,
            page_size: if page_size == 0 { DEFAULT_PAGE_SIZE } else { page_size },
            entities: Vec::new(),
            offset: 0,
            has_more: true,
            status: PageStatus::Idle,
            generation: 0,
            last_request: None,
            scroll_threshold: DEFAULT_SCROLL_THRESHOLD,
            render_policy: RenderPolicy::default(),
        }
    }

    /// Create a controller using the service page size and configured thresholds
    pub fn for_view(view: ViewKind, service: &CatalogService, config: &PaginationConfig) -> Self {
        Self::new(view, service.page_size())
            .with_scroll_threshold(config.scroll_threshold_px)
            .with_render_policy(RenderPolicy {
                threshold: config.virtualization_threshold,
                row_height: config.row_height_px,
            })
    }

    pub fn with_scroll_threshold(mut self, threshold: f64) -> Self {
        self.scroll_threshold = threshold;
        self
    }

    pub fn with_render_policy(mut self, policy: RenderPolicy) -> Self {
        self.render_policy = policy;
        self
    }

    /// Reset to the first page of the current filter and request it
    pub fn start(&mut self) -> PageRequest {
        self.entities.clear();
        self.offset = 0;
        self.has_more = true;
        self.status = PageStatus::Loading;

        info!(view = ?self.view, text = ?self.text, "Loading first page");
        self.issue(LoadPhase::Initial, self.params(0))
    }

    /// Change the text filter.
    ///
    /// Blank text clears the filter. Returns the initial request when the
    /// filter actually changed (or nothing was loaded yet).
    pub fn set_filter(&mut self, text: Option<String>) -> Option<PageRequest> {
        let text = text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        if text == self.text && self.status != PageStatus::Idle {
            return None;
        }

        self.text = text;
        Some(self.start())
    }

    pub fn filter(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Whether a scroll position `distance` px from the bottom should load more
    pub fn should_load_more(&self, distance: f64) -> bool {
        distance < self.scroll_threshold && self.status == PageStatus::Ready && self.has_more
    }

    /// Scroll notification; yields the next page request when one is due
    pub fn on_scroll(&mut self, distance: f64) -> Option<PageRequest> {
        if self.should_load_more(distance) {
            self.load_more()
        } else {
            None
        }
    }

    /// Request the next page if the list is ready and more results exist
    pub fn load_more(&mut self) -> Option<PageRequest> {
        if self.status != PageStatus::Ready || !self.has_more {
            return None;
        }

        self.status = PageStatus::LoadingMore;
        debug!(view = ?self.view, offset = self.offset, "Loading next page");
        Some(self.issue(LoadPhase::More, self.params(self.offset)))
    }

    /// Re-enter the failed loading phase with the same parameters
    pub fn retry(&mut self) -> Option<PageRequest> {
        let phase = match &self.status {
            PageStatus::Error { retry, .. } => *retry,
            _ => return None,
        };
        let params = self.last_request.as_ref()?.params.clone();

        self.status = match phase {
            LoadPhase::Initial => PageStatus::Loading,
            LoadPhase::More => PageStatus::LoadingMore,
        };

        info!(view = ?self.view, offset = params.offset, "Retrying page load");
        Some(self.issue(phase, params))
    }

    /// Apply the outcome of `request`.
    ///
    /// Results for anything but the latest request are discarded. A failure
    /// leaves the accumulated entities untouched.
    pub fn complete(
        &mut self,
        request: &PageRequest,
        result: Result<CatalogPage, CatalogError>,
    ) -> Completion {
        if request.generation != self.generation {
            debug!(
                view = ?self.view,
                generation = request.generation,
                current = self.generation,
                "Discarding stale page"
            );
            return Completion::Stale;
        }

        match result {
            Ok(page) => {
                let entities = self.retain_view_subtype(page.entities);
                let received = entities.len();

                match request.phase {
                    LoadPhase::Initial => self.entities = entities,
                    LoadPhase::More => self.entities.extend(entities),
                }

                // A full page (after narrowing) means there may be more; exact
                // multiples cost one empty fetch.
                self.has_more = received == request.params.limit as usize;
                self.offset = request.params.offset + request.params.limit;
                self.status = PageStatus::Ready;

                debug!(
                    view = ?self.view,
                    received,
                    total = self.entities.len(),
                    has_more = self.has_more,
                    "Page applied"
                );
            }
            Err(error) => {
                warn!(view = ?self.view, error = %error, "Page load failed");
                self.status = PageStatus::Error {
                    error,
                    retry: request.phase,
                };
            }
        }

        Completion::Applied
    }

    /// Run `request` against `service` and apply its outcome
    pub async fn drive(&mut self, service: &CatalogService, request: PageRequest) -> Completion {
        let result = service.query(&request.params).await;
        self.complete(&request, result)
    }

    pub fn view(&self) -> ViewKind {
        self.view
    }

    pub fn entities(&self) -> &[CatalogEntity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn status(&self) -> &PageStatus {
        &self.status
    }

    pub fn error(&self) -> Option<&CatalogError> {
        match &self.status {
            PageStatus::Error { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn in_flight(&self) -> bool {
        matches!(self.status, PageStatus::Loading | PageStatus::LoadingMore)
    }

    pub fn render_strategy(&self) -> RenderStrategy {
        self.render_policy.strategy_for(self.entities.len())
    }

    fn issue(&mut self, phase: LoadPhase, params: QueryParams) -> PageRequest {
        self.generation += 1;
        let request = PageRequest {
            generation: self.generation,
            phase,
            params,
        };
        self.last_request = Some(request.clone());
        request
    }

    /// Upstream cannot combine subtype and text filters, so text queries
    /// are sent alone and narrowed here.
    fn params(&self, offset: u32) -> QueryParams {
        let params = QueryParams::new(self.page_size, offset);
        match (&self.text, self.view.subtype()) {
            (Some(text), _) => params.with_text(text.clone()),
            (None, Some(subtype)) => params.with_subtype(subtype),
            (None, None) => params,
        }
    }

    fn retain_view_subtype(&self, entities: Vec<CatalogEntity>) -> Vec<CatalogEntity> {
        match (&self.text, self.view.subtype()) {
            (Some(_), Some(subtype)) => entities
                .into_iter()
                .filter(|e| e.attributes.subtype == Some(subtype))
                .collect(),
            _ => entities,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PageLinks;
    use crate::test_support::{anime_json, list_json, service_for, service_with_timeout};
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;

    fn page_of(first_id: usize, count: usize, subtype: Subtype) -> CatalogPage {
        let entities = (first_id..first_id + count)
            .map(|id| {
                let mut entity = CatalogEntity::new(id.to_string(), format!("Anime {id}"));
                entity.attributes.subtype = Some(subtype);
                entity
            })
            .collect();

        CatalogPage {
            entities,
            total_count: None,
            links: PageLinks::default(),
        }
    }

    #[test]
    fn test_first_page_then_short_page() {
        let mut controller = PaginationController::new(ViewKind::Series, 20);

        let request = controller.start();
        assert_eq!(request.phase, LoadPhase::Initial);
        assert_eq!(request.params.subtype, Some(Subtype::Tv));
        assert_eq!(request.params.offset, 0);
        assert_eq!(request.params.limit, 20);
        assert!(controller.in_flight());

        controller.complete(&request, Ok(page_of(1, 20, Subtype::Tv)));
        assert_eq!(controller.len(), 20);
        assert!(controller.has_more());
        assert_eq!(controller.offset(), 20);
        assert_eq!(controller.status(), &PageStatus::Ready);

        let request = controller.load_more().unwrap();
        assert_eq!(request.params.offset, 20);
        assert_eq!(controller.status(), &PageStatus::LoadingMore);

        controller.complete(&request, Ok(page_of(21, 7, Subtype::Tv)));
        assert_eq!(controller.len(), 27);
        assert!(!controller.has_more());
        assert_eq!(controller.offset(), 40);
        assert_eq!(controller.entities()[20].id, "21");

        assert!(controller.load_more().is_none());
    }

    #[test]
    fn test_exact_multiple_costs_one_empty_fetch() {
        let mut controller = PaginationController::new(ViewKind::Movies, 10);

        let request = controller.start();
        controller.complete(&request, Ok(page_of(1, 10, Subtype::Movie)));
        assert!(controller.has_more());

        let request = controller.load_more().unwrap();
        controller.complete(&request, Ok(page_of(11, 0, Subtype::Movie)));
        assert!(!controller.has_more());
        assert_eq!(controller.len(), 10);
    }

    #[test]
    fn test_error_keeps_entities_and_retry_repeats_request() {
        let mut controller = PaginationController::new(ViewKind::Series, 20);
        let request = controller.start();
        controller.complete(&request, Ok(page_of(1, 20, Subtype::Tv)));

        let request = controller.load_more().unwrap();
        controller.complete(&request, Err(CatalogError::network()));

        assert_eq!(controller.len(), 20);
        assert_eq!(controller.error(), Some(&CatalogError::network()));
        assert_eq!(
            controller.status(),
            &PageStatus::Error {
                error: CatalogError::network(),
                retry: LoadPhase::More
            }
        );
        assert!(controller.load_more().is_none());

        let retry = controller.retry().unwrap();
        assert_eq!(retry.phase, LoadPhase::More);
        assert_eq!(retry.params, request.params);
        assert!(retry.generation > request.generation);
        assert_eq!(controller.status(), &PageStatus::LoadingMore);

        controller.complete(&retry, Ok(page_of(21, 5, Subtype::Tv)));
        assert_eq!(controller.len(), 25);
    }

    #[test]
    fn test_retry_only_after_error() {
        let mut controller = PaginationController::new(ViewKind::Series, 20);
        assert!(controller.retry().is_none());

        let request = controller.start();
        controller.complete(&request, Err(CatalogError::service()));

        let retry = controller.retry().unwrap();
        assert_eq!(retry.phase, LoadPhase::Initial);
        assert_eq!(retry.params.offset, 0);
        assert_eq!(controller.status(), &PageStatus::Loading);
        assert!(controller.retry().is_none());
    }

    #[test]
    fn test_stale_completion_is_discarded() {
        let mut controller = PaginationController::new(ViewKind::Series, 20);
        let old = controller.start();
        let fresh = controller.set_filter(Some("bebop".to_string())).unwrap();

        assert_eq!(
            controller.complete(&old, Ok(page_of(1, 20, Subtype::Tv))),
            Completion::Stale
        );
        assert!(controller.is_empty());
        assert_eq!(controller.status(), &PageStatus::Loading);

        assert_eq!(
            controller.complete(&fresh, Ok(page_of(100, 3, Subtype::Tv))),
            Completion::Applied
        );
        assert_eq!(controller.len(), 3);
    }

    #[test]
    fn test_filter_change_resets_state() {
        let mut controller = PaginationController::new(ViewKind::Series, 20);
        let request = controller.start();
        controller.complete(&request, Ok(page_of(1, 20, Subtype::Tv)));

        let request = controller
            .set_filter(Some("  cowboy  ".to_string()))
            .unwrap();
        assert_eq!(controller.filter(), Some("cowboy"));
        assert!(controller.is_empty());
        assert_eq!(controller.offset(), 0);
        assert!(controller.has_more());
        assert_eq!(request.params.text.as_deref(), Some("cowboy"));
        assert_eq!(request.params.subtype, None);

        // Same filter again: nothing to do
        assert!(controller.set_filter(Some("cowboy".to_string())).is_none());

        let request = controller.set_filter(Some("   ".to_string())).unwrap();
        assert_eq!(controller.filter(), None);
        assert_eq!(request.params.subtype, Some(Subtype::Tv));
    }

    #[test]
    fn test_text_results_narrowed_to_view_subtype() {
        let mut controller = PaginationController::new(ViewKind::Movies, 4);
        let request = controller.set_filter(Some("ghost".to_string())).unwrap();

        let mut page = page_of(1, 2, Subtype::Movie);
        page.entities.extend(page_of(3, 2, Subtype::Tv).entities);
        controller.complete(&request, Ok(page));

        assert_eq!(controller.len(), 2);
        assert!(controller
            .entities()
            .iter()
            .all(|e| e.attributes.subtype == Some(Subtype::Movie)));
        // Judged on the narrowed page
        assert!(!controller.has_more());
        assert_eq!(controller.offset(), 4);
    }

    #[test]
    fn test_narrowed_page_decides_has_more() {
        let mut controller = PaginationController::new(ViewKind::Series, 20);
        let request = controller.set_filter(Some("naruto".to_string())).unwrap();

        let mut page = page_of(1, 12, Subtype::Tv);
        page.entities.extend(page_of(13, 8, Subtype::Movie).entities);
        controller.complete(&request, Ok(page));

        assert_eq!(controller.len(), 12);
        assert!(!controller.has_more());
        assert!(controller.load_more().is_none());

        let request = controller.set_filter(Some("bebop".to_string())).unwrap();
        controller.complete(&request, Ok(page_of(100, 20, Subtype::Tv)));
        assert!(controller.has_more());
        assert_eq!(controller.load_more().unwrap().params.offset, 20);
    }

    #[test]
    fn test_scroll_gating() {
        let mut controller = PaginationController::new(ViewKind::Series, 20);
        assert!(!controller.should_load_more(10.0));

        let request = controller.start();
        assert!(controller.on_scroll(10.0).is_none());

        controller.complete(&request, Ok(page_of(1, 20, Subtype::Tv)));
        assert!(!controller.should_load_more(200.0));
        assert!(controller.on_scroll(450.0).is_none());
        assert!(controller.should_load_more(199.0));

        let request = controller.on_scroll(50.0).unwrap();
        assert_eq!(request.params.offset, 20);
        assert!(controller.on_scroll(0.0).is_none());
    }

    #[test]
    fn test_render_strategy() {
        let mut controller = PaginationController::new(ViewKind::Series, 50);
        assert_eq!(controller.render_strategy(), RenderStrategy::Grid);

        let request = controller.start();
        controller.complete(&request, Ok(page_of(1, 50, Subtype::Tv)));
        assert_eq!(controller.render_strategy(), RenderStrategy::Grid);

        let request = controller.load_more().unwrap();
        controller.complete(&request, Ok(page_of(51, 1, Subtype::Tv)));
        assert_eq!(
            controller.render_strategy(),
            RenderStrategy::Virtualized { row_height: 400 }
        );
    }

    #[test]
    fn test_for_view_uses_config() {
        let server = MockServer::start();
        let service = service_for(&server).with_page_size(12);
        let config = PaginationConfig {
            scroll_threshold_px: 100.0,
            virtualization_threshold: 5,
            row_height_px: 300,
        };

        let mut controller = PaginationController::for_view(ViewKind::Movies, &service, &config);
        let request = controller.start();
        assert_eq!(request.params.limit, 12);
        assert_eq!(request.params.subtype, Some(Subtype::Movie));

        controller.complete(&request, Ok(page_of(1, 12, Subtype::Movie)));
        assert!(!controller.should_load_more(150.0));
        assert_eq!(
            controller.render_strategy(),
            RenderStrategy::Virtualized { row_height: 300 }
        );
    }

    #[tokio::test]
    async fn test_drive_against_catalog() {
        let server = MockServer::start_async().await;
        let first = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/anime")
                    .query_param("filter[subtype]", "TV")
                    .query_param("page[offset]", "0");
                then.status(200).json_body(list_json(1, 20, "TV"));
            })
            .await;
        let second = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/anime")
                    .query_param("filter[subtype]", "TV")
                    .query_param("page[offset]", "20");
                then.status(200).json_body(list_json(21, 7, "TV"));
            })
            .await;

        let service = service_for(&server);
        let mut controller = PaginationController::new(ViewKind::Series, service.page_size());

        let request = controller.start();
        assert_eq!(controller.drive(&service, request).await, Completion::Applied);
        assert_eq!(controller.len(), 20);
        assert!(controller.has_more());
        assert_eq!(controller.offset(), 20);

        let request = controller.on_scroll(0.0).unwrap();
        controller.drive(&service, request).await;
        assert_eq!(controller.len(), 27);
        assert!(!controller.has_more());

        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_drive_timeout_keeps_entities() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/anime").query_param("page[offset]", "0");
                then.status(200).json_body(json!({
                    "data": [anime_json("1", "Trigun", "TV", "")]
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/anime").query_param("page[offset]", "1");
                then.status(200)
                    .delay(Duration::from_secs(2))
                    .json_body(list_json(2, 1, "TV"));
            })
            .await;

        let service = service_with_timeout(&server, Duration::from_millis(200));
        let mut controller = PaginationController::new(ViewKind::Series, 1);

        let request = controller.start();
        controller.drive(&service, request).await;
        assert_eq!(controller.len(), 1);

        let request = controller.load_more().unwrap();
        controller.drive(&service, request).await;

        assert_eq!(controller.error(), Some(&CatalogError::network()));
        assert_eq!(controller.len(), 1);
        assert_eq!(controller.entities()[0].attributes.title, "Trigun");
    }
}
