//! Result aggregation controller.
//!
//! Owns the search session, the rendered view, the source filter, the
//! recent-search log, the lazy image loader, and the detail overlay, and
//! drives them from backend responses.
//!
//! # Concurrency
//!
//! Methods take `&self` so a UI can call them from concurrent tasks (a
//! "Load More" click racing a scroll trigger). State sits behind a mutex
//! that is never held across an await. Mutual exclusion of fetches comes
//! from the session's loading flag, claimed with
//! [`SearchSession::try_begin_loading`] and released by guard drop on every
//! exit path, cancellation and panics included.
//!
//! Each session carries a token. A response is only applied if its token
//! still matches the current session, so a request started for an old
//! query can never touch a newer one. Starting a new search also cancels
//! the old request outright, and every request is bounded by the
//! configured timeout.

use anyhow::{anyhow, Result};
use serde::Serialize;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::backend::{HttpBackend, SearchBackend};
use crate::config::Config;
use crate::detail::{DetailOverlay, DetailSnapshot, PointerTarget};
use crate::error::{FetchError, DETAIL_ERROR_NOTICE, SEARCH_ERROR_NOTICE};
use crate::filter::SourceFilter;
use crate::history::SearchHistory;
use crate::indicator::{LoadEvent, LoadingIndicator, NoIndicator};
use crate::lazy_image::{ImageId, LazyImageLoader};
use crate::models::{AddToCollectionRequest, Collection, SearchPage, SourceId};
use crate::render::{self, DetailView};
use crate::session::{SearchSession, SessionSnapshot};
use crate::view::{CardId, RenderSettings, ResultView};

/// Controller tunables, usually taken from [`Config`].
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub render: RenderSettings,
    pub history_limit: usize,
    pub scroll_threshold_px: f64,
    pub request_timeout: Duration,
    pub hidden_sources: Vec<SourceId>,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from(&Config::minimal())
    }
}

impl From<&Config> for ControllerSettings {
    fn from(config: &Config) -> Self {
        Self {
            render: RenderSettings {
                synopsis_cutoff: config.display.synopsis_cutoff,
                max_items_per_source: config.display.max_items_per_source,
            },
            history_limit: config.display.history_limit,
            scroll_threshold_px: config.display.scroll_threshold_px,
            request_timeout: config.backend.timeout(),
            hidden_sources: config.filter.hidden_sources.clone(),
        }
    }
}

/// Result of a fetch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FetchOutcome {
    /// The page was merged into the view.
    Loaded {
        page: u32,
        items: usize,
        has_more: bool,
    },
    /// Page 1 came back empty across every source.
    NoResults,
    /// No request was sent.
    Skipped { reason: SkipReason },
    /// The response belonged to a superseded session and was dropped.
    Stale,
    /// The request failed; `notice` is what the result area shows.
    Failed { notice: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    EmptyQuery,
    NoSession,
    /// The query is not the one the current session is for.
    NotCurrentQuery,
    InFlight,
    /// Every page has been loaded.
    Exhausted,
    /// Only the next page (or a page-1 refresh) may be requested.
    OutOfOrder,
}

struct State {
    session: Option<SearchSession>,
    last_token: u64,
    view: ResultView,
    filter: SourceFilter,
    history: SearchHistory,
    images: LazyImageLoader,
    detail: DetailOverlay,
}

pub struct ResultAggregationController {
    backend: Arc<dyn SearchBackend>,
    settings: ControllerSettings,
    indicator: Box<dyn LoadingIndicator>,
    state: Mutex<State>,
}

impl ResultAggregationController {
    pub fn new(backend: Arc<dyn SearchBackend>, settings: ControllerSettings) -> Self {
        let state = State {
            session: None,
            last_token: 0,
            view: ResultView::new(),
            filter: SourceFilter::with_hidden(&settings.hidden_sources),
            history: SearchHistory::new(settings.history_limit),
            images: LazyImageLoader::new(),
            detail: DetailOverlay::new(),
        };
        Self {
            backend,
            settings,
            indicator: Box::new(NoIndicator),
            state: Mutex::new(state),
        }
    }

    /// A controller talking HTTP to the configured backend.
    pub fn from_config(config: &Config) -> Result<Self> {
        let backend = HttpBackend::new(&config.backend)?;
        Ok(Self::new(Arc::new(backend), ControllerSettings::from(config)))
    }

    pub fn with_indicator(mut self, indicator: Box<dyn LoadingIndicator>) -> Self {
        self.indicator = indicator;
        self
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn bounded<T>(
        &self,
        request: impl Future<Output = Result<T, FetchError>>,
    ) -> Result<T, FetchError> {
        let limit = self.settings.request_timeout;
        tokio::time::timeout(limit, request)
            .await
            .unwrap_or(Err(FetchError::Timeout(limit)))
    }

    // ============ Session ============

    /// Begin a new search: reset the session, clear the result area, log
    /// the query, and load page 1.
    pub async fn start_search(&self, query: &str) -> FetchOutcome {
        let query = query.trim();
        if query.is_empty() {
            return FetchOutcome::Skipped {
                reason: SkipReason::EmptyQuery,
            };
        }

        {
            let mut state = self.lock();
            if let Some(previous) = state.session.take() {
                previous.cancel();
            }
            state.last_token += 1;
            let token = state.last_token;
            state.session = Some(SearchSession::new(query, token));
            state.view.clear();
            state.images.reset();
            state.detail.close();
            state.history.record(query);
            info!(query, token, "search started");
        }

        self.fetch_page(query, 1).await
    }

    /// Fetch one page of the current session's query.
    ///
    /// Page 1 replaces the view; later pages append. Does nothing while
    /// another fetch of the session is in flight.
    pub async fn fetch_page(&self, query: &str, page: u32) -> FetchOutcome {
        let (guard, token, cancel) = {
            let state = self.lock();
            let Some(session) = state.session.as_ref() else {
                return FetchOutcome::Skipped {
                    reason: SkipReason::NoSession,
                };
            };
            if session.query() != query {
                return FetchOutcome::Skipped {
                    reason: SkipReason::NotCurrentQuery,
                };
            }
            if page != 1 && page != session.next_page() {
                return FetchOutcome::Skipped {
                    reason: SkipReason::OutOfOrder,
                };
            }
            let Some(guard) = session.try_begin_loading() else {
                debug!(query, page, "fetch skipped: already loading");
                return FetchOutcome::Skipped {
                    reason: SkipReason::InFlight,
                };
            };
            (guard, session.token(), session.cancel_token())
        };

        let started = Instant::now();
        self.indicator.report(LoadEvent::Started {
            query: query.to_string(),
            page,
        });

        let result = tokio::select! {
            _ = cancel.cancelled() => Err(FetchError::Cancelled),
            result = self.bounded(self.backend.search(query, page)) => result,
        };

        let outcome = {
            let mut state = self.lock();
            self.apply_result(&mut state, token, page, result)
        };
        drop(guard);

        self.indicator.report(LoadEvent::Finished {
            page,
            outcome: outcome.clone(),
            elapsed: started.elapsed(),
        });
        outcome
    }

    fn apply_result(
        &self,
        state: &mut State,
        token: u64,
        page: u32,
        result: Result<SearchPage, FetchError>,
    ) -> FetchOutcome {
        let current = state.session.as_ref().map(|s| s.token());
        if current != Some(token) {
            debug!(token, ?current, page, "dropping response for superseded search");
            return FetchOutcome::Stale;
        }

        let data = match result {
            Ok(data) => data,
            Err(e) if !e.is_user_visible() => return FetchOutcome::Stale,
            Err(e) => {
                warn!(page, error = %e, "search request failed");
                state.view.set_notice(SEARCH_ERROR_NOTICE);
                return FetchOutcome::Failed {
                    notice: SEARCH_ERROR_NOTICE.to_string(),
                };
            }
        };

        if data.current_page != page {
            warn!(
                requested = page,
                reported = data.current_page,
                "backend reported a different page"
            );
        }

        let State {
            session,
            view,
            filter,
            images,
            ..
        } = state;
        let Some(session) = session.as_mut() else {
            return FetchOutcome::Stale;
        };

        let new_images = view.apply_page(&data, page == 1, self.settings.render, filter);
        if page == 1 {
            images.reset();
        }
        images.observe(new_images);
        session.record_page(page, data.total_pages, data.total_results);

        if view.is_no_results() {
            info!(query = session.query(), "no results");
            return FetchOutcome::NoResults;
        }

        FetchOutcome::Loaded {
            page,
            items: data.item_count(),
            has_more: session.has_more(),
        }
    }

    /// Load the page after the current one, if there is one.
    pub async fn load_more(&self) -> FetchOutcome {
        let (query, next) = {
            let state = self.lock();
            let Some(session) = state.session.as_ref() else {
                return FetchOutcome::Skipped {
                    reason: SkipReason::NoSession,
                };
            };
            if session.is_loading() {
                return FetchOutcome::Skipped {
                    reason: SkipReason::InFlight,
                };
            }
            if !session.has_more() {
                return FetchOutcome::Skipped {
                    reason: SkipReason::Exhausted,
                };
            }
            (session.query().to_string(), session.next_page())
        };
        self.fetch_page(&query, next).await
    }

    /// Scroll trigger: loads more once the viewport bottom is within the
    /// configured threshold of the document's end.
    pub async fn on_scroll(&self, viewport_bottom: f64, document_height: f64) -> Option<FetchOutcome> {
        if document_height - viewport_bottom > self.settings.scroll_threshold_px {
            return None;
        }
        Some(self.load_more().await)
    }

    pub fn session(&self) -> Option<SessionSnapshot> {
        self.lock().session.as_ref().map(SearchSession::snapshot)
    }

    /// Whether the "Load More" control should be enabled.
    pub fn can_load_more(&self) -> bool {
        self.lock()
            .session
            .as_ref()
            .map(|s| s.has_more() && !s.is_loading())
            .unwrap_or(false)
    }

    pub fn view(&self) -> ResultView {
        self.lock().view.clone()
    }

    pub fn history(&self) -> Vec<String> {
        self.lock().history.queries()
    }

    // ============ Filter ============

    /// Flip a source's visibility and re-apply it to rendered cards.
    /// Returns whether the source is now visible.
    pub fn toggle_source(&self, source: SourceId) -> bool {
        let mut state = self.lock();
        let visible = state.filter.toggle(source);
        let touched = state.view.set_source_hidden(source, !visible);
        debug!(%source, visible, touched, "source filter toggled");
        visible
    }

    pub fn visible_sources(&self) -> Vec<SourceId> {
        self.lock().filter.visible().collect()
    }

    // ============ Lazy images ============

    /// Cards scrolled into view. Resolves their deferred images (hidden
    /// cards are not in the viewport) and returns the newly assigned URLs.
    pub fn enter_viewport(&self, cards: &[CardId]) -> Vec<(ImageId, String)> {
        let mut state = self.lock();
        let State { view, images, .. } = &mut *state;
        let mut resolved = Vec::new();
        for card in view.visible_cards().filter(|c| cards.contains(&c.id)) {
            if let Some(id) = card.image_id {
                if let Some(url) = images.enter_viewport(id) {
                    resolved.push((id, url));
                }
            }
        }
        resolved
    }

    pub fn image_src(&self, id: ImageId) -> Option<String> {
        self.lock().images.src(id).map(str::to_string)
    }

    pub fn pending_images(&self) -> usize {
        self.lock().images.pending()
    }

    // ============ Detail overlay ============

    /// Open the overlay for a rendered card.
    pub fn open_detail(&self, card_id: CardId) -> Option<DetailView> {
        let mut state = self.lock();
        let item = state.view.card(card_id)?.item.clone();
        Some(state.detail.open(Some(card_id), item))
    }

    pub fn close_detail(&self) {
        self.lock().detail.close();
    }

    /// Returns `true` if the event closed the overlay.
    pub fn detail_pointer(&self, target: PointerTarget) -> bool {
        self.lock().detail.handle_pointer(target)
    }

    pub fn detail(&self) -> Option<DetailSnapshot> {
        self.lock().detail.snapshot()
    }

    /// Fetch the open item's full record through the backend and re-render
    /// the overlay with it.
    ///
    /// On failure the card-derived content stays and the overlay shows an
    /// error notice.
    pub async fn enrich_detail(&self) -> Result<DetailView> {
        let (card_id, source, id) = {
            let state = self.lock();
            let item = state
                .detail
                .item()
                .ok_or_else(|| anyhow!("no detail view is open"))?;
            let id = render::renderer_for(item.source)
                .item_id(item)
                .ok_or_else(|| anyhow!("item has no identifier to look up"))?;
            (state.detail.card_id(), item.source, id)
        };

        let result = self.bounded(self.backend.details(source, &id)).await;

        let mut state = self.lock();
        if state.detail.card_id() != card_id || !state.detail.is_open() {
            anyhow::bail!("detail view changed while loading");
        }
        match result {
            Ok(full) => state
                .detail
                .enrich(full)
                .ok_or_else(|| anyhow!("detail view closed while loading")),
            Err(e) => {
                warn!(%source, id = %id, error = %e, "detail request failed");
                state.detail.set_notice(DETAIL_ERROR_NOTICE);
                Err(e.into())
            }
        }
    }

    // ============ Collections ============

    pub async fn collections(&self) -> Result<Vec<Collection>, FetchError> {
        self.bounded(self.backend.collections()).await
    }

    /// Add a rendered card's record to a collection; returns the backend's
    /// confirmation message.
    pub async fn add_to_collection(&self, card_id: CardId, collection_id: &str) -> Result<String> {
        let request = {
            let state = self.lock();
            let card = state
                .view
                .card(card_id)
                .ok_or_else(|| anyhow!("no card with id {}", card_id))?;
            AddToCollectionRequest {
                source: card.item.source,
                content: card.item.raw(),
            }
        };
        let message = self
            .bounded(self.backend.add_to_collection(collection_id, &request))
            .await?;
        info!(card_id, collection_id, "added to collection");
        Ok(message)
    }
}
