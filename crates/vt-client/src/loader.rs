//! Incremental list loader.
//!
//! [`ListLoader`] accumulates pages of `GET /api/contents` into one
//! de-duplicated list. Fetches are triggered by scrolling near the bottom,
//! by an explicit [`ListLoader::load_next`], or by a debounced filter change
//! that restarts from page 1.
//!
//! Every fetch runs in its own task under a child of the loader's shutdown
//! token. Starting a fetch cancels the previous one, and a generation
//! counter discards any response that still arrives for a superseded list.
//! Dropping the loader cancels everything it started.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use vt_core::config::LoaderConfig;
use vt_core::MediaType;

use crate::api::{ContentItem, ContentPage, ContentQuery, ContentsApi};
use crate::error::ClientError;

/// Lifecycle of the accumulated list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// Nothing loaded yet, or a filter change is waiting out its debounce.
    Idle,
    Loading,
    /// At least one page loaded and more remain.
    Ready,
    /// The last page has been loaded.
    Exhausted,
    /// Retries ran out; only [`ListLoader::retry`] leaves this state.
    Failed,
}

impl LoadStatus {
    fn is_settled(&self) -> bool {
        matches!(self, Self::Ready | Self::Exhausted | Self::Failed)
    }
}

/// Viewport geometry reported by the scrolling surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub viewport_height: f64,
    pub content_height: f64,
}

impl ScrollMetrics {
    /// Within `margin` of the bottom, or content too short to scroll.
    pub fn near_bottom(&self, margin: f64) -> bool {
        self.content_height <= self.viewport_height
            || self.scroll_top + self.viewport_height >= self.content_height - margin
    }
}

/// Point-in-time copy of the loader state.
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderSnapshot {
    pub query: ContentQuery,
    pub items: Vec<ContentItem>,
    /// Last page merged into `items`; 0 before the first page.
    pub last_page: u32,
    pub total_pages: i64,
    pub total_items: i64,
    pub has_more: bool,
    pub status: LoadStatus,
    pub error: Option<String>,
}

/// Delay before retry number `attempt` (1-based): `base * 2^(attempt - 1)`.
pub fn backoff(base: Duration, attempt: u32) -> Duration {
    base * 2u32.saturating_pow(attempt.saturating_sub(1))
}

struct State {
    query: ContentQuery,
    items: Vec<ContentItem>,
    seen: HashSet<(MediaType, i64)>,
    last_page: u32,
    total_pages: i64,
    total_items: i64,
    has_more: bool,
    status: LoadStatus,
    error: Option<String>,
    generation: u64,
    in_flight: Option<CancellationToken>,
    debounce: Option<CancellationToken>,
    last_scroll_fetch: Option<Instant>,
}

impl State {
    fn new(query: ContentQuery) -> Self {
        Self {
            query,
            items: Vec::new(),
            seen: HashSet::new(),
            last_page: 0,
            total_pages: 0,
            total_items: 0,
            has_more: true,
            status: LoadStatus::Idle,
            error: None,
            generation: 0,
            in_flight: None,
            debounce: None,
            last_scroll_fetch: None,
        }
    }

    /// Invalidate responses of every fetch started so far.
    fn supersede(&mut self) {
        self.generation += 1;
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
    }

    /// Drop accumulated results and start over with `query`.
    fn reset(&mut self, query: ContentQuery) {
        self.supersede();
        self.query = query;
        self.items.clear();
        self.seen.clear();
        self.last_page = 0;
        self.total_pages = 0;
        self.total_items = 0;
        self.has_more = true;
        self.error = None;
    }

    /// Append entries not already present. Returns how many were added.
    fn merge(&mut self, items: Vec<ContentItem>) -> usize {
        let before = self.items.len();
        for item in items {
            if self.seen.insert(item.key()) {
                self.items.push(item);
            }
        }
        self.items.len() - before
    }

    fn debounce_pending(&self) -> bool {
        self.debounce.as_ref().is_some_and(|t| !t.is_cancelled())
    }
}

struct Inner {
    api: Arc<dyn ContentsApi>,
    config: LoaderConfig,
    state: Mutex<State>,
    status_tx: watch::Sender<LoadStatus>,
    shutdown: CancellationToken,
}

impl Inner {
    fn set_status(&self, state: &mut State, status: LoadStatus) {
        state.status = status;
        self.status_tx.send_replace(status);
    }

    fn try_load_next(self: &Arc<Self>, state: &mut State) -> bool {
        if self.shutdown.is_cancelled() || state.debounce_pending() || !state.has_more {
            return false;
        }
        match state.status {
            LoadStatus::Idle | LoadStatus::Ready => {}
            LoadStatus::Loading | LoadStatus::Exhausted | LoadStatus::Failed => return false,
        }
        let page = state.last_page + 1;
        self.spawn_fetch(state, page);
        true
    }

    fn spawn_fetch(self: &Arc<Self>, state: &mut State, page: u32) {
        if let Some(prev) = state.in_flight.take() {
            prev.cancel();
        }
        let cancel = self.shutdown.child_token();
        state.in_flight = Some(cancel.clone());
        state.error = None;
        self.set_status(state, LoadStatus::Loading);

        let inner = Arc::clone(self);
        let query = state.query.clone();
        let generation = state.generation;
        tokio::spawn(async move {
            inner.run_fetch(query, page, generation, cancel).await;
        });
    }

    async fn run_fetch(
        &self,
        query: ContentQuery,
        page: u32,
        generation: u64,
        cancel: CancellationToken,
    ) {
        let attempts = self.config.max_attempts.max(1);
        let base = Duration::from_millis(self.config.base_backoff_ms);

        for attempt in 1..=attempts {
            let result = self
                .api
                .fetch_page(&query, page, self.config.page_size, cancel.clone())
                .await;

            match result {
                Ok(body) => {
                    self.apply(generation, page, body);
                    return;
                }
                Err(e) if e.is_cancelled() || cancel.is_cancelled() => {
                    tracing::debug!(page, "Page fetch cancelled");
                    return;
                }
                Err(e) if attempt == attempts => {
                    tracing::error!(page, attempts, error = %e, "Page fetch failed");
                    self.fail(generation, e);
                    return;
                }
                Err(e) => {
                    let delay = backoff(base, attempt);
                    tracing::warn!(
                        page,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Page fetch failed, retrying"
                    );
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            tracing::debug!(page, "Retry cancelled");
                            return;
                        }
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }

    fn apply(&self, generation: u64, page: u32, body: ContentPage) {
        let mut state = self.state.lock();
        if state.generation != generation {
            tracing::debug!(page, "Discarding stale page");
            return;
        }
        state.in_flight = None;
        let added = state.merge(body.data);
        state.last_page = page;
        state.total_pages = body.pagination.total_pages;
        state.total_items = body.pagination.total_items;
        state.has_more = body.pagination.has_more;
        tracing::debug!(page, added, total = state.items.len(), "Page merged");

        let status = if state.has_more {
            LoadStatus::Ready
        } else {
            LoadStatus::Exhausted
        };
        self.set_status(&mut state, status);
    }

    fn fail(&self, generation: u64, error: ClientError) {
        let mut state = self.state.lock();
        if state.generation != generation {
            return;
        }
        state.in_flight = None;
        state.error = Some(error.to_string());
        self.set_status(&mut state, LoadStatus::Failed);
    }
}

/// Accumulating, de-duplicating page loader over a [`ContentsApi`].
///
/// Methods spawn onto the current Tokio runtime and must be called from
/// within one.
pub struct ListLoader {
    inner: Arc<Inner>,
}

impl ListLoader {
    pub fn new(api: Arc<dyn ContentsApi>, config: LoaderConfig) -> Self {
        Self::with_query(api, config, ContentQuery::default())
    }

    pub fn with_query(api: Arc<dyn ContentsApi>, config: LoaderConfig, query: ContentQuery) -> Self {
        let (status_tx, _) = watch::channel(LoadStatus::Idle);
        Self {
            inner: Arc::new(Inner {
                api,
                config,
                state: Mutex::new(State::new(query)),
                status_tx,
                shutdown: CancellationToken::new(),
            }),
        }
    }

    pub fn status(&self) -> LoadStatus {
        self.inner.state.lock().status
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadStatus> {
        self.inner.status_tx.subscribe()
    }

    pub fn snapshot(&self) -> LoaderSnapshot {
        let state = self.inner.state.lock();
        LoaderSnapshot {
            query: state.query.clone(),
            items: state.items.clone(),
            last_page: state.last_page,
            total_pages: state.total_pages,
            total_items: state.total_items,
            has_more: state.has_more,
            status: state.status,
            error: state.error.clone(),
        }
    }

    /// Wait until the list is `Ready`, `Exhausted` or `Failed`.
    pub async fn settled(&self) -> LoadStatus {
        let mut rx = self.subscribe();
        let settled = match rx.wait_for(LoadStatus::is_settled).await {
            Ok(status) => *status,
            Err(_) => self.status(),
        };
        settled
    }

    /// Fetch the next page unless a fetch is running, the list is
    /// exhausted or failed, or a filter change is pending.
    pub fn load_next(&self) -> bool {
        let mut state = self.inner.state.lock();
        self.inner.try_load_next(&mut state)
    }

    /// Fetch the next page when the viewport nears the bottom, at most once
    /// per throttle window.
    pub fn on_scroll(&self, metrics: ScrollMetrics) -> bool {
        let config = &self.inner.config;
        if !metrics.near_bottom(f64::from(config.scroll_margin_px)) {
            return false;
        }

        let now = Instant::now();
        let throttle = Duration::from_millis(config.throttle_ms);
        let mut state = self.inner.state.lock();
        if let Some(last) = state.last_scroll_fetch {
            if now.duration_since(last) < throttle {
                return false;
            }
        }
        let started = self.inner.try_load_next(&mut state);
        if started {
            state.last_scroll_fetch = Some(now);
        }
        started
    }

    /// Replace the filters. In-flight work is superseded at once; after the
    /// debounce delay the list is cleared and page 1 is fetched.
    pub fn set_filters(&self, query: ContentQuery) {
        if self.inner.shutdown.is_cancelled() {
            return;
        }

        let token = self.inner.shutdown.child_token();
        {
            let mut state = self.inner.state.lock();
            if let Some(prev) = state.debounce.replace(token.clone()) {
                prev.cancel();
            }
            state.supersede();
            self.inner.set_status(&mut state, LoadStatus::Idle);
        }

        let inner = Arc::clone(&self.inner);
        let delay = Duration::from_millis(inner.config.debounce_ms);
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
            let mut state = inner.state.lock();
            if token.is_cancelled() {
                return;
            }
            state.debounce = None;
            state.reset(query);
            inner.spawn_fetch(&mut state, 1);
        });
    }

    /// Start over from page 1 with the current filters and a fresh attempt
    /// budget.
    pub fn retry(&self) {
        if self.inner.shutdown.is_cancelled() {
            return;
        }
        let mut state = self.inner.state.lock();
        if let Some(token) = state.debounce.take() {
            token.cancel();
        }
        let query = state.query.clone();
        state.reset(query);
        self.inner.spawn_fetch(&mut state, 1);
    }

    /// Cancel pending debounces, fetches and retries. The loader stays
    /// inert afterwards.
    pub fn shutdown(&self) {
        self.inner.shutdown.cancel();
        let mut state = self.inner.state.lock();
        state.supersede();
        state.debounce = None;
        if state.status == LoadStatus::Loading {
            self.inner.set_status(&mut state, LoadStatus::Idle);
        }
    }
}

impl Drop for ListLoader {
    fn drop(&mut self) {
        self.inner.shutdown.cancel();
    }
}
