//! Search session state and the single-flight loading guard.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Pagination state of one active query.
///
/// Invariants: `current_page <= total_pages` once a page has loaded, and
/// [`has_more`](SearchSession::has_more) is exactly
/// `current_page < total_pages`.
#[derive(Debug)]
pub struct SearchSession {
    query: String,
    token: u64,
    current_page: u32,
    total_pages: u32,
    total_results: u64,
    loading: Arc<AtomicBool>,
    cancel: CancellationToken,
}

impl SearchSession {
    /// A fresh session positioned before page 1.
    pub fn new(query: impl Into<String>, token: u64) -> Self {
        Self {
            query: query.into(),
            token,
            current_page: 0,
            total_pages: 0,
            total_results: 0,
            loading: Arc::new(AtomicBool::new(false)),
            cancel: CancellationToken::new(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn total_results(&self) -> u64 {
        self.total_results
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub fn has_more(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// The page `load_more` would request next.
    pub fn next_page(&self) -> u32 {
        self.current_page + 1
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Abort whatever request this session has in flight.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Claim the loading flag. `None` while another fetch holds it.
    pub fn try_begin_loading(&self) -> Option<LoadingGuard> {
        self.loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| LoadingGuard {
                flag: self.loading.clone(),
            })
    }

    /// Record a successfully loaded page.
    pub fn record_page(&mut self, page: u32, total_pages: u32, total_results: u64) {
        self.current_page = page;
        self.total_pages = total_pages.max(page);
        self.total_results = total_results;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            query: self.query.clone(),
            token: self.token,
            current_page: self.current_page,
            total_pages: self.total_pages,
            total_results: self.total_results,
            is_loading: self.is_loading(),
            has_more: self.has_more(),
        }
    }
}

/// Releases the loading flag when dropped, on every exit path.
#[derive(Debug)]
pub struct LoadingGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Read-only copy of a session's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub query: String,
    pub token: u64,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_results: u64,
    pub is_loading: bool,
    pub has_more: bool,
}
