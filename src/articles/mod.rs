//! Lazy article loading driven by visibility triggers.

mod loader;
mod visibility;

pub use loader::{ArticleFetcher, ArticleLoader, FetchError, LoadOutcome};
pub use visibility::{Trigger, VisibilityMargins, VisibilityTracker};

use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Largest ID list one article or summary request may carry.
pub const MAX_IDS_PER_REQUEST: usize = 100;

/// A visibility tracker wired to an article loader.
///
/// Every trigger issues at most one batched request for the IDs registered
/// with the item. Dropping the value (unmount) disconnects the tracker and
/// cancels pending batches.
pub struct LazyArticles<K, F: ArticleFetcher> {
    tracker: Mutex<VisibilityTracker<K>>,
    loader: ArticleLoader<F>,
}

impl<K: Eq + Hash, F: ArticleFetcher> LazyArticles<K, F> {
    #[must_use]
    pub fn new(loader: ArticleLoader<F>, margins: VisibilityMargins) -> Self {
        Self {
            tracker: Mutex::new(VisibilityTracker::new(margins)),
            loader,
        }
    }

    fn tracker(&self) -> MutexGuard<'_, VisibilityTracker<K>> {
        self.tracker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Observe an item; a second call for the same key is a no-op.
    pub fn observe(&self, key: K, needed: Vec<String>, preload: Vec<String>) -> bool {
        self.tracker().observe(key, needed, preload)
    }

    /// Handle one visibility event for `key`.
    pub async fn trigger(&self, key: &K, trigger: Trigger) -> LoadOutcome {
        let ids = self.tracker().on_visible(key, trigger);
        if ids.is_empty() {
            return LoadOutcome::Skipped;
        }
        self.loader.load_articles(&ids).await
    }

    /// Handle an item reported `distance_px` below the viewport.
    pub async fn on_distance(&self, key: &K, distance_px: u32) -> LoadOutcome {
        let hit = self.tracker().on_distance(key, distance_px);
        match hit {
            Some((_, ids)) if !ids.is_empty() => self.loader.load_articles(&ids).await,
            _ => LoadOutcome::Skipped,
        }
    }

    #[must_use]
    pub fn loader(&self) -> &ArticleLoader<F> {
        &self.loader
    }

    #[must_use]
    pub fn margins(&self) -> VisibilityMargins {
        self.tracker().margins()
    }

    /// Disconnect the tracker and cancel pending batches.
    pub fn unmount(&self) {
        self.tracker().disconnect();
        self.loader.cancel();
    }
}

impl<K, F: ArticleFetcher> Drop for LazyArticles<K, F> {
    fn drop(&mut self) {
        self.loader.cancel();
    }
}
