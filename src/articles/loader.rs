//! Incremental article resolution.
//!
//! An [`ArticleLoader`] owns the article map for one page view. IDs are
//! requested in batches; an ID that is already resolved or already being
//! fetched is never requested again, so concurrent triggers for the same
//! section issue a single request. The map only grows.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::content::Article;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("storage error: {0}")]
    Storage(String),
}

/// Resolves article IDs to full articles.
///
/// IDs without a matching article are simply absent from the result.
#[async_trait]
pub trait ArticleFetcher: Send + Sync {
    async fn fetch_articles(&self, ids: &[String]) -> Result<Vec<Article>, FetchError>;
}

#[async_trait]
impl<T: ArticleFetcher + ?Sized> ArticleFetcher for Arc<T> {
    async fn fetch_articles(&self, ids: &[String]) -> Result<Vec<Article>, FetchError> {
        (**self).fetch_articles(ids).await
    }
}

/// What a call to [`ArticleLoader::load_articles`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Every ID was already resolved or in flight; no request was made.
    Skipped,
    Loaded { requested: usize, received: usize },
    /// The request failed; the IDs are eligible for the next trigger.
    Failed(String),
    /// The loader was cancelled before the batch landed.
    Cancelled,
}

#[derive(Debug, Default)]
struct LoaderState {
    articles: HashMap<String, Article>,
    in_flight: HashSet<String>,
}

pub struct ArticleLoader<F> {
    fetcher: F,
    state: Mutex<LoaderState>,
    cancel: CancellationToken,
}

impl<F: ArticleFetcher> ArticleLoader<F> {
    #[must_use]
    pub fn new(fetcher: F) -> Self {
        Self::with_initial(fetcher, Vec::new())
    }

    /// Create a loader pre-seeded with articles that arrived with the page.
    #[must_use]
    pub fn with_initial<I>(fetcher: F, initial: I) -> Self
    where
        I: IntoIterator<Item = Article>,
    {
        let articles = initial.into_iter().map(|a| (a.id.clone(), a)).collect();
        Self {
            fetcher,
            state: Mutex::new(LoaderState {
                articles,
                in_flight: HashSet::new(),
            }),
            cancel: CancellationToken::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LoaderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Request the IDs of `ids` that are neither resolved nor in flight.
    ///
    /// Issues at most one fetch. On failure the in-flight marks are rolled
    /// back and nothing is cached, so a later call retries from scratch.
    pub async fn load_articles(&self, ids: &[String]) -> LoadOutcome {
        if self.cancel.is_cancelled() {
            return LoadOutcome::Cancelled;
        }

        let batch: Vec<String> = {
            let mut guard = self.lock();
            let LoaderState {
                articles,
                in_flight,
            } = &mut *guard;
            ids.iter()
                .filter(|id| !articles.contains_key(*id) && in_flight.insert((*id).clone()))
                .cloned()
                .collect()
        };

        if batch.is_empty() {
            return LoadOutcome::Skipped;
        }

        debug!(count = batch.len(), "Loading article batch");

        let result = tokio::select! {
            biased;
            () = self.cancel.cancelled() => None,
            result = self.fetcher.fetch_articles(&batch) => Some(result),
        };

        let mut state = self.lock();
        for id in &batch {
            state.in_flight.remove(id);
        }

        match result {
            None => {
                debug!(count = batch.len(), "Article batch dropped after cancellation");
                LoadOutcome::Cancelled
            }
            Some(Ok(articles)) => {
                let received = articles.len();
                for article in articles {
                    state.articles.insert(article.id.clone(), article);
                }
                debug!(requested = batch.len(), received, "Article batch merged");
                LoadOutcome::Loaded {
                    requested: batch.len(),
                    received,
                }
            }
            Some(Err(e)) => {
                warn!(error = %e, count = batch.len(), "Failed to load article batch");
                LoadOutcome::Failed(e.to_string())
            }
        }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<Article> {
        self.lock().articles.get(id).cloned()
    }

    /// Resolved articles for `ids`, in the order given. Missing IDs are skipped.
    #[must_use]
    pub fn articles_for(&self, ids: &[String]) -> Vec<Article> {
        let state = self.lock();
        ids.iter()
            .filter_map(|id| state.articles.get(id).cloned())
            .collect()
    }

    /// Snapshot of every resolved article.
    #[must_use]
    pub fn articles(&self) -> HashMap<String, Article> {
        self.lock().articles.clone()
    }

    #[must_use]
    pub fn resolved_count(&self) -> usize {
        self.lock().articles.len()
    }

    #[must_use]
    pub fn in_flight(&self) -> HashSet<String> {
        self.lock().in_flight.clone()
    }

    #[must_use]
    pub fn is_loading(&self, id: &str) -> bool {
        self.lock().in_flight.contains(id)
    }

    /// Abort pending batches; their results are discarded.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use super::*;

    pub(crate) fn article(id: &str) -> Article {
        Article {
            id: id.to_string(),
            title: format!("Title {id}"),
            sub_title: String::new(),
            body: String::new(),
            source: "Yonhap".to_string(),
            send_date: "20210101".to_string(),
            link: format!("https://news.example/{id}"),
            image_urls: Vec::new(),
        }
    }

    pub(crate) fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    /// Yields once before answering so concurrent callers interleave.
    #[derive(Default)]
    pub(crate) struct CountingFetcher {
        pub calls: AtomicUsize,
        pub requested: Mutex<Vec<Vec<String>>>,
        pub fail: AtomicBool,
    }

    #[async_trait]
    impl ArticleFetcher for CountingFetcher {
        async fn fetch_articles(&self, ids: &[String]) -> Result<Vec<Article>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requested.lock().unwrap().push(ids.to_vec());
            tokio::task::yield_now().await;
            if self.fail.load(Ordering::SeqCst) {
                return Err(FetchError::Request("connection reset".to_string()));
            }
            Ok(ids
                .iter()
                .filter(|id| !id.starts_with("missing"))
                .map(|id| article(id))
                .collect())
        }
    }

    struct NeverFetcher;

    #[async_trait]
    impl ArticleFetcher for NeverFetcher {
        async fn fetch_articles(&self, _ids: &[String]) -> Result<Vec<Article>, FetchError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_initial_articles_are_seeded() {
        let loader = ArticleLoader::with_initial(CountingFetcher::default(), vec![article("a")]);
        assert!(loader.get("a").is_some());

        let outcome = loader.load_articles(&ids(&["a"])).await;
        assert_eq!(outcome, LoadOutcome::Skipped);
        assert_eq!(loader.fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_loads_only_unresolved_ids() {
        let loader = ArticleLoader::with_initial(CountingFetcher::default(), vec![article("a")]);
        let outcome = loader.load_articles(&ids(&["a", "b", "c", "b"])).await;
        assert_eq!(
            outcome,
            LoadOutcome::Loaded {
                requested: 2,
                received: 2
            }
        );
        assert_eq!(
            *loader.fetcher.requested.lock().unwrap(),
            vec![ids(&["b", "c"])]
        );
        assert_eq!(loader.resolved_count(), 3);
        assert!(loader.in_flight().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_calls_issue_one_request() {
        let loader = ArticleLoader::new(CountingFetcher::default());
        let wanted = ids(&["a", "b"]);

        let (first, second) = tokio::join!(
            loader.load_articles(&wanted),
            loader.load_articles(&wanted)
        );

        assert_eq!(loader.fetcher.calls.load(Ordering::SeqCst), 1);
        let loaded = LoadOutcome::Loaded {
            requested: 2,
            received: 2,
        };
        let mut outcomes = [first, second];
        outcomes.sort_by_key(|o| matches!(o, LoadOutcome::Skipped));
        assert_eq!(outcomes, [loaded, LoadOutcome::Skipped]);
        assert!(loader.get("a").is_some() && loader.get("b").is_some());
    }

    #[tokio::test]
    async fn test_missing_ids_are_not_errors() {
        let loader = ArticleLoader::new(CountingFetcher::default());
        let outcome = loader.load_articles(&ids(&["a", "missing-1"])).await;
        assert_eq!(
            outcome,
            LoadOutcome::Loaded {
                requested: 2,
                received: 1
            }
        );
        assert!(loader.get("missing-1").is_none());
        assert!(!loader.is_loading("missing-1"));
    }

    #[tokio::test]
    async fn test_failure_rolls_back_and_retries() {
        let loader = ArticleLoader::new(CountingFetcher::default());
        loader.fetcher.fail.store(true, Ordering::SeqCst);

        let outcome = loader.load_articles(&ids(&["a"])).await;
        assert!(matches!(
            outcome,
            LoadOutcome::Failed(ref msg) if msg.contains("connection reset")
        ));
        assert!(loader.in_flight().is_empty());
        assert!(loader.get("a").is_none());

        loader.fetcher.fail.store(false, Ordering::SeqCst);
        let retry = loader.load_articles(&ids(&["a"])).await;
        assert!(matches!(retry, LoadOutcome::Loaded { .. }));
        assert_eq!(loader.fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cancel_discards_pending_batch() {
        let loader = ArticleLoader::new(NeverFetcher);
        let wanted = ids(&["a"]);

        let (outcome, ()) = tokio::join!(loader.load_articles(&wanted), async {
            tokio::task::yield_now().await;
            assert!(loader.is_loading("a"));
            loader.cancel();
        });

        assert_eq!(outcome, LoadOutcome::Cancelled);
        assert!(loader.in_flight().is_empty());
        assert!(loader.is_cancelled());
        assert_eq!(loader.load_articles(&wanted).await, LoadOutcome::Cancelled);
    }

    #[tokio::test]
    async fn test_articles_for_preserves_order() {
        let loader = ArticleLoader::with_initial(
            CountingFetcher::default(),
            vec![article("a"), article("b")],
        );
        let found = loader.articles_for(&ids(&["b", "x", "a"]));
        let found_ids: Vec<_> = found.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(found_ids, vec!["b", "a"]);
        assert_eq!(loader.articles().len(), 2);
    }
}
