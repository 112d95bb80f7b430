//! Debounced exercise search with cancel-on-supersede and response caching.
//!
//! `DebouncedSearch` owns the lifecycle of at most one outstanding search.
//! Typing (`input`) restarts the debounce timer; submitting (`search_now`)
//! skips it. Either call aborts whatever was pending or already in flight,
//! so a stale response can never overwrite a newer one. Results are
//! published on a `watch` channel; drop the receiver to unsubscribe.

use crate::cache::TtlLruCache;
use crate::config::CacheConfig;
use crate::exercises::{filter_exercises, Exercise, ExerciseFilter};
use crate::Result;
use futures::future::BoxFuture;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Something that can answer an exercise search
pub trait SearchBackend: Send + Sync + 'static {
    fn search(&self, term: String) -> BoxFuture<'static, Result<Vec<Exercise>>>;
}

/// Search results shared between the cache and subscribers
pub type SearchResults = Arc<Vec<Exercise>>;

/// Cache of search responses keyed by normalized term
pub type SearchCache = Arc<Mutex<TtlLruCache<String, SearchResults>>>;

/// What subscribers currently see
#[derive(Clone, Debug, PartialEq)]
pub enum SearchState {
    Idle,
    Loading { term: String },
    Ready { term: String, results: SearchResults },
    Failed { term: String, message: String },
}

pub struct DebouncedSearch<B: SearchBackend> {
    backend: Arc<B>,
    cache: SearchCache,
    delay: Duration,
    state: Arc<watch::Sender<SearchState>>,
    pending: Option<JoinHandle<()>>,
}

impl<B: SearchBackend> DebouncedSearch<B> {
    /// Create a search with its own response cache sized from `config`
    pub fn new(backend: Arc<B>, config: &CacheConfig) -> Self {
        let cache = Arc::new(Mutex::new(TtlLruCache::new(
            config.search_capacity,
            config.search_ttl(),
        )));
        Self::with_cache(backend, config.search_debounce(), cache)
    }

    /// Create a search that shares an existing response cache
    pub fn with_cache(backend: Arc<B>, delay: Duration, cache: SearchCache) -> Self {
        let (state, _) = watch::channel(SearchState::Idle);
        Self {
            backend,
            cache,
            delay,
            state: Arc::new(state),
            pending: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SearchState {
        self.state.borrow().clone()
    }

    /// A keystroke: search for `term` once the debounce delay passes quietly
    ///
    /// Must be called from within a tokio runtime.
    pub fn input(&mut self, term: &str) {
        self.schedule(term, Some(self.delay));
    }

    /// An explicit submit: search for `term` immediately
    ///
    /// Must be called from within a tokio runtime.
    pub fn search_now(&mut self, term: &str) {
        self.schedule(term, None);
    }

    /// Abort the pending or in-flight search, if any
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    fn schedule(&mut self, term: &str, delay: Option<Duration>) {
        self.cancel();

        let term = term.trim().to_string();
        if term.is_empty() {
            self.state.send_replace(SearchState::Idle);
            return;
        }

        let backend = Arc::clone(&self.backend);
        let cache = Arc::clone(&self.cache);
        let state = Arc::clone(&self.state);

        self.pending = Some(tokio::spawn(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            run_search(backend.as_ref(), &cache, &state, term).await;
        }));
    }
}

impl<B: SearchBackend> Drop for DebouncedSearch<B> {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn cache_key(term: &str) -> String {
    term.to_lowercase()
}

async fn run_search<B: SearchBackend>(
    backend: &B,
    cache: &SearchCache,
    state: &watch::Sender<SearchState>,
    term: String,
) {
    let key = cache_key(&term);

    let cached = cache.lock().ok().and_then(|mut c| c.get(&key));
    if let Some(results) = cached {
        tracing::debug!("Search cache hit for {:?}", term);
        state.send_replace(SearchState::Ready { term, results });
        return;
    }

    state.send_replace(SearchState::Loading { term: term.clone() });

    match backend.search(term.clone()).await {
        Ok(results) => {
            let results = Arc::new(results);
            if let Ok(mut c) = cache.lock() {
                c.insert(key, Arc::clone(&results));
            }
            tracing::debug!("Search for {:?} returned {} results", term, results.len());
            state.send_replace(SearchState::Ready { term, results });
        }
        Err(e) => {
            tracing::warn!("Search for {:?} failed: {}", term, e);
            state.send_replace(SearchState::Failed {
                term,
                message: e.to_string(),
            });
        }
    }
}

/// Search backend over an in-memory exercise list
pub struct LocalExerciseIndex {
    exercises: Arc<Vec<Exercise>>,
}

impl LocalExerciseIndex {
    pub fn new(exercises: Vec<Exercise>) -> Self {
        Self {
            exercises: Arc::new(exercises),
        }
    }
}

impl SearchBackend for LocalExerciseIndex {
    fn search(&self, term: String) -> BoxFuture<'static, Result<Vec<Exercise>>> {
        let exercises = Arc::clone(&self.exercises);
        Box::pin(async move {
            let filter = ExerciseFilter::query(&term);
            Ok(filter_exercises(&exercises, &filter)
                .into_iter()
                .cloned()
                .collect())
        })
    }
}
