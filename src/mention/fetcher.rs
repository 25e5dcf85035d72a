//! Debounced suggestion fetching
//!
//! Each call to [`SuggestionFetcher::search`] cancels the previous call's
//! pending timer, so only the last query inside a debounce window reaches
//! the network. Once a request has been sent it is not cancelled; instead
//! every search bumps a generation counter and responses for an older
//! generation are dropped (unless `discard_stale` is off).
//!
//! State is published through a `tokio::sync::watch` channel so hosts can
//! render from [`SuggestionFetcher::snapshot`] or await updates.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::candidate::NetworkUser;
use super::selection::SelectionState;
use crate::api::{SearchQuery, UserSearch};
use crate::config::MentionConfig;

/// What the dropdown renders from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionState {
    pub selection: SelectionState,
    /// Set when a search is scheduled, cleared when it settles
    pub is_searching: bool,
}

/// Tunables for [`SuggestionFetcher`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetcherOptions {
    pub debounce: Duration,
    pub page_size: u32,
    pub discard_stale: bool,
}

impl Default for FetcherOptions {
    fn default() -> Self {
        Self::from(&MentionConfig::default())
    }
}

impl From<&MentionConfig> for FetcherOptions {
    fn from(config: &MentionConfig) -> Self {
        Self {
            debounce: config.debounce(),
            page_size: config.page_size,
            discard_stale: config.discard_stale_responses,
        }
    }
}

/// Debounced, cache-of-one user search.
///
/// Must be used from within a tokio runtime; `search` spawns the timer task.
pub struct SuggestionFetcher {
    search: Arc<dyn UserSearch>,
    options: FetcherOptions,
    state: Arc<watch::Sender<SuggestionState>>,
    generation: Arc<AtomicU64>,
    pending: Option<CancellationToken>,
}

impl SuggestionFetcher {
    pub fn new(search: Arc<dyn UserSearch>, options: FetcherOptions) -> Self {
        let (state, _) = watch::channel(SuggestionState::default());
        Self {
            search,
            options,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
            pending: None,
        }
    }

    pub fn options(&self) -> FetcherOptions {
        self.options
    }

    /// Schedule a search for `query`.
    ///
    /// An empty query clears suggestions and the loading flag right away
    /// without touching the network.
    pub fn search(&mut self, query: &str) {
        self.cancel_pending();

        if query.is_empty() {
            self.reset();
            return;
        }

        let mut generation = 0;
        self.state.send_modify(|s| {
            generation = self.bump_generation();
            s.is_searching = true;
        });

        let token = CancellationToken::new();
        self.pending = Some(token.clone());

        let search = Arc::clone(&self.search);
        let state = Arc::clone(&self.state);
        let current = Arc::clone(&self.generation);
        let options = self.options;
        let query = SearchQuery::new(query, options.page_size);

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    trace!(query = %query.name, "debounced search superseded");
                    return;
                }
                _ = tokio::time::sleep(options.debounce) => {}
            }

            let result = search.search_users(&query).await;

            let users = match result {
                Ok(page) => {
                    debug!(query = %query.name, count = page.items.len(), "search settled");
                    page.items
                }
                Err(e) => {
                    warn!(query = %query.name, error = %e, "mention search failed");
                    Vec::new()
                }
            };

            // Checked under the channel lock so a newer search cannot slip in
            // between the check and the write
            state.send_if_modified(|s| {
                if options.discard_stale && current.load(Ordering::SeqCst) != generation {
                    debug!(query = %query.name, "discarding stale search response");
                    return false;
                }
                s.selection.replace(users);
                s.is_searching = false;
                true
            });
        });
    }

    /// Single teardown path: cancel the pending timer and reset everything.
    ///
    /// A request that is already in flight keeps running, but its response
    /// is dropped when stale responses are discarded.
    pub fn close(&mut self) {
        self.cancel_pending();
        self.reset();
    }

    pub fn navigate_up(&self) {
        self.state.send_modify(|s| s.selection.navigate_up());
    }

    pub fn navigate_down(&self) {
        self.state.send_modify(|s| s.selection.navigate_down());
    }

    /// The highlighted user, if any
    pub fn selected(&self) -> Option<NetworkUser> {
        self.state.borrow().selection.selected().cloned()
    }

    pub fn snapshot(&self) -> SuggestionState {
        self.state.borrow().clone()
    }

    pub fn is_searching(&self) -> bool {
        self.state.borrow().is_searching
    }

    pub fn has_suggestions(&self) -> bool {
        !self.state.borrow().selection.is_empty()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<SuggestionState> {
        self.state.subscribe()
    }

    /// Wait until no search is scheduled or in flight.
    ///
    /// Returns immediately when idle. A hung request keeps this waiting, so
    /// callers that cannot block indefinitely should wrap it in a timeout.
    pub async fn settled(&self) -> SuggestionState {
        let mut rx = self.state.subscribe();
        match rx.wait_for(|s| !s.is_searching).await {
            Ok(state) => state.clone(),
            Err(_) => self.snapshot(),
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }

    fn reset(&self) {
        self.state.send_modify(|s| {
            self.bump_generation();
            s.selection.clear();
            s.is_searching = false;
        });
    }

    fn bump_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl Drop for SuggestionFetcher {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

impl std::fmt::Debug for SuggestionFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestionFetcher")
            .field("options", &self.options)
            .field("state", &*self.state.borrow())
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::SearchPage;
    use crate::error::{ApiError, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every query and answers with users whose first name starts
    /// with it. Queries listed in `slow` take longer to answer.
    #[derive(Default)]
    pub(crate) struct MockSearch {
        pub calls: Mutex<Vec<String>>,
        pub users: Vec<NetworkUser>,
        pub slow: Vec<(String, Duration)>,
        pub fail: bool,
    }

    impl MockSearch {
        pub(crate) fn with_users(users: Vec<NetworkUser>) -> Self {
            Self {
                users,
                ..Self::default()
            }
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl UserSearch for MockSearch {
        async fn search_users(&self, query: &SearchQuery) -> Result<SearchPage> {
            self.calls.lock().unwrap().push(query.name.clone());

            if let Some((_, delay)) = self.slow.iter().find(|(q, _)| q == &query.name) {
                tokio::time::sleep(*delay).await;
            }
            if self.fail {
                return Err(ApiError::Request("connection refused".into()).into());
            }

            let needle = query.name.to_lowercase();
            let items = self
                .users
                .iter()
                .filter(|u| u.first_name.to_lowercase().starts_with(&needle))
                .take(query.limit as usize)
                .cloned()
                .collect();
            Ok(SearchPage {
                items,
                ..SearchPage::default()
            })
        }
    }

    pub(crate) fn people() -> Vec<NetworkUser> {
        vec![
            NetworkUser::new("u1", "John", "Doe"),
            NetworkUser::new("u2", "Joan", "Smith"),
            NetworkUser::new("u3", "Ana", "Lee"),
        ]
    }

    fn fetcher(mock: Arc<MockSearch>, discard_stale: bool) -> SuggestionFetcher {
        SuggestionFetcher::new(
            mock,
            FetcherOptions {
                debounce: Duration::from_millis(300),
                page_size: 10,
                discard_stale,
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_sends_only_last_query() {
        let mock = Arc::new(MockSearch::with_users(people()));
        let mut fetcher = fetcher(mock.clone(), true);

        fetcher.search("a");
        assert!(fetcher.is_searching());
        tokio::time::sleep(Duration::from_millis(100)).await;
        fetcher.search("jo");

        let state = fetcher.settled().await;
        assert_eq!(mock.calls(), vec!["jo".to_string()]);
        assert_eq!(state.selection.len(), 2);
        assert!(!state.is_searching);
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_sent_before_window_elapses() {
        let mock = Arc::new(MockSearch::with_users(people()));
        let mut fetcher = fetcher(mock.clone(), true);

        fetcher.search("jo");
        tokio::time::sleep(Duration::from_millis(299)).await;
        assert!(mock.calls().is_empty());

        tokio::time::sleep(Duration::from_millis(2)).await;
        fetcher.settled().await;
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_query_clears_without_network() {
        let mock = Arc::new(MockSearch::with_users(people()));
        let mut fetcher = fetcher(mock.clone(), true);

        fetcher.search("jo");
        fetcher.settled().await;
        assert!(fetcher.has_suggestions());

        fetcher.search("");
        assert!(!fetcher.is_searching());
        assert!(!fetcher.has_suggestions());
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_degrades_to_empty() {
        let mock = Arc::new(MockSearch {
            fail: true,
            ..MockSearch::with_users(people())
        });
        let mut fetcher = fetcher(mock, true);

        fetcher.search("jo");
        let state = fetcher.settled().await;
        assert!(state.selection.is_empty());
        assert!(!state.is_searching);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_resets_and_cancels_timer() {
        let mock = Arc::new(MockSearch::with_users(people()));
        let mut fetcher = fetcher(mock.clone(), true);

        fetcher.search("jo");
        fetcher.settled().await;
        fetcher.navigate_down();
        fetcher.search("joh");
        fetcher.close();

        let state = fetcher.snapshot();
        assert!(state.selection.is_empty());
        assert_eq!(state.selection.selected_index(), 0);
        assert!(!state.is_searching);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(mock.calls(), vec!["jo".to_string()]);
    }

    /// "an" is sent first and answers slowly; "jo" is sent later and answers
    /// fast. With the guard on, the slow answer must not win.
    fn racing_mock() -> Arc<MockSearch> {
        Arc::new(MockSearch {
            slow: vec![("an".to_string(), Duration::from_secs(2))],
            ..MockSearch::with_users(people())
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_is_discarded() {
        let mock = racing_mock();
        let mut fetcher = fetcher(mock.clone(), true);

        fetcher.search("an");
        tokio::time::sleep(Duration::from_millis(400)).await;
        fetcher.search("jo");
        fetcher.settled().await;

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(mock.calls(), vec!["an".to_string(), "jo".to_string()]);
        let ids: Vec<String> = fetcher
            .snapshot()
            .selection
            .suggestions()
            .iter()
            .map(|u| u.id.clone())
            .collect();
        assert_eq!(ids, vec!["u1".to_string(), "u2".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_keeps_newer_search_loading() {
        let mock = Arc::new(MockSearch {
            slow: vec![("an".to_string(), Duration::from_millis(200))],
            ..MockSearch::with_users(people())
        });
        let mut fetcher = fetcher(mock, true);

        // "an" goes out at 300ms and answers at 500ms, while "jo" is still
        // debouncing until 700ms
        fetcher.search("an");
        tokio::time::sleep(Duration::from_millis(400)).await;
        fetcher.search("jo");
        tokio::time::sleep(Duration::from_millis(150)).await;

        let state = fetcher.snapshot();
        assert!(state.is_searching);
        assert!(state.selection.is_empty());

        let settled = fetcher.settled().await;
        assert!(!settled.is_searching);
        assert_eq!(settled.selection.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_writer_wins_without_guard() {
        let mock = racing_mock();
        let mut fetcher = fetcher(mock, false);

        fetcher.search("an");
        tokio::time::sleep(Duration::from_millis(400)).await;
        fetcher.search("jo");
        fetcher.settled().await;

        tokio::time::sleep(Duration::from_secs(3)).await;
        let state = fetcher.snapshot();
        assert_eq!(state.selection.len(), 1);
        assert_eq!(state.selection.suggestions()[0].id, "u3");
    }
}
