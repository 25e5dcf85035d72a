//! Per-input mention state machine
//!
//! ```text
//!   Idle --(keystroke opens @token)--> Searching --(results)--> Suggesting
//!    ^                                     |                        |
//!    +---- selection / Escape / token closed by space or deletion --+
//! ```
//!
//! The machine has no terminal state; it lives as long as the text input
//! that owns it.

use std::sync::Arc;

use tracing::debug;

use super::candidate::NetworkUser;
use super::fetcher::{FetcherOptions, SuggestionFetcher, SuggestionState};
use super::matcher::{MentionMatch, find_mention_match};
use super::splice::{SpliceResult, select_user};
use crate::api::UserSearch;

/// Keys the hosting input forwards to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionKey {
    Up,
    Down,
    Enter { shift: bool },
    Escape,
    /// Anything else; always passed through to normal editing
    Other,
}

/// What the host should do after forwarding a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Engine did not use the key
    PassThrough,
    /// Engine consumed the key (selection moved)
    Handled,
    /// A mention was inserted; apply the new text and cursor
    Committed(SpliceResult),
    /// Suggestions were dismissed
    Closed,
}

/// Coarse state for rendering decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionState {
    /// No open token, or an open token with nothing to show
    Idle,
    /// Open token with a search scheduled or in flight
    Searching,
    /// Results available for selection
    Suggesting,
}

type TaggedListener = Box<dyn FnMut(&[String]) + Send>;

/// Mention autocomplete for one text input.
pub struct MentionEngine {
    fetcher: SuggestionFetcher,
    active: Option<MentionMatch>,
    tagged_users: Vec<String>,
    on_tagged_users_change: Option<TaggedListener>,
}

impl MentionEngine {
    pub fn new(search: Arc<dyn UserSearch>, options: FetcherOptions) -> Self {
        Self::with_fetcher(SuggestionFetcher::new(search, options))
    }

    pub fn with_fetcher(fetcher: SuggestionFetcher) -> Self {
        Self {
            fetcher,
            active: None,
            tagged_users: Vec::new(),
            on_tagged_users_change: None,
        }
    }

    /// Register a callback fired after each successful insertion with the
    /// full list of tagged user IDs.
    pub fn on_tagged_users_change<F>(&mut self, listener: F)
    where
        F: FnMut(&[String]) + Send + 'static,
    {
        self.on_tagged_users_change = Some(Box::new(listener));
    }

    /// Re-run the matcher after the text or cursor changed.
    pub fn on_input(&mut self, text: &str, cursor: usize) {
        match find_mention_match(text, cursor) {
            Some(found) => {
                let unchanged = self
                    .active
                    .as_ref()
                    .is_some_and(|m| m.index == found.index && m.query == found.query);
                if !unchanged {
                    self.fetcher.search(&found.query);
                }
                self.active = Some(found);
            }
            None => {
                if self.active.take().is_some() {
                    debug!("mention token closed");
                    self.fetcher.close();
                }
            }
        }
    }

    /// Handle a navigation key.
    ///
    /// Keys are only consumed while the dropdown has something to show.
    pub fn handle_key(&mut self, key: MentionKey, text: &str) -> KeyOutcome {
        if !self.fetcher.has_suggestions() {
            return KeyOutcome::PassThrough;
        }

        match key {
            MentionKey::Up => {
                self.fetcher.navigate_up();
                KeyOutcome::Handled
            }
            MentionKey::Down => {
                self.fetcher.navigate_down();
                KeyOutcome::Handled
            }
            MentionKey::Enter { shift: false } => match self.fetcher.selected() {
                Some(user) => match self.select_user(&user, text) {
                    Some(result) => KeyOutcome::Committed(result),
                    None => KeyOutcome::PassThrough,
                },
                None => KeyOutcome::PassThrough,
            },
            MentionKey::Escape => {
                self.close_suggestions();
                KeyOutcome::Closed
            }
            MentionKey::Enter { shift: true } | MentionKey::Other => KeyOutcome::PassThrough,
        }
    }

    /// Insert `user` at the active token.
    ///
    /// Returns `None` when no token is open. On success the tagged list is
    /// updated, the listener fires, and suggestions are torn down.
    pub fn select_user(&mut self, user: &NetworkUser, text: &str) -> Option<SpliceResult> {
        let mention = self.active.as_ref()?;
        let result = select_user(user, text, mention);

        if !self.tagged_users.contains(&user.id) {
            self.tagged_users.push(user.id.clone());
        }
        if let Some(listener) = self.on_tagged_users_change.as_mut() {
            listener(&self.tagged_users);
        }
        debug!(user = %user.id, "mention inserted");

        self.close_suggestions();
        Some(result)
    }

    /// Cancel any pending search and reset suggestions.
    pub fn close_suggestions(&mut self) {
        self.active = None;
        self.fetcher.close();
    }

    pub fn state(&self) -> MentionState {
        if self.active.is_none() {
            return MentionState::Idle;
        }
        let snapshot = self.fetcher.snapshot();
        if snapshot.is_searching {
            MentionState::Searching
        } else if !snapshot.selection.is_empty() {
            MentionState::Suggesting
        } else {
            MentionState::Idle
        }
    }

    pub fn active_match(&self) -> Option<&MentionMatch> {
        self.active.as_ref()
    }

    pub fn suggestions(&self) -> SuggestionState {
        self.fetcher.snapshot()
    }

    /// Wait for the current search to settle
    pub async fn settled(&self) -> SuggestionState {
        self.fetcher.settled().await
    }

    pub fn tagged_users(&self) -> &[String] {
        &self.tagged_users
    }

    /// Hand the tagged users to the submitting form and start over
    pub fn take_tagged_users(&mut self) -> Vec<String> {
        std::mem::take(&mut self.tagged_users)
    }
}

impl std::fmt::Debug for MentionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MentionEngine")
            .field("fetcher", &self.fetcher)
            .field("active", &self.active)
            .field("tagged_users", &self.tagged_users)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mention::fetcher::tests::{MockSearch, people};
    use std::sync::Mutex;
    use std::time::Duration;

    fn engine(mock: Arc<MockSearch>) -> MentionEngine {
        MentionEngine::new(
            mock,
            FetcherOptions {
                debounce: Duration::from_millis(300),
                page_size: 10,
                discard_stale: true,
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_mention_flow() {
        let mock = Arc::new(MockSearch::with_users(people()));
        let mut engine = engine(mock);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        engine.on_tagged_users_change(move |ids| {
            *sink.lock().unwrap() = ids.to_vec();
        });

        assert_eq!(engine.state(), MentionState::Idle);

        let text = "Hi @jo";
        engine.on_input(text, text.len());
        assert_eq!(engine.state(), MentionState::Searching);

        engine.settled().await;
        assert_eq!(engine.state(), MentionState::Suggesting);

        assert_eq!(engine.handle_key(MentionKey::Down, text), KeyOutcome::Handled);
        let outcome = engine.handle_key(MentionKey::Enter { shift: false }, text);
        let KeyOutcome::Committed(result) = outcome else {
            panic!("expected a committed mention, got {outcome:?}");
        };

        assert_eq!(result.new_text, "Hi @Joan Smith ");
        assert_eq!(result.new_cursor_position, "Hi @Joan Smith ".len());
        assert_eq!(engine.tagged_users(), ["u2".to_string()]);
        assert_eq!(*seen.lock().unwrap(), vec!["u2".to_string()]);
        assert_eq!(engine.state(), MentionState::Idle);
        assert!(engine.suggestions().selection.is_empty());

        // Typing on after the inserted space does not reopen the token
        engine.on_input(&result.new_text, result.new_cursor_position);
        assert!(engine.active_match().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_space_closes_token() {
        let mock = Arc::new(MockSearch::with_users(people()));
        let mut engine = engine(mock);

        engine.on_input("@jo", 3);
        engine.settled().await;
        assert_eq!(engine.state(), MentionState::Suggesting);

        engine.on_input("@jo ", 4);
        assert_eq!(engine.state(), MentionState::Idle);
        assert!(engine.suggestions().selection.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_escape_and_passthrough() {
        let mock = Arc::new(MockSearch::with_users(people()));
        let mut engine = engine(mock);

        // Nothing to show yet: every key passes through
        assert_eq!(
            engine.handle_key(MentionKey::Escape, ""),
            KeyOutcome::PassThrough
        );

        engine.on_input("@a", 2);
        engine.settled().await;
        assert_eq!(
            engine.handle_key(MentionKey::Enter { shift: true }, "@a"),
            KeyOutcome::PassThrough
        );
        assert_eq!(
            engine.handle_key(MentionKey::Other, "@a"),
            KeyOutcome::PassThrough
        );
        assert_eq!(engine.handle_key(MentionKey::Escape, "@a"), KeyOutcome::Closed);
        assert_eq!(engine.state(), MentionState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_input_does_not_resend() {
        let mock = Arc::new(MockSearch::with_users(people()));
        let mut engine = engine(mock.clone());

        engine.on_input("@jo", 3);
        engine.settled().await;
        // Cursor moves but the token is identical
        engine.on_input("@jo", 3);
        engine.settled().await;
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tagged_users_accumulate_once() {
        let mock = Arc::new(MockSearch::with_users(people()));
        let mut engine = engine(mock);
        let john = NetworkUser::new("u1", "John", "Doe");

        engine.on_input("@jo", 3);
        let first = engine.select_user(&john, "@jo").unwrap();

        let text = format!("{}@jo", first.new_text);
        engine.on_input(&text, text.len());
        engine.select_user(&john, &text).unwrap();

        assert_eq!(engine.tagged_users(), ["u1".to_string()]);
        assert_eq!(engine.take_tagged_users(), vec!["u1".to_string()]);
        assert!(engine.tagged_users().is_empty());

        // No open token, nothing to splice into
        assert!(engine.select_user(&john, "plain").is_none());
    }
}
