//! Completer for reedline - turns the open `@token` into mention suggestions

use std::time::Duration;

use reedline::{Completer, Span, Suggestion};
use tokio::runtime::Handle;

use super::shared_state::SharedState;
use crate::mention::{MentionEngine, SuggestionState};

/// Mention completer for reedline
///
/// The line editor calls `complete` synchronously, so the completer runs the
/// debounced search and then blocks on it settling, bounded by `wait_limit`.
pub struct MentionCompleter {
    engine: MentionEngine,
    shared_state: SharedState,
    wait_limit: Duration,
}

impl MentionCompleter {
    /// Create a new mention completer
    ///
    /// # Arguments
    /// * `engine` - Mention engine backing this input
    /// * `shared_state` - Shared state receiving every offered candidate
    /// * `wait_limit` - Longest time to wait for a search to settle
    pub fn new(engine: MentionEngine, shared_state: SharedState, wait_limit: Duration) -> Self {
        Self {
            engine,
            shared_state,
            wait_limit,
        }
    }

    fn wait_for_results(&self) -> SuggestionState {
        let engine = &self.engine;
        let limit = self.wait_limit;
        tokio::task::block_in_place(|| {
            Handle::current().block_on(async move {
                match tokio::time::timeout(limit, engine.settled()).await {
                    Ok(state) => state,
                    Err(_) => {
                        tracing::debug!("mention search did not settle in time");
                        engine.suggestions()
                    }
                }
            })
        })
    }
}

impl Completer for MentionCompleter {
    /// Complete the input at the given cursor position
    ///
    /// # Arguments
    /// * `line` - The input line
    /// * `pos` - Cursor position (byte index)
    ///
    /// # Returns
    /// * `Vec<Suggestion>` - One suggestion per candidate, replacing the `@query`
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        // The fetcher spawns its debounce timer on the runtime
        if Handle::try_current().is_err() {
            return Vec::new();
        }

        self.engine.on_input(line, pos);
        let Some(mention) = self.engine.active_match().cloned() else {
            return Vec::new();
        };

        let state = self.wait_for_results();
        let users = state.selection.suggestions();
        self.shared_state.remember(users);

        users
            .iter()
            .map(|user| {
                let description = user.describe();
                Suggestion {
                    value: format!("{} ", user.mention_string()),
                    description: (!description.is_empty()).then_some(description),
                    span: Span::new(mention.index, mention.end()),
                    append_whitespace: false,
                    ..Suggestion::default()
                }
            })
            .collect()
    }
}
