//! Interactive compose prompt
//!
//! A reedline editor where typing `@` followed by a few letters and pressing
//! Tab searches the network and offers matching people. Submitting a line
//! resolves the mentions it contains to user IDs:
//!
//! ```text
//! wingman@localhost:3000> great work @Ana Lee and @John Doe
//! {"body":"great work @Ana Lee and @John Doe","taggedUsers":["u2","u1"]}
//! ```

mod completer;
mod highlighter;
mod prompt;
mod shared_state;

pub use completer::MentionCompleter;
pub use highlighter::MentionHighlighter;
pub use prompt::ComposePrompt;
pub use shared_state::SharedState;

use std::sync::Arc;
use std::time::Duration;

use reedline::{
    DescriptionMode, Emacs, FileBackedHistory, IdeMenu, KeyCode, KeyModifiers,
    Keybindings, MenuBuilder, Reedline, ReedlineEvent, ReedlineMenu, Signal,
    default_emacs_keybindings,
};
use serde::Serialize;

use crate::api::UserSearch;
use crate::config::Config;
use crate::error::Result;
use crate::mention::{FetcherOptions, MentionEngine, extract_mentions};

const COMPLETION_MENU_NAME: &str = "mention_menu";

/// Extra slack on top of the request timeout when the completer waits
const SETTLE_SLACK: Duration = Duration::from_millis(500);

/// A submitted post body and the users it mentions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedPost {
    pub body: String,
    pub tagged_users: Vec<String>,
}

/// What the loop should do with a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplInput {
    Post(String),
    Quit,
    Empty,
}

impl ReplInput {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed {
            "" => ReplInput::Empty,
            ":q" | ":quit" | ":exit" => ReplInput::Quit,
            _ => ReplInput::Post(trimmed.to_string()),
        }
    }
}

/// Line editor driving one compose input
pub struct ReplEngine {
    /// Line editor
    editor: Reedline,

    /// Shared state with the completer and highlighter
    shared_state: SharedState,

    /// Whether to continue running
    running: bool,
}

impl ReplEngine {
    /// Create a new REPL engine
    ///
    /// # Arguments
    /// * `config` - Effective configuration
    /// * `search` - Source of mention candidates
    /// * `shared_state` - State shared with completer and highlighter
    ///
    /// # Returns
    /// * `Result<Self>` - New REPL engine or error
    pub fn new(
        config: &Config,
        search: Arc<dyn UserSearch>,
        shared_state: SharedState,
    ) -> Result<Self> {
        let engine = MentionEngine::new(search, FetcherOptions::from(&config.mentions));
        let wait_limit = config.mentions.debounce() + config.request_timeout() + SETTLE_SLACK;
        let completer = Box::new(MentionCompleter::new(
            engine,
            shared_state.clone(),
            wait_limit,
        ));

        let highlighter = Box::new(MentionHighlighter::new(
            shared_state.clone(),
            config.display.highlight_mentions,
        ));

        let mut keybindings = default_emacs_keybindings();
        configure_mention_keybindings(&mut keybindings);

        let mut editor = Reedline::create()
            .with_quick_completions(false)
            .with_completer(completer)
            .with_highlighter(highlighter)
            .with_menu(ReedlineMenu::EngineCompleter(create_mention_menu()))
            .with_edit_mode(Box::new(Emacs::new(keybindings)))
            .with_ansi_colors(config.display.color_output);

        if config.history.persist {
            match FileBackedHistory::with_file(
                config.history.max_size,
                config.history.file_path.clone(),
            ) {
                Ok(history) => editor = editor.with_history(Box::new(history)),
                Err(e) => tracing::warn!(error = %e, "history disabled"),
            }
        }

        Ok(Self {
            editor,
            shared_state,
            running: true,
        })
    }

    /// Read a single line of input
    ///
    /// # Returns
    /// * `Result<Option<String>>` - Input line or None on Ctrl-D
    pub fn read_line(&mut self) -> Result<Option<String>> {
        let prompt = ComposePrompt::new(
            self.shared_state.get_api_host(),
            self.shared_state.composed_count(),
        );
        match self.editor.read_line(&prompt)? {
            Signal::Success(line) => Ok(Some(line)),
            // Ctrl-C drops the current draft
            Signal::CtrlC => Ok(Some(String::new())),
            Signal::CtrlD => {
                self.running = false;
                Ok(None)
            }
            #[allow(unreachable_patterns)]
            _ => Ok(Some(String::new())),
        }
    }

    /// Resolve a submitted body against every candidate offered so far
    pub fn compose(&self, body: &str) -> ComposedPost {
        let post = compose_post(body, &self.shared_state);
        self.shared_state.record_composed();
        post
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stop(&mut self) {
        self.running = false;
    }
}

/// Resolve the mentions in `body` to user IDs
pub fn compose_post(body: &str, shared_state: &SharedState) -> ComposedPost {
    let known = shared_state.known_users();
    let tagged_users = extract_mentions(body, &known)
        .into_iter()
        .map(|user| user.id.clone())
        .collect();
    ComposedPost {
        body: body.to_string(),
        tagged_users,
    }
}

fn configure_mention_keybindings(keybindings: &mut Keybindings) {
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::UntilFound(vec![
            ReedlineEvent::Menu(COMPLETION_MENU_NAME.to_string()),
            ReedlineEvent::MenuNext,
        ]),
    );
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Down,
        ReedlineEvent::UntilFound(vec![ReedlineEvent::MenuDown, ReedlineEvent::Down]),
    );
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Up,
        ReedlineEvent::UntilFound(vec![ReedlineEvent::MenuUp, ReedlineEvent::Up]),
    );
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Esc, ReedlineEvent::Esc);
}

fn create_mention_menu() -> Box<IdeMenu> {
    Box::new(
        IdeMenu::default()
            .with_name(COMPLETION_MENU_NAME)
            .with_description_mode(DescriptionMode::PreferRight)
            .with_padding(1)
            .with_min_completion_width(0)
            .with_max_completion_width(40)
            .with_max_description_width(60),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mention::NetworkUser;

    #[test]
    fn test_parse_input() {
        assert_eq!(ReplInput::parse("   "), ReplInput::Empty);
        assert_eq!(ReplInput::parse(":q"), ReplInput::Quit);
        assert_eq!(ReplInput::parse(":quit "), ReplInput::Quit);
        assert_eq!(
            ReplInput::parse(" hello @Ana Lee "),
            ReplInput::Post("hello @Ana Lee".to_string())
        );
    }

    #[test]
    fn test_compose_post_resolves_known_mentions() {
        let state = SharedState::new("localhost".to_string());
        state.remember(&[
            NetworkUser::new("u1", "John", "Doe"),
            NetworkUser::new("u2", "Ana", "Lee"),
        ]);

        let post = compose_post("great work @Ana Lee and @John Doe", &state);
        assert_eq!(post.tagged_users, vec!["u2".to_string(), "u1".to_string()]);

        let json = serde_json::to_string(&post).unwrap();
        assert_eq!(
            json,
            r#"{"body":"great work @Ana Lee and @John Doe","taggedUsers":["u2","u1"]}"#
        );
    }

    #[test]
    fn test_unknown_mentions_are_not_tagged() {
        let state = SharedState::new("localhost".to_string());
        let post = compose_post("hi @Someone Else", &state);
        assert!(post.tagged_users.is_empty());
    }
}
