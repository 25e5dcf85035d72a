//! Wingman mentions library
//!
//! Mention autocomplete for free-text inputs (posts, comments) backed by the
//! Wingman network search API.
//!
//! # Modules
//!
//! - `mention`: matcher, debounced fetcher, selection state, splicer and the
//!   per-input engine
//! - `api`: remote user search
//! - `cli`: command-line interface and argument parsing
//! - `config`: configuration management
//! - `error`: error types and handling
//! - `repl`: interactive compose prompt
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use wingman_mentions::{api::HttpUserSearch, config::Config};
//! use wingman_mentions::mention::{FetcherOptions, MentionEngine, MentionKey, KeyOutcome};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let search = Arc::new(HttpUserSearch::new(&config.api)?);
//!     let mut engine = MentionEngine::new(search, FetcherOptions::from(&config.mentions));
//!
//!     let text = "Thanks @jo";
//!     engine.on_input(text, text.len());
//!     engine.settled().await;
//!
//!     if let KeyOutcome::Committed(result) =
//!         engine.handle_key(MentionKey::Enter { shift: false }, text)
//!     {
//!         println!("{} -> {:?}", result.new_text, result.tagged_users);
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod mention;
pub mod repl;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, WingmanError};
pub use mention::{MentionEngine, MentionMatch, NetworkUser, find_mention_match};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
pub fn version() -> &'static str {
    VERSION
}
