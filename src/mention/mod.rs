//! Mention autocomplete
//!
//! Dependency order, leaves first:
//! - `matcher`: finds the `@token` under the cursor
//! - `fetcher`: debounced remote lookup for the token's query
//! - `selection`: keyboard navigation over the results
//! - `splice`: rewrites the text when a result is chosen
//! - `engine`: the per-input state machine tying them together

pub mod candidate;
pub mod engine;
pub mod fetcher;
pub mod matcher;
pub mod selection;
pub mod splice;

pub use candidate::NetworkUser;
pub use engine::{KeyOutcome, MentionEngine, MentionKey, MentionState};
pub use fetcher::{FetcherOptions, SuggestionFetcher, SuggestionState};
pub use matcher::{MentionMatch, extract_mentions, find_mention_match};
pub use selection::SelectionState;
pub use splice::{SpliceResult, retain_present, select_user};
