//! Rewrites text when a suggestion is chosen

use serde::Serialize;

use super::candidate::NetworkUser;
use super::matcher::{MentionMatch, extract_mentions};

/// Result of inserting a mention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpliceResult {
    pub new_text: String,
    /// Byte offset right after the inserted trailing space
    pub new_cursor_position: usize,
    pub tagged_users: Vec<String>,
}

/// Replace the open `@query` with `@First Last ` and place the cursor after it.
///
/// Everything from `mention.index` through the end of the typed query is
/// replaced; text after the query is kept verbatim.
pub fn select_user(user: &NetworkUser, text: &str, mention: &MentionMatch) -> SpliceResult {
    let mention_string = user.mention_string();
    let tail_start = mention.end().min(text.len());
    let tail = text.get(tail_start..).unwrap_or_default();

    let mut new_text =
        String::with_capacity(mention.before_match.len() + mention_string.len() + 1 + tail.len());
    new_text.push_str(&mention.before_match);
    new_text.push_str(&mention_string);
    new_text.push(' ');
    new_text.push_str(tail);

    SpliceResult {
        new_text,
        new_cursor_position: mention.before_match.len() + mention_string.len() + 1,
        tagged_users: vec![user.id.clone()],
    }
}

/// Keep only tagged IDs whose mention is still present in `text`.
///
/// IDs that do not belong to any of `known` are kept as-is, since there is
/// nothing to check them against.
pub fn retain_present(tagged: &[String], text: &str, known: &[NetworkUser]) -> Vec<String> {
    let present = extract_mentions(text, known);
    tagged
        .iter()
        .filter(|id| {
            !known.iter().any(|u| &u.id == *id) || present.iter().any(|u| &u.id == *id)
        })
        .cloned()
        .collect()
}
