//! Detects an in-progress `@name` token under the cursor.
//!
//! All offsets are byte offsets into UTF-8 text, which is what the line
//! editor reports as cursor position.

use serde::Serialize;

use super::candidate::NetworkUser;

/// An open mention token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MentionMatch {
    /// Offset of the `@`
    pub index: usize,
    /// Text typed after the `@` up to the cursor
    pub query: String,
    /// Text preceding the `@`
    pub before_match: String,
}

impl MentionMatch {
    /// Offset one past the end of the typed query
    pub fn end(&self) -> usize {
        self.index + 1 + self.query.len()
    }
}

fn closes_token(ch: char) -> bool {
    ch == ' ' || ch == '\n'
}

/// Whether an `@` at byte offset `pos` may open a mention: it sits at the
/// start of the text or right after a space or newline.
pub(crate) fn at_token_start(text: &str, pos: usize) -> bool {
    text[..pos].chars().next_back().is_none_or(closes_token)
}

/// Find the mention token the cursor is currently inside, if any.
///
/// Returns `None` when no `@` precedes the cursor, when the text between the
/// nearest `@` and the cursor contains a space or newline, or when the `@`
/// is glued to a preceding word (`user@example.com`). An `@` at offset 0
/// counts as preceded by a space.
pub fn find_mention_match(text: &str, cursor: usize) -> Option<MentionMatch> {
    let cursor = cursor.min(text.len());
    if !text.is_char_boundary(cursor) {
        return None;
    }

    let before_cursor = &text[..cursor];
    let index = before_cursor.rfind('@')?;
    let query = &before_cursor[index + 1..];

    if query.chars().any(closes_token) {
        return None;
    }

    if !at_token_start(text, index) {
        return None;
    }

    Some(MentionMatch {
        index,
        query: query.to_string(),
        before_match: text[..index].to_string(),
    })
}

/// Resolve the mentions present in a finished body against known users.
///
/// A user counts as mentioned when their mention string appears at the start
/// of the text or after a space or newline. Each user is reported once, in order of
/// first appearance.
pub fn extract_mentions<'a>(text: &str, candidates: &'a [NetworkUser]) -> Vec<&'a NetworkUser> {
    let mut found: Vec<(usize, &NetworkUser)> = Vec::new();

    for candidate in candidates {
        if found.iter().any(|(_, seen)| seen.id == candidate.id) {
            continue;
        }
        let needle = candidate.mention_string();
        let first = text
            .match_indices(&needle)
            .map(|(pos, _)| pos)
            .find(|&pos| at_token_start(text, pos));
        if let Some(pos) = first {
            found.push((pos, candidate));
        }
    }

    found.sort_by_key(|(pos, _)| *pos);
    found.into_iter().map(|(_, user)| user).collect()
}
