//! Mention highlighter for the compose prompt
//!
//! Completed mentions of known users are shown in bold cyan, the `@token`
//! currently being typed in yellow.

use nu_ansi_term::{Color, Style};
use reedline::{Highlighter, StyledText};

use super::shared_state::SharedState;
use crate::mention::find_mention_match;
use crate::mention::matcher::at_token_start;

pub struct MentionHighlighter {
    shared_state: SharedState,
    enabled: bool,
    mention_style: Style,
    open_token_style: Style,
}

impl MentionHighlighter {
    pub fn new(shared_state: SharedState, enabled: bool) -> Self {
        Self {
            shared_state,
            enabled,
            mention_style: Style::new().bold().fg(Color::Cyan),
            open_token_style: Style::new().fg(Color::Yellow),
        }
    }

    /// Byte spans to style, sorted and non-overlapping
    fn spans(&self, line: &str, cursor: usize) -> Vec<(usize, usize, Style)> {
        let mut spans: Vec<(usize, usize, Style)> = Vec::new();

        for user in self.shared_state.known_users() {
            let needle = user.mention_string();
            for (start, _) in line.match_indices(&needle) {
                if at_token_start(line, start) {
                    spans.push((start, start + needle.len(), self.mention_style));
                }
            }
        }

        if let Some(open) = find_mention_match(line, cursor) {
            spans.push((open.index, open.end(), self.open_token_style));
        }

        // Longest first at equal starts, then drop overlaps
        spans.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));
        let mut kept: Vec<(usize, usize, Style)> = Vec::with_capacity(spans.len());
        for span in spans {
            if kept.last().is_none_or(|last| span.0 >= last.1) {
                kept.push(span);
            }
        }
        kept
    }
}

impl Highlighter for MentionHighlighter {
    fn highlight(&self, line: &str, cursor: usize) -> StyledText {
        let mut styled = StyledText::new();
        if !self.enabled || !self.shared_state.get_color_enabled() {
            styled.push((Style::default(), line.to_string()));
            return styled;
        }

        let mut pos = 0;
        for (start, end, style) in self.spans(line, cursor) {
            if start > pos {
                styled.push((Style::default(), line[pos..start].to_string()));
            }
            styled.push((style, line[start..end].to_string()));
            pos = end;
        }
        if pos < line.len() {
            styled.push((Style::default(), line[pos..].to_string()));
        }
        styled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mention::NetworkUser;

    fn highlighter() -> MentionHighlighter {
        let state = SharedState::new("localhost".to_string());
        state.remember(&[NetworkUser::new("u1", "John", "Doe")]);
        MentionHighlighter::new(state, true)
    }

    fn segments(text: &StyledText) -> Vec<String> {
        text.buffer.iter().map(|(_, s)| s.clone()).collect()
    }

    #[test]
    fn test_highlights_known_and_open_mentions() {
        let h = highlighter();
        let line = "hi @John Doe and @an";
        let styled = h.highlight(line, line.len());

        assert_eq!(
            segments(&styled),
            vec!["hi ", "@John Doe", " and ", "@an"]
        );
        assert_eq!(styled.buffer[1].0, h.mention_style);
        assert_eq!(styled.buffer[3].0, h.open_token_style);
    }

    #[test]
    fn test_embedded_at_is_plain() {
        let h = highlighter();
        let styled = h.highlight("x@John Doe", 10);
        assert_eq!(segments(&styled), vec!["x@John Doe"]);
    }

    #[test]
    fn test_mention_after_tab_is_plain() {
        let h = highlighter();
        let styled = h.highlight("hi\t@John Doe", 2);
        assert_eq!(segments(&styled), vec!["hi\t@John Doe"]);
    }

    #[test]
    fn test_disabled_highlighting() {
        let state = SharedState::new("localhost".to_string());
        let h = MentionHighlighter::new(state, false);
        let styled = h.highlight("@jo", 3);
        assert_eq!(styled.buffer.len(), 1);
    }
}
