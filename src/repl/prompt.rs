//! Compose prompt

use reedline::{Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus};

/// Prompt showing the API host and how many posts were composed
pub struct ComposePrompt {
    host: String,
    composed: usize,
}

impl ComposePrompt {
    pub fn new(host: String, composed: usize) -> Self {
        Self { host, composed }
    }
}

impl Prompt for ComposePrompt {
    fn render_prompt_left(&self) -> std::borrow::Cow<'_, str> {
        format!("wingman@{}> ", self.host).into()
    }

    fn render_prompt_right(&self) -> std::borrow::Cow<'_, str> {
        if self.composed == 0 {
            "".into()
        } else {
            format!("[{} posted]", self.composed).into()
        }
    }

    fn render_prompt_indicator(&self, _prompt_mode: PromptEditMode) -> std::borrow::Cow<'_, str> {
        "".into()
    }

    fn render_prompt_multiline_indicator(&self) -> std::borrow::Cow<'_, str> {
        "... ".into()
    }

    /// Render the history search prompt
    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> std::borrow::Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        format!("({}reverse-search: {}) ", prefix, history_search.term).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_rendering() {
        let prompt = ComposePrompt::new("localhost:3000".to_string(), 0);
        assert_eq!(prompt.render_prompt_left(), "wingman@localhost:3000> ");
        assert_eq!(prompt.render_prompt_right(), "");

        let prompt = ComposePrompt::new("localhost:3000".to_string(), 3);
        assert_eq!(prompt.render_prompt_right(), "[3 posted]");
    }
}
