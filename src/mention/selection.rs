//! Keyboard-navigable suggestion list

use super::candidate::NetworkUser;

/// Current suggestion list and the highlighted entry.
///
/// `selected_index` is always a valid index while `suggestions` is
/// non-empty, and 0 otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    suggestions: Vec<NetworkUser>,
    selected_index: usize,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn suggestions(&self) -> &[NetworkUser] {
        &self.suggestions
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.suggestions.len()
    }

    /// Move the highlight up one entry, stopping at the first.
    pub fn navigate_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    /// Move the highlight down one entry, stopping at the last.
    pub fn navigate_down(&mut self) {
        if self.selected_index + 1 < self.suggestions.len() {
            self.selected_index += 1;
        }
    }

    /// The highlighted user, if the list is non-empty
    pub fn selected(&self) -> Option<&NetworkUser> {
        self.suggestions.get(self.selected_index)
    }

    /// Overwrite the list with a fresh result set
    pub fn replace(&mut self, suggestions: Vec<NetworkUser>) {
        self.suggestions = suggestions;
        self.selected_index = 0;
    }

    pub fn clear(&mut self) {
        self.suggestions.clear();
        self.selected_index = 0;
    }
}
