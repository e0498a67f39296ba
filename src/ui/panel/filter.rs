//! Filter input handling for the navigation panel.

use crossterm::event::{KeyCode, KeyEvent};

/// Result of processing a key in the filter input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKeyResult {
    /// No visual change needed
    Continue,
    /// Query text changed -- re-filter and reset selection
    QueryChanged,
    /// Enter pressed -- exit insert mode, keep filter text visible
    Deactivated,
    /// Esc pressed -- filter cleared and input closed
    Cleared,
}

/// Filter-related methods on `PanelState`.
impl super::PanelState {
    /// Activate the inline filter input
    pub fn activate_filter(&mut self) {
        self.filter_active = true;
        self.filter_cursor_pos = self.filter_query.chars().count();
    }

    /// Deactivate the filter input (keep text visible but stop accepting keystrokes)
    pub fn deactivate_filter(&mut self) {
        self.filter_active = false;
    }

    /// Clear the filter entirely (text, cursor, active state)
    pub fn clear_filter(&mut self) {
        self.filter_query.clear();
        self.filter_cursor_pos = 0;
        self.filter_active = false;
    }

    /// Whether there is a non-empty filter query
    pub fn has_filter(&self) -> bool {
        !self.filter_query.is_empty()
    }

    /// Byte offset of the cursor in `filter_query`.
    fn cursor_byte(&self) -> usize {
        self.filter_query
            .char_indices()
            .nth(self.filter_cursor_pos)
            .map_or(self.filter_query.len(), |(i, _)| i)
    }

    /// Handle a key event while the filter input is active
    pub fn handle_filter_key(&mut self, key: KeyEvent) -> FilterKeyResult {
        let len = self.filter_query.chars().count();
        match key.code {
            KeyCode::Char(c) => {
                let at = self.cursor_byte();
                self.filter_query.insert(at, c);
                self.filter_cursor_pos += 1;
                FilterKeyResult::QueryChanged
            }
            KeyCode::Backspace => {
                if self.filter_cursor_pos > 0 {
                    self.filter_cursor_pos -= 1;
                    let at = self.cursor_byte();
                    self.filter_query.remove(at);
                    FilterKeyResult::QueryChanged
                } else {
                    FilterKeyResult::Continue
                }
            }
            KeyCode::Delete => {
                if self.filter_cursor_pos < len {
                    let at = self.cursor_byte();
                    self.filter_query.remove(at);
                    FilterKeyResult::QueryChanged
                } else {
                    FilterKeyResult::Continue
                }
            }
            KeyCode::Left => {
                self.filter_cursor_pos = self.filter_cursor_pos.saturating_sub(1);
                FilterKeyResult::Continue
            }
            KeyCode::Right => {
                self.filter_cursor_pos = (self.filter_cursor_pos + 1).min(len);
                FilterKeyResult::Continue
            }
            KeyCode::Home => {
                self.filter_cursor_pos = 0;
                FilterKeyResult::Continue
            }
            KeyCode::End => {
                self.filter_cursor_pos = len;
                FilterKeyResult::Continue
            }
            KeyCode::Enter => {
                self.deactivate_filter();
                FilterKeyResult::Deactivated
            }
            KeyCode::Esc => {
                self.clear_filter();
                FilterKeyResult::Cleared
            }
            _ => FilterKeyResult::Continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::PanelState;
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn edits_at_cursor_with_multibyte_text() {
        let mut state = PanelState::default();
        state.activate_filter();
        for c in "héllo".chars() {
            assert_eq!(state.handle_filter_key(key(KeyCode::Char(c))), FilterKeyResult::QueryChanged);
        }
        state.handle_filter_key(key(KeyCode::Home));
        state.handle_filter_key(key(KeyCode::Right));
        state.handle_filter_key(key(KeyCode::Right));
        assert_eq!(state.handle_filter_key(key(KeyCode::Backspace)), FilterKeyResult::QueryChanged);
        assert_eq!(state.filter_query, "hllo");
        assert_eq!(state.handle_filter_key(key(KeyCode::Delete)), FilterKeyResult::QueryChanged);
        assert_eq!(state.filter_query, "hlo");
    }

    #[test]
    fn enter_keeps_text_and_esc_clears() {
        let mut state = PanelState::default();
        state.activate_filter();
        state.handle_filter_key(key(KeyCode::Char('x')));

        assert_eq!(state.handle_filter_key(key(KeyCode::Enter)), FilterKeyResult::Deactivated);
        assert!(!state.filter_active);
        assert!(state.has_filter());

        state.activate_filter();
        assert_eq!(state.handle_filter_key(key(KeyCode::Esc)), FilterKeyResult::Cleared);
        assert!(!state.has_filter());
        assert!(!state.filter_active);
    }
}
