//! Navigation panel: the list of responses with an inline filter.

mod filter;
mod rendering;

use ratatui::layout::Rect;
use ratatui::widgets::ListState;

pub use filter::FilterKeyResult;
pub use rendering::NavPanel;

/// Panel widget state: cursor row and filter input.
#[derive(Debug, Default)]
pub struct PanelState {
    /// Ratatui list selection state (the keyboard cursor)
    pub list_state: ListState,
    /// Current inline filter query text
    pub filter_query: String,
    /// Cursor position within the filter input, in characters
    pub filter_cursor_pos: usize,
    /// Whether the filter input is actively accepting keystrokes
    pub filter_active: bool,
    /// Where the rows were last drawn, for mouse hit-testing
    pub list_area: Option<Rect>,
}

impl PanelState {
    /// Panel state with a restored filter query.
    pub fn with_filter(query: &str) -> Self {
        Self {
            filter_query: query.to_string(),
            filter_cursor_pos: query.chars().count(),
            ..Self::default()
        }
    }

    /// Move the cursor down, clamping at the last of `len` rows.
    pub fn select_next(&mut self, len: usize) {
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        let next = self.list_state.selected().map_or(0, |i| (i + 1).min(len - 1));
        self.list_state.select(Some(next));
    }

    /// Move the cursor up, clamping at the first row.
    pub fn select_previous(&mut self, len: usize) {
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        let prev = self.list_state.selected().map_or(0, |i| i.saturating_sub(1));
        self.list_state.select(Some(prev));
    }

    /// Keep the cursor inside a list of `len` rows after a re-render.
    pub fn clamp_selection(&mut self, len: usize) {
        match self.list_state.selected() {
            _ if len == 0 => self.list_state.select(None),
            Some(i) if i >= len => self.list_state.select(Some(len - 1)),
            None => self.list_state.select(Some(0)),
            Some(_) => {}
        }
    }

    /// Row index under a screen position, if it hits a drawn row.
    pub fn row_at(&self, column: u16, row: u16, len: usize) -> Option<usize> {
        let area = self.list_area?;
        if column < area.x
            || column >= area.x + area.width
            || row < area.y
            || row >= area.y + area.height
        {
            return None;
        }
        let index = self.list_state.offset() + usize::from(row - area.y);
        (index < len).then_some(index)
    }
}
