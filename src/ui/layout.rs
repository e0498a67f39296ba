use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Width of the navigation panel when collapsed to its header.
pub const COLLAPSED_PANEL_WIDTH: u16 = 16;

/// Create layout with help bar at the bottom: conversation pane on the left,
/// navigation panel on the right.
pub fn create_layout_with_help(area: Rect, collapsed: bool) -> (Rect, Rect, Rect) {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let main_area = vertical[0];
    let help_area = vertical[1];

    let panel = if collapsed {
        Constraint::Length(COLLAPSED_PANEL_WIDTH)
    } else {
        Constraint::Percentage(32)
    };
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), panel])
        .split(main_area);

    (horizontal[0], horizontal[1], help_area)
}
