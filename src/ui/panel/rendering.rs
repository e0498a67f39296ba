//! Panel widget rendering: the `NavPanel` struct and its `StatefulWidget` implementation.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, StatefulWidget, Widget},
};

use crate::sync::ListModel;

use super::PanelState;

/// Navigation panel over the last rendered list.
pub struct NavPanel<'a> {
    model: &'a ListModel,
    /// Number of targets before filtering
    total: usize,
    /// Whether the panel has keyboard focus
    focused: bool,
}

impl<'a> NavPanel<'a> {
    pub fn new(model: &'a ListModel, total: usize, focused: bool) -> Self {
        Self {
            model,
            total,
            focused,
        }
    }
}

impl<'a> StatefulWidget for NavPanel<'a> {
    type State = PanelState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        if self.model.is_collapsed() {
            let block = Block::default()
                .title(format!(" ▸ {} ", self.total))
                .borders(Borders::ALL)
                .border_style(border_style);
            block.render(area, buf);
            state.list_area = None;
            return;
        }

        let shown = self.model.rows().len();
        let title = if shown == self.total {
            format!(" Responses ({}) ", self.total)
        } else {
            format!(" Responses ({shown}/{}) ", self.total)
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style);

        let inner_area = block.inner(area);
        block.render(area, buf);
        if inner_area.height == 0 {
            state.list_area = None;
            return;
        }

        // Filter row at top, list below
        let filter_area = Rect {
            height: 1,
            ..inner_area
        };
        let list_area = Rect {
            y: inner_area.y + 1,
            height: inner_area.height - 1,
            ..inner_area
        };
        render_filter_row(
            filter_area,
            buf,
            &state.filter_query,
            state.filter_active,
            state.filter_cursor_pos,
        );

        if let Some(placeholder) = self.model.placeholder() {
            state.list_area = None;
            Paragraph::new(Span::styled(
                placeholder.text(),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ))
            .render(list_area, buf);
            return;
        }

        let active = self.model.active_index();
        let items: Vec<ListItem> = self
            .model
            .rows()
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let marker = if Some(i) == active { "● " } else { "  " };
                let style = if Some(i) == active {
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(vec![
                    Span::styled(marker, Style::default().fg(Color::Yellow)),
                    Span::styled(format!("{:>2}. ", row.number), Style::default().fg(Color::DarkGray)),
                    Span::styled(row.snippet.clone(), style),
                ]))
            })
            .collect();

        let list = List::new(items)
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        state.list_area = Some(list_area);
        StatefulWidget::render(list, list_area, buf, &mut state.list_state);
    }
}

/// Render the inline filter input row at the top of the panel
fn render_filter_row(area: Rect, buf: &mut Buffer, query: &str, active: bool, cursor_pos: usize) {
    let prefix = "/ ";

    if active {
        // Active: show prefix + query with cursor highlight
        let mut spans = vec![Span::styled(prefix, Style::default().fg(Color::Yellow))];

        let available_width = usize::from(area.width).saturating_sub(prefix.len());
        if available_width == 0 {
            Paragraph::new(Line::from(spans)).render(area, buf);
            return;
        }
        let chars: Vec<char> = query.chars().collect();
        let start = if cursor_pos >= available_width {
            cursor_pos + 1 - available_width
        } else {
            0
        };
        let end = (start + available_width).min(chars.len());
        let visible = chars.get(start..end).unwrap_or(&[]);
        let cursor_offset = cursor_pos - start;

        for (i, c) in visible.iter().enumerate() {
            if i == cursor_offset {
                spans.push(Span::styled(
                    c.to_string(),
                    Style::default().bg(Color::White).fg(Color::Black),
                ));
            } else {
                spans.push(Span::raw(c.to_string()));
            }
        }
        // Block cursor at end of text
        if cursor_offset >= visible.len() {
            spans.push(Span::styled(" ", Style::default().bg(Color::White)));
        }

        Paragraph::new(Line::from(spans)).render(area, buf);
    } else if query.is_empty() {
        let line = Line::from(Span::styled(
            "/ filter",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM),
        ));
        Paragraph::new(line).render(area, buf);
    } else {
        // Inactive (persistent display): dimmed style, no cursor
        let line = Line::from(vec![
            Span::styled(prefix, Style::default().fg(Color::DarkGray)),
            Span::styled(query, Style::default().fg(Color::DarkGray)),
        ]);
        Paragraph::new(line).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::TargetId;
    use crate::sync::{ListContent, ListRenderer, ListRow, Placeholder};

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut out = String::new();
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn model() -> ListModel {
        let mut model = ListModel::default();
        model.render(ListContent::Rows(vec![
            ListRow {
                id: TargetId::Stable("m1".to_string()),
                number: 1,
                snippet: "first answer".to_string(),
            },
            ListRow {
                id: TargetId::Stable("m2".to_string()),
                number: 2,
                snippet: "second answer".to_string(),
            },
        ]));
        model.highlight(Some(&TargetId::Stable("m2".to_string())));
        model
    }

    #[test]
    fn renders_rows_and_records_list_area() {
        let model = model();
        let area = Rect::new(0, 0, 40, 8);
        let mut buf = Buffer::empty(area);
        let mut state = PanelState::default();

        NavPanel::new(&model, 2, true).render(area, &mut buf, &mut state);

        let text = buffer_text(&buf);
        assert!(text.contains("Responses (2)"));
        assert!(text.contains("1. first answer"));
        assert!(text.contains("● "));
        assert_eq!(state.list_area, Some(Rect::new(1, 2, 38, 5)));
    }

    #[test]
    fn placeholder_replaces_rows() {
        let mut model = ListModel::default();
        model.render(ListContent::Empty(Placeholder::NoMatches));
        let area = Rect::new(0, 0, 40, 6);
        let mut buf = Buffer::empty(area);
        let mut state = PanelState::with_filter("zzz");

        NavPanel::new(&model, 3, false).render(area, &mut buf, &mut state);

        let text = buffer_text(&buf);
        assert!(text.contains("No matches"));
        assert!(text.contains("/ zzz"));
        assert!(state.list_area.is_none());
    }

    #[test]
    fn collapsed_panel_shows_count_only() {
        let mut model = model();
        model.set_collapsed(true);
        let area = Rect::new(0, 0, 16, 6);
        let mut buf = Buffer::empty(area);
        let mut state = PanelState::default();

        NavPanel::new(&model, 2, false).render(area, &mut buf, &mut state);

        let text = buffer_text(&buf);
        assert!(text.contains("▸ 2"));
        assert!(!text.contains("first"));
    }
}
