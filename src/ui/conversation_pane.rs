use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Widget},
};

use crate::config::MarkerConfig;
use crate::conversation::MarkupContract;
use crate::dom::{descendants, HostDocument, MemoryDocument, NodeId, LINE_HEIGHT};

/// Conversation pane widget: draws the document's text at its current
/// scroll position, one terminal row per layout line.
pub struct ConversationPane<'a> {
    doc: &'a MemoryDocument,
    contract: &'a MarkupContract,
    markers: &'a MarkerConfig,
    focused: bool,
}

impl<'a> ConversationPane<'a> {
    pub fn new(
        doc: &'a MemoryDocument,
        contract: &'a MarkupContract,
        markers: &'a MarkerConfig,
        focused: bool,
    ) -> Self {
        Self {
            doc,
            contract,
            markers,
            focused,
        }
    }

    /// Style from the node and its ancestors: role colour, code block
    /// markers, flash.
    fn node_style(&self, node: NodeId) -> Style {
        let doc = self.doc;
        let mut style = Style::default();
        let mut flashed = false;
        let mut current = Some(node);
        let mut role_seen = false;
        let mut code_seen = false;

        while let Some(n) = current {
            if !code_seen && self.contract.code_block.matches(doc, n) {
                code_seen = true;
                style = if doc.has_class(n, &self.markers.code_pending) {
                    style.fg(Color::DarkGray).add_modifier(Modifier::ITALIC)
                } else if doc.has_class(n, &self.markers.code_ready) {
                    style.fg(Color::Green).add_modifier(Modifier::BOLD)
                } else {
                    style.fg(Color::LightGreen)
                };
            }
            if !role_seen {
                if let Some(role) = doc.attr(n, &self.contract.role_attr) {
                    role_seen = true;
                    if role == "user" && !code_seen {
                        style = style.fg(Color::Cyan);
                    }
                }
            }
            flashed |= doc.has_class(n, &self.markers.flash);
            current = doc.parent(n);
        }

        if flashed {
            style = style.bg(Color::Rgb(70, 60, 0));
        }
        style
    }

    /// Visible vertical band of `node` after clipping by ancestors that do
    /// not let content overflow.
    fn clip_band(&self, node: NodeId, viewport: f64) -> (f64, f64) {
        let doc = self.doc;
        let mut band = (0.0_f64, viewport);
        let mut current = doc.parent(node);
        while let Some(n) = current {
            if doc.overflow_y(n) != crate::dom::Overflow::Visible {
                let top = doc.bounding_top(n);
                band.0 = band.0.max(top);
                band.1 = band.1.min(top + doc.client_height(n));
            }
            current = doc.parent(n);
        }
        band
    }
}

impl<'a> Widget for ConversationPane<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let scrolled = self.doc.window_scroll() / LINE_HEIGHT;
        let title = if scrolled > 0.0 {
            format!(" {} [line {}] ", self.doc.location(), scrolled.round())
        } else {
            format!(" {} ", self.doc.location())
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style);

        let inner_area = block.inner(area);
        block.render(area, buf);
        if inner_area.width == 0 || inner_area.height == 0 {
            return;
        }

        let viewport = f64::from(inner_area.height) * LINE_HEIGHT;
        for node in descendants(self.doc, self.doc.root()) {
            let text = self.doc.own_text(node);
            if text.trim().is_empty() {
                continue;
            }
            let style = self.node_style(node);
            let (band_top, band_bottom) = self.clip_band(node, viewport);
            let top = self.doc.bounding_top(node);

            for (i, line) in text.lines().enumerate() {
                let y_px = top + i as f64 * LINE_HEIGHT;
                if y_px < band_top || y_px + LINE_HEIGHT > band_bottom {
                    continue;
                }
                let row = (y_px / LINE_HEIGHT).floor() as u16;
                buf.set_stringn(
                    inner_area.x,
                    inner_area.y + row,
                    line,
                    usize::from(inner_area.width),
                    style,
                );
            }
        }
    }
}
