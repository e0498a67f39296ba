//! Scrolling a response into view below the panel header.

use std::time::{Duration, Instant};

use crate::config::ScrollConfig;
use crate::conversation::Target;
use crate::dom::{HostDocument, NodeId, ScrollBehavior, ScrollContainer};
use crate::timers::ExpiringMarks;

/// Where a jump scrolled to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollPlan {
    pub container: ScrollContainer,
    pub top: f64,
}

/// Finds the effective scroller for an anchor, scrolls it, and flashes the
/// target turn.
#[derive(Debug, Clone)]
pub struct ScrollNavigator {
    config: ScrollConfig,
    flash_class: String,
    flashes: ExpiringMarks,
}

impl ScrollNavigator {
    pub fn new(config: ScrollConfig, flash_class: impl Into<String>, flash_for: Duration) -> Self {
        Self {
            config,
            flash_class: flash_class.into(),
            flashes: ExpiringMarks::new(flash_for),
        }
    }

    /// Nearest ancestor that is scrollable and actually overflowing by more
    /// than the configured margin, else the document scroller.
    pub fn scroll_container<D: HostDocument + ?Sized>(
        &self,
        doc: &D,
        anchor: NodeId,
    ) -> ScrollContainer {
        let mut current = doc.parent(anchor);
        for _ in 0..self.config.max_depth {
            let Some(node) = current else {
                break;
            };
            if doc.overflow_y(node).is_scrollable()
                && doc.scroll_height(node) > doc.client_height(node) + self.config.overflow_margin
            {
                return ScrollContainer::Element(node);
            }
            current = doc.parent(node);
        }
        ScrollContainer::Document
    }

    /// Scroll offset that puts `anchor` one header clearance below the top
    /// of `container`'s visible area. Never negative.
    pub fn target_offset<D: HostDocument + ?Sized>(
        &self,
        doc: &D,
        container: ScrollContainer,
        anchor: NodeId,
    ) -> f64 {
        let relative = doc.bounding_top(anchor) - doc.viewport_top(container);
        (doc.scroll_top(container) + relative - self.config.header_offset).max(0.0)
    }

    /// Smooth-scroll to `target` and flash its turn. Returns `None` when the
    /// target's anchor is no longer in the document.
    pub fn jump<D: HostDocument + ?Sized>(
        &mut self,
        doc: &mut D,
        target: &Target,
        now: Instant,
    ) -> Option<ScrollPlan> {
        if !doc.is_attached(target.anchor) {
            return None;
        }

        let container = self.scroll_container(doc, target.anchor);
        let top = self.target_offset(doc, container, target.anchor);
        doc.scroll_to(container, top, ScrollBehavior::Smooth);
        tracing::debug!(id = %target.id, ?container, top, "jumped to target");

        let flash_on = if doc.is_attached(target.turn) {
            target.turn
        } else {
            target.anchor
        };
        self.flash(doc, flash_on, now);

        Some(ScrollPlan { container, top })
    }

    /// Restart the transient highlight on `node`.
    pub fn flash<D: HostDocument + ?Sized>(&mut self, doc: &mut D, node: NodeId, now: Instant) {
        doc.restart_highlight(node, &self.flash_class);
        self.flashes.track(node, &self.flash_class, now);
    }

    /// Drop flashes whose time is up.
    pub fn expire<D: HostDocument + ?Sized>(&mut self, doc: &mut D, now: Instant) {
        self.flashes.expire(doc, now);
    }

    pub fn flash_class(&self) -> &str {
        &self.flash_class
    }
}
