//! Host document abstraction.
//!
//! The navigation engine never touches a concrete DOM. Everything it needs
//! from the host page (tree shape, attributes, geometry, scrolling, class
//! toggling, and the child-list mutation feed) goes through [`HostDocument`].
//! [`MemoryDocument`] is the in-process implementation used by the terminal
//! front-end and by the tests.

mod fixture;
mod matcher;
mod memory;

pub use fixture::{DocumentSpec, NodeSpec};
pub use matcher::{closest, descendants, matches_or_contains, query_all, query_first, Matcher};
pub use memory::{MemoryDocument, ScrollCall, LINE_HEIGHT};

use serde::{Deserialize, Serialize};

/// Handle to an element in a host document.
///
/// Handles are non-owning and may go stale when the host page re-renders;
/// check [`HostDocument::is_attached`] before trusting one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Computed vertical overflow of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Auto,
    Scroll,
}

impl Overflow {
    /// Whether the user can scroll this element (`auto` or `scroll`).
    pub fn is_scrollable(self) -> bool {
        matches!(self, Overflow::Auto | Overflow::Scroll)
    }
}

/// Something that can be scrolled: an element or the document itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollContainer {
    /// The document-level scroller (window)
    Document,
    /// A scrollable element
    Element(NodeId),
}

/// How a scroll request should be animated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Instant,
    Smooth,
}

/// One child-list change, as delivered by the host's mutation feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    /// Element whose children changed
    pub target: NodeId,
    /// Nodes inserted under `target`
    pub added: Vec<NodeId>,
    /// Nodes removed from `target`
    pub removed: Vec<NodeId>,
}

/// Read/write access to the live host document.
///
/// Lookups on a stale handle return empty values (`None`, `false`, `0.0`)
/// rather than failing.
pub trait HostDocument {
    /// The document element.
    fn root(&self) -> NodeId;
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    /// Element children in document order.
    fn children(&self, node: NodeId) -> Vec<NodeId>;
    /// Lower-case tag name, `None` for an unknown handle.
    fn tag(&self, node: NodeId) -> Option<&str>;
    fn attr(&self, node: NodeId, name: &str) -> Option<&str>;
    fn has_class(&self, node: NodeId, class: &str) -> bool;
    /// Concatenated text of the node and all of its descendants.
    fn text_content(&self, node: NodeId) -> String;
    /// Whether the node is still connected to [`HostDocument::root`].
    fn is_attached(&self, node: NodeId) -> bool;
    /// Identity of the current location (the page URL).
    fn location(&self) -> &str;

    fn overflow_y(&self, node: NodeId) -> Overflow;
    /// Height of the node's scrollable content.
    fn scroll_height(&self, node: NodeId) -> f64;
    /// Visible height of the node.
    fn client_height(&self, node: NodeId) -> f64;
    /// Top edge of the node relative to the viewport.
    fn bounding_top(&self, node: NodeId) -> f64;
    fn scroll_top(&self, container: ScrollContainer) -> f64;
    /// Top edge of the container's visible area relative to the viewport.
    fn viewport_top(&self, container: ScrollContainer) -> f64;
    fn scroll_to(&mut self, container: ScrollContainer, top: f64, behavior: ScrollBehavior);

    fn add_class(&mut self, node: NodeId, class: &str);
    fn remove_class(&mut self, node: NodeId, class: &str);
    /// Remove and re-add `class` so a timed visual effect starts over even
    /// when the class was already present.
    fn restart_highlight(&mut self, node: NodeId, class: &str);

    /// Take the child-list mutations recorded since the previous call.
    fn drain_mutations(&mut self) -> Vec<MutationRecord>;

    /// Whether `node` is `ancestor` or lies inside it.
    fn is_inclusive_descendant(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }
}
