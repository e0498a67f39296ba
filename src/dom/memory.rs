//! Arena-backed in-memory document with a simple block layout.
//!
//! Every element stacks its own text lines and then its children vertically.
//! Heights are in pixels, one text line is [`LINE_HEIGHT`] tall. Node ids are
//! never reused, so a handle to a removed subtree stays detectably stale.

use std::collections::BTreeMap;

use super::{
    DocumentSpec, HostDocument, MutationRecord, NodeId, NodeSpec, Overflow, ScrollBehavior,
    ScrollContainer,
};

/// Height of one line of text, in pixels.
pub const LINE_HEIGHT: f64 = 20.0;

#[derive(Debug, Clone)]
struct NodeData {
    tag: String,
    attrs: BTreeMap<String, String>,
    classes: Vec<String>,
    text: String,
    height: Option<f64>,
    overflow_y: Overflow,
    scroll_top: f64,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl NodeData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: BTreeMap::new(),
            classes: Vec::new(),
            text: String::new(),
            height: None,
            overflow_y: Overflow::Visible,
            scroll_top: 0.0,
            parent: None,
            children: Vec::new(),
        }
    }

    fn text_lines(&self) -> usize {
        if self.text.trim().is_empty() {
            0
        } else {
            self.text.lines().count()
        }
    }
}

/// A scroll request as received by the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollCall {
    pub container: ScrollContainer,
    /// Offset that was requested (before clamping to the scroll range)
    pub top: f64,
    pub behavior: ScrollBehavior,
}

/// In-memory [`HostDocument`].
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    nodes: Vec<NodeData>,
    root: NodeId,
    body: NodeId,
    location: String,
    window_scroll: f64,
    viewport_height: f64,
    pending: Vec<MutationRecord>,
    scroll_log: Vec<ScrollCall>,
    highlight_restarts: Vec<(NodeId, String)>,
}

impl MemoryDocument {
    /// An empty `<html><body></body></html>` page at `location`.
    pub fn new(location: impl Into<String>) -> Self {
        let mut doc = Self {
            nodes: vec![NodeData::new("html")],
            root: NodeId(0),
            body: NodeId(0),
            location: location.into(),
            window_scroll: 0.0,
            viewport_height: 800.0,
            pending: Vec::new(),
            scroll_log: Vec::new(),
            highlight_restarts: Vec::new(),
        };
        let body = doc.alloc(NodeData::new("body"));
        doc.link(doc.root, body);
        doc.body = body;
        doc
    }

    /// A page whose body already holds `body`. The initial content is not
    /// reported as a mutation.
    pub fn with_body(location: impl Into<String>, body: Vec<NodeSpec>) -> Self {
        let mut doc = Self::new(location);
        for spec in &body {
            let node = doc.build(spec);
            doc.link(doc.body, node);
        }
        doc
    }

    pub fn from_spec(spec: &DocumentSpec) -> Self {
        let mut doc = Self::with_body(spec.location.clone(), spec.body.clone());
        doc.viewport_height = spec.viewport_height;
        doc
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Create a detached subtree from `spec` and return its root.
    pub fn build(&mut self, spec: &NodeSpec) -> NodeId {
        let mut data = NodeData::new(&spec.tag);
        data.attrs = spec.attrs.clone();
        data.classes = spec.classes.clone();
        data.text = spec.text.clone();
        data.height = spec.height;
        data.overflow_y = spec.overflow_y;
        let node = self.alloc(data);
        for child in &spec.children {
            let child_id = self.build(child);
            self.link(node, child_id);
        }
        node
    }

    /// Append `child` under `parent`, detaching it from any previous parent.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if self.data(parent).is_none() || self.data(child).is_none() {
            return;
        }
        self.detach(child);
        self.link(parent, child);
        self.pending.push(MutationRecord {
            target: parent,
            added: vec![child],
            removed: Vec::new(),
        });
    }

    /// Build `spec` and append it under `parent`.
    pub fn append_spec(&mut self, parent: NodeId, spec: &NodeSpec) -> NodeId {
        let node = self.build(spec);
        self.append_child(parent, node);
        node
    }

    /// Remove `node` (and its subtree) from the tree.
    pub fn remove(&mut self, node: NodeId) {
        self.detach(node);
    }

    /// Swap all children of `parent` for `children` in one mutation.
    pub fn replace_children(&mut self, parent: NodeId, children: Vec<NodeId>) {
        let Some(data) = self.data(parent) else {
            return;
        };
        let removed = data.children.clone();
        for &old in &removed {
            if let Some(d) = self.data_mut(old) {
                d.parent = None;
            }
        }
        if let Some(d) = self.data_mut(parent) {
            d.children.clear();
        }
        for &child in &children {
            self.detach(child);
            self.link(parent, child);
        }
        self.pending.push(MutationRecord {
            target: parent,
            added: children,
            removed,
        });
    }

    /// Re-render the page body from scratch, the way a host page swaps a
    /// conversation view wholesale.
    pub fn replace_body(&mut self, body: &[NodeSpec]) {
        let nodes: Vec<NodeId> = body.iter().map(|spec| self.build(spec)).collect();
        self.replace_children(self.body, nodes);
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(d) = self.data_mut(node) {
            d.attrs.insert(name.to_string(), value.to_string());
        }
    }

    pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) {
        if let Some(d) = self.data_mut(node) {
            d.text = text.into();
        }
    }

    pub fn set_height(&mut self, node: NodeId, height: Option<f64>) {
        if let Some(d) = self.data_mut(node) {
            d.height = height;
        }
    }

    pub fn set_overflow_y(&mut self, node: NodeId, overflow: Overflow) {
        if let Some(d) = self.data_mut(node) {
            d.overflow_y = overflow;
        }
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = location.into();
    }

    pub fn set_viewport_height(&mut self, height: f64) {
        self.viewport_height = height.max(0.0);
        self.window_scroll = self.window_scroll.min(self.max_window_scroll());
    }

    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    pub fn window_scroll(&self) -> f64 {
        self.window_scroll
    }

    /// Scroll the document by `delta` pixels without going through the
    /// scroll log (user wheel input).
    pub fn scroll_window_by(&mut self, delta: f64) {
        self.window_scroll = (self.window_scroll + delta).clamp(0.0, self.max_window_scroll());
    }

    /// Text owned directly by `node`, excluding descendants.
    pub fn own_text(&self, node: NodeId) -> &str {
        self.data(node).map_or("", |d| d.text.as_str())
    }

    pub fn classes(&self, node: NodeId) -> &[String] {
        self.data(node).map_or(&[], |d| d.classes.as_slice())
    }

    /// Every scroll request received so far.
    pub fn scroll_log(&self) -> &[ScrollCall] {
        &self.scroll_log
    }

    /// Every highlight restart received so far.
    pub fn highlight_restarts(&self) -> &[(NodeId, String)] {
        &self.highlight_restarts
    }

    /// Height of the whole page.
    pub fn document_height(&self) -> f64 {
        self.outer_height(self.root)
    }

    fn max_window_scroll(&self) -> f64 {
        (self.document_height() - self.viewport_height).max(0.0)
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(data);
        NodeId(self.nodes.len() - 1)
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        if let Some(d) = self.data_mut(child) {
            d.parent = Some(parent);
        }
        if let Some(d) = self.data_mut(parent) {
            d.children.push(child);
        }
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.data(node).and_then(|d| d.parent) else {
            return;
        };
        if let Some(d) = self.data_mut(parent) {
            d.children.retain(|&c| c != node);
        }
        if let Some(d) = self.data_mut(node) {
            d.parent = None;
        }
        self.pending.push(MutationRecord {
            target: parent,
            added: Vec::new(),
            removed: vec![node],
        });
    }

    fn data(&self, node: NodeId) -> Option<&NodeData> {
        self.nodes.get(node.0)
    }

    fn data_mut(&mut self, node: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(node.0)
    }

    fn content_height(&self, node: NodeId) -> f64 {
        let Some(d) = self.data(node) else {
            return 0.0;
        };
        let text = d.text_lines() as f64 * LINE_HEIGHT;
        text + d.children.iter().map(|&c| self.outer_height(c)).sum::<f64>()
    }

    fn outer_height(&self, node: NodeId) -> f64 {
        match self.data(node) {
            Some(d) => d.height.unwrap_or_else(|| self.content_height(node)),
            None => 0.0,
        }
    }

    /// Distance from the parent's content top to this node's top edge.
    fn offset_in_parent(&self, node: NodeId, parent: NodeId) -> f64 {
        let Some(p) = self.data(parent) else {
            return 0.0;
        };
        let mut offset = p.text_lines() as f64 * LINE_HEIGHT;
        for &sibling in &p.children {
            if sibling == node {
                break;
            }
            offset += self.outer_height(sibling);
        }
        offset
    }
}

impl HostDocument for MemoryDocument {
    fn root(&self) -> NodeId {
        self.root
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.data(node).and_then(|d| d.parent)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.data(node).map(|d| d.children.clone()).unwrap_or_default()
    }

    fn tag(&self, node: NodeId) -> Option<&str> {
        self.data(node).map(|d| d.tag.as_str())
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.data(node)
            .and_then(|d| d.attrs.get(name))
            .map(String::as_str)
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.data(node).is_some_and(|d| d.classes.iter().any(|c| c == class))
    }

    fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            if let Some(d) = self.data(n) {
                out.push_str(&d.text);
                stack.extend(d.children.iter().rev().copied());
            }
        }
        out
    }

    fn is_attached(&self, node: NodeId) -> bool {
        self.data(node).is_some() && self.is_inclusive_descendant(node, self.root)
    }

    fn location(&self) -> &str {
        &self.location
    }

    fn overflow_y(&self, node: NodeId) -> Overflow {
        self.data(node).map_or(Overflow::Visible, |d| d.overflow_y)
    }

    fn scroll_height(&self, node: NodeId) -> f64 {
        self.content_height(node).max(self.outer_height(node))
    }

    fn client_height(&self, node: NodeId) -> f64 {
        self.outer_height(node)
    }

    fn bounding_top(&self, node: NodeId) -> f64 {
        if node == self.root {
            return -self.window_scroll;
        }
        match self.parent(node) {
            Some(parent) => {
                let scroll = self.data(parent).map_or(0.0, |d| d.scroll_top);
                self.bounding_top(parent) + self.offset_in_parent(node, parent) - scroll
            }
            None => 0.0,
        }
    }

    fn scroll_top(&self, container: ScrollContainer) -> f64 {
        match container {
            ScrollContainer::Document => self.window_scroll,
            ScrollContainer::Element(node) => self.data(node).map_or(0.0, |d| d.scroll_top),
        }
    }

    fn viewport_top(&self, container: ScrollContainer) -> f64 {
        match container {
            ScrollContainer::Document => 0.0,
            ScrollContainer::Element(node) => self.bounding_top(node),
        }
    }

    fn scroll_to(&mut self, container: ScrollContainer, top: f64, behavior: ScrollBehavior) {
        self.scroll_log.push(ScrollCall {
            container,
            top,
            behavior,
        });
        match container {
            ScrollContainer::Document => {
                self.window_scroll = top.clamp(0.0, self.max_window_scroll());
            }
            ScrollContainer::Element(node) => {
                let max = (self.scroll_height(node) - self.client_height(node)).max(0.0);
                if let Some(d) = self.data_mut(node) {
                    d.scroll_top = top.clamp(0.0, max);
                }
            }
        }
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(d) = self.data_mut(node) {
            if !d.classes.iter().any(|c| c == class) {
                d.classes.push(class.to_string());
            }
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(d) = self.data_mut(node) {
            d.classes.retain(|c| c != class);
        }
    }

    fn restart_highlight(&mut self, node: NodeId, class: &str) {
        if self.data(node).is_none() {
            return;
        }
        self.remove_class(node, class);
        self.add_class(node, class);
        self.highlight_restarts.push((node, class.to_string()));
    }

    fn drain_mutations(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.pending)
    }
}
