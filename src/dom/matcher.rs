//! Minimal selector matching over a [`HostDocument`].

use serde::{Deserialize, Serialize};

use super::{HostDocument, NodeId};

/// The subset of CSS selector behaviour the engine relies on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Matcher {
    /// `pre`
    Tag { name: String },
    /// `.markdown`
    Class { name: String },
    /// `[data-message-author-role]`
    HasAttr { name: String },
    /// `[data-testid="conversation-turn"]`
    AttrEquals { name: String, value: String },
    /// `[aria-label*="Stop"]`
    AttrContains { name: String, value: String },
    /// `a, b, c`
    AnyOf { of: Vec<Matcher> },
    /// `button[title*="Stop"]`
    AllOf { of: Vec<Matcher> },
}

impl Matcher {
    pub fn tag(name: impl Into<String>) -> Self {
        Self::Tag { name: name.into() }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::Class { name: name.into() }
    }

    pub fn has_attr(name: impl Into<String>) -> Self {
        Self::HasAttr { name: name.into() }
    }

    pub fn attr_equals(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::AttrEquals {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn attr_contains(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::AttrContains {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn any_of(of: impl IntoIterator<Item = Matcher>) -> Self {
        Self::AnyOf {
            of: of.into_iter().collect(),
        }
    }

    pub fn all_of(of: impl IntoIterator<Item = Matcher>) -> Self {
        Self::AllOf {
            of: of.into_iter().collect(),
        }
    }

    /// Test a single element.
    pub fn matches<D: HostDocument + ?Sized>(&self, doc: &D, node: NodeId) -> bool {
        match self {
            Matcher::Tag { name } => doc.tag(node).is_some_and(|t| t.eq_ignore_ascii_case(name)),
            Matcher::Class { name } => doc.has_class(node, name),
            Matcher::HasAttr { name } => doc.attr(node, name).is_some(),
            Matcher::AttrEquals { name, value } => doc.attr(node, name) == Some(value.as_str()),
            Matcher::AttrContains { name, value } => {
                doc.attr(node, name).is_some_and(|v| v.contains(value.as_str()))
            }
            Matcher::AnyOf { of } => of.iter().any(|m| m.matches(doc, node)),
            Matcher::AllOf { of } => of.iter().all(|m| m.matches(doc, node)),
        }
    }
}

/// All descendants of `scope` (excluding `scope`) in document order.
pub fn descendants<D: HostDocument + ?Sized>(doc: &D, scope: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack: Vec<NodeId> = doc.children(scope).into_iter().rev().collect();
    while let Some(node) = stack.pop() {
        out.push(node);
        stack.extend(doc.children(node).into_iter().rev());
    }
    out
}

/// `scope.querySelectorAll(matcher)`
pub fn query_all<D: HostDocument + ?Sized>(doc: &D, scope: NodeId, matcher: &Matcher) -> Vec<NodeId> {
    descendants(doc, scope)
        .into_iter()
        .filter(|&n| matcher.matches(doc, n))
        .collect()
}

/// `scope.querySelector(matcher)`
pub fn query_first<D: HostDocument + ?Sized>(
    doc: &D,
    scope: NodeId,
    matcher: &Matcher,
) -> Option<NodeId> {
    let mut stack: Vec<NodeId> = doc.children(scope).into_iter().rev().collect();
    while let Some(node) = stack.pop() {
        if matcher.matches(doc, node) {
            return Some(node);
        }
        stack.extend(doc.children(node).into_iter().rev());
    }
    None
}

/// `node.closest(matcher)`: the node itself or its nearest matching ancestor.
pub fn closest<D: HostDocument + ?Sized>(doc: &D, node: NodeId, matcher: &Matcher) -> Option<NodeId> {
    let mut current = Some(node);
    while let Some(n) = current {
        if matcher.matches(doc, n) {
            return Some(n);
        }
        current = doc.parent(n);
    }
    None
}

/// The node matches, or has a matching descendant.
pub fn matches_or_contains<D: HostDocument + ?Sized>(
    doc: &D,
    node: NodeId,
    matcher: &Matcher,
) -> bool {
    matcher.matches(doc, node) || query_first(doc, node, matcher).is_some()
}
