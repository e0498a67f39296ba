//! Turn discovery and role classification.

use crate::dom::{closest, query_all, query_first, HostDocument, NodeId};

use super::MarkupContract;

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    /// Missing or unrecognised role marker
    Unknown,
}

impl Role {
    fn from_marker(marker: &str) -> Self {
        match marker {
            "assistant" => Role::Assistant,
            "user" => Role::User,
            _ => Role::Unknown,
        }
    }
}

/// Finds turn elements in a host document.
#[derive(Debug, Clone)]
pub struct TurnLocator {
    contract: MarkupContract,
}

impl TurnLocator {
    pub fn new(contract: MarkupContract) -> Self {
        Self { contract }
    }

    pub fn contract(&self) -> &MarkupContract {
        &self.contract
    }

    /// Candidate turn elements in document order.
    ///
    /// Elements matching the primary turn contract win; when there are none,
    /// role-marked elements are used instead. Returns an empty list when the
    /// page matches neither.
    pub fn locate_turns<D: HostDocument + ?Sized>(&self, doc: &D) -> Vec<NodeId> {
        let turns = query_all(doc, doc.root(), &self.contract.turn);
        if !turns.is_empty() {
            return turns;
        }
        query_all(doc, doc.root(), &self.contract.role())
    }

    /// Read the role marker from the element itself or its first marked
    /// descendant.
    pub fn classify_role<D: HostDocument + ?Sized>(&self, doc: &D, element: NodeId) -> Role {
        let role = self.contract.role();
        let marked = if role.matches(doc, element) {
            Some(element)
        } else {
            query_first(doc, element, &role)
        };
        marked
            .and_then(|el| doc.attr(el, &self.contract.role_attr))
            .map_or(Role::Unknown, Role::from_marker)
    }

    /// The turn wrapper around `element`, or `element` itself when the page
    /// has no turn wrappers.
    pub fn enclosing_turn<D: HostDocument + ?Sized>(&self, doc: &D, element: NodeId) -> NodeId {
        closest(doc, element, &self.contract.turn).unwrap_or(element)
    }

    /// Turn element of the last assistant message, if any.
    pub fn newest_assistant_turn<D: HostDocument + ?Sized>(&self, doc: &D) -> Option<NodeId> {
        self.locate_turns(doc)
            .into_iter()
            .rev()
            .find(|&el| self.classify_role(doc, el) == Role::Assistant)
            .map(|el| self.enclosing_turn(doc, el))
    }

    /// Subtree to observe for conversation changes.
    ///
    /// Parent of the first turn, else parent of the first role-marked
    /// element, else `<main>`, else `<body>`, else the document root.
    pub fn conversation_root<D: HostDocument + ?Sized>(&self, doc: &D) -> NodeId {
        let root = doc.root();
        let main = || query_first(doc, root, &crate::dom::Matcher::tag("main"));
        let body = || query_first(doc, root, &crate::dom::Matcher::tag("body"));
        let fallback = || main().or_else(body).unwrap_or(root);

        for matcher in [&self.contract.turn, &self.contract.role()] {
            if let Some(first) = query_first(doc, root, matcher) {
                return doc.parent(first).unwrap_or_else(fallback);
            }
        }
        fallback()
    }
}
