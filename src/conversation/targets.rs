//! Navigable targets derived from assistant turns.

use std::collections::HashSet;
use std::fmt;

use crate::dom::{query_first, HostDocument, Matcher, NodeId};

use super::{Role, TurnLocator};

/// Placeholder snippet for a response with no visible text.
pub const EMPTY_SNIPPET: &str = "(empty)";

/// Marker appended to truncated snippets.
pub const ELLIPSIS: char = '…';

const POSITIONAL_PREFIX: &str = "pos:";

/// Identity of a target.
///
/// `Stable` ids come from the host page and survive re-renders. `Positional`
/// ids are the degraded tier: the target's index among assistant turns in a
/// single build, which shifts whenever a turn before it appears or vanishes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetId {
    Stable(String),
    Positional(usize),
}

impl TargetId {
    pub fn is_degraded(&self) -> bool {
        matches!(self, TargetId::Positional(_))
    }

    /// Parse a persisted id. Blank input yields `None`; anything that is not
    /// a positional marker is a stable id.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        if let Some(index) = value.strip_prefix(POSITIONAL_PREFIX) {
            if let Ok(index) = index.parse() {
                return Some(TargetId::Positional(index));
            }
        }
        Some(TargetId::Stable(value.to_string()))
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetId::Stable(id) => f.write_str(id),
            TargetId::Positional(index) => write!(f, "{POSITIONAL_PREFIX}{index}"),
        }
    }
}

/// One entry of the navigation index.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub id: TargetId,
    /// Normalized, truncated display text
    pub snippet: String,
    /// Element to scroll to. Only valid for the build that produced it.
    pub anchor: NodeId,
    /// Turn element enclosing the anchor (receives the flash marker)
    pub turn: NodeId,
}

/// Source of stable message identifiers.
pub trait IdSource {
    fn stable_id(&self, doc: &dyn HostDocument, turn: NodeId) -> Option<String>;
}

/// Reads an identity attribute from the turn or the first descendant
/// carrying it.
#[derive(Debug, Clone)]
pub struct AttributeIdSource {
    attr: String,
}

impl AttributeIdSource {
    pub fn new(attr: impl Into<String>) -> Self {
        Self { attr: attr.into() }
    }
}

impl IdSource for AttributeIdSource {
    fn stable_id(&self, doc: &dyn HostDocument, turn: NodeId) -> Option<String> {
        let read = |node: NodeId| {
            doc.attr(node, &self.attr)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        read(turn).or_else(|| query_first(doc, turn, &Matcher::has_attr(self.attr.clone())).and_then(read))
    }
}

/// Collapse whitespace runs, trim, cap at `max_chars` characters (plus an
/// ellipsis when cut) and substitute [`EMPTY_SNIPPET`] for empty text.
pub fn normalize_snippet(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return EMPTY_SNIPPET.to_string();
    }
    if collapsed.chars().count() > max_chars {
        let mut cut: String = collapsed.chars().take(max_chars).collect();
        cut.push(ELLIPSIS);
        return cut;
    }
    collapsed
}

/// Builds the ordered target list from the live document.
///
/// Holds no state between builds: every call reflects only the document as
/// it is now.
pub struct TargetIndexer {
    locator: TurnLocator,
    ids: Box<dyn IdSource>,
    snippet_max_chars: usize,
}

impl TargetIndexer {
    pub fn new(locator: TurnLocator, snippet_max_chars: usize) -> Self {
        let ids = Box::new(AttributeIdSource::new(locator.contract().id_attr.clone()));
        Self {
            locator,
            ids,
            snippet_max_chars,
        }
    }

    /// Replace the stable id tier.
    pub fn with_id_source(mut self, ids: Box<dyn IdSource>) -> Self {
        self.ids = ids;
        self
    }

    pub fn locator(&self) -> &TurnLocator {
        &self.locator
    }

    /// Assistant targets in document order, one per distinct turn element.
    pub fn build_targets<D: HostDocument>(&self, doc: &D) -> Vec<Target> {
        let content = &self.locator.contract().content;
        let mut seen = HashSet::new();
        let mut targets = Vec::new();

        for candidate in self.locator.locate_turns(doc) {
            if self.locator.classify_role(doc, candidate) != Role::Assistant {
                continue;
            }
            let turn = self.locator.enclosing_turn(doc, candidate);
            if !seen.insert(turn) {
                continue;
            }

            let id = self
                .ids
                .stable_id(doc, turn)
                .map_or(TargetId::Positional(targets.len()), TargetId::Stable);
            let anchor = query_first(doc, turn, content).unwrap_or(turn);
            let snippet = normalize_snippet(&doc.text_content(anchor), self.snippet_max_chars);

            targets.push(Target {
                id,
                snippet,
                anchor,
                turn,
            });
        }

        targets
    }
}

impl fmt::Debug for TargetIndexer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetIndexer")
            .field("locator", &self.locator)
            .field("snippet_max_chars", &self.snippet_max_chars)
            .finish_non_exhaustive()
    }
}
