//! Keeping the navigation list in step with the conversation.

mod filter;
mod model;

pub use filter::{filter_rows, row_matches};
pub use model::ListModel;

use std::fmt;

use crate::conversation::{IndexSnapshot, TargetId, TargetIndexer};
use crate::dom::HostDocument;

/// Why a resync was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildReason {
    Init,
    Filter,
    Mutation,
    UrlChange,
    Resize,
    Settle,
    Manual,
}

impl RebuildReason {
    /// Explicit reasons always re-render; passive ones may be skipped when
    /// the index has not changed.
    pub fn is_explicit(self) -> bool {
        matches!(
            self,
            RebuildReason::Init | RebuildReason::Filter | RebuildReason::Manual
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RebuildReason::Init => "init",
            RebuildReason::Filter => "filter",
            RebuildReason::Mutation => "mutation",
            RebuildReason::UrlChange => "url-change",
            RebuildReason::Resize => "resize",
            RebuildReason::Settle => "settle",
            RebuildReason::Manual => "manual",
        }
    }
}

impl fmt::Display for RebuildReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rendered list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRow {
    pub id: TargetId,
    /// 1-based position in the unfiltered index
    pub number: usize,
    pub snippet: String,
}

impl ListRow {
    /// Row label, e.g. `3. Sure, here is...`
    pub fn label(&self) -> String {
        format!("{}. {}", self.number, self.snippet)
    }
}

/// Shown instead of rows when there is nothing to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// The index is empty
    NoResponses,
    /// The filter rejected every target
    NoMatches,
}

impl Placeholder {
    pub fn text(self) -> &'static str {
        match self {
            Placeholder::NoResponses => "No assistant responses yet",
            Placeholder::NoMatches => "No matches",
        }
    }
}

/// Full contents of the navigation list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListContent {
    Rows(Vec<ListRow>),
    Empty(Placeholder),
}

/// Render target owned by the panel UI.
pub trait ListRenderer {
    /// Replace the whole list.
    fn render(&mut self, content: ListContent);
    /// Decorate the row whose id equals `active` and only that row. When
    /// that row is not rendered, no row is decorated.
    fn highlight(&mut self, active: Option<&TargetId>);
    fn set_collapsed(&mut self, collapsed: bool);
    /// Put the panel back in place after the host swapped its page.
    fn reattach(&mut self) {}
}

/// What a resync did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResyncOutcome {
    /// Passive trigger with an unchanged index
    Skipped,
    Rendered { total: usize, shown: usize },
}

/// Owns the index snapshot and the no-op detection key.
#[derive(Debug)]
pub struct ListSynchronizer {
    indexer: TargetIndexer,
    snapshot: IndexSnapshot,
    last_key: Option<String>,
}

impl ListSynchronizer {
    pub fn new(indexer: TargetIndexer) -> Self {
        Self {
            indexer,
            snapshot: IndexSnapshot::default(),
            last_key: None,
        }
    }

    pub fn indexer(&self) -> &TargetIndexer {
        &self.indexer
    }

    /// Snapshot from the most recent resync.
    pub fn snapshot(&self) -> &IndexSnapshot {
        &self.snapshot
    }

    /// Build a fresh snapshot from the live document.
    pub fn build<D: HostDocument>(&self, doc: &D) -> IndexSnapshot {
        IndexSnapshot::new(self.indexer.build_targets(doc))
    }

    /// Rebuild the index and re-render when needed.
    pub fn resync<D: HostDocument, R: ListRenderer + ?Sized>(
        &mut self,
        doc: &D,
        renderer: &mut R,
        filter: &str,
        active: Option<&TargetId>,
        reason: RebuildReason,
    ) -> ResyncOutcome {
        let snapshot = self.build(doc);

        let unchanged = self.last_key.as_deref() == Some(snapshot.key());
        self.snapshot = snapshot;
        if unchanged && !reason.is_explicit() {
            tracing::trace!(%reason, "index unchanged, skipping render");
            return ResyncOutcome::Skipped;
        }
        self.last_key = Some(self.snapshot.key().to_string());

        let rows = filter_rows(self.snapshot.targets(), filter);
        let total = self.snapshot.len();
        let shown = rows.len();

        let content = if total == 0 {
            ListContent::Empty(Placeholder::NoResponses)
        } else if rows.is_empty() {
            ListContent::Empty(Placeholder::NoMatches)
        } else {
            ListContent::Rows(rows)
        };
        renderer.render(content);
        renderer.highlight(active);

        tracing::debug!(%reason, total, shown, "list rebuilt");
        ResyncOutcome::Rendered { total, shown }
    }
}
