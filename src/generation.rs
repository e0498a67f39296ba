//! Pending/ready markers on code blocks of the response being streamed.

use std::time::{Duration, Instant};

use crate::config::MarkerConfig;
use crate::conversation::MarkupContract;
use crate::dom::{query_all, query_first, HostDocument, Matcher, NodeId};
use crate::timers::ExpiringMarks;

/// Whether the host page currently shows a generation indicator.
pub fn is_generating<D: HostDocument + ?Sized>(doc: &D, contract: &MarkupContract) -> bool {
    let root = doc.root();
    if query_first(doc, root, &contract.generating).is_some() {
        return true;
    }
    let label = contract.stop_label.trim().to_lowercase();
    !label.is_empty()
        && query_all(doc, root, &Matcher::tag("button"))
            .into_iter()
            .any(|b| doc.text_content(b).trim().to_lowercase() == label)
}

/// Tracks the generating → idle transition and marks code blocks in the
/// newest response accordingly.
#[derive(Debug, Clone)]
pub struct CodeBlockTracker {
    pending_class: String,
    ready_class: String,
    was_generating: bool,
    ready: ExpiringMarks,
}

impl CodeBlockTracker {
    pub fn new(markers: &MarkerConfig, ready_for: Duration) -> Self {
        Self {
            pending_class: markers.code_pending.clone(),
            ready_class: markers.code_ready.clone(),
            was_generating: false,
            ready: ExpiringMarks::new(ready_for),
        }
    }

    /// Re-evaluate markers against the current page.
    pub fn update<D: HostDocument + ?Sized>(
        &mut self,
        doc: &mut D,
        contract: &MarkupContract,
        newest: Option<NodeId>,
        now: Instant,
    ) {
        let generating = is_generating(doc, contract);
        let Some(turn) = newest else {
            self.was_generating = generating;
            return;
        };
        let blocks = query_all(doc, turn, &contract.code_block);

        if generating {
            for &block in &blocks {
                doc.add_class(block, &self.pending_class);
                doc.remove_class(block, &self.ready_class);
            }
        }

        if self.was_generating && !generating {
            tracing::debug!(blocks = blocks.len(), "generation finished");
            for &block in &blocks {
                doc.remove_class(block, &self.pending_class);
                doc.add_class(block, &self.ready_class);
                self.ready.track(block, &self.ready_class, now);
            }
        }

        self.was_generating = generating;
    }

    /// Drop ready markers whose time is up.
    pub fn expire<D: HostDocument + ?Sized>(&mut self, doc: &mut D, now: Instant) {
        self.ready.expire(doc, now);
    }

    pub fn was_generating(&self) -> bool {
        self.was_generating
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryDocument, NodeSpec};

    fn page(generating: bool) -> Vec<NodeSpec> {
        let mut body = vec![NodeSpec::new("article")
            .attr("data-testid", "conversation-turn")
            .child(
                NodeSpec::new("div")
                    .attr("data-message-author-role", "assistant")
                    .child(NodeSpec::new("pre").text("fn main() {}")),
            )];
        if generating {
            body.push(NodeSpec::new("button").attr("data-testid", "stop-button"));
        }
        body
    }

    fn tracker() -> CodeBlockTracker {
        CodeBlockTracker::new(&MarkerConfig::default(), Duration::from_millis(5500))
    }

    #[test]
    fn detects_each_indicator_kind() {
        let contract = MarkupContract::default();
        let cases = [
            NodeSpec::new("button").attr("data-testid", "stop-button"),
            NodeSpec::new("button").attr("aria-label", "Stop streaming"),
            NodeSpec::new("button").attr("title", "Stop"),
            NodeSpec::new("button").text("  Stop generating "),
        ];
        for case in cases {
            let doc = MemoryDocument::with_body("about:blank", vec![case.clone()]);
            assert!(is_generating(&doc, &contract), "{case:?}");
        }

        let idle = MemoryDocument::with_body(
            "about:blank",
            vec![
                NodeSpec::new("button").text("Regenerate"),
                NodeSpec::new("div").attr("title", "Stop"),
            ],
        );
        assert!(!is_generating(&idle, &contract));
    }

    #[test]
    fn pending_then_ready_then_cleared() {
        let contract = MarkupContract::default();
        let markers = MarkerConfig::default();
        let t0 = Instant::now();
        let mut doc = MemoryDocument::with_body("about:blank", page(true));
        let turn = query_first(&doc, doc.root(), &contract.turn);
        let pre = query_first(&doc, doc.root(), &Matcher::tag("pre")).unwrap();
        let mut tracker = tracker();

        tracker.update(&mut doc, &contract, turn, t0);
        assert!(doc.has_class(pre, &markers.code_pending));

        // Stop button disappears: generation finished
        let button = query_first(&doc, doc.root(), &Matcher::tag("button")).unwrap();
        doc.remove(button);
        tracker.update(&mut doc, &contract, turn, t0 + Duration::from_secs(1));
        assert!(!doc.has_class(pre, &markers.code_pending));
        assert!(doc.has_class(pre, &markers.code_ready));

        tracker.expire(&mut doc, t0 + Duration::from_secs(7));
        assert!(!doc.has_class(pre, &markers.code_ready));
    }

    #[test]
    fn idle_page_is_left_alone() {
        let contract = MarkupContract::default();
        let mut doc = MemoryDocument::with_body("about:blank", page(false));
        let turn = query_first(&doc, doc.root(), &contract.turn);
        let pre = query_first(&doc, doc.root(), &Matcher::tag("pre")).unwrap();
        let mut tracker = tracker();

        tracker.update(&mut doc, &contract, turn, Instant::now());
        assert!(doc.classes(pre).is_empty());
        assert!(!tracker.was_generating());
    }
}
