//! Deciding when the navigation list needs a resync.

mod fixture;

pub use fixture::FixtureWatcher;

use std::time::{Duration, Instant};

use crate::config::TimingConfig;
use crate::conversation::TurnLocator;
use crate::dom::{matches_or_contains, HostDocument, Matcher, MutationRecord, NodeId};
use crate::sync::RebuildReason;
use crate::timers::{Debounce, Interval, OneShot};

/// What a [`ChangeWatcher::tick`] found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchOutcome {
    /// A debounced resync is due now
    pub rebuild: Option<RebuildReason>,
    /// The reconciliation poll ran on this tick
    pub polled: bool,
    /// The page location changed since the previous poll
    pub location_changed: bool,
}

/// Turns mutation batches and timers into debounced resync requests.
#[derive(Debug)]
pub struct ChangeWatcher {
    locator: TurnLocator,
    root: Option<NodeId>,
    last_location: String,
    pending: Debounce<RebuildReason>,
    poll: Interval,
    settle: OneShot,
    settle_after: Duration,
}

impl ChangeWatcher {
    pub fn new(locator: TurnLocator, timing: &TimingConfig) -> Self {
        Self {
            locator,
            root: None,
            last_location: String::new(),
            pending: Debounce::new(timing.debounce()),
            poll: Interval::new(timing.poll()),
            settle: OneShot::default(),
            settle_after: timing.settle(),
        }
    }

    /// Start observing: find the conversation root, remember the location,
    /// arm the settle resync and start the reconciliation poll.
    pub fn attach<D: HostDocument + ?Sized>(&mut self, doc: &D, now: Instant) {
        self.anchor(doc);
        self.last_location = doc.location().to_string();
        self.settle.arm(now + self.settle_after);
        self.poll.start(now);
    }

    /// Currently observed conversation root.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    fn anchor<D: HostDocument + ?Sized>(&mut self, doc: &D) {
        let root = self.locator.conversation_root(doc);
        tracing::debug!(root = root.0, "observing conversation root");
        self.root = Some(root);
    }

    /// Whether the batch can change which targets exist.
    ///
    /// Only records inside the observed root count, and only for added
    /// elements that are, or contain, a turn or role-marked element. Nodes
    /// injected by the panel itself are ignored.
    pub fn is_relevant<D: HostDocument + ?Sized>(&self, doc: &D, batch: &[MutationRecord]) -> bool {
        let Some(root) = self.root else {
            return false;
        };
        let contract = self.locator.contract();
        let role = contract.role();
        let wanted = Matcher::any_of([contract.turn.clone(), role]);

        batch
            .iter()
            .filter(|record| doc.is_inclusive_descendant(record.target, root))
            .flat_map(|record| record.added.iter().copied())
            .filter(|&node| {
                !doc
                    .attr(node, "id")
                    .is_some_and(|id| id.starts_with(&contract.own_id_prefix))
            })
            .any(|node| matches_or_contains(doc, node, &wanted))
    }

    /// Feed one mutation batch. Relevant batches (re)start the debounce.
    pub fn observe<D: HostDocument + ?Sized>(
        &mut self,
        doc: &D,
        batch: &[MutationRecord],
        now: Instant,
    ) -> bool {
        if batch.is_empty() || !self.is_relevant(doc, batch) {
            return false;
        }
        self.request(RebuildReason::Mutation, now);
        true
    }

    /// Schedule a debounced resync; the latest request wins.
    pub fn request(&mut self, reason: RebuildReason, now: Instant) {
        self.pending.schedule(reason, now);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_pending()
    }

    /// Run timers.
    pub fn tick<D: HostDocument + ?Sized>(&mut self, doc: &D, now: Instant) -> WatchOutcome {
        let mut outcome = WatchOutcome::default();

        if self.poll.fire(now) {
            outcome.polled = true;
            if doc.location() != self.last_location {
                tracing::info!(
                    from = %self.last_location,
                    to = %doc.location(),
                    "location changed"
                );
                self.last_location = doc.location().to_string();
                outcome.location_changed = true;
                self.anchor(doc);
                self.request(RebuildReason::UrlChange, now);
            } else if self.root.is_some_and(|root| !doc.is_attached(root)) {
                tracing::debug!("conversation root detached, re-anchoring");
                self.anchor(doc);
                self.request(RebuildReason::Mutation, now);
            }
        }

        if self.settle.fire(now) {
            self.request(RebuildReason::Settle, now);
        }

        outcome.rebuild = self.pending.take_due(now);
        outcome
    }
}
