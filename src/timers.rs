//! Deadline-based timers driven by the host event loop.
//!
//! Nothing here spawns threads or sleeps. The owner passes the current
//! [`Instant`] in and asks whether a deadline has passed.

use std::time::{Duration, Instant};

use crate::dom::{HostDocument, NodeId};

/// Coalesces bursts of requests: every `schedule` pushes the deadline out
/// again and replaces the pending value (last write wins).
#[derive(Debug, Clone)]
pub struct Debounce<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debounce<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Cancel any pending request and start the delay over with `value`.
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The pending value once its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        let due = self.pending.as_ref().is_some_and(|(_, due)| now >= *due);
        if due {
            self.pending.take().map(|(value, _)| value)
        } else {
            None
        }
    }
}

/// Fixed-period repeating timer.
#[derive(Debug, Clone)]
pub struct Interval {
    period: Duration,
    next: Option<Instant>,
}

impl Interval {
    pub fn new(period: Duration) -> Self {
        Self { period, next: None }
    }

    /// First firing is one period after `now`.
    pub fn start(&mut self, now: Instant) {
        self.next = Some(now + self.period);
    }

    /// Returns true at most once per period. Missed periods are not replayed.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.next {
            Some(next) if now >= next => {
                self.next = Some(now + self.period);
                true
            }
            _ => false,
        }
    }
}

/// Timer that fires once.
#[derive(Debug, Clone, Default)]
pub struct OneShot {
    at: Option<Instant>,
}

impl OneShot {
    pub fn arm(&mut self, at: Instant) {
        self.at = Some(at);
    }

    pub fn fire(&mut self, now: Instant) -> bool {
        match self.at {
            Some(at) if now >= at => {
                self.at = None;
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
struct Mark {
    node: NodeId,
    class: String,
    created_at: Instant,
}

/// Classes that remove themselves from elements after a fixed duration.
#[derive(Debug, Clone)]
pub struct ExpiringMarks {
    duration: Duration,
    marks: Vec<Mark>,
}

impl ExpiringMarks {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            marks: Vec::new(),
        }
    }

    /// Track `class` on `node`; re-tracking restarts its countdown.
    pub fn track(&mut self, node: NodeId, class: &str, now: Instant) {
        self.marks.retain(|m| !(m.node == node && m.class == class));
        self.marks.push(Mark {
            node,
            class: class.to_string(),
            created_at: now,
        });
    }

    pub fn is_tracked(&self, node: NodeId, class: &str) -> bool {
        self.marks.iter().any(|m| m.node == node && m.class == class)
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Remove expired classes from the document.
    pub fn expire<D: HostDocument + ?Sized>(&mut self, doc: &mut D, now: Instant) {
        let duration = self.duration;
        self.marks.retain(|m| {
            let expired = now.saturating_duration_since(m.created_at) >= duration;
            if expired {
                doc.remove_class(m.node, &m.class);
            }
            !expired
        });
    }
}
