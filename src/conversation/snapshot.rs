//! Immutable result of one index build.

use super::{Target, TargetId};

/// Ordered targets plus the key used to detect no-op resyncs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexSnapshot {
    targets: Vec<Target>,
    key: String,
}

impl IndexSnapshot {
    pub fn new(targets: Vec<Target>) -> Self {
        let key = comparison_key(&targets);
        Self { targets, key }
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Last target in document order.
    pub fn latest(&self) -> Option<&Target> {
        self.targets.last()
    }

    pub fn find(&self, id: &TargetId) -> Option<&Target> {
        self.targets.iter().find(|t| &t.id == id)
    }

    /// 0-based position of `id` in document order.
    pub fn position(&self, id: &TargetId) -> Option<usize> {
        self.targets.iter().position(|t| &t.id == id)
    }
}

/// Stable ids where the host provides them, snippets for degraded targets.
fn comparison_key(targets: &[Target]) -> String {
    let parts: Vec<&str> = targets
        .iter()
        .map(|t| match &t.id {
            TargetId::Stable(id) => id.as_str(),
            TargetId::Positional(_) => t.snippet.as_str(),
        })
        .collect();
    parts.join("\n")
}
