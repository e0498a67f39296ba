//! Discovering assistant responses in the host document.
//!
//! [`TurnLocator`] finds turn elements and reads their roles;
//! [`TargetIndexer`] turns the assistant ones into ordered [`Target`]s;
//! [`IndexSnapshot`] freezes one build for comparison.

mod contract;
mod locator;
mod snapshot;
mod targets;

pub use contract::MarkupContract;
pub use locator::{Role, TurnLocator};
pub use snapshot::IndexSnapshot;
pub use targets::{
    normalize_snippet, AttributeIdSource, IdSource, Target, TargetId, TargetIndexer, ELLIPSIS,
    EMPTY_SNIPPET,
};
