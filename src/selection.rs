//! The user's active target.

use crate::conversation::TargetId;

/// `Unset` until the user picks a target; never returns to `Unset` on its
/// own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ActiveSelection {
    #[default]
    Unset,
    Selected(TargetId),
}

impl ActiveSelection {
    /// Restore from a persisted value. Blank or missing values leave the
    /// selection unset.
    pub fn restore(persisted: Option<&str>) -> Self {
        persisted
            .and_then(TargetId::parse)
            .map_or(ActiveSelection::Unset, ActiveSelection::Selected)
    }

    pub fn select(&mut self, id: TargetId) {
        *self = ActiveSelection::Selected(id);
    }

    pub fn id(&self) -> Option<&TargetId> {
        match self {
            ActiveSelection::Unset => None,
            ActiveSelection::Selected(id) => Some(id),
        }
    }
}
