//! Terminal UI components: conversation pane and navigation panel.

pub mod conversation_pane;
pub mod layout;
pub mod panel;

pub use conversation_pane::ConversationPane;
pub use panel::{FilterKeyResult, NavPanel, PanelState};
