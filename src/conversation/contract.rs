//! Host page markup contract.
//!
//! The chat page's markup is unversioned and has changed between releases,
//! so every selector the engine depends on lives here as data and can be
//! overridden from the config file.

use serde::{Deserialize, Serialize};

use crate::dom::Matcher;

/// Selectors and attribute names describing the host page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupContract {
    /// Primary "conversation turn" contract
    pub turn: Matcher,
    /// Attribute carrying the author role (the fallback contract)
    pub role_attr: String,
    /// Attribute carrying a stable message identifier
    pub id_attr: String,
    /// Rendered-content containers preferred as scroll anchors
    pub content: Matcher,
    /// Elements that only exist while a response is being generated
    pub generating: Matcher,
    /// Button label (trimmed, case-insensitive) that also marks generation
    pub stop_label: String,
    /// Code blocks tracked for pending/ready markers
    pub code_block: Matcher,
    /// Id prefix of elements injected by the panel itself
    pub own_id_prefix: String,
}

impl Default for MarkupContract {
    fn default() -> Self {
        Self {
            turn: Matcher::attr_equals("data-testid", "conversation-turn"),
            role_attr: "data-message-author-role".to_string(),
            id_attr: "data-message-id".to_string(),
            content: Matcher::any_of([
                Matcher::class("markdown"),
                Matcher::class("prose"),
                Matcher::attr_equals("data-message-author-role", "assistant"),
            ]),
            generating: Matcher::any_of([
                Matcher::attr_equals("data-testid", "stop-button"),
                Matcher::all_of([
                    Matcher::tag("button"),
                    Matcher::attr_contains("aria-label", "Stop"),
                ]),
                Matcher::all_of([Matcher::tag("button"), Matcher::attr_contains("title", "Stop")]),
            ]),
            stop_label: "stop generating".to_string(),
            code_block: Matcher::tag("pre"),
            own_id_prefix: "respnav-".to_string(),
        }
    }
}

impl MarkupContract {
    /// Matcher for the fallback "message role" contract.
    pub fn role(&self) -> Matcher {
        Matcher::has_attr(self.role_attr.clone())
    }
}
