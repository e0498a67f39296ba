//! Application state for the respnav terminal front-end.

mod state;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};

use crate::config::EngineConfig;
use crate::conversation::TargetId;
use crate::dom::{DocumentSpec, MemoryDocument, LINE_HEIGHT};
use crate::engine::NavEngine;
use crate::prefs::PreferenceStore;
use crate::sync::{ListModel, RebuildReason};
use crate::ui::PanelState;
use crate::watcher::FixtureWatcher;

pub use state::{StatusMessage, STATUS_TIMEOUT};

/// Engine over the in-memory document, whatever store backs preferences.
pub type Engine = NavEngine<MemoryDocument, Box<dyn PreferenceStore>, ListModel>;

/// Which UI pane currently has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// Navigation panel has focus
    #[default]
    Panel,
    /// Conversation pane has focus (arrow keys scroll)
    Conversation,
}

/// Application state
pub struct App {
    pub engine: Engine,
    pub config: EngineConfig,
    pub panel_state: PanelState,
    pub focus: Focus,
    /// Fixture the document was loaded from
    pub fixture_path: PathBuf,
    fixture_watcher: Option<FixtureWatcher>,
    pub status: StatusMessage,
    pub should_quit: bool,
}

impl App {
    /// Load the fixture and start the engine.
    pub fn new(
        fixture_path: &Path,
        config: EngineConfig,
        prefs: Box<dyn PreferenceStore>,
        now: Instant,
    ) -> Result<Self> {
        let spec = DocumentSpec::load(fixture_path)
            .with_context(|| format!("Failed to load fixture {}", fixture_path.display()))?;
        let doc = MemoryDocument::from_spec(&spec);

        let mut engine = NavEngine::new(doc, prefs, ListModel::default(), &config);
        engine.start(now);

        let fixture_watcher = match FixtureWatcher::new(fixture_path) {
            Ok(w) => Some(w),
            Err(e) => {
                tracing::warn!(error = %e, "fixture changes will not be picked up");
                None
            }
        };

        let mut panel_state = PanelState::with_filter(engine.filter());
        panel_state.clamp_selection(engine.renderer().rows().len());

        let mut app = Self {
            engine,
            config,
            panel_state,
            focus: Focus::Panel,
            fixture_path: fixture_path.to_path_buf(),
            fixture_watcher,
            status: StatusMessage::None,
            should_quit: false,
        };
        app.follow_active();
        Ok(app)
    }

    /// Per-frame housekeeping: fixture reloads, engine timers, cursor clamp.
    pub fn tick(&mut self, now: Instant) {
        let changed = self
            .fixture_watcher
            .as_ref()
            .is_some_and(FixtureWatcher::changed);
        if changed {
            self.reload_fixture(now);
        }

        self.engine.pump(now);
        self.panel_state.clamp_selection(self.rows_len());
    }

    /// Replay the fixture file as a host re-render of the whole page.
    pub fn reload_fixture(&mut self, now: Instant) {
        match DocumentSpec::load(&self.fixture_path) {
            Ok(spec) => {
                let doc = self.engine.document_mut();
                doc.set_location(spec.location);
                doc.replace_body(&spec.body);
                tracing::debug!(path = %self.fixture_path.display(), "fixture reloaded");
                self.status = StatusMessage::Info {
                    text: "Fixture reloaded".to_string(),
                    at: now,
                };
            }
            Err(e) => {
                tracing::warn!(error = %e, "fixture reload failed");
                self.status = StatusMessage::Error {
                    text: e.to_string(),
                    at: now,
                };
            }
        }
    }

    pub fn rows_len(&self) -> usize {
        self.engine.renderer().rows().len()
    }

    /// Id of the row under the keyboard cursor.
    pub fn cursor_id(&self) -> Option<TargetId> {
        let index = self.panel_state.list_state.selected()?;
        self.engine
            .renderer()
            .rows()
            .get(index)
            .map(|row| row.id.clone())
    }

    pub fn select_next(&mut self) {
        let len = self.rows_len();
        self.panel_state.select_next(len);
    }

    pub fn select_previous(&mut self) {
        let len = self.rows_len();
        self.panel_state.select_previous(len);
    }

    /// Jump to the response under the cursor.
    pub fn jump_selected(&mut self, now: Instant) {
        let Some(id) = self.cursor_id() else {
            return;
        };
        if !self.engine.jump_to(&id, now) {
            self.status = StatusMessage::Info {
                text: "Response is no longer on the page".to_string(),
                at: now,
            };
        }
    }

    /// Jump to the newest response and move the cursor onto it.
    pub fn jump_latest(&mut self, now: Instant) {
        if self.engine.jump_to_latest(now) {
            self.follow_active();
        }
    }

    /// Handle a click at a screen position; clicking a row jumps to it.
    pub fn click(&mut self, column: u16, row: u16, now: Instant) {
        let len = self.rows_len();
        if let Some(index) = self.panel_state.row_at(column, row, len) {
            self.panel_state.list_state.select(Some(index));
            self.focus = Focus::Panel;
            self.jump_selected(now);
        }
    }

    /// Start editing the filter, expanding the panel so the input shows.
    pub fn open_filter(&mut self) {
        if self.engine.is_collapsed() {
            self.engine.set_collapsed(false);
        }
        self.focus = Focus::Panel;
        self.panel_state.activate_filter();
    }

    /// Push the panel's filter text into the engine.
    pub fn apply_filter(&mut self) {
        let query = self.panel_state.filter_query.clone();
        self.engine.set_filter(&query);
        self.panel_state.list_state.select(None);
        self.panel_state.clamp_selection(self.rows_len());
    }

    pub fn toggle_collapsed(&mut self) {
        self.engine.toggle_collapsed();
    }

    pub fn manual_rebuild(&mut self) {
        self.engine.rebuild(RebuildReason::Manual);
        self.follow_active();
    }

    /// Scroll the conversation by whole lines (negative is up).
    pub fn scroll_conversation(&mut self, lines: i32) {
        self.engine
            .document_mut()
            .scroll_window_by(f64::from(lines) * LINE_HEIGHT);
    }

    /// Match the document viewport to the rows the conversation pane shows.
    pub fn set_viewport_rows(&mut self, rows: u16) {
        let height = f64::from(rows) * LINE_HEIGHT;
        if (self.engine.document().viewport_height() - height).abs() > f64::EPSILON {
            self.engine.document_mut().set_viewport_height(height);
        }
    }

    pub fn on_resize(&mut self, now: Instant) {
        self.engine.on_resize(now);
    }

    /// Put the cursor on the highlighted row, if it is shown.
    fn follow_active(&mut self) {
        if let Some(index) = self.engine.renderer().active_index() {
            self.panel_state.list_state.select(Some(index));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{HostDocument, NodeSpec};
    use crate::prefs::{keys, MemoryPrefs};
    use std::time::Duration;

    fn reply(id: &str, text: &str) -> NodeSpec {
        NodeSpec::new("article")
            .attr("data-testid", "conversation-turn")
            .child(
                NodeSpec::new("div")
                    .attr("data-message-author-role", "assistant")
                    .attr("data-message-id", id)
                    .child(NodeSpec::new("div").class("markdown").text(text)),
            )
    }

    fn write_fixture(path: &Path, location: &str, ids: &[&str]) {
        let spec = DocumentSpec {
            location: location.to_string(),
            viewport_height: 200.0,
            body: ids.iter().map(|id| reply(id, &format!("answer {id}"))).collect(),
        };
        std::fs::write(path, serde_json::to_string(&spec).unwrap()).unwrap();
    }

    fn app(path: &Path, prefs: MemoryPrefs) -> App {
        App::new(path, EngineConfig::default(), Box::new(prefs), Instant::now()).unwrap()
    }

    #[test]
    fn loads_fixture_and_lists_responses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conversation.json");
        write_fixture(&path, "https://chat.example/c/1", &["m1", "m2"]);

        let app = app(&path, MemoryPrefs::new());
        assert_eq!(app.rows_len(), 2);
        assert_eq!(app.panel_state.list_state.selected(), Some(0));
        assert_eq!(app.engine.document().viewport_height(), 200.0);
    }

    #[test]
    fn missing_fixture_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = App::new(
            &dir.path().join("nope.json"),
            EngineConfig::default(),
            Box::new(MemoryPrefs::new()),
            Instant::now(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn cursor_jump_selects_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conversation.json");
        write_fixture(&path, "https://chat.example/c/1", &["m1", "m2", "m3"]);
        let now = Instant::now();

        let mut app = app(&path, MemoryPrefs::new());
        app.select_next();
        app.jump_selected(now);

        let expected = TargetId::Stable("m2".to_string());
        assert_eq!(app.engine.active(), Some(&expected));
        assert_eq!(app.engine.prefs().get(keys::ACTIVE).as_deref(), Some("m2"));
    }

    #[test]
    fn jump_latest_moves_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conversation.json");
        write_fixture(&path, "https://chat.example/c/1", &["m1", "m2", "m3"]);

        let mut app = app(&path, MemoryPrefs::new());
        app.jump_latest(Instant::now());
        assert_eq!(app.panel_state.list_state.selected(), Some(2));
    }

    #[test]
    fn restored_active_id_positions_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conversation.json");
        write_fixture(&path, "https://chat.example/c/1", &["m1", "m2", "m3"]);
        let mut prefs = MemoryPrefs::new();
        prefs.set(keys::ACTIVE, "m3");

        let app = app(&path, prefs);
        assert_eq!(app.panel_state.list_state.selected(), Some(2));
    }

    #[test]
    fn filter_edits_reach_the_engine() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conversation.json");
        write_fixture(&path, "https://chat.example/c/1", &["m1", "m2"]);

        let mut app = app(&path, MemoryPrefs::new());
        app.panel_state.filter_query = "m2".to_string();
        app.apply_filter();
        assert_eq!(app.rows_len(), 1);
        assert_eq!(app.panel_state.list_state.selected(), Some(0));
        assert_eq!(app.engine.filter(), "m2");
    }

    #[test]
    fn opening_filter_expands_collapsed_panel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conversation.json");
        write_fixture(&path, "https://chat.example/c/1", &["m1"]);
        let mut prefs = MemoryPrefs::new();
        prefs.set(keys::COLLAPSED, "1");

        let mut app = app(&path, prefs);
        app.focus = Focus::Conversation;
        assert!(app.engine.is_collapsed());

        app.open_filter();
        assert!(!app.engine.is_collapsed());
        assert!(!app.engine.renderer().is_collapsed());
        assert!(app.panel_state.filter_active);
        assert_eq!(app.focus, Focus::Panel);
        assert_eq!(app.engine.prefs().get(keys::COLLAPSED).as_deref(), Some("0"));
    }

    #[test]
    fn reload_replays_fixture_as_host_rerender() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conversation.json");
        write_fixture(&path, "https://chat.example/c/1", &["m1"]);
        let t0 = Instant::now();

        let mut app = App::new(
            &path,
            EngineConfig::default(),
            Box::new(MemoryPrefs::new()),
            t0,
        )
        .unwrap();

        write_fixture(&path, "https://chat.example/c/1", &["m1", "m2"]);
        app.reload_fixture(t0);
        // Drive the engine directly so file events cannot trigger a second reload
        app.engine.pump(t0 + Duration::from_millis(10));
        app.engine.pump(t0 + Duration::from_millis(300));
        assert_eq!(app.rows_len(), 2);
        assert!(matches!(app.status, StatusMessage::Info { .. }));
    }

    #[test]
    fn broken_reload_keeps_previous_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conversation.json");
        write_fixture(&path, "https://chat.example/c/1", &["m1"]);
        let now = Instant::now();

        let mut app = app(&path, MemoryPrefs::new());
        std::fs::write(&path, "{ not json").unwrap();
        app.reload_fixture(now);

        assert!(matches!(app.status, StatusMessage::Error { .. }));
        assert_eq!(app.engine.document().location(), "https://chat.example/c/1");
        assert_eq!(app.rows_len(), 1);
    }
}
