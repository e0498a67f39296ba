//! The navigation engine: one constructible object that owns the index,
//! the list synchronizer, the change watcher and the scroll navigator, with
//! the host document, preference store and list renderer injected.

use std::time::Instant;

use crate::config::EngineConfig;
use crate::conversation::{IndexSnapshot, Target, TargetId, TargetIndexer, TurnLocator};
use crate::dom::HostDocument;
use crate::generation::CodeBlockTracker;
use crate::prefs::{keys, read_flag, write_flag, PreferenceStore};
use crate::scroll::ScrollNavigator;
use crate::selection::ActiveSelection;
use crate::sync::{ListRenderer, ListSynchronizer, RebuildReason, ResyncOutcome};
use crate::watcher::ChangeWatcher;

pub struct NavEngine<D, P, R> {
    doc: D,
    prefs: P,
    renderer: R,
    sync: ListSynchronizer,
    watcher: ChangeWatcher,
    navigator: ScrollNavigator,
    code_blocks: CodeBlockTracker,
    selection: ActiveSelection,
    filter: String,
    collapsed: bool,
}

impl<D, P, R> NavEngine<D, P, R>
where
    D: HostDocument,
    P: PreferenceStore,
    R: ListRenderer,
{
    /// Build an engine. Persisted filter, collapsed flag and active id are
    /// read here; nothing is rendered until [`NavEngine::start`].
    pub fn new(doc: D, prefs: P, renderer: R, config: &EngineConfig) -> Self {
        let locator = TurnLocator::new(config.contract.clone());
        let indexer = TargetIndexer::new(locator.clone(), config.snippet_max_chars);

        let filter = prefs.get(keys::FILTER).unwrap_or_default();
        let collapsed = read_flag(&prefs, keys::COLLAPSED);
        let selection = ActiveSelection::restore(prefs.get(keys::ACTIVE).as_deref());

        Self {
            doc,
            prefs,
            renderer,
            sync: ListSynchronizer::new(indexer),
            watcher: ChangeWatcher::new(locator, &config.timing),
            navigator: ScrollNavigator::new(
                config.scroll.clone(),
                config.markers.flash.clone(),
                config.timing.flash(),
            ),
            code_blocks: CodeBlockTracker::new(&config.markers, config.timing.code_ready()),
            selection,
            filter,
            collapsed,
        }
    }

    /// Render the initial list and start watching the document.
    pub fn start(&mut self, now: Instant) {
        self.renderer.set_collapsed(self.collapsed);
        self.rebuild(RebuildReason::Init);
        self.watcher.attach(&self.doc, now);
        self.update_code_blocks(now);
    }

    /// Resync the list right away.
    pub fn rebuild(&mut self, reason: RebuildReason) -> ResyncOutcome {
        self.sync.resync(
            &self.doc,
            &mut self.renderer,
            &self.filter,
            self.selection.id(),
            reason,
        )
    }

    /// Resync after the debounce delay, coalescing with pending requests.
    pub fn request_rebuild(&mut self, reason: RebuildReason, now: Instant) {
        self.watcher.request(reason, now);
    }

    /// Scroll to the target with `id`, looked up in a fresh build. Unknown
    /// ids are ignored. Returns whether a jump happened.
    pub fn jump_to(&mut self, id: &TargetId, now: Instant) -> bool {
        let snapshot = self.sync.build(&self.doc);
        match snapshot.find(id) {
            Some(target) => self.jump(target, now),
            None => {
                tracing::debug!(%id, "jump target not found");
                false
            }
        }
    }

    /// Scroll to the last response. No-op on an empty index.
    pub fn jump_to_latest(&mut self, now: Instant) -> bool {
        let snapshot = self.sync.build(&self.doc);
        match snapshot.latest() {
            Some(target) => self.jump(target, now),
            None => false,
        }
    }

    fn jump(&mut self, target: &Target, now: Instant) -> bool {
        if self.navigator.jump(&mut self.doc, target, now).is_none() {
            return false;
        }
        self.selection.select(target.id.clone());
        self.prefs.set(keys::ACTIVE, &target.id.to_string());
        self.renderer.highlight(Some(&target.id));
        true
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Persist the filter and re-render immediately.
    pub fn set_filter(&mut self, text: &str) -> ResyncOutcome {
        self.filter = text.to_string();
        self.prefs.set(keys::FILTER, text);
        self.rebuild(RebuildReason::Filter)
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn set_collapsed(&mut self, collapsed: bool) {
        self.collapsed = collapsed;
        write_flag(&mut self.prefs, keys::COLLAPSED, collapsed);
        self.renderer.set_collapsed(collapsed);
    }

    pub fn toggle_collapsed(&mut self) {
        self.set_collapsed(!self.collapsed);
    }

    /// The viewport changed size.
    pub fn on_resize(&mut self, now: Instant) {
        self.watcher.request(RebuildReason::Resize, now);
    }

    /// Feed pending document mutations to the watcher, then run timers.
    pub fn pump(&mut self, now: Instant) -> Option<ResyncOutcome> {
        let batch = self.doc.drain_mutations();
        if !batch.is_empty() {
            self.watcher.observe(&self.doc, &batch, now);
            self.update_code_blocks(now);
        }
        self.tick(now)
    }

    /// Run timers: reconciliation poll, settle, debounced resyncs and
    /// marker expiry.
    pub fn tick(&mut self, now: Instant) -> Option<ResyncOutcome> {
        let outcome = self.watcher.tick(&self.doc, now);
        if outcome.location_changed {
            self.renderer.reattach();
        }
        if outcome.polled {
            self.update_code_blocks(now);
        }

        let resynced = outcome.rebuild.map(|reason| self.rebuild(reason));

        self.navigator.expire(&mut self.doc, now);
        self.code_blocks.expire(&mut self.doc, now);
        resynced
    }

    fn update_code_blocks(&mut self, now: Instant) {
        let locator = self.sync.indexer().locator();
        let newest = locator.newest_assistant_turn(&self.doc);
        self.code_blocks
            .update(&mut self.doc, locator.contract(), newest, now);
    }

    pub fn active(&self) -> Option<&TargetId> {
        self.selection.id()
    }

    /// Index from the most recent resync.
    pub fn snapshot(&self) -> &IndexSnapshot {
        self.sync.snapshot()
    }

    pub fn document(&self) -> &D {
        &self.doc
    }

    /// Mutable access for host-side changes. Mutations made here are picked
    /// up by the next [`NavEngine::pump`].
    pub fn document_mut(&mut self) -> &mut D {
        &mut self.doc
    }

    pub fn prefs(&self) -> &P {
        &self.prefs
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{query_first, Matcher, MemoryDocument, NodeSpec, ScrollContainer};
    use crate::prefs::MemoryPrefs;
    use crate::sync::{ListModel, Placeholder};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    type Engine = NavEngine<MemoryDocument, MemoryPrefs, ListModel>;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn user(text: &str) -> NodeSpec {
        NodeSpec::new("article")
            .attr("data-testid", "conversation-turn")
            .child(
                NodeSpec::new("div")
                    .attr("data-message-author-role", "user")
                    .text(text),
            )
    }

    fn reply(id: &str, text: &str) -> NodeSpec {
        let lines = format!("{text}\nmore\nmore\nmore\nmore");
        NodeSpec::new("article")
            .attr("data-testid", "conversation-turn")
            .child(
                NodeSpec::new("div")
                    .attr("data-message-author-role", "assistant")
                    .attr("data-message-id", id)
                    .child(NodeSpec::new("div").class("markdown").text(lines)),
            )
    }

    fn thread(ids: &[&str]) -> Vec<NodeSpec> {
        let mut body = Vec::new();
        for id in ids {
            body.push(user(&format!("question {id}")));
            body.push(reply(id, &format!("answer {id}")));
        }
        body
    }

    fn engine_with(body: Vec<NodeSpec>, prefs: MemoryPrefs) -> Engine {
        let doc = MemoryDocument::with_body("https://chat.example/c/1", body);
        NavEngine::new(doc, prefs, ListModel::default(), &EngineConfig::default())
    }

    fn started(ids: &[&str], t0: Instant) -> Engine {
        let mut engine = engine_with(thread(ids), MemoryPrefs::new());
        engine.start(t0);
        engine
    }

    fn stable(id: &str) -> TargetId {
        TargetId::Stable(id.to_string())
    }

    #[test]
    fn start_renders_assistant_targets_only() {
        let engine = started(&["m1", "m2", "m3"], Instant::now());
        let labels: Vec<String> = engine.renderer().rows().iter().map(|r| r.label()).collect();
        assert_eq!(
            labels,
            vec![
                "1. answer m1 more more more more".to_string(),
                "2. answer m2 more more more more".to_string(),
                "3. answer m3 more more more more".to_string(),
            ]
        );
        assert_eq!(engine.renderer().render_count(), 1);
    }

    #[test]
    fn highlight_survives_rebuild_that_keeps_the_id() {
        let t0 = Instant::now();
        let mut engine = started(&["m1", "m2", "m3"], t0);

        assert!(engine.jump_to(&stable("m3"), t0));
        assert_eq!(engine.renderer().active(), Some(&stable("m3")));

        // Host re-renders every turn, same ids, new elements
        engine.document_mut().replace_body(&thread(&["m1", "m2", "m3", "m4"]));
        engine.rebuild(RebuildReason::Mutation);

        assert_eq!(engine.renderer().render_count(), 2);
        assert_eq!(engine.renderer().active(), Some(&stable("m3")));
        assert_eq!(engine.renderer().active_index(), Some(2));
    }

    #[test]
    fn jump_to_latest_on_empty_index_does_nothing() {
        let t0 = Instant::now();
        let mut engine = engine_with(vec![user("hello?")], MemoryPrefs::new());
        engine.start(t0);

        assert!(!engine.jump_to_latest(t0));
        assert!(engine.document().scroll_log().is_empty());
        assert_eq!(engine.active(), None);
        assert_eq!(engine.renderer().placeholder(), Some(Placeholder::NoResponses));
    }

    #[test]
    fn jump_to_latest_selects_and_persists_last_target() {
        let t0 = Instant::now();
        let mut engine = started(&["m1", "m2", "m3"], t0);

        assert!(engine.jump_to_latest(t0));
        assert_eq!(engine.active(), Some(&stable("m3")));
        assert_eq!(engine.prefs().get(keys::ACTIVE).as_deref(), Some("m3"));
        assert_eq!(engine.renderer().active_index(), Some(2));

        let call = engine.document().scroll_log()[0];
        assert_eq!(call.container, ScrollContainer::Document);
    }

    #[test]
    fn jump_to_filtered_out_target_leaves_no_stale_highlight() {
        let t0 = Instant::now();
        let mut engine = started(&["m1", "m2", "m3"], t0);

        assert!(engine.jump_to(&stable("m1"), t0));
        engine.set_filter("answer m1");
        assert_eq!(engine.renderer().active(), Some(&stable("m1")));

        assert!(engine.jump_to_latest(t0));
        assert_eq!(engine.active(), Some(&stable("m3")));
        assert_eq!(engine.renderer().active(), None);
        assert_eq!(engine.renderer().active_index(), None);
    }

    #[test]
    fn jump_resolves_anchor_at_click_time() {
        let t0 = Instant::now();
        let mut engine = started(&["m1", "m2"], t0);
        let stale_anchor = engine.snapshot().targets()[1].anchor;

        engine.document_mut().replace_body(&thread(&["m1", "m2"]));
        assert!(!engine.document().is_attached(stale_anchor));

        assert!(engine.jump_to(&stable("m2"), t0));
        let flashed = engine.document().highlight_restarts()[0].0;
        assert!(engine.document().is_attached(flashed));
    }

    #[test]
    fn unknown_id_is_a_silent_no_op() {
        let t0 = Instant::now();
        let mut engine = started(&["m1"], t0);

        assert!(!engine.jump_to(&stable("gone"), t0));
        assert!(engine.document().scroll_log().is_empty());
        assert_eq!(engine.active(), None);
        assert_eq!(engine.prefs().get(keys::ACTIVE), None);
    }

    #[test]
    fn filter_is_persisted_and_always_rerenders() {
        let t0 = Instant::now();
        let mut engine = started(&["m1", "m2"], t0);

        let first = engine.set_filter("m2");
        let second = engine.set_filter("m2");
        assert_eq!(first, ResyncOutcome::Rendered { total: 2, shown: 1 });
        assert_eq!(second, first);
        assert_eq!(engine.renderer().render_count(), 3);
        assert_eq!(engine.prefs().get(keys::FILTER).as_deref(), Some("m2"));

        engine.set_filter("nothing like this");
        assert_eq!(engine.renderer().placeholder(), Some(Placeholder::NoMatches));
    }

    #[test]
    fn persisted_state_is_restored() {
        let mut prefs = MemoryPrefs::new();
        prefs.set(keys::FILTER, "m2");
        prefs.set(keys::COLLAPSED, "1");
        prefs.set(keys::ACTIVE, "m2");

        let mut engine = engine_with(thread(&["m1", "m2"]), prefs);
        engine.start(Instant::now());

        assert_eq!(engine.filter(), "m2");
        assert!(engine.is_collapsed());
        assert!(engine.renderer().is_collapsed());
        assert_eq!(engine.renderer().rows().len(), 1);
        assert_eq!(engine.renderer().active(), Some(&stable("m2")));
    }

    #[test]
    fn malformed_prefs_fall_back_to_defaults() {
        let mut prefs = MemoryPrefs::new();
        prefs.set(keys::COLLAPSED, "yes please");
        prefs.set(keys::ACTIVE, "   ");

        let mut engine = engine_with(thread(&["m1"]), prefs);
        engine.start(Instant::now());

        assert!(!engine.is_collapsed());
        assert_eq!(engine.active(), None);
        assert_eq!(engine.filter(), "");
    }

    #[test]
    fn collapse_toggle_is_persisted() {
        let mut engine = started(&["m1"], Instant::now());
        engine.toggle_collapsed();
        assert!(engine.renderer().is_collapsed());
        assert_eq!(engine.prefs().get(keys::COLLAPSED).as_deref(), Some("1"));

        engine.set_collapsed(false);
        assert_eq!(engine.prefs().get(keys::COLLAPSED).as_deref(), Some("0"));
    }

    #[test]
    fn streaming_burst_is_debounced_into_one_render() {
        let t0 = Instant::now();
        let mut engine = started(&["m1"], t0);
        let body = engine.document().body();

        for i in 0..20u64 {
            let id = format!("s{i}");
            engine.document_mut().append_spec(body, &reply(&id, "partial"));
            assert_eq!(engine.pump(t0 + ms(i * 20)), None);
        }
        assert_eq!(engine.renderer().render_count(), 1);

        let outcome = engine.pump(t0 + ms(19 * 20 + 250));
        assert_eq!(outcome, Some(ResyncOutcome::Rendered { total: 21, shown: 21 }));
        assert_eq!(engine.renderer().render_count(), 2);
    }

    #[test]
    fn irrelevant_mutations_do_not_rebuild() {
        let t0 = Instant::now();
        let mut engine = started(&["m1"], t0);
        let body = engine.document().body();

        engine
            .document_mut()
            .append_spec(body, &NodeSpec::new("div").class("typing-indicator"));
        engine.pump(t0);
        assert_eq!(engine.pump(t0 + ms(400)), None);
        assert_eq!(engine.renderer().render_count(), 1);
    }

    #[test]
    fn url_change_reattaches_panel_and_rebuilds() {
        let t0 = Instant::now();
        let mut engine = started(&["m1"], t0);

        engine.document_mut().set_location("https://chat.example/c/2");
        engine.document_mut().replace_body(&thread(&["n1", "n2"]));
        engine.pump(t0 + ms(600));
        assert_eq!(engine.renderer().reattach_count(), 1);

        let outcome = engine.pump(t0 + ms(850));
        assert_eq!(outcome, Some(ResyncOutcome::Rendered { total: 2, shown: 2 }));
        assert_eq!(engine.snapshot().targets()[0].id, stable("n1"));
    }

    #[test]
    fn resize_requests_a_debounced_resync() {
        let t0 = Instant::now();
        let mut engine = started(&["m1"], t0);

        engine.on_resize(t0);
        assert_eq!(engine.tick(t0 + ms(100)), None);
        // Unchanged index: the passive resync runs but does not re-render
        assert_eq!(engine.tick(t0 + ms(250)), Some(ResyncOutcome::Skipped));
        assert_eq!(engine.renderer().render_count(), 1);
    }

    #[test]
    fn manual_rebuild_always_renders() {
        let mut engine = started(&["m1"], Instant::now());
        engine.rebuild(RebuildReason::Manual);
        assert_eq!(engine.renderer().render_count(), 2);
    }

    #[test]
    fn flash_is_removed_after_its_duration() {
        let t0 = Instant::now();
        let mut engine = started(&["m1", "m2"], t0);
        engine.jump_to(&stable("m1"), t0);
        let turn = engine.snapshot().targets()[0].turn;
        let flash = EngineConfig::default().markers.flash;

        engine.tick(t0 + ms(100));
        assert!(engine.document().has_class(turn, &flash));
        engine.tick(t0 + ms(1200));
        assert!(!engine.document().has_class(turn, &flash));
    }

    #[test]
    fn code_blocks_marked_while_generating() {
        let t0 = Instant::now();
        let markers = EngineConfig::default().markers;
        let mut engine = started(&["m1"], t0);
        let body = engine.document().body();

        let streaming = reply("m2", "here").child(NodeSpec::new("pre").text("let x = 1;"));
        engine.document_mut().append_spec(body, &streaming);
        let stop = engine
            .document_mut()
            .append_spec(body, &NodeSpec::new("button").attr("data-testid", "stop-button"));
        engine.pump(t0 + ms(10));

        let root = engine.document().root();
        let pre = query_first(engine.document(), root, &Matcher::tag("pre")).unwrap();
        assert!(engine.document().has_class(pre, &markers.code_pending));

        engine.document_mut().remove(stop);
        engine.pump(t0 + ms(20));
        assert!(engine.document().has_class(pre, &markers.code_ready));
        assert!(!engine.document().has_class(pre, &markers.code_pending));

        engine.tick(t0 + ms(20 + 5500));
        assert!(!engine.document().has_class(pre, &markers.code_ready));
    }

    #[test]
    fn independent_engines_do_not_share_state() {
        let t0 = Instant::now();
        let mut a = started(&["m1", "m2"], t0);
        let b = started(&["m1", "m2"], t0);

        a.jump_to(&stable("m1"), t0);
        assert_eq!(a.active(), Some(&stable("m1")));
        assert_eq!(b.active(), None);
    }
}
