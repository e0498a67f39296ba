//! In-memory render target for the navigation list.

use crate::conversation::TargetId;

use super::{ListContent, ListRenderer, ListRow, Placeholder};

/// Holds whatever was last rendered. The terminal panel draws from it and
/// tests inspect it.
#[derive(Debug, Clone)]
pub struct ListModel {
    content: ListContent,
    active: Option<TargetId>,
    collapsed: bool,
    render_count: usize,
    reattach_count: usize,
}

impl Default for ListModel {
    fn default() -> Self {
        Self {
            content: ListContent::Rows(Vec::new()),
            active: None,
            collapsed: false,
            render_count: 0,
            reattach_count: 0,
        }
    }
}

impl ListModel {
    pub fn content(&self) -> &ListContent {
        &self.content
    }

    /// Rendered rows, empty while a placeholder is shown.
    pub fn rows(&self) -> &[ListRow] {
        match &self.content {
            ListContent::Rows(rows) => rows.as_slice(),
            ListContent::Empty(_) => &[],
        }
    }

    pub fn placeholder(&self) -> Option<Placeholder> {
        match self.content {
            ListContent::Empty(p) => Some(p),
            ListContent::Rows(_) => None,
        }
    }

    /// Id of the highlighted row.
    pub fn active(&self) -> Option<&TargetId> {
        self.active.as_ref()
    }

    /// Index of the highlighted row within [`ListModel::rows`].
    pub fn active_index(&self) -> Option<usize> {
        let active = self.active.as_ref()?;
        self.rows().iter().position(|r| &r.id == active)
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    /// Number of full renders so far.
    pub fn render_count(&self) -> usize {
        self.render_count
    }

    pub fn reattach_count(&self) -> usize {
        self.reattach_count
    }
}

impl ListRenderer for ListModel {
    fn render(&mut self, content: ListContent) {
        self.content = content;
        self.active = None;
        self.render_count += 1;
    }

    fn highlight(&mut self, active: Option<&TargetId>) {
        self.active = active
            .filter(|id| self.rows().iter().any(|r| &r.id == *id))
            .cloned();
    }

    fn set_collapsed(&mut self, collapsed: bool) {
        self.collapsed = collapsed;
    }

    fn reattach(&mut self) {
        self.reattach_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, number: usize) -> ListRow {
        ListRow {
            id: TargetId::Stable(id.to_string()),
            number,
            snippet: format!("snippet {number}"),
        }
    }

    #[test]
    fn highlight_ignores_ids_not_rendered() {
        let mut model = ListModel::default();
        model.render(ListContent::Rows(vec![row("m1", 1), row("m2", 2)]));

        model.highlight(Some(&TargetId::Stable("m9".to_string())));
        assert_eq!(model.active(), None);

        model.highlight(Some(&TargetId::Stable("m2".to_string())));
        assert_eq!(model.active_index(), Some(1));
    }

    #[test]
    fn highlight_of_hidden_row_clears_previous_one() {
        let mut model = ListModel::default();
        model.render(ListContent::Rows(vec![row("m1", 1)]));
        model.highlight(Some(&TargetId::Stable("m1".to_string())));

        model.highlight(Some(&TargetId::Stable("m3".to_string())));
        assert_eq!(model.active(), None);
        assert_eq!(model.active_index(), None);
    }

    #[test]
    fn render_clears_previous_decoration() {
        let mut model = ListModel::default();
        model.render(ListContent::Rows(vec![row("m1", 1)]));
        model.highlight(Some(&TargetId::Stable("m1".to_string())));

        model.render(ListContent::Empty(Placeholder::NoMatches));
        assert_eq!(model.active(), None);
        assert!(model.rows().is_empty());
        assert_eq!(model.render_count(), 2);
    }
}
