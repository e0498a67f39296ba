//! Free-text filtering of the target list.

use crate::conversation::Target;

use super::ListRow;

/// Case-insensitive substring match against `"<number> <snippet>"`.
/// `needle` must already be trimmed and lower-cased; empty matches all.
pub fn row_matches(number: usize, snippet: &str, needle: &str) -> bool {
    needle.is_empty() || format!("{number} {snippet}").to_lowercase().contains(needle)
}

/// Rows for the targets that pass `filter`, numbered by their position in
/// the unfiltered list.
pub fn filter_rows(targets: &[Target], filter: &str) -> Vec<ListRow> {
    let needle = filter.trim().to_lowercase();
    targets
        .iter()
        .enumerate()
        .map(|(idx, t)| (idx + 1, t))
        .filter(|(number, t)| row_matches(*number, &t.snippet, &needle))
        .map(|(number, t)| ListRow {
            id: t.id.clone(),
            number,
            snippet: t.snippet.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::TargetId;
    use crate::dom::NodeId;

    fn targets(snippets: &[&str]) -> Vec<Target> {
        snippets
            .iter()
            .enumerate()
            .map(|(i, s)| Target {
                id: TargetId::Positional(i),
                snippet: s.to_string(),
                anchor: NodeId(i),
                turn: NodeId(i),
            })
            .collect()
    }

    #[test]
    fn matches_snippet_case_insensitively() {
        let rows = filter_rows(&targets(&["Hello World", "goodbye"]), "  WORLD ");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].number, 1);
    }

    #[test]
    fn matches_serial_number() {
        let all = targets(&["alpha", "beta", "gamma"]);
        let rows = filter_rows(&all, "3");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].snippet, "gamma");

        // Number and snippet are joined by a single space
        let rows = filter_rows(&all, "2 be");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].number, 2);
    }

    #[test]
    fn empty_filter_keeps_everything() {
        assert_eq!(filter_rows(&targets(&["a", "b"]), "").len(), 2);
        assert_eq!(filter_rows(&targets(&["a", "b"]), "   ").len(), 2);
    }
}
