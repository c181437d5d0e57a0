//! Group edits by file and order them for sequential application.
//!
//! Within a file, edits run bottom-to-top and right-to-left: descending line,
//! then descending start column. An edit never shifts text at or before its own
//! start, so every edit still to be applied keeps valid coordinates.

use crate::edit::Edit;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use tracing::debug;

/// All edits targeting one file, in application order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEditGroup {
    pub file: PathBuf,
    pub edits: Vec<Edit>,
}

/// Application order: descending line, then descending start column.
pub fn application_order(a: &Edit, b: &Edit) -> Ordering {
    b.line
        .cmp(&a.line)
        .then(b.column_start.cmp(&a.column_start))
}

/// Group edits by file, keeping files in first-seen order.
///
/// Exact duplicates (same span, verification, and replacement) are collapsed.
pub fn group_edits(edits: impl IntoIterator<Item = Edit>) -> Vec<FileEditGroup> {
    let mut slots: HashMap<PathBuf, usize> = HashMap::new();
    let mut groups: Vec<FileEditGroup> = Vec::new();

    for edit in edits {
        let slot = *slots.entry(edit.file.clone()).or_insert_with(|| {
            groups.push(FileEditGroup {
                file: edit.file.clone(),
                edits: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].edits.push(edit);
    }

    for group in &mut groups {
        let before = group.edits.len();
        let mut seen = HashSet::new();
        group.edits.retain(|edit| seen.insert(edit.clone()));
        if group.edits.len() < before {
            debug!(
                file = %group.file.display(),
                removed = before - group.edits.len(),
                "collapsed duplicate edits"
            );
        }

        // Stable, so equal positions keep their diagnostic order.
        group.edits.sort_by(application_order);
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn edit(file: &str, line: usize, start: usize, end: usize) -> Edit {
        Edit::new(file, line, start, end, "x", "y").unwrap()
    }

    #[test]
    fn test_groups_keep_first_seen_file_order() {
        let groups = group_edits(vec![
            edit("b.js", 1, 0, 1),
            edit("a.js", 1, 0, 1),
            edit("b.js", 2, 0, 1),
        ]);

        let files: Vec<_> = groups.iter().map(|g| g.file.clone()).collect();
        assert_eq!(files, vec![PathBuf::from("b.js"), PathBuf::from("a.js")]);
        assert_eq!(groups[0].edits.len(), 2);
    }

    #[test]
    fn test_orders_bottom_to_top_right_to_left() {
        let groups = group_edits(vec![
            edit("a.js", 3, 2, 4),
            edit("a.js", 10, 0, 6),
            edit("a.js", 3, 20, 29),
            edit("a.js", 7, 5, 5),
        ]);

        let order: Vec<_> = groups[0]
            .edits
            .iter()
            .map(|e| (e.line, e.column_start))
            .collect();
        assert_eq!(order, vec![(10, 0), (7, 5), (3, 20), (3, 2)]);
    }

    #[test]
    fn test_collapses_exact_duplicates() {
        let groups = group_edits(vec![
            Edit::reindent("a.js", 4, 2, 4).unwrap(),
            Edit::reindent("a.js", 4, 2, 4).unwrap(),
            Edit::reindent("a.js", 4, 0, 4).unwrap(),
        ]);
        assert_eq!(groups[0].edits.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(group_edits(Vec::new()).is_empty());
    }

    proptest! {
        #[test]
        fn groups_are_single_file_and_ordered(
            specs in proptest::collection::vec((0usize..3, 1usize..20, 0usize..10), 0..40)
        ) {
            let edits: Vec<Edit> = specs
                .iter()
                .map(|(file, line, start)| edit(&format!("f{file}.js"), *line, *start, start + 1))
                .collect();
            let groups = group_edits(edits);

            for group in &groups {
                prop_assert!(group.edits.iter().all(|e| e.file == group.file));
                for pair in group.edits.windows(2) {
                    prop_assert_ne!(application_order(&pair[0], &pair[1]), Ordering::Greater);
                }
            }
        }
    }
}
