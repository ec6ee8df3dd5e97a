//! Responsible for transforming the `ExplorerState` into a `ViewState` view model.
//!
//! This module acts as a presentation layer: it flattens the tree, attaches the
//! resolved checkbox state to every row and formats the summary line.

use serde::Serialize;

use super::auto_exclude::ExclusionReason;
use super::state::ExplorerState;
use crate::core::{CheckState, FlatRow, TreeNode};
use crate::utils::{format_size, is_image_file};

/// A serializable snapshot of everything the tree view renders.
#[derive(Serialize, Clone, Debug)]
pub struct ViewState {
    pub repository: Option<String>,
    pub rows: Vec<RowView>,
    pub total_files: usize,
    pub selected_files: usize,
    pub excluded_files: usize,
    pub selected_size: u64,
    pub filters_enabled: bool,
    pub include_globs: Vec<String>,
    pub exclude_globs: Vec<String>,
    pub search_query: String,
    pub status_message: String,
}

/// A single visible row of the tree view.
#[derive(Serialize, Clone, Debug)]
pub struct RowView {
    pub name: String,
    pub path: String,
    pub depth: usize,
    pub is_directory: bool,
    pub is_image: bool,
    pub size: u64,
    /// Number of files below a directory; `1` for files.
    pub file_count: usize,
    pub check_state: CheckState,
    pub is_disabled: bool,
    pub is_expanded: bool,
    pub is_match: bool,
    pub auto_excluded: Option<ExclusionReason>,
}

/// Creates the complete `ViewState` from the current `ExplorerState`.
pub fn generate_view_state(state: &ExplorerState) -> ViewState {
    let selection = state.selection();
    let query = state.search_query().trim().to_lowercase();
    let rows = state
        .rows()
        .into_iter()
        .map(|row| build_row(state, row, &query))
        .collect();

    let status_message = if state.repo().is_none() {
        "No repository loaded".to_string()
    } else {
        let mut message = format!(
            "{} of {} files selected ({})",
            selection.selected_files.len(),
            selection.total_files,
            format_size(selection.selected_size)
        );
        if selection.excluded_files > 0 {
            message.push_str(&format!(", {} excluded", selection.excluded_files));
        }
        message
    };

    ViewState {
        repository: state.repo().map(ToString::to_string),
        rows,
        total_files: selection.total_files,
        selected_files: selection.selected_files.len(),
        excluded_files: selection.excluded_files,
        selected_size: selection.selected_size,
        filters_enabled: state.filters_enabled(),
        include_globs: state.include_globs().to_vec(),
        exclude_globs: state.exclude_globs().to_vec(),
        search_query: state.search_query().to_string(),
        status_message,
    }
}

fn build_row(state: &ExplorerState, row: FlatRow<'_>, query: &str) -> RowView {
    let node = row.node;
    let path = node.path();
    let is_match = !query.is_empty() && path.to_lowercase().contains(query);

    let (check_state, is_disabled, is_expanded, auto_excluded) = match node {
        TreeNode::Dir(dir) => {
            let counts = state.selection().dir_counts(&dir.path);
            let expanded = !query.is_empty() || !state.collapsed_dirs().contains(&dir.path);
            (counts.state(), counts.is_disabled(), expanded, None)
        }
        TreeNode::File(file) => {
            let check_state = if state.selection().is_selected(&file.path) {
                CheckState::Checked
            } else {
                CheckState::Unchecked
            };
            (
                check_state,
                state.is_excluded(&file.path),
                false,
                state.auto_exclusion(&file.path),
            )
        }
    };

    RowView {
        name: node.name().to_string(),
        path: path.to_string(),
        depth: row.depth,
        is_directory: node.is_dir(),
        is_image: !node.is_dir() && is_image_file(path),
        size: node.total_size(),
        file_count: node.file_count(),
        check_state,
        is_disabled,
        is_expanded,
        is_match,
        auto_excluded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::core::RepoRef;
    use crate::utils::test_helpers::{mixed_entries, sample_entries};

    fn state_with(entries: Vec<crate::core::RepoEntry>) -> ExplorerState {
        let mut state = ExplorerState::new(AppConfig {
            default_exclude_globs: Vec::new(),
            ..Default::default()
        });
        state.load_entries(RepoRef::new("octocat", "hello-world"), entries);
        state
    }

    #[test]
    fn test_empty_state() {
        let view = generate_view_state(&ExplorerState::default());
        assert!(view.rows.is_empty());
        assert_eq!(view.status_message, "No repository loaded");
        assert_eq!(view.repository, None);
    }

    #[test]
    fn test_rows_carry_check_states() {
        let mut state = state_with(sample_entries());
        state.set_masks(vec!["nothing".into()], Vec::new());
        state.toggle_file("src/index.ts");

        let view = generate_view_state(&state);
        let row = |path: &str| view.rows.iter().find(|r| r.path == path).unwrap();

        assert_eq!(row("src").check_state, CheckState::Indeterminate);
        assert_eq!(row("src").file_count, 2);
        assert_eq!(row("src").size, 7400);
        assert!(row("src").is_expanded);
        assert_eq!(row("src/components").check_state, CheckState::Unchecked);
        assert_eq!(row("src/index.ts").check_state, CheckState::Checked);
        assert_eq!(row("src/index.ts").depth, 1);
        assert_eq!(view.status_message, "1 of 4 files selected (3.1 KB)");
    }

    #[test]
    fn test_auto_excluded_rows_are_disabled() {
        let state = state_with(mixed_entries());
        let view = generate_view_state(&state);
        let row = |path: &str| view.rows.iter().find(|r| r.path == path).unwrap();

        let hero = row("assets/hero.png");
        assert!(hero.is_disabled);
        assert!(hero.is_image);
        assert_eq!(hero.auto_excluded, Some(ExclusionReason::Lfs));
        assert_eq!(hero.check_state, CheckState::Unchecked);

        let submodule = row("vendor/zlib");
        assert!(submodule.is_disabled);
        assert_eq!(submodule.file_count, 1);

        assert_eq!(view.excluded_files, 3);
        assert!(view.status_message.ends_with(", 3 excluded"));
    }

    #[test]
    fn test_large_selection_marks_every_file_row() {
        let entries: Vec<_> = (0..5000)
            .map(|i| crate::core::RepoEntry::file(format!("dir{}/f{i}.rs", i % 50), 10))
            .collect();
        let view = generate_view_state(&state_with(entries));

        assert_eq!(view.selected_files, 5000);
        assert_eq!(view.rows.len(), 5050);
        assert!(view
            .rows
            .iter()
            .all(|r| r.check_state == CheckState::Checked));
    }

    #[test]
    fn test_search_marks_matches() {
        let mut state = state_with(sample_entries());
        state.toggle_collapsed("src");
        state.set_search_query("App");

        let view = generate_view_state(&state);
        let paths: Vec<_> = view.rows.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["src", "src/components", "src/components/App.tsx"]);
        assert!(view.rows.iter().all(|r| r.is_expanded || !r.is_directory));
        assert_eq!(
            view.rows.iter().filter(|r| r.is_match).count(),
            1,
            "only the file itself contains the term"
        );
    }
}
