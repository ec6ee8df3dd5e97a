//! Resolves which files are exported by combining glob masks, manual selection and
//! auto-exclusions, and derives the tri-state of every directory checkbox.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::glob::MaskMatcher;
use super::path::normalize;
use super::tree::{build, DirNode, TreeNode};
use super::RepoEntry;

/// The state of a directory checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckState {
    Checked,
    Unchecked,
    Indeterminate,
}

/// Selection counts for one directory.
///
/// `total` counts the selectable files below the directory. Files that are
/// auto-excluded or hit by an exclude glob cannot be selected, so they are tallied
/// in `excluded` instead. Exclude-glob matches are treated the same way as
/// auto-exclusions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DirCounts {
    pub total: usize,
    pub selected: usize,
    pub excluded: usize,
}

impl DirCounts {
    pub fn state(&self) -> CheckState {
        if self.total == 0 || self.selected == 0 {
            CheckState::Unchecked
        } else if self.selected == self.total {
            CheckState::Checked
        } else {
            CheckState::Indeterminate
        }
    }

    /// A directory with nothing selectable below it renders as a disabled checkbox.
    pub fn is_disabled(&self) -> bool {
        self.total == 0
    }

    fn add(&mut self, other: DirCounts) {
        self.total += other.total;
        self.selected += other.selected;
        self.excluded += other.excluded;
    }
}

/// The caller-owned inputs of a selection pass.
#[derive(Debug, Clone, Copy)]
pub struct SelectionInputs<'a> {
    /// Files checked by the user.
    pub selected_paths: &'a HashSet<String>,
    pub include_globs: &'a [String],
    pub exclude_globs: &'a [String],
    /// Files excluded by system policy (LFS, size, secrets, ...).
    pub auto_excluded_paths: &'a HashSet<String>,
    /// When `false`, the masks are ignored entirely.
    pub filters_enabled: bool,
}

/// The outcome of a selection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionResult {
    /// Selected file paths in tree pre-order.
    pub selected_files: Vec<String>,
    pub selected_size: u64,
    /// Number of files in the tree, selected or not.
    pub total_files: usize,
    /// Number of files that cannot be selected.
    pub excluded_files: usize,
    pub directories: HashMap<String, DirCounts>,
    /// `selected_files` as a set, for constant-time lookups.
    #[serde(skip)]
    pub(crate) selected_index: HashSet<String>,
}

impl SelectionResult {
    pub fn dir_counts(&self, path: &str) -> DirCounts {
        self.directories.get(path).copied().unwrap_or_default()
    }

    pub fn dir_state(&self, path: &str) -> CheckState {
        self.dir_counts(path).state()
    }

    pub fn is_selected(&self, path: &str) -> bool {
        self.selected_index.contains(path)
    }
}

/// Builds the tree from `entries` and resolves the selection against it.
pub fn resolve_selection(entries: &[RepoEntry], inputs: &SelectionInputs<'_>) -> SelectionResult {
    let roots = build(entries);
    let mask = MaskMatcher::new(inputs.include_globs, inputs.exclude_globs);
    resolve_tree(&roots, &mask, inputs)
}

/// Resolves the selection against an already built tree and compiled mask.
///
/// The mask must have been compiled from `inputs.include_globs` and
/// `inputs.exclude_globs`; the pattern lists in `inputs` are not read here.
pub fn resolve_tree(
    roots: &[TreeNode],
    mask: &MaskMatcher,
    inputs: &SelectionInputs<'_>,
) -> SelectionResult {
    let resolver = Resolver {
        mask,
        selected: normalize_set(inputs.selected_paths),
        auto_excluded: normalize_set(inputs.auto_excluded_paths),
        filters_enabled: inputs.filters_enabled,
    };

    let mut result = SelectionResult::default();
    let totals = resolver.visit(roots, &mut result);
    result.excluded_files = totals.excluded;

    tracing::debug!(
        "Resolved selection: {} of {} files selected ({} bytes), {} excluded",
        result.selected_files.len(),
        result.total_files,
        result.selected_size,
        result.excluded_files
    );
    result
}

fn normalize_set(paths: &HashSet<String>) -> HashSet<String> {
    paths.iter().filter_map(|p| normalize(p)).collect()
}

struct Resolver<'a> {
    mask: &'a MaskMatcher,
    selected: HashSet<String>,
    auto_excluded: HashSet<String>,
    filters_enabled: bool,
}

/// The decision for a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileDecision {
    Selected,
    Unselected,
    Excluded,
}

impl Resolver<'_> {
    fn decide(&self, path: &str) -> FileDecision {
        let excluded = self.auto_excluded.contains(path)
            || (self.filters_enabled && self.mask.is_excluded_normalized(path));
        if excluded {
            return FileDecision::Excluded;
        }

        let manually_selected = self.selected.contains(path);
        let mask_included = !self.filters_enabled || self.mask.matches_normalized(path);
        if manually_selected || mask_included {
            FileDecision::Selected
        } else {
            FileDecision::Unselected
        }
    }

    fn visit(&self, nodes: &[TreeNode], result: &mut SelectionResult) -> DirCounts {
        let mut counts = DirCounts::default();
        for node in nodes {
            match node {
                TreeNode::File(file) => {
                    result.total_files += 1;
                    match self.decide(&file.path) {
                        FileDecision::Selected => {
                            result.selected_files.push(file.path.clone());
                            result.selected_index.insert(file.path.clone());
                            result.selected_size = result.selected_size.saturating_add(file.size);
                            counts.total += 1;
                            counts.selected += 1;
                        }
                        FileDecision::Unselected => counts.total += 1,
                        FileDecision::Excluded => counts.excluded += 1,
                    }
                }
                TreeNode::Dir(dir) => {
                    let dir_counts = self.visit(&dir.children, result);
                    result.directories.insert(dir.path.clone(), dir_counts);
                    counts.add(dir_counts);
                }
            }
        }
        counts
    }
}

/// Toggles a directory checkbox by rewriting the manual selection.
///
/// A checked directory has all of its descendant files removed from `selected`;
/// otherwise all of them are added. Paths outside the directory are untouched.
pub fn toggle_directory(selected: &mut HashSet<String>, dir: &DirNode, counts: DirCounts) {
    if counts.state() == CheckState::Checked {
        for path in &dir.descendant_files {
            selected.remove(path);
        }
    } else {
        selected.extend(dir.descendant_files.iter().cloned());
    }
}

/// Toggles the manual selection of a single file. Returns `true` if the file is
/// now manually selected.
pub fn toggle_file(selected: &mut HashSet<String>, path: &str) -> bool {
    let Some(path) = normalize(path) else {
        return false;
    };
    if selected.remove(&path) {
        false
    } else {
        selected.insert(path);
        true
    }
}
