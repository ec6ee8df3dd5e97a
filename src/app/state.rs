//! Defines the caller-owned, mutable selection state.
//!
//! The engine in `core` is a set of pure functions; `ExplorerState` is the thin
//! adapter that owns entries, masks and selection sets, and recomputes the
//! selection synchronously after every mutation.

use std::collections::{HashMap, HashSet};

use super::auto_exclude::{AutoExcludePolicy, ExclusionReason};
use crate::config::AppConfig;
use crate::core::tree::{find, walk_dirs, walk_files};
use crate::core::{
    self, flatten, normalize, resolve_tree, ExportFormat, ExportRequest, FlatRow, MaskMatcher,
    MatcherCache, RepoEntry, RepoRef, SelectionInputs, SelectionResult, TreeNode,
};

/// Holds the complete, mutable state of one repository explorer.
///
/// The caller is responsible for serializing concurrent edits, e.g. by wrapping
/// the state in a `Mutex`.
pub struct ExplorerState {
    /// The application's configuration settings.
    pub config: AppConfig,
    /// The repository (and ref) the current entries belong to.
    repo: Option<RepoRef>,
    /// The flat listing as received from the repository API.
    entries: Vec<RepoEntry>,
    /// The tree built from `entries`.
    tree: Vec<TreeNode>,
    include_globs: Vec<String>,
    exclude_globs: Vec<String>,
    /// `include_globs`/`exclude_globs` compiled; rebuilt only when the masks change.
    mask: MaskMatcher,
    matcher_cache: MatcherCache,
    filters_enabled: bool,
    /// Files checked manually by the user.
    selected_paths: HashSet<String>,
    /// Files reported by the secret scanner.
    secret_paths: HashSet<String>,
    /// Every auto-excluded file with the reason it was excluded.
    auto_exclusions: HashMap<String, ExclusionReason>,
    /// Keys of `auto_exclusions`, kept in sync for the resolver.
    auto_excluded_paths: HashSet<String>,
    /// Directories whose children are hidden in the tree view.
    collapsed_dirs: HashSet<String>,
    /// The current search query for paths.
    search_query: String,
    /// The last resolved selection.
    selection: SelectionResult,
}

impl Default for ExplorerState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl ExplorerState {
    pub fn new(config: AppConfig) -> Self {
        let mut matcher_cache = MatcherCache::new();
        let include_globs = config.default_include_globs.clone();
        let exclude_globs = config.default_exclude_globs.clone();
        let mask = matcher_cache.mask(include_globs.as_slice(), exclude_globs.as_slice());

        Self {
            filters_enabled: config.filters_enabled,
            config,
            repo: None,
            entries: Vec::new(),
            tree: Vec::new(),
            include_globs,
            exclude_globs,
            mask,
            matcher_cache,
            selected_paths: HashSet::new(),
            secret_paths: HashSet::new(),
            auto_exclusions: HashMap::new(),
            auto_excluded_paths: HashSet::new(),
            collapsed_dirs: HashSet::new(),
            search_query: String::new(),
            selection: SelectionResult::default(),
        }
    }

    pub fn repo(&self) -> Option<&RepoRef> {
        self.repo.as_ref()
    }

    pub fn entries(&self) -> &[RepoEntry] {
        &self.entries
    }

    pub fn tree(&self) -> &[TreeNode] {
        &self.tree
    }

    pub fn include_globs(&self) -> &[String] {
        &self.include_globs
    }

    pub fn exclude_globs(&self) -> &[String] {
        &self.exclude_globs
    }

    pub fn filters_enabled(&self) -> bool {
        self.filters_enabled
    }

    pub fn selected_paths(&self) -> &HashSet<String> {
        &self.selected_paths
    }

    pub fn auto_excluded_paths(&self) -> &HashSet<String> {
        &self.auto_excluded_paths
    }

    pub fn auto_exclusion(&self, path: &str) -> Option<ExclusionReason> {
        self.auto_exclusions.get(path).copied()
    }

    pub fn collapsed_dirs(&self) -> &HashSet<String> {
        &self.collapsed_dirs
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn selection(&self) -> &SelectionResult {
        &self.selection
    }

    /// Returns `true` if the file cannot be selected, either by policy or by an
    /// exclude mask.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.auto_excluded_paths.contains(path)
            || (self.filters_enabled && self.mask.is_excluded(path))
    }

    /// The rows currently visible in the tree view.
    pub fn rows(&self) -> Vec<FlatRow<'_>> {
        flatten(&self.tree, &self.collapsed_dirs, &self.search_query)
    }

    /// Replaces the entry listing.
    ///
    /// A different repository or ref starts from a clean selection. Refreshing the
    /// same ref keeps the manual selection, secret flags and collapsed directories
    /// that still exist in the new listing.
    pub fn load_entries(&mut self, repo: RepoRef, entries: Vec<RepoEntry>) {
        let same_repo = self.repo.as_ref() == Some(&repo);
        self.tree = core::build(&entries);
        self.entries = entries;

        let files: HashSet<&str> = walk_files(&self.tree)
            .into_iter()
            .map(|f| f.path.as_str())
            .collect();

        if same_repo {
            self.selected_paths.retain(|p| files.contains(p.as_str()));
            self.secret_paths.retain(|p| files.contains(p.as_str()));
            let dirs: HashSet<&str> = walk_dirs(&self.tree)
                .into_iter()
                .map(|d| d.path.as_str())
                .collect();
            self.collapsed_dirs.retain(|p| dirs.contains(p.as_str()));
        } else {
            tracing::info!("Loading repository {}", repo);
            self.selected_paths.clear();
            self.secret_paths.clear();
            self.search_query.clear();
            self.collapsed_dirs.clear();
            if self.config.collapse_directories_by_default {
                self.collapse_all_dirs();
            }
        }

        self.config.last_repository = Some(repo.to_string());
        self.repo = Some(repo);
        self.refresh_auto_exclusions();
        self.recompute();
    }

    /// Resets all state related to a loaded repository.
    pub fn reset(&mut self) {
        self.repo = None;
        self.entries.clear();
        self.tree.clear();
        self.selected_paths.clear();
        self.secret_paths.clear();
        self.auto_exclusions.clear();
        self.auto_excluded_paths.clear();
        self.collapsed_dirs.clear();
        self.search_query.clear();
        self.selection = SelectionResult::default();
    }

    pub fn set_masks(&mut self, include_globs: Vec<String>, exclude_globs: Vec<String>) {
        self.mask = self.matcher_cache.mask(include_globs.as_slice(), exclude_globs.as_slice());
        self.include_globs = include_globs;
        self.exclude_globs = exclude_globs;
        self.recompute();
    }

    pub fn set_filters_enabled(&mut self, enabled: bool) {
        self.filters_enabled = enabled;
        self.recompute();
    }

    /// Toggles the manual selection of a file. Returns `true` if it is now
    /// manually selected.
    pub fn toggle_file(&mut self, path: &str) -> bool {
        let is_file = find(&self.tree, path).is_some_and(|n| !n.is_dir());
        if !is_file {
            tracing::warn!("toggle_file called for unknown file {:?}", path);
            return false;
        }
        let now_selected = core::toggle_file(&mut self.selected_paths, path);
        self.recompute();
        now_selected
    }

    /// Toggles a directory checkbox. Returns `false` if `path` is not a directory.
    pub fn toggle_directory(&mut self, path: &str) -> bool {
        let Some(dir) = find(&self.tree, path).and_then(TreeNode::as_dir) else {
            tracing::warn!("toggle_directory called for unknown directory {:?}", path);
            return false;
        };
        let counts = self.selection.dir_counts(&dir.path);
        core::toggle_directory(&mut self.selected_paths, dir, counts);
        self.recompute();
        true
    }

    /// Manually selects every file of the tree.
    pub fn select_all(&mut self) {
        let files: Vec<String> = walk_files(&self.tree)
            .into_iter()
            .map(|f| f.path.clone())
            .collect();
        self.selected_paths.extend(files);
        self.recompute();
    }

    /// Clears the manual selection.
    pub fn deselect_all(&mut self) {
        self.selected_paths.clear();
        self.recompute();
    }

    pub fn toggle_collapsed(&mut self, path: &str) {
        let Some(path) = normalize(path) else {
            return;
        };
        if !self.collapsed_dirs.remove(&path) {
            self.collapsed_dirs.insert(path);
        }
    }

    pub fn collapse_all(&mut self) {
        self.collapse_all_dirs();
    }

    pub fn expand_all(&mut self) {
        self.collapsed_dirs.clear();
    }

    pub fn set_search_query(&mut self, query: &str) {
        self.search_query = query.to_string();
    }

    /// Marks files reported by the secret scanner as auto-excluded. Paths that are
    /// not files of the current tree are ignored.
    pub fn flag_secrets<I, S>(&mut self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for path in paths {
            let Some(path) = normalize(path.as_ref()) else {
                continue;
            };
            if find(&self.tree, &path).is_some_and(|n| !n.is_dir()) {
                self.secret_paths.insert(path);
            }
        }
        self.refresh_auto_exclusions();
        self.recompute();
    }

    /// Builds the export payload for the current selection, or `None` when no
    /// repository is loaded.
    ///
    /// When nothing but the masks shapes the selection, the service can evaluate
    /// them itself; otherwise the resolved file list is sent.
    pub fn export_request(&self, format: Option<ExportFormat>) -> Option<ExportRequest> {
        let repo = self.repo.as_ref()?;
        let format = format.unwrap_or(self.config.default_export_format);
        let (include, exclude): (&[String], &[String]) = if self.filters_enabled {
            (self.include_globs.as_slice(), self.exclude_globs.as_slice())
        } else {
            (Default::default(), Default::default())
        };

        let masks_suffice = self.selected_paths.is_empty() && self.auto_excluded_paths.is_empty();
        let request = if masks_suffice {
            ExportRequest::masks_only(repo, format, include, exclude, &self.selection)
        } else {
            ExportRequest::explicit(repo, format, include, exclude, &self.selection)
        };
        Some(request)
    }

    fn collapse_all_dirs(&mut self) {
        self.collapsed_dirs = walk_dirs(&self.tree)
            .into_iter()
            .map(|d| d.path.clone())
            .collect();
    }

    fn refresh_auto_exclusions(&mut self) {
        let policy = AutoExcludePolicy::from_config(&self.config);
        let mut exclusions: HashMap<String, ExclusionReason> = policy
            .evaluate(&self.tree)
            .into_iter()
            .map(|e| (e.path, e.reason))
            .collect();
        for path in &self.secret_paths {
            exclusions.insert(path.clone(), ExclusionReason::Secret);
        }

        self.auto_excluded_paths = exclusions.keys().cloned().collect();
        self.auto_exclusions = exclusions;
    }

    fn recompute(&mut self) {
        let inputs = SelectionInputs {
            selected_paths: &self.selected_paths,
            include_globs: &self.include_globs,
            exclude_globs: &self.exclude_globs,
            auto_excluded_paths: &self.auto_excluded_paths,
            filters_enabled: self.filters_enabled,
        };
        self.selection = resolve_tree(&self.tree, &self.mask, &inputs);
    }
}
