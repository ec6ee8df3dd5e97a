pub mod error;
pub mod export;
pub mod flatten;
pub mod glob;
pub mod path;
pub mod selection;
pub mod tree;

use serde::{Deserialize, Serialize};

pub use error::CoreError;
pub use export::{ExportFormat, ExportRequest, ExportSelection, RepoRef};
pub use flatten::{flatten, FlatRow};
pub use glob::{compile, compile_set, create_matcher, MaskMatcher, Matcher, MatcherCache};
pub use path::normalize;
pub use selection::{
    resolve_selection, resolve_tree, toggle_directory, toggle_file, CheckState, DirCounts,
    SelectionInputs, SelectionResult,
};
pub use tree::{build, DirNode, FileNode, TreeNode};

/// The kind of a repository entry as reported by the tree listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
}

/// One entry of a flat repository listing.
///
/// Paths are repository-relative and use `/` separators. Entries are produced by
/// whatever fetches the repository tree; the engine only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub lfs: bool,
    #[serde(default)]
    pub submodule: bool,
}

impl RepoEntry {
    pub fn file(path: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::File,
            size,
            lfs: false,
            submodule: false,
        }
    }

    pub fn dir(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Dir,
            size: 0,
            lfs: false,
            submodule: false,
        }
    }

    /// Marks the entry as a Git LFS pointer.
    pub fn with_lfs(mut self) -> Self {
        self.lfs = true;
        self
    }

    /// Marks the entry as a submodule root.
    pub fn with_submodule(mut self) -> Self {
        self.submodule = true;
        self
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// Parses a JSON array of repository entries, as returned by the tree listing API.
pub fn parse_entries(json: &str) -> Result<Vec<RepoEntry>, CoreError> {
    Ok(serde_json::from_str(json)?)
}
