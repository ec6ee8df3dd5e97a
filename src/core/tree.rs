//! Builds the nested repository tree from a flat entry listing.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

use super::path::normalize;
use super::{EntryKind, RepoEntry};

/// A node of the repository tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    File(FileNode),
    Dir(DirNode),
}

/// A file leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileNode {
    pub name: String,
    pub path: String,
    pub size: u64,
    pub lfs: bool,
    pub submodule: bool,
}

/// A directory with metadata aggregated over every file below it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirNode {
    pub name: String,
    pub path: String,
    /// The size declared by the listing for the directory entry itself, usually 0.
    pub size: u64,
    pub lfs: bool,
    pub submodule: bool,
    pub children: Vec<TreeNode>,
    pub file_count: usize,
    pub total_size: u64,
    /// Every file path below this directory, in tree pre-order.
    pub descendant_files: Vec<String>,
}

impl TreeNode {
    pub fn name(&self) -> &str {
        match self {
            TreeNode::File(f) => &f.name,
            TreeNode::Dir(d) => &d.name,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            TreeNode::File(f) => &f.path,
            TreeNode::Dir(d) => &d.path,
        }
    }

    pub fn size(&self) -> u64 {
        match self {
            TreeNode::File(f) => f.size,
            TreeNode::Dir(d) => d.size,
        }
    }

    pub fn lfs(&self) -> bool {
        match self {
            TreeNode::File(f) => f.lfs,
            TreeNode::Dir(d) => d.lfs,
        }
    }

    pub fn submodule(&self) -> bool {
        match self {
            TreeNode::File(f) => f.submodule,
            TreeNode::Dir(d) => d.submodule,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, TreeNode::Dir(_))
    }

    pub fn children(&self) -> &[TreeNode] {
        match self {
            TreeNode::File(_) => &[],
            TreeNode::Dir(d) => &d.children,
        }
    }

    pub fn file_count(&self) -> usize {
        match self {
            TreeNode::File(_) => 1,
            TreeNode::Dir(d) => d.file_count,
        }
    }

    pub fn total_size(&self) -> u64 {
        match self {
            TreeNode::File(f) => f.size,
            TreeNode::Dir(d) => d.total_size,
        }
    }

    pub fn as_dir(&self) -> Option<&DirNode> {
        match self {
            TreeNode::Dir(d) => Some(d),
            TreeNode::File(_) => None,
        }
    }
}

/// Builds the tree from a flat list of entries.
///
/// Entries whose path cannot be normalized are skipped. When the same path is
/// declared more than once, the later declaration wins, except that a path with
/// descendants always stays a directory.
pub fn build(entries: &[RepoEntry]) -> Vec<TreeNode> {
    let mut normalized: Vec<(String, &RepoEntry)> = entries
        .iter()
        .filter_map(|entry| match normalize(&entry.path) {
            Some(path) => Some((path, entry)),
            None => {
                tracing::warn!("Skipping repository entry with invalid path {:?}", entry.path);
                None
            }
        })
        .collect();

    // Stable, so repeated declarations keep their input order.
    normalized.sort_by(|a, b| a.0.cmp(&b.0));

    let mut arena = TreeArena::default();
    for (path, entry) in &normalized {
        arena.insert(path, entry);
    }

    let roots = arena.finish();
    tracing::debug!(
        "Built repository tree: {} entries, {} roots, {} files",
        entries.len(),
        roots.len(),
        count_files(&roots)
    );
    roots
}

/// Looks up a node by path.
pub fn find<'a>(roots: &'a [TreeNode], path: &str) -> Option<&'a TreeNode> {
    let path = normalize(path)?;
    let mut level = roots;
    let mut found = None;
    for segment in path.split('/') {
        let node = level.iter().find(|n| n.name() == segment)?;
        level = node.children();
        found = Some(node);
    }
    found
}

/// Returns every file node in tree pre-order.
pub fn walk_files(roots: &[TreeNode]) -> Vec<&FileNode> {
    fn visit<'a>(nodes: &'a [TreeNode], out: &mut Vec<&'a FileNode>) {
        for node in nodes {
            match node {
                TreeNode::File(f) => out.push(f),
                TreeNode::Dir(d) => visit(&d.children, out),
            }
        }
    }

    let mut out = Vec::new();
    visit(roots, &mut out);
    out
}

/// Returns every directory node in tree pre-order.
pub fn walk_dirs(roots: &[TreeNode]) -> Vec<&DirNode> {
    fn visit<'a>(nodes: &'a [TreeNode], out: &mut Vec<&'a DirNode>) {
        for node in nodes {
            if let TreeNode::Dir(d) = node {
                out.push(d);
                visit(&d.children, out);
            }
        }
    }

    let mut out = Vec::new();
    visit(roots, &mut out);
    out
}

pub fn count_files(roots: &[TreeNode]) -> usize {
    roots.iter().map(TreeNode::file_count).sum()
}

/// Directories first, then case-sensitive by name.
fn compare_nodes(a: &TreeNode, b: &TreeNode) -> Ordering {
    match (a.is_dir(), b.is_dir()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.name().cmp(b.name()),
    }
}

/// A mutable node used while the tree is assembled.
struct Slot {
    name: String,
    path: String,
    kind: EntryKind,
    size: u64,
    lfs: bool,
    submodule: bool,
    children: Vec<usize>,
}

/// Index-based tree under construction. `index` maps each path to its slot so that
/// synthesized parents are created once and explicit entries merge into them.
#[derive(Default)]
struct TreeArena {
    slots: Vec<Slot>,
    index: HashMap<String, usize>,
    roots: Vec<usize>,
}

impl TreeArena {
    fn insert(&mut self, path: &str, entry: &RepoEntry) {
        let segments: Vec<&str> = path.split('/').collect();
        let (leaf_name, ancestors) = match segments.split_last() {
            Some(split) => split,
            None => return,
        };

        let mut parent = None;
        let mut prefix = String::new();
        for segment in ancestors {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(segment);
            parent = Some(self.get_or_create_dir(&prefix, segment, parent));
        }

        match self.index.get(path) {
            Some(&idx) => self.merge(idx, entry),
            None => {
                self.push(
                    Slot {
                        name: (*leaf_name).to_string(),
                        path: path.to_string(),
                        kind: entry.kind,
                        size: entry.size,
                        lfs: entry.lfs,
                        submodule: entry.submodule,
                        children: Vec::new(),
                    },
                    parent,
                );
            }
        }
    }

    fn get_or_create_dir(&mut self, path: &str, name: &str, parent: Option<usize>) -> usize {
        if let Some(&idx) = self.index.get(path) {
            let slot = &mut self.slots[idx];
            if slot.kind == EntryKind::File {
                tracing::warn!(
                    "Path {:?} was listed as a file but has children; treating it as a directory",
                    path
                );
                slot.kind = EntryKind::Dir;
                slot.size = 0;
                slot.lfs = false;
                slot.submodule = false;
            }
            return idx;
        }

        self.push(
            Slot {
                name: name.to_string(),
                path: path.to_string(),
                kind: EntryKind::Dir,
                size: 0,
                lfs: false,
                submodule: false,
                children: Vec::new(),
            },
            parent,
        )
    }

    fn push(&mut self, slot: Slot, parent: Option<usize>) -> usize {
        let idx = self.slots.len();
        self.index.insert(slot.path.clone(), idx);
        self.slots.push(slot);
        match parent {
            Some(p) => self.slots[p].children.push(idx),
            None => self.roots.push(idx),
        }
        idx
    }

    fn merge(&mut self, idx: usize, entry: &RepoEntry) {
        let slot = &mut self.slots[idx];
        if slot.kind != entry.kind {
            if entry.kind == EntryKind::File && !slot.children.is_empty() {
                tracing::warn!(
                    "Path {:?} was listed as a file but has children; keeping it as a directory",
                    slot.path
                );
                return;
            }
            tracing::warn!(
                "Path {:?} listed as both file and directory; the later entry wins",
                slot.path
            );
            slot.kind = entry.kind;
        }
        slot.size = entry.size;
        slot.lfs = entry.lfs;
        slot.submodule = entry.submodule;
    }

    fn finish(self) -> Vec<TreeNode> {
        let mut roots: Vec<TreeNode> = self.roots.iter().map(|&i| self.materialize(i)).collect();
        roots.sort_by(compare_nodes);
        roots
    }

    fn materialize(&self, idx: usize) -> TreeNode {
        let slot = &self.slots[idx];
        if slot.kind == EntryKind::File {
            return TreeNode::File(FileNode {
                name: slot.name.clone(),
                path: slot.path.clone(),
                size: slot.size,
                lfs: slot.lfs,
                submodule: slot.submodule,
            });
        }

        let mut children: Vec<TreeNode> =
            slot.children.iter().map(|&c| self.materialize(c)).collect();
        children.sort_by(compare_nodes);

        let mut file_count = 0;
        let mut total_size = 0u64;
        let mut descendant_files = Vec::new();
        for child in &children {
            match child {
                TreeNode::File(f) => {
                    file_count += 1;
                    total_size = total_size.saturating_add(f.size);
                    descendant_files.push(f.path.clone());
                }
                TreeNode::Dir(d) => {
                    file_count += d.file_count;
                    total_size = total_size.saturating_add(d.total_size);
                    descendant_files.extend(d.descendant_files.iter().cloned());
                }
            }
        }

        TreeNode::Dir(DirNode {
            name: slot.name.clone(),
            path: slot.path.clone(),
            size: slot.size,
            lfs: slot.lfs,
            submodule: slot.submodule,
            children,
            file_count,
            total_size,
            descendant_files,
        })
    }
}
