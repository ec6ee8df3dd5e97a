//! Projects the tree into an ordered sequence of displayable rows.

use std::collections::HashSet;

use super::tree::TreeNode;

/// One visible row: a node and its nesting depth (0 for roots).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatRow<'a> {
    pub node: &'a TreeNode,
    pub depth: usize,
}

/// Flattens the tree in pre-order.
///
/// Without a search term, children of directories listed in `collapsed` are
/// hidden. With a search term (trimmed, case-insensitive), a node is shown if its
/// path contains the term or if any descendant is shown, and every shown
/// directory is expanded.
pub fn flatten<'a>(
    roots: &'a [TreeNode],
    collapsed: &HashSet<String>,
    search_term: &str,
) -> Vec<FlatRow<'a>> {
    let term = search_term.trim().to_lowercase();
    let mut rows = Vec::new();
    if term.is_empty() {
        push_expanded(roots, collapsed, 0, &mut rows);
    } else {
        push_matching(roots, &term, 0, &mut rows);
    }
    rows
}

fn push_expanded<'a>(
    nodes: &'a [TreeNode],
    collapsed: &HashSet<String>,
    depth: usize,
    rows: &mut Vec<FlatRow<'a>>,
) {
    for node in nodes {
        rows.push(FlatRow { node, depth });
        if node.is_dir() && !collapsed.contains(node.path()) {
            push_expanded(node.children(), collapsed, depth + 1, rows);
        }
    }
}

/// Returns `true` if at least one row was emitted for `nodes`.
fn push_matching<'a>(
    nodes: &'a [TreeNode],
    term: &str,
    depth: usize,
    rows: &mut Vec<FlatRow<'a>>,
) -> bool {
    let mut any_visible = false;
    for node in nodes {
        let own_match = node.path().to_lowercase().contains(term);
        // Reserve the parent's slot so it precedes its descendants.
        let slot = rows.len();
        rows.push(FlatRow { node, depth });
        let descendant_match =
            node.is_dir() && push_matching(node.children(), term, depth + 1, rows);

        if own_match || descendant_match {
            any_visible = true;
        } else {
            rows.truncate(slot);
        }
    }
    any_visible
}
