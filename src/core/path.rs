//! Canonicalization of repository-relative paths.

/// Normalizes a repository-relative path.
///
/// Backslashes become `/`, leading separators are stripped and empty or `.`
/// segments are dropped. Returns `None` for paths containing a `..` segment or a
/// NUL byte, and for paths with no segments left. The result is stable under
/// repeated application.
pub fn normalize(input: &str) -> Option<String> {
    if input.contains('\0') {
        return None;
    }

    let unified = input.replace('\\', "/");
    let mut segments = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

/// Returns the last segment of a normalized path.
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Returns the parent of a normalized path, or `None` for a root-level path.
pub fn parent(path: &str) -> Option<&str> {
    path.rfind('/').map(|idx| &path[..idx])
}
