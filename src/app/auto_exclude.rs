//! System-imposed exclusions derived from entry metadata.
//!
//! The resolver treats the auto-excluded set as opaque input. This module is the
//! caller-side policy that produces it from LFS flags, sizes, binary-looking
//! names and submodule boundaries. Secret-scan hits arrive from outside and are
//! merged in by `ExplorerState::flag_secrets`.

use serde::Serialize;

use crate::config::AppConfig;
use crate::core::{FileNode, TreeNode};
use crate::utils::is_probably_binary;

/// Why a file cannot be exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExclusionReason {
    Lfs,
    TooLarge { size: u64, limit: u64 },
    Binary,
    Submodule,
    Secret,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutoExclusion {
    pub path: String,
    pub reason: ExclusionReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutoExcludePolicy {
    pub exclude_lfs: bool,
    pub exclude_binary: bool,
    pub exclude_submodules: bool,
    pub max_file_size_bytes: Option<u64>,
}

impl AutoExcludePolicy {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            exclude_lfs: config.exclude_lfs_files,
            exclude_binary: config.exclude_binary_files,
            exclude_submodules: config.exclude_submodules,
            max_file_size_bytes: config.max_file_size_bytes(),
        }
    }

    /// Returns the first matching reason, checked in order: submodule, LFS, size, binary.
    pub fn reason_for(&self, file: &FileNode, inside_submodule: bool) -> Option<ExclusionReason> {
        if self.exclude_submodules && (inside_submodule || file.submodule) {
            return Some(ExclusionReason::Submodule);
        }
        if self.exclude_lfs && file.lfs {
            return Some(ExclusionReason::Lfs);
        }
        if let Some(limit) = self.max_file_size_bytes {
            if file.size > limit {
                return Some(ExclusionReason::TooLarge {
                    size: file.size,
                    limit,
                });
            }
        }
        if self.exclude_binary && is_probably_binary(&file.path) {
            return Some(ExclusionReason::Binary);
        }
        None
    }

    /// Evaluates the policy over every file of the tree, in tree pre-order.
    pub fn evaluate(&self, roots: &[TreeNode]) -> Vec<AutoExclusion> {
        let mut out = Vec::new();
        self.visit(roots, false, &mut out);
        tracing::debug!("Auto-exclusion policy flagged {} files", out.len());
        out
    }

    fn visit(&self, nodes: &[TreeNode], inside_submodule: bool, out: &mut Vec<AutoExclusion>) {
        for node in nodes {
            match node {
                TreeNode::File(file) => {
                    if let Some(reason) = self.reason_for(file, inside_submodule) {
                        out.push(AutoExclusion {
                            path: file.path.clone(),
                            reason,
                        });
                    }
                }
                TreeNode::Dir(dir) => {
                    self.visit(&dir.children, inside_submodule || dir.submodule, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::build;
    use crate::utils::test_helpers::mixed_entries;

    fn strict_policy() -> AutoExcludePolicy {
        AutoExcludePolicy {
            exclude_lfs: true,
            exclude_binary: true,
            exclude_submodules: true,
            max_file_size_bytes: Some(20 * 1024 * 1024),
        }
    }

    #[test]
    fn test_policy_flags_each_reason() {
        let roots = build(&mixed_entries());
        let flagged = strict_policy().evaluate(&roots);

        assert_eq!(
            flagged,
            vec![
                AutoExclusion {
                    path: "assets/hero.png".to_string(),
                    reason: ExclusionReason::Lfs,
                },
                AutoExclusion {
                    path: "dist/bundle.js".to_string(),
                    reason: ExclusionReason::TooLarge {
                        size: 30 * 1024 * 1024,
                        limit: 20 * 1024 * 1024,
                    },
                },
                AutoExclusion {
                    path: "vendor/zlib/zlib.h".to_string(),
                    reason: ExclusionReason::Submodule,
                },
            ]
        );
    }

    #[test]
    fn test_binary_reason_applies_without_lfs_flag() {
        let roots = build(&[crate::core::RepoEntry::file("docs/diagram.png", 10)]);
        let flagged = strict_policy().evaluate(&roots);
        assert_eq!(flagged[0].reason, ExclusionReason::Binary);
    }

    #[test]
    fn test_disabled_policy_flags_nothing() {
        let roots = build(&mixed_entries());
        assert!(AutoExcludePolicy::default().evaluate(&roots).is_empty());
    }

    #[test]
    fn test_from_config() {
        let config = AppConfig {
            exclude_binary_files: false,
            max_file_size_mb: 1,
            ..Default::default()
        };
        let policy = AutoExcludePolicy::from_config(&config);
        assert!(policy.exclude_lfs);
        assert!(!policy.exclude_binary);
        assert_eq!(policy.max_file_size_bytes, Some(1024 * 1024));
    }
}
