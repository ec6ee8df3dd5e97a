pub mod settings;

use serde::{Deserialize, Serialize};

use crate::core::ExportFormat;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    pub default_include_globs: Vec<String>,
    pub default_exclude_globs: Vec<String>,
    pub filters_enabled: bool,
    pub exclude_lfs_files: bool,
    pub exclude_binary_files: bool,
    pub exclude_submodules: bool,
    /// Files above this size are auto-excluded. `0` disables the limit.
    pub max_file_size_mb: u64,
    pub default_export_format: ExportFormat,
    pub collapse_directories_by_default: bool,
    pub last_repository: Option<String>,
}

impl AppConfig {
    pub fn max_file_size_bytes(&self) -> Option<u64> {
        (self.max_file_size_mb > 0).then(|| self.max_file_size_mb.saturating_mul(1024 * 1024))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let common_patterns = [
            "**/node_modules/**",
            "**/target/**",
            "**/.git/**",
            "**/.idea/**",
            "**/venv/**",
            "**/__pycache__/**",
            "**/*.log",
            "**/*.tmp",
            "**/*.lock",
            "**/package-lock.json",
            "**/.DS_Store",
            "**/Thumbs.db",
            "**/*.min.js",
            "**/*.map",
        ];

        Self {
            default_include_globs: Vec::new(),
            default_exclude_globs: common_patterns.iter().map(|p| p.to_string()).collect(),
            filters_enabled: true,
            exclude_lfs_files: true,
            exclude_binary_files: true,
            exclude_submodules: true,
            max_file_size_mb: 20,
            default_export_format: ExportFormat::Markdown,
            collapse_directories_by_default: false,
            last_repository: None,
        }
    }
}
