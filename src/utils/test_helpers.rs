use std::sync::Once;

use crate::core::RepoEntry;

static LOGGING_INIT: Once = Once::new();

/// Initializes the tracing subscriber for tests.
///
/// Wrapped in a `Once` block so the global subscriber is set exactly one time,
/// even when tests run in parallel.
pub fn setup_test_logging() {
    LOGGING_INIT.call_once(|| {
        // `#[traced_test]` installs its own global subscriber and panics if one
        // already exists, so only install ours when explicitly requested.
        if std::env::var_os("RUST_LOG").is_none() {
            return;
        }
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok(); // Another test harness may already have installed one.
    });
}

/// The small TypeScript project used across the selection tests.
pub fn sample_entries() -> Vec<RepoEntry> {
    vec![
        RepoEntry::file("README.md", 1200),
        RepoEntry::file("src/index.ts", 3200),
        RepoEntry::file("src/components/App.tsx", 4200),
        RepoEntry::file("package.json", 1800),
    ]
}

/// A project with LFS assets, a submodule and a large binary.
pub fn mixed_entries() -> Vec<RepoEntry> {
    vec![
        RepoEntry::file("README.md", 1200),
        RepoEntry::file("src/main.rs", 2400),
        RepoEntry::file("src/lib.rs", 5100),
        RepoEntry::file("assets/hero.png", 250_000).with_lfs(),
        RepoEntry::file("assets/notes.txt", 90),
        RepoEntry::file("dist/bundle.js", 30 * 1024 * 1024),
        RepoEntry::dir("vendor/zlib").with_submodule(),
        RepoEntry::file("vendor/zlib/zlib.h", 800),
    ]
}
