//! Repository tree selection engine.
//!
//! The `core` module holds the pure engine (path normalization, glob masks, tree
//! building, flattening and selection resolution). The `app` module is the thin
//! caller-side adapter that owns mutable selection state and projects it for a UI.

// Declare all modules as public so they can be used by consumers and tests.
pub mod app;
pub mod config;
pub mod core;
pub mod utils;
