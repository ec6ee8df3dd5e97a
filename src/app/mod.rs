//! The stateful layer around the engine: auto-exclusion policy, the explorer
//! state that owns every selection input, and the view model rendered from it.

pub mod auto_exclude;
pub mod state;
pub mod view_model;

pub use auto_exclude::{AutoExcludePolicy, AutoExclusion, ExclusionReason};
pub use state::ExplorerState;
pub use view_model::{generate_view_state, RowView, ViewState};
