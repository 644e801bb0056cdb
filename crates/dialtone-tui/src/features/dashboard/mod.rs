//! Dashboard (protected) screen: profile card.

mod render;
mod update;

pub use render::{dashboard_lines, render_dashboard};
pub use update::handle_key;

/// Transient dashboard UI state.
#[derive(Debug, Default, Clone)]
pub struct DashboardState {
    /// One-line notice (e.g. the browser failed to open).
    pub notice: Option<String>,
}
