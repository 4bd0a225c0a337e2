//! Engine Configuration

use serde::Deserialize;

/// Layout metrics and commit policy. Every field has a default so hosts can
/// override only what they need.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Viewport height of a column's card list, px
    pub list_height: f64,
    /// Width of a column's card list, px
    pub column_width: f64,
    /// Card title font size, px
    pub font_size: f64,
    /// Card chrome (key, badges, padding) excluding the title, px
    pub base_row_height: f64,
    /// Extra height when a card shows a due date, px
    pub due_date_row_height: f64,
    /// Height of the trailing drop slot shown while dragging, px
    pub placeholder_row_height: f64,
    /// Slack when deciding the list is scrolled to the bottom, px
    pub bottom_tolerance: f64,
    /// Rows rendered beyond each edge of the viewport
    pub overscan: usize,
    /// Restore the pre-drag state when the server rejects a move
    pub rollback_on_commit_failure: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            list_height: 600.0,
            column_width: 300.0,
            font_size: 13.0,
            base_row_height: 70.0,
            due_date_row_height: 20.0,
            placeholder_row_height: 70.0,
            bottom_tolerance: 1.0,
            overscan: 3,
            rollback_on_commit_failure: true,
        }
    }
}
