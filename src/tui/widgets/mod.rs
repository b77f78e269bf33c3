//! TUI Widgets
//!
//! Custom widgets for the Estate Chat TUI.

mod chart;
mod table;

pub use chart::render_chart;
pub use table::render_table;
