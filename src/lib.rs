// Estate Chat - Terminal chat client for AI real-estate data analysis

pub mod backend;
pub mod chart;
pub mod config;
pub mod export;
pub mod format;
pub mod session;
pub mod tui;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use types::{AppError, AppResult};
