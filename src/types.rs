// Type definitions and enums

/// One row of chart or table data, field name to value, in the exact order
/// the backend sent the fields.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Chart orientation requested by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    #[default]
    Line,
    Bar,
}

impl ChartKind {
    /// Maps the backend's `chart type` string. Only "bar" selects a bar
    /// chart; anything else (including a missing field) is a line chart.
    pub fn from_wire(value: Option<&str>) -> Self {
        match value {
            Some("bar") => ChartKind::Bar,
            _ => ChartKind::Line,
        }
    }
}

impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChartKind::Line => write!(f, "line"),
            ChartKind::Bar => write!(f, "bar"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// File rejected before any request was made.
    #[error("{0}")]
    InvalidFile(String),

    /// The backend answered with a non-success status. `found_columns` is
    /// populated when an upload failed column validation server-side.
    #[error("backend error ({status}): {message}")]
    Backend {
        status: u16,
        message: String,
        found_columns: Option<Vec<String>>,
    },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_kind_only_bar_is_bar() {
        assert_eq!(ChartKind::from_wire(Some("bar")), ChartKind::Bar);
        assert_eq!(ChartKind::from_wire(Some("line")), ChartKind::Line);
        assert_eq!(ChartKind::from_wire(Some("pie")), ChartKind::Line);
        assert_eq!(ChartKind::from_wire(Some("BAR")), ChartKind::Line);
        assert_eq!(ChartKind::from_wire(None), ChartKind::Line);
    }
}
