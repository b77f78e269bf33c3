// Chart field selection
//
// Turns one backend record list into a drawable chart description. The
// backend decides bar vs line; this module decides which field labels the
// x axis and which fields become series.

use ratatui::style::Color;

use crate::format::display_label;
use crate::types::{ChartKind, Record};

/// Field names that win the x-axis slot, in priority order. Matching is
/// case-insensitive against the first record's keys.
const X_AXIS_PRIORITY: [&str; 9] = [
    "year", "date", "month", "time", "location", "locality", "name", "category", "type",
];

/// Series palette carried over from the web build; series `i` wears
/// `SERIES_PALETTE[i % 8]`.
pub const SERIES_PALETTE: [Color; 8] = [
    Color::Rgb(0x4f, 0x46, 0xe5), // indigo
    Color::Rgb(0x10, 0xb9, 0x81), // emerald
    Color::Rgb(0xf5, 0x9e, 0x0b), // amber
    Color::Rgb(0xef, 0x44, 0x44), // red
    Color::Rgb(0x8b, 0x5c, 0xf6), // violet
    Color::Rgb(0xec, 0x48, 0x99), // pink
    Color::Rgb(0x06, 0xb6, 0xd4), // cyan
    Color::Rgb(0x84, 0xcc, 0x16), // lime
];

/// One plottable field.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub key: String,
    pub label: String,
    pub color: Color,
}

/// Everything the chart widget needs besides the records themselves.
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub x_key: String,
    pub series: Vec<Series>,
}

impl ChartSpec {
    /// Inspects the first record and derives the x-axis field and the
    /// series list. Returns `None` when there is nothing to draw at all
    /// (no records, or a record with no fields). A spec with zero series
    /// is still `Some`: the chart renders with an empty plot area.
    pub fn build(records: &[Record], kind: ChartKind) -> Option<ChartSpec> {
        let first = records.first()?;
        let x_key = select_x_key(first)?;
        let series = select_series(first, &x_key);
        Some(ChartSpec { kind, x_key, series })
    }
}

fn select_x_key(first: &Record) -> Option<String> {
    for name in X_AXIS_PRIORITY {
        if let Some(key) = first.keys().find(|k| k.eq_ignore_ascii_case(name)) {
            return Some(key.clone());
        }
    }
    // No reserved name present: the first field labels the axis.
    first.keys().next().cloned()
}

fn select_series(first: &Record, x_key: &str) -> Vec<Series> {
    first
        .iter()
        .filter(|(key, _)| key.as_str() != x_key)
        .filter(|(key, _)| {
            let lower = key.to_lowercase();
            !lower.contains("id") && !lower.contains("index")
        })
        .filter(|(_, value)| value.as_f64().is_some_and(f64::is_finite))
        .enumerate()
        .map(|(i, (key, _))| Series {
            key: key.clone(),
            label: display_label(key),
            color: SERIES_PALETTE[i % SERIES_PALETTE.len()],
        })
        .collect()
}

/// The x-axis tick text for each record.
pub fn x_axis_labels(records: &[Record], x_key: &str) -> Vec<String> {
    records
        .iter()
        .map(|record| match record.get(x_key) {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            Some(serde_json::Value::Bool(b)) => b.to_string(),
            Some(serde_json::Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        })
        .collect()
}

/// Numeric value of `key` per record; records where the field is missing
/// or not a number yield `None` and leave a gap in the plot.
pub fn series_values(records: &[Record], key: &str) -> Vec<Option<f64>> {
    records
        .iter()
        .map(|record| record.get(key).and_then(|v| v.as_f64()).filter(|v| v.is_finite()))
        .collect()
}
