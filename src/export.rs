// CSV export
//
// Serializes table records back into CSV text for the export action. The
// format intentionally matches what the deployed web clients produced:
// header names are written bare, a value is quoted only when it contains a
// comma, and embedded quotes or newlines pass through untouched.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::Value;
use tracing::info;

use crate::backend::ApiDialect;
use crate::types::{AppResult, Record};

/// Renders records as CSV text. The header row comes from the first
/// record's keys; every record must share that shape. Empty input yields
/// an empty string.
pub fn records_to_csv(records: &[Record]) -> String {
    let Some(first) = records.first() else {
        return String::new();
    };

    let mut out = String::new();
    out.push_str(&first.keys().cloned().collect::<Vec<_>>().join(","));
    out.push('\n');
    for record in records {
        let fields: Vec<String> = record.values().map(csv_field).collect();
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

fn csv_field(value: &Value) -> String {
    match value {
        Value::String(s) if s.contains(',') => format!("\"{s}\""),
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// The classic backend's client saved under a fixed name; the RAG one
/// stamps the epoch milliseconds in.
pub fn export_filename(dialect: ApiDialect, epoch_millis: i64) -> String {
    match dialect {
        ApiDialect::Classic => "real_estate_analysis.csv".to_string(),
        ApiDialect::Rag => format!("real_estate_analysis_{epoch_millis}.csv"),
    }
}

/// Writes the records to a CSV file in `dir` and returns the path.
pub async fn export_records(
    records: &[Record],
    dir: &Path,
    dialect: ApiDialect,
) -> AppResult<PathBuf> {
    let csv = records_to_csv(records);
    let path = dir.join(export_filename(dialect, Utc::now().timestamp_millis()));
    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(&path, &csv).await?;
    info!(path = %path.display(), rows = records.len(), "exported table to CSV");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(value: serde_json::Value) -> Vec<Record> {
        match value {
            Value::Array(rows) => rows
                .into_iter()
                .map(|row| match row {
                    Value::Object(map) => map,
                    other => panic!("expected an object, got {other}"),
                })
                .collect(),
            other => panic!("expected an array, got {other}"),
        }
    }

    #[test]
    fn test_header_from_first_record_and_comma_quoting() {
        let rows = records(json!([{ "a": 1, "b": "x,y" }]));
        assert_eq!(records_to_csv(&rows), "a,b\n1,\"x,y\"\n");
    }

    #[test]
    fn test_plain_strings_stay_unquoted() {
        let rows = records(json!([{ "locality": "Wakad", "price": 4500 }]));
        assert_eq!(records_to_csv(&rows), "locality,price\nWakad,4500\n");
    }

    #[test]
    fn test_embedded_quotes_pass_through_untouched() {
        let rows = records(json!([{ "note": "say \"hi\"" }]));
        assert_eq!(records_to_csv(&rows), "note\nsay \"hi\"\n");
    }

    #[test]
    fn test_null_becomes_an_empty_field() {
        let rows = records(json!([{ "a": null, "b": 2 }]));
        assert_eq!(records_to_csv(&rows), "a,b\n,2\n");
    }

    #[test]
    fn test_no_records_means_empty_output() {
        assert_eq!(records_to_csv(&[]), "");
    }

    #[test]
    fn test_filenames_differ_by_dialect() {
        assert_eq!(
            export_filename(ApiDialect::Classic, 1_700_000_000_000),
            "real_estate_analysis.csv"
        );
        assert_eq!(
            export_filename(ApiDialect::Rag, 1_700_000_000_000),
            "real_estate_analysis_1700000000000.csv"
        );
    }

    #[tokio::test]
    async fn test_export_writes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let rows = records(json!([{ "year": 2024, "price": 100 }]));
        let path = export_records(&rows, dir.path(), ApiDialect::Rag)
            .await
            .unwrap();
        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(written, "year,price\n2024,100\n");
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("real_estate_analysis_"));
        assert!(name.ends_with(".csv"));
    }
}
