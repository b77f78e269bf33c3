// Backend gateway abstraction
//
// The analysis backend is an opaque HTTP collaborator. This module owns the
// trait seam and the domain-level reply types; `http` speaks the two wire
// dialects the deployed backends expose.

pub mod http;

pub use http::HttpBackend;

use std::path::Path;

use async_trait::async_trait;

use crate::types::{AppError, AppResult, ChartKind, Record};

// Where each backend lives when nothing else is configured.
const CLASSIC_DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
const RAG_DEFAULT_BASE_URL: &str = "https://realestate-chatbot-backend-im6f.onrender.com/api";

/// File extensions the client will hand to the backend at all, lowercase.
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["csv", "xlsx", "xls"];

/// Which deployed backend we are speaking to. The two were never unified:
/// they disagree on endpoint paths, response field names, and whether a
/// startup data check exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiDialect {
    /// Local analysis server: `/upload/` and `/analyze/`, flat reply fields.
    Classic,
    /// Hosted RAG server: `/upload-csv` and `/query`, nested chart object,
    /// plus `/health-check` and `/check-data` probes.
    #[default]
    Rag,
}

impl ApiDialect {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ApiDialect::Classic => CLASSIC_DEFAULT_BASE_URL,
            ApiDialect::Rag => RAG_DEFAULT_BASE_URL,
        }
    }
}

impl std::fmt::Display for ApiDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiDialect::Classic => write!(f, "classic"),
            ApiDialect::Rag => write!(f, "rag"),
        }
    }
}

impl std::str::FromStr for ApiDialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "classic" => Ok(ApiDialect::Classic),
            "rag" => Ok(ApiDialect::Rag),
            other => Err(format!(
                "unknown API dialect '{other}' (expected 'classic' or 'rag')"
            )),
        }
    }
}

/// Rejects paths the backend would never accept, before any I/O happens.
/// The check is on the extension only, case-insensitive; a path with no
/// extension is rejected too.
pub fn validate_upload_path(path: &Path) -> AppResult<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    match extension {
        Some(ext) if ACCEPTED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(AppError::InvalidFile(
            "Please upload a valid CSV or Excel file (.csv, .xlsx, .xls)".to_string(),
        )),
    }
}

/// Data already sitting on the backend from an earlier session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingData {
    pub points_count: Option<u64>,
}

/// What the backend reported after ingesting an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub columns: Vec<String>,
    pub row_count: u64,
}

/// A normalized analysis answer, whichever dialect produced it.
#[derive(Debug, Clone, Default)]
pub struct AnalysisReply {
    pub summary: String,
    pub chart_data: Vec<Record>,
    pub chart_kind: ChartKind,
    pub table_data: Vec<Record>,
}

#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Startup probe for pre-loaded data. `Ok(None)` means nothing is
    /// loaded, or the dialect has no such endpoint.
    async fn check_existing_data(&self) -> AppResult<Option<ExistingData>>;

    /// Uploads one data file. Validates the extension before touching the
    /// filesystem or the network.
    async fn upload_file(&self, path: &Path) -> AppResult<UploadOutcome>;

    /// Sends one natural-language query and returns the normalized reply.
    async fn submit_query(&self, query: &str) -> AppResult<AnalysisReply>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_accepts_known_extensions_case_insensitively() {
        for name in ["data.csv", "data.CSV", "book.xlsx", "old.XLS"] {
            assert!(validate_upload_path(&PathBuf::from(name)).is_ok(), "{name}");
        }
    }

    #[test]
    fn test_rejects_other_extensions_and_missing_ones() {
        for name in ["report.pdf", "notes.txt", "archive.csv.gz", "noext"] {
            let err = validate_upload_path(&PathBuf::from(name)).unwrap_err();
            assert!(matches!(err, AppError::InvalidFile(_)), "{name}");
        }
    }

    #[test]
    fn test_dialect_parsing() {
        assert_eq!("rag".parse::<ApiDialect>().unwrap(), ApiDialect::Rag);
        assert_eq!("Classic".parse::<ApiDialect>().unwrap(), ApiDialect::Classic);
        assert!("graphql".parse::<ApiDialect>().is_err());
    }

    #[test]
    fn test_default_base_urls() {
        assert_eq!(
            ApiDialect::Classic.default_base_url(),
            "http://localhost:8000/api"
        );
        assert!(ApiDialect::Rag.default_base_url().starts_with("https://"));
    }
}
