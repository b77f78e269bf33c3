// HTTP gateway implementation
//
// Speaks both deployed wire dialects. Requests are single-shot with no
// retry and no client-side timeout, exactly like the web client this
// replaces: a slow backend shows as a long-running spinner, not an error.

use std::path::Path;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info};

use super::{
    validate_upload_path, AnalysisBackend, AnalysisReply, ApiDialect, ExistingData, UploadOutcome,
};
use crate::types::{AppError, AppResult, ChartKind, Record};

pub struct HttpBackend {
    client: Client,
    base_url: String,
    dialect: ApiDialect,
}

// Wire types for the RAG data check
#[derive(Deserialize)]
struct CheckDataWire {
    #[serde(default)]
    exists: bool,
    points_count: Option<u64>,
}

// Upload replies: RAG names first, classic names as aliases
#[derive(Deserialize)]
struct UploadWire {
    #[serde(alias = "columns_found")]
    columns: Option<Vec<String>>,
    #[serde(alias = "total_rows")]
    rows_processed: Option<u64>,
}

// Query replies: one struct covers both dialects, `into_reply` picks
// whichever shape arrived
#[derive(Deserialize)]
struct QueryWire {
    summary: Option<String>,
    chart: Option<ChartWire>,
    table: Option<Vec<Record>>,
    #[serde(rename = "chartData")]
    chart_data: Option<Vec<Record>>,
    #[serde(rename = "chartType")]
    chart_type: Option<String>,
    #[serde(rename = "tableData")]
    table_data: Option<Vec<Record>>,
}

#[derive(Deserialize)]
struct ChartWire {
    #[serde(rename = "type")]
    kind: Option<String>,
    data: Option<Vec<Record>>,
}

#[derive(Deserialize)]
struct ErrorWire {
    error: Option<String>,
    found_columns: Option<Vec<String>>,
}

impl QueryWire {
    fn into_reply(self) -> AnalysisReply {
        let (chart_data, chart_type) = match self.chart {
            Some(chart) => (chart.data.unwrap_or_default(), chart.kind),
            None => (self.chart_data.unwrap_or_default(), self.chart_type),
        };
        AnalysisReply {
            summary: self
                .summary
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "Analysis complete.".to_string()),
            chart_data,
            chart_kind: ChartKind::from_wire(chart_type.as_deref()),
            table_data: self.table.or(self.table_data).unwrap_or_default(),
        }
    }
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, dialect: ApiDialect) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
            dialect,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn dialect(&self) -> ApiDialect {
        self.dialect
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn upload_path(&self) -> &'static str {
        match self.dialect {
            ApiDialect::Classic => "upload/",
            ApiDialect::Rag => "upload-csv",
        }
    }

    fn query_path(&self) -> &'static str {
        match self.dialect {
            ApiDialect::Classic => "analyze/",
            ApiDialect::Rag => "query",
        }
    }

    /// Maps a non-success response to [`AppError::Backend`]. The body is
    /// expected to be `{"error": ...}`, optionally with `found_columns`;
    /// anything else falls back to the raw text or the given default.
    fn backend_error(status: StatusCode, body: &str, fallback: &str) -> AppError {
        match serde_json::from_str::<ErrorWire>(body) {
            Ok(ErrorWire {
                error: Some(message),
                found_columns,
            }) => AppError::Backend {
                status: status.as_u16(),
                message,
                found_columns,
            },
            Ok(_) => AppError::Backend {
                status: status.as_u16(),
                message: fallback.to_string(),
                found_columns: None,
            },
            Err(_) => AppError::Backend {
                status: status.as_u16(),
                message: if body.trim().is_empty() {
                    fallback.to_string()
                } else {
                    body.to_string()
                },
                found_columns: None,
            },
        }
    }
}

#[async_trait]
impl AnalysisBackend for HttpBackend {
    async fn check_existing_data(&self) -> AppResult<Option<ExistingData>> {
        // Only the RAG deployment exposes the probes.
        if self.dialect == ApiDialect::Classic {
            return Ok(None);
        }

        // Wake the server first; the health-check body is irrelevant.
        self.client.get(self.endpoint("health-check")).send().await?;

        let response = self.client.get(self.endpoint("check-data")).send().await?;
        let wire: CheckDataWire = response.json().await?;
        debug!(exists = wire.exists, points = ?wire.points_count, "data check");
        if wire.exists {
            Ok(Some(ExistingData {
                points_count: wire.points_count,
            }))
        } else {
            Ok(None)
        }
    }

    async fn upload_file(&self, path: &Path) -> AppResult<UploadOutcome> {
        validate_upload_path(path)?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.csv".to_string());
        let bytes = tokio::fs::read(path).await?;
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        debug!(file = %file_name, bytes = bytes.len(), "uploading data file");

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime.essence_str())?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.endpoint(self.upload_path()))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::backend_error(status, &body, "Upload failed"));
        }

        let wire: UploadWire = response.json().await?;
        let outcome = UploadOutcome {
            columns: wire.columns.unwrap_or_default(),
            row_count: wire.rows_processed.unwrap_or(0),
        };
        info!(rows = outcome.row_count, columns = outcome.columns.len(), "upload accepted");
        Ok(outcome)
    }

    async fn submit_query(&self, query: &str) -> AppResult<AnalysisReply> {
        let response = self
            .client
            .post(self.endpoint(self.query_path()))
            .json(&serde_json::json!({ "query": query }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let fallback = match self.dialect {
                ApiDialect::Classic => "Analysis failed",
                ApiDialect::Rag => "Query failed",
            };
            return Err(Self::backend_error(status, &body, fallback));
        }

        let wire: QueryWire = response.json().await?;
        Ok(wire.into_reply())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn write_csv(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("pune.csv");
        std::fs::write(&path, "locality,price\nWakad,4500\n").unwrap();
        path
    }

    #[test]
    fn test_trailing_slash_is_trimmed_from_the_base_url() {
        let backend = HttpBackend::new("http://localhost:8000/api/", ApiDialect::Classic);
        assert_eq!(backend.base_url(), "http://localhost:8000/api");
        assert_eq!(backend.dialect(), ApiDialect::Classic);
        assert_eq!(backend.endpoint("upload/"), "http://localhost:8000/api/upload/");
    }

    #[tokio::test]
    async fn test_rag_query_parses_nested_chart() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/query")
            .match_body(Matcher::JsonString(r#"{"query":"price trends"}"#.to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "summary": "Prices rose steadily.",
                    "chart": { "type": "bar", "data": [{ "year": 2023, "price": 100 }] },
                    "table": [{ "locality": "Wakad", "price": 4500 }]
                }"#,
            )
            .create_async()
            .await;

        let backend = HttpBackend::new(format!("{}/api", server.url()), ApiDialect::Rag);
        let reply = backend.submit_query("price trends").await.unwrap();

        assert_eq!(reply.summary, "Prices rose steadily.");
        assert_eq!(reply.chart_kind, ChartKind::Bar);
        assert_eq!(reply.chart_data.len(), 1);
        assert_eq!(reply.table_data.len(), 1);
        assert_eq!(reply.table_data[0]["locality"], "Wakad");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_classic_query_parses_flat_fields() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/analyze/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "summary": "Demand is up.",
                    "chartType": "line",
                    "chartData": [{ "year": 2024, "demand": 81 }],
                    "tableData": [{ "year": 2024, "demand": 81 }]
                }"#,
            )
            .create_async()
            .await;

        let backend = HttpBackend::new(format!("{}/api", server.url()), ApiDialect::Classic);
        let reply = backend.submit_query("demand").await.unwrap();

        assert_eq!(reply.summary, "Demand is up.");
        assert_eq!(reply.chart_kind, ChartKind::Line);
        assert_eq!(reply.chart_data.len(), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_summary_gets_a_default() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/query")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{ "table": [] }"#)
            .create_async()
            .await;

        let backend = HttpBackend::new(format!("{}/api", server.url()), ApiDialect::Rag);
        let reply = backend.submit_query("anything").await.unwrap();
        assert_eq!(reply.summary, "Analysis complete.");
        assert!(reply.chart_data.is_empty());
        assert!(reply.table_data.is_empty());
    }

    #[tokio::test]
    async fn test_query_error_surfaces_backend_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/query")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{ "error": "No data found. Please upload a CSV file first." }"#)
            .create_async()
            .await;

        let backend = HttpBackend::new(format!("{}/api", server.url()), ApiDialect::Rag);
        let err = backend.submit_query("anything").await.unwrap_err();
        match err {
            AppError::Backend { status, message, .. } => {
                assert_eq!(status, 400);
                assert!(message.contains("No data found"));
            }
            other => panic!("expected a backend error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_upload_parses_rag_field_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir);

        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/upload-csv")
            .match_header(
                "content-type",
                Matcher::Regex("multipart/form-data.*".to_string()),
            )
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{ "columns": ["locality", "price"], "rows_processed": 1 }"#)
            .create_async()
            .await;

        let backend = HttpBackend::new(format!("{}/api", server.url()), ApiDialect::Rag);
        let outcome = backend.upload_file(&path).await.unwrap();
        assert_eq!(outcome.columns, vec!["locality", "price"]);
        assert_eq!(outcome.row_count, 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upload_parses_classic_field_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir);

        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/upload/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{ "columns_found": ["locality", "price"], "total_rows": 42 }"#)
            .create_async()
            .await;

        let backend = HttpBackend::new(format!("{}/api", server.url()), ApiDialect::Classic);
        let outcome = backend.upload_file(&path).await.unwrap();
        assert_eq!(outcome.columns, vec!["locality", "price"]);
        assert_eq!(outcome.row_count, 42);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upload_error_carries_found_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir);

        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/upload-csv")
            .with_status(422)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{ "error": "Missing required columns", "found_columns": ["a", "b"] }"#,
            )
            .create_async()
            .await;

        let backend = HttpBackend::new(format!("{}/api", server.url()), ApiDialect::Rag);
        let err = backend.upload_file(&path).await.unwrap_err();
        match err {
            AppError::Backend {
                status,
                message,
                found_columns,
            } => {
                assert_eq!(status, 422);
                assert_eq!(message, "Missing required columns");
                assert_eq!(found_columns, Some(vec!["a".to_string(), "b".to_string()]));
            }
            other => panic!("expected a backend error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_bad_extension_is_rejected_before_any_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let backend = HttpBackend::new(format!("{}/api", server.url()), ApiDialect::Rag);
        let err = backend
            .upload_file(Path::new("report.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidFile(_)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_classic_dialect_skips_the_data_check() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let backend = HttpBackend::new(format!("{}/api", server.url()), ApiDialect::Classic);
        let existing = backend.check_existing_data().await.unwrap();
        assert!(existing.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rag_data_check_wakes_then_probes() {
        let mut server = mockito::Server::new_async().await;
        let health = server
            .mock("GET", "/api/health-check")
            .with_status(200)
            .with_body("ok")
            .create_async()
            .await;
        let check = server
            .mock("GET", "/api/check-data")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{ "exists": true, "points_count": 1250 }"#)
            .create_async()
            .await;

        let backend = HttpBackend::new(format!("{}/api", server.url()), ApiDialect::Rag);
        let existing = backend.check_existing_data().await.unwrap().unwrap();
        assert_eq!(existing.points_count, Some(1250));
        health.assert_async().await;
        check.assert_async().await;
    }

    #[tokio::test]
    async fn test_rag_data_check_with_nothing_loaded() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/health-check")
            .with_status(200)
            .create_async()
            .await;
        server
            .mock("GET", "/api/check-data")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{ "exists": false }"#)
            .create_async()
            .await;

        let backend = HttpBackend::new(format!("{}/api", server.url()), ApiDialect::Rag);
        let existing = backend.check_existing_data().await.unwrap();
        assert!(existing.is_none());
    }
}
