// Chat session state
//
// Owns the transcript, the in-flight flags, and the uploaded-file slot.
// Every mutation goes through [`SessionState::apply`], which keeps the
// transition rules testable without a terminal or a network.

use chrono::{DateTime, Utc};

use crate::backend::AnalysisReply;
use crate::types::{ChartKind, Record};

/// Notice appended when the user discards the uploaded file.
pub const FILE_REMOVED_NOTICE: &str = "File removed. Upload a new file to continue analysis.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Assistant,
}

/// One transcript entry. Assistant messages may carry chart records and/or
/// table records alongside the text.
#[derive(Debug, Clone)]
pub struct Message {
    pub role: MessageRole,
    pub text: String,
    pub chart_data: Vec<Record>,
    pub chart_kind: ChartKind,
    pub table_data: Vec<Record>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::plain(MessageRole::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::plain(MessageRole::Assistant, text)
    }

    fn plain(role: MessageRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            chart_data: Vec::new(),
            chart_kind: ChartKind::default(),
            table_data: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    fn from_reply(reply: AnalysisReply) -> Self {
        Self {
            role: MessageRole::Assistant,
            text: reply.summary,
            chart_data: reply.chart_data,
            chart_kind: reply.chart_kind,
            table_data: reply.table_data,
            timestamp: Utc::now(),
        }
    }

    pub fn has_chart(&self) -> bool {
        !self.chart_data.is_empty()
    }

    pub fn has_table(&self) -> bool {
        !self.table_data.is_empty()
    }

    pub fn has_visuals(&self) -> bool {
        self.has_chart() || self.has_table()
    }
}

/// What the user currently has loaded on the backend side.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFileInfo {
    pub name: String,
    pub size_label: String,
    pub columns: Vec<String>,
    pub row_count: u64,
}

/// Everything that can happen to a session.
#[derive(Debug)]
pub enum SessionEvent {
    UserSubmitted { text: String },
    UploadStarted,
    UploadSucceeded { info: UploadedFileInfo, notice: String },
    UploadFailed { error: String },
    QuerySucceeded { reply: AnalysisReply },
    QueryFailed { error: String },
    FileRemoved,
}

#[derive(Debug, Default)]
pub struct SessionState {
    pub messages: Vec<Message>,
    /// A query request is outstanding.
    pub loading: bool,
    /// An upload request is outstanding.
    pub uploading: bool,
    pub uploaded_file: Option<UploadedFileInfo>,
}

impl SessionState {
    /// Fresh session seeded with a greeting from the assistant.
    pub fn with_welcome(text: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::assistant(text)],
            ..Self::default()
        }
    }

    /// Applies one event. The transcript is append-only: no event rewrites
    /// or removes messages already present.
    pub fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::UserSubmitted { text } => {
                let text = text.trim();
                if text.is_empty() || self.loading {
                    return;
                }
                self.messages.push(Message::user(text));
                self.loading = true;
            }
            SessionEvent::UploadStarted => {
                self.uploading = true;
            }
            SessionEvent::UploadSucceeded { info, notice } => {
                self.uploading = false;
                self.uploaded_file = Some(info);
                self.messages.push(Message::assistant(notice));
            }
            SessionEvent::UploadFailed { error } => {
                self.uploading = false;
                self.messages.push(Message::assistant(error));
            }
            SessionEvent::QuerySucceeded { reply } => {
                self.loading = false;
                self.messages.push(Message::from_reply(reply));
            }
            SessionEvent::QueryFailed { error } => {
                self.loading = false;
                self.messages.push(Message::assistant(error));
            }
            SessionEvent::FileRemoved => {
                self.uploaded_file = None;
                self.messages.push(Message::assistant(FILE_REMOVED_NOTICE));
            }
        }
    }
}
