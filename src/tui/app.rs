//! Application State
//!
//! Owns the chat session, the backend handle, and the glue between user
//! actions and the async gateway calls. Gateway calls run on spawned tasks
//! and report back through an [`AppEvent`] channel so the draw loop never
//! blocks on the network.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tui_textarea::TextArea;
use uuid::Uuid;

use crate::backend::{
    validate_upload_path, AnalysisBackend, AnalysisReply, ExistingData, UploadOutcome,
};
use crate::config::Config;
use crate::export;
use crate::format::format_count;
use crate::session::{Message, SessionEvent, SessionState, UploadedFileInfo};
use crate::tui::event::AppAction;
use crate::types::{AppError, AppResult};

/// Suggested queries, cycled into the input with Tab.
pub const QUICK_QUERIES: [&str; 5] = [
    "Show me price trends in Wakad",
    "Compare prices across different locations",
    "Give me analysis of Wakad",
    "Compare Ambegaon Budruk and Aundh demand trends",
    "Show price growth for Akurdi over the last 3 years",
];

const INPUT_PLACEHOLDER: &str = "Ask about prices, demand, growth...";

/// Current view/screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Chat,
    /// Modal asking for a file path to upload
    UploadPrompt,
    Help,
}

/// Completion events sent back from spawned gateway tasks
#[derive(Debug)]
pub enum AppEvent {
    /// Startup data check finished; `None` means nothing pre-loaded (or the
    /// probe failed, which is deliberately silent).
    PreflightDone(Option<ExistingData>),
    /// Upload finished one way or the other
    UploadDone {
        file_name: String,
        size_label: String,
        result: AppResult<UploadOutcome>,
    },
    /// Query finished
    QueryDone(AppResult<AnalysisReply>),
    /// CSV export finished
    ExportDone(AppResult<PathBuf>),
}

/// Main application state
pub struct App {
    // Configuration
    pub config: Config,
    backend: Arc<dyn AnalysisBackend>,

    // UI State
    pub view: View,
    pub should_quit: bool,
    pub input: TextArea<'static>,
    pub upload_input: String,
    pub scroll_offset: u16,
    pub max_scroll: u16,
    pub tick: usize,
    /// Transient note for the status bar (export results, small warnings)
    pub status_note: Option<String>,

    // Chat State
    pub session: SessionState,

    // Which message's chart/table the side panes show; `None` follows the
    // newest message that has any
    visual_focus: Option<usize>,
    quick_query_index: usize,

    // One-shot guard for the startup data check
    preflight_started: bool,

    session_id: Uuid,

    // Async communication
    event_rx: mpsc::Receiver<AppEvent>,
    event_tx: mpsc::Sender<AppEvent>,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config, backend: Arc<dyn AnalysisBackend>) -> Self {
        let (tx, rx) = mpsc::channel(100);
        let session_id = Uuid::new_v4();
        info!(
            session = %session_id,
            dialect = %config.api.dialect,
            base_url = %config.api.base_url,
            "chat session started"
        );

        Self {
            config,
            backend,
            view: View::Chat,
            should_quit: false,
            input: Self::fresh_input(),
            upload_input: String::new(),
            scroll_offset: 0,
            max_scroll: 0,
            tick: 0,
            status_note: None,
            session: SessionState::with_welcome(welcome_text()),
            visual_focus: None,
            quick_query_index: 0,
            preflight_started: false,
            session_id,
            event_rx: rx,
            event_tx: tx,
        }
    }

    fn fresh_input() -> TextArea<'static> {
        let mut input = TextArea::default();
        input.set_cursor_line_style(ratatui::style::Style::default());
        input.set_placeholder_style(crate::tui::theme::Theme::placeholder());
        input.set_placeholder_text(INPUT_PLACEHOLDER);
        input
    }

    /// Kick off the one-shot startup data check. Subsequent calls are
    /// no-ops, whatever the first probe returned.
    pub fn start_preflight(&mut self) {
        if self.preflight_started {
            return;
        }
        self.preflight_started = true;

        let backend = Arc::clone(&self.backend);
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let existing = match backend.check_existing_data().await {
                Ok(existing) => existing,
                Err(e) => {
                    // Server asleep or no data yet; the chat works either way.
                    debug!("startup data check failed: {e}");
                    None
                }
            };
            tx.send(AppEvent::PreflightDone(existing)).await.ok();
        });
    }

    /// Poll for async events
    pub fn poll_events(&mut self) {
        // Collect first so handle_event can borrow self mutably
        let mut events = Vec::new();
        while let Ok(event) = self.event_rx.try_recv() {
            events.push(event);
        }
        for event in events {
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::PreflightDone(Some(existing)) => {
                let notice = preflight_notice(&existing);
                self.session.apply(SessionEvent::UploadSucceeded {
                    info: preloaded_info(&existing),
                    notice,
                });
                self.scroll_to_bottom();
            }
            AppEvent::PreflightDone(None) => {}
            AppEvent::UploadDone {
                file_name,
                size_label,
                result,
            } => {
                match result {
                    Ok(outcome) => {
                        let notice = upload_success_text(&file_name, &outcome);
                        self.session.apply(SessionEvent::UploadSucceeded {
                            info: UploadedFileInfo {
                                name: file_name,
                                size_label,
                                columns: outcome.columns,
                                row_count: outcome.row_count,
                            },
                            notice,
                        });
                    }
                    Err(error) => {
                        warn!(session = %self.session_id, "upload failed: {error}");
                        self.session.apply(SessionEvent::UploadFailed {
                            error: upload_failure_text(&error, &self.config.api.base_url),
                        });
                    }
                }
                self.visual_focus = None;
                self.scroll_to_bottom();
            }
            AppEvent::QueryDone(result) => {
                match result {
                    Ok(reply) => {
                        self.session.apply(SessionEvent::QuerySucceeded { reply });
                        self.visual_focus = None;
                    }
                    Err(error) => {
                        warn!(session = %self.session_id, "query failed: {error}");
                        self.session.apply(SessionEvent::QueryFailed {
                            error: query_failure_text(&error),
                        });
                    }
                }
                self.scroll_to_bottom();
            }
            AppEvent::ExportDone(result) => {
                self.status_note = Some(match result {
                    Ok(path) => format!("✓ Exported to {}", path.display()),
                    Err(error) => format!("✗ Export failed: {error}"),
                });
            }
        }
    }

    /// Handle a user action
    pub fn handle_action(&mut self, action: AppAction) {
        match action {
            AppAction::Quit | AppAction::ForceQuit => {
                self.should_quit = true;
            }
            AppAction::Submit => match self.view {
                View::Chat => self.submit_chat_message(),
                View::UploadPrompt => self.submit_upload_path(),
                View::Help => self.view = View::Chat,
            },
            AppAction::ToggleHelp => {
                self.view = if self.view == View::Help {
                    View::Chat
                } else {
                    View::Help
                };
            }
            AppAction::Escape => {
                if self.view != View::Chat {
                    self.view = View::Chat;
                    self.upload_input.clear();
                }
            }
            AppAction::StartUpload => {
                if self.session.uploading {
                    self.status_note = Some("Upload already in progress".to_string());
                } else {
                    self.view = View::UploadPrompt;
                }
            }
            AppAction::RemoveFile => {
                if self.session.uploaded_file.is_some() {
                    self.session.apply(SessionEvent::FileRemoved);
                    self.scroll_to_bottom();
                }
            }
            AppAction::ExportTable => {
                self.export_focused_table();
            }
            AppAction::FocusPrevVisual => {
                self.step_visual_focus(false);
            }
            AppAction::FocusNextVisual => {
                self.step_visual_focus(true);
            }
            AppAction::CycleQuickQuery => {
                if self.view == View::Chat {
                    self.cycle_quick_query();
                }
            }
            AppAction::ScrollUp => {
                self.scroll_offset = self.scroll_offset.saturating_sub(1);
            }
            AppAction::ScrollDown => {
                if self.scroll_offset < self.max_scroll {
                    self.scroll_offset += 1;
                }
            }
            AppAction::ScrollPageUp => {
                self.scroll_offset = self.scroll_offset.saturating_sub(10);
            }
            AppAction::ScrollPageDown => {
                self.scroll_offset = (self.scroll_offset + 10).min(self.max_scroll);
            }
            AppAction::Input(key) => {
                self.handle_input(key);
            }
            AppAction::Tick => {
                self.tick = self.tick.wrapping_add(1);
            }
        }
    }

    fn handle_input(&mut self, key: crossterm::event::KeyEvent) {
        use crossterm::event::{KeyCode, KeyModifiers};

        match self.view {
            View::Chat => {
                self.input.input(key);
            }
            View::UploadPrompt => match key.code {
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.upload_input.push(c);
                }
                KeyCode::Backspace => {
                    self.upload_input.pop();
                }
                _ => {}
            },
            View::Help => {}
        }
    }

    /// Submit the chat input as a query. Ignored while a previous query is
    /// still in flight.
    fn submit_chat_message(&mut self) {
        let text: String = self.input.lines().join("\n");
        let text = text.trim().to_string();

        if text.is_empty() || self.session.loading {
            return;
        }

        self.status_note = None;
        self.input = Self::fresh_input();
        self.session
            .apply(SessionEvent::UserSubmitted { text: text.clone() });
        debug!(session = %self.session_id, "submitting query");

        let backend = Arc::clone(&self.backend);
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = backend.submit_query(&text).await;
            tx.send(AppEvent::QueryDone(result)).await.ok();
        });

        self.scroll_to_bottom();
    }

    /// Validate and upload the path typed into the prompt. Bad extensions
    /// are rejected right here, before any file or network I/O.
    fn submit_upload_path(&mut self) {
        let raw = self.upload_input.trim().to_string();
        self.upload_input.clear();
        self.view = View::Chat;

        if raw.is_empty() {
            return;
        }

        let path = PathBuf::from(&raw);
        if let Err(error) = validate_upload_path(&path) {
            self.session.apply(SessionEvent::UploadFailed {
                error: format!("✗ {error}"),
            });
            self.scroll_to_bottom();
            return;
        }

        if self.session.uploading {
            return;
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| raw.clone());
        self.status_note = None;
        self.session.apply(SessionEvent::UploadStarted);

        let backend = Arc::clone(&self.backend);
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let size_label = match tokio::fs::metadata(&path).await {
                Ok(meta) => format!("{:.2} KB", meta.len() as f64 / 1024.0),
                Err(_) => "N/A".to_string(),
            };
            let result = backend.upload_file(&path).await;
            tx.send(AppEvent::UploadDone {
                file_name,
                size_label,
                result,
            })
            .await
            .ok();
        });

        self.scroll_to_bottom();
    }

    /// Export the focused message's table to a CSV file in the export dir.
    fn export_focused_table(&mut self) {
        let records = self
            .focused_visual_index()
            .map(|i| self.session.messages[i].table_data.clone())
            .unwrap_or_default();

        if records.is_empty() {
            self.status_note = Some("No table to export".to_string());
            return;
        }

        let dir = self.config.export_dir.clone();
        let dialect = self.config.api.dialect;
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = export::export_records(&records, &dir, dialect).await;
            tx.send(AppEvent::ExportDone(result)).await.ok();
        });
    }

    /// The message whose chart/table the side panes render: the explicitly
    /// focused one if still valid, otherwise the newest with visuals.
    pub fn focused_visual_index(&self) -> Option<usize> {
        if let Some(i) = self.visual_focus {
            if self.session.messages.get(i).is_some_and(Message::has_visuals) {
                return Some(i);
            }
        }
        self.session.messages.iter().rposition(Message::has_visuals)
    }

    fn step_visual_focus(&mut self, forward: bool) {
        let indexes: Vec<usize> = self
            .session
            .messages
            .iter()
            .enumerate()
            .filter(|(_, m)| m.has_visuals())
            .map(|(i, _)| i)
            .collect();
        let Some(current) = self.focused_visual_index() else {
            return;
        };
        let pos = indexes
            .iter()
            .position(|&i| i == current)
            .unwrap_or(indexes.len().saturating_sub(1));
        let next = if forward {
            (pos + 1) % indexes.len()
        } else {
            (pos + indexes.len() - 1) % indexes.len()
        };
        self.visual_focus = Some(indexes[next]);
    }

    fn cycle_quick_query(&mut self) {
        let query = QUICK_QUERIES[self.quick_query_index % QUICK_QUERIES.len()];
        self.quick_query_index = self.quick_query_index.wrapping_add(1);

        let mut input = Self::fresh_input();
        input.insert_str(query);
        self.input = input;
    }

    /// Scroll to bottom of messages
    fn scroll_to_bottom(&mut self) {
        // Clamped to the real bottom by update_scroll_bounds on the next draw.
        self.scroll_offset = u16::MAX;
    }

    /// Update max scroll based on rendered content
    pub fn update_scroll_bounds(&mut self, content_height: u16, viewport_height: u16) {
        self.max_scroll = content_height.saturating_sub(viewport_height);
        if self.scroll_offset > self.max_scroll {
            self.scroll_offset = self.max_scroll;
        }
    }
}

fn welcome_text() -> String {
    "Hello! I'm your AI Real Estate Analyst.\n\n\
     Upload your Excel/CSV file with Ctrl+U to get started, or ask questions \
     if data is already loaded.\n\n\
     Try these queries (Tab cycles them into the input):\n\
     • \"Show me price trends in Wakad\"\n\
     • \"Compare prices across locations\"\n\
     • \"What are the total sales by year?\"\n\
     • \"Analyze demand patterns\"\n\
     • \"Show me the top performing areas\""
        .to_string()
}

fn preloaded_info(existing: &ExistingData) -> UploadedFileInfo {
    UploadedFileInfo {
        name: "Pre-loaded data".to_string(),
        size_label: "N/A".to_string(),
        columns: vec![
            "locality".to_string(),
            "date".to_string(),
            "price".to_string(),
            "demand".to_string(),
        ],
        row_count: existing.points_count.unwrap_or(0),
    }
}

fn preflight_notice(existing: &ExistingData) -> String {
    let found = match existing.points_count {
        Some(count) => format!("Found {} embedded records", format_count(count)),
        None => "Found embedded records".to_string(),
    };
    format!(
        "✓ Data already loaded!\n\n{found}\n\n\
         You can start asking questions immediately:\n\
         • \"Show price trends for Wakad\"\n\
         • \"Compare demand across locations\"\n\
         • \"What are the yearly sales patterns?\""
    )
}

fn upload_success_text(file_name: &str, outcome: &UploadOutcome) -> String {
    let rows = if outcome.row_count > 0 {
        format_count(outcome.row_count)
    } else {
        "N/A".to_string()
    };
    let columns = if outcome.columns.is_empty() {
        "N/A".to_string()
    } else {
        outcome.columns.join(", ")
    };
    format!(
        "✓ File \"{file_name}\" uploaded successfully!\n\n\
         Data summary:\n\
         • Total rows: {rows}\n\
         • Columns: {columns}\n\n\
         Now ask me anything about your real estate data!"
    )
}

fn upload_failure_text(error: &AppError, base_url: &str) -> String {
    match error {
        AppError::InvalidFile(message) => format!("✗ {message}"),
        AppError::Backend {
            message,
            found_columns,
            ..
        } => {
            let mut text = format!("✗ Upload failed: {message}");
            if let Some(columns) = found_columns {
                text.push_str(&format!("\n\nFound columns: {}", columns.join(", ")));
            }
            text
        }
        other => format!(
            "✗ Upload error: {other}\n\n\
             Make sure the analysis server is reachable at {base_url}"
        ),
    }
}

fn query_failure_text(error: &AppError) -> String {
    let message = match error {
        AppError::Backend { message, .. } => message.clone(),
        other => other.to_string(),
    };
    if message.contains("No data found") {
        format!("✗ Error: {message}\n\nPlease upload a file first!")
    } else {
        format!(
            "✗ Error: {message}\n\n\
             Troubleshooting:\n\
             1. Check that the analysis server is running\n\
             2. Upload a data file if you have not\n\
             3. Try rephrasing your query"
        )
    }
}
