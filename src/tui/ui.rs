//! UI Rendering
//!
//! Draws the chat interface each frame: header, data-file panel, scrollable
//! conversation, the focused reply's chart/table panes, query input and
//! status bar, plus the upload and help modals.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::format::format_count;
use crate::session::MessageRole;
use crate::tui::app::{App, View};
use crate::tui::theme::{Icons, Theme};
use crate::tui::widgets;

/// Render the entire UI
pub fn render(frame: &mut Frame, app: &mut App) {
    let focused = app.focused_visual_index();
    let (show_chart, show_table) = focused
        .map(|i| {
            let message = &app.session.messages[i];
            (message.has_chart(), message.has_table())
        })
        .unwrap_or((false, false));

    let mut constraints = vec![
        Constraint::Length(3), // Header
        Constraint::Length(3), // Data file panel
        Constraint::Min(8),    // Conversation
    ];
    if show_chart {
        constraints.push(Constraint::Length(13));
    }
    if show_table {
        constraints.push(Constraint::Length(9));
    }
    constraints.push(Constraint::Length(4)); // Input
    constraints.push(Constraint::Length(1)); // Status bar

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(frame.area());

    render_header(frame, chunks[0], app);
    render_file_panel(frame, chunks[1], app);
    render_messages(frame, chunks[2], app);

    let mut next = 3;
    if show_chart {
        if let Some(i) = focused {
            widgets::render_chart(frame, chunks[next], &app.session.messages[i]);
        }
        next += 1;
    }
    if show_table {
        if let Some(i) = focused {
            widgets::render_table(frame, chunks[next], &app.session.messages[i]);
        }
        next += 1;
    }

    render_input(frame, chunks[next], app);
    render_status_bar(frame, chunks[next + 1], app);

    match app.view {
        View::UploadPrompt => render_upload_prompt(frame, app),
        View::Help => render_help(frame),
        View::Chat => {}
    }
}

/// Render the header bar
fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Theme::border());

    let line = Line::from(vec![
        Span::styled("Estate Chat", Theme::title()),
        Span::styled(
            format!(" {} AI Real Estate Analyst", Icons::DOT),
            Theme::text_secondary(),
        ),
        Span::styled(
            format!(
                "  [{} {} {}]",
                app.config.api.dialect,
                Icons::DOT,
                app.config.api.base_url
            ),
            Theme::text_dim(),
        ),
    ]);

    let paragraph = Paragraph::new(line)
        .block(block)
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Render the uploaded-file panel
fn render_file_panel(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Data File ")
        .borders(Borders::ALL)
        .border_style(Theme::border());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let line = if app.session.uploading {
        Line::from(vec![
            Span::styled(spinner(app.tick), Theme::active()),
            Span::styled(" Uploading and processing...", Theme::text_secondary()),
        ])
    } else if let Some(file) = &app.session.uploaded_file {
        Line::from(vec![
            Span::styled(Icons::COMPLETE, Theme::success()),
            Span::raw(" "),
            Span::styled(file.name.as_str(), Theme::heading()),
            Span::styled(
                format!(
                    "  {size}  {dot} {rows} rows {dot} {cols} columns",
                    size = file.size_label,
                    dot = Icons::DOT,
                    rows = format_count(file.row_count),
                    cols = file.columns.len(),
                ),
                Theme::text_secondary(),
            ),
            Span::styled("   [Ctrl+R] remove", Theme::text_dim()),
        ])
    } else {
        Line::from(vec![
            Span::styled("No data file", Theme::text_secondary()),
            Span::styled(
                "  press [Ctrl+U] to upload (.csv, .xlsx, .xls)",
                Theme::text_dim(),
            ),
        ])
    };

    frame.render_widget(Paragraph::new(line), inner);
}

/// Render the conversation history
fn render_messages(frame: &mut Frame, area: Rect, app: &mut App) {
    let mut block = Block::default()
        .title(" Conversation ")
        .borders(Borders::ALL)
        .border_style(Theme::border());
    if app.max_scroll > 0 {
        block = block.title_bottom(
            Line::from(Span::styled(" [PgUp/PgDn] scroll ", Theme::text_dim())).right_aligned(),
        );
    }
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let wrap_width = inner.width.saturating_sub(2) as usize;
    let focused = app.focused_visual_index();
    let mut lines: Vec<Line> = Vec::new();

    for (i, message) in app.session.messages.iter().enumerate() {
        if i > 0 {
            lines.push(Line::from(""));
        }

        let (prefix, style) = match message.role {
            MessageRole::User => ("You", Theme::user_message()),
            MessageRole::Assistant => ("Analyst", Theme::assistant_message()),
        };
        lines.push(Line::from(Span::styled(
            prefix,
            style.add_modifier(Modifier::BOLD),
        )));

        for raw in message.text.split('\n') {
            if raw.is_empty() {
                lines.push(Line::from(""));
                continue;
            }
            for wrapped in wrap_line(raw, wrap_width) {
                lines.push(Line::from(Span::styled(
                    format!("  {wrapped}"),
                    Theme::text(),
                )));
            }
        }

        if message.has_visuals() {
            let mut parts = Vec::new();
            if message.has_chart() {
                parts.push(format!(
                    "{} chart {} {} rows",
                    message.chart_kind,
                    Icons::DOT,
                    message.chart_data.len()
                ));
            }
            if message.has_table() {
                parts.push(format!(
                    "table {} {} columns",
                    Icons::DOT,
                    message.table_data.first().map_or(0, |record| record.len())
                ));
            }
            let marker = format!("  {} {}", Icons::DOT, parts.join("  "));
            if focused == Some(i) {
                lines.push(Line::from(vec![
                    Span::styled(marker, Theme::active()),
                    Span::styled("  (shown below)", Theme::text_dim()),
                ]));
            } else {
                lines.push(Line::from(Span::styled(marker, Theme::text_dim())));
            }
        }
    }

    if app.session.loading {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            "Analyst",
            Theme::assistant_message().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            format!("  {} Analyzing...", spinner(app.tick)),
            Theme::active(),
        )));
    }

    app.update_scroll_bounds(lines.len() as u16, inner.height);

    let paragraph = Paragraph::new(lines).scroll((app.scroll_offset, 0));
    frame.render_widget(paragraph, inner);
}

/// Render the query input box
fn render_input(frame: &mut Frame, area: Rect, app: &App) {
    let title = if app.session.loading {
        " Query (analysis in progress) "
    } else {
        " Query "
    };
    let border = if app.view == View::Chat {
        Theme::border_focused()
    } else {
        Theme::border()
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(&app.input, inner);
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let status = if app.session.loading {
        Span::styled(
            format!("{} Analyzing...", spinner(app.tick)),
            Theme::active(),
        )
    } else if app.session.uploading {
        Span::styled(
            format!("{} Uploading...", spinner(app.tick)),
            Theme::active(),
        )
    } else if let Some(note) = &app.status_note {
        let style = if note.starts_with(Icons::ERROR) {
            Theme::error()
        } else if note.starts_with(Icons::COMPLETE) {
            Theme::success()
        } else {
            Theme::text_secondary()
        };
        Span::styled(note.as_str(), style)
    } else {
        Span::styled("Ready", Theme::text_secondary())
    };

    let mut spans = vec![status, Span::raw("   ")];
    for (key, desc) in [
        ("[Enter]", "Send"),
        ("[Tab]", "Queries"),
        ("[Ctrl+U]", "Upload"),
        ("[Ctrl+E]", "Export"),
        ("[F2/F3]", "Visuals"),
        ("[F1]", "Help"),
        ("[Ctrl+Q]", "Quit"),
    ] {
        spans.push(Span::styled(key, Theme::shortcut_key()));
        spans.push(Span::styled(format!(" {desc}  "), Theme::shortcut_desc()));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the upload path prompt modal
fn render_upload_prompt(frame: &mut Frame, app: &App) {
    let area = centered_rect(60, 30, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(Span::styled(
            "Path to a .csv, .xlsx or .xls file:",
            Theme::text(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("> ", Theme::shortcut_key()),
            Span::styled(app.upload_input.as_str(), Theme::text()),
            Span::styled(Icons::CURSOR, Theme::active()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("[Enter]", Theme::shortcut_key()),
            Span::styled(" Upload   ", Theme::shortcut_desc()),
            Span::styled("[Esc]", Theme::shortcut_key()),
            Span::styled(" Cancel", Theme::shortcut_desc()),
        ]),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Upload Data File ")
            .borders(Borders::ALL)
            .border_style(Theme::border_focused()),
    );
    frame.render_widget(paragraph, area);
}

/// Render the help modal
fn render_help(frame: &mut Frame) {
    let area = centered_rect(60, 60, frame.area());
    frame.render_widget(Clear, area);

    let bindings = [
        ("Enter", "Send the current query"),
        ("Tab", "Cycle suggested queries into the input"),
        ("Ctrl+U", "Upload a CSV/Excel file"),
        ("Ctrl+R", "Remove the uploaded file"),
        ("Ctrl+E", "Export the focused table as CSV"),
        ("F2 / F3", "Focus older / newer chart or table"),
        ("Up / Down", "Scroll the conversation"),
        ("PgUp / PgDn", "Scroll the conversation by page"),
        ("F1 / Ctrl+H", "Toggle this help"),
        ("Esc", "Close modal"),
        ("Ctrl+Q", "Quit"),
    ];

    let mut lines = vec![Line::from("")];
    for (key, desc) in bindings {
        lines.push(Line::from(vec![
            Span::styled(format!("  {key:<14}"), Theme::shortcut_key()),
            Span::styled(desc, Theme::text()),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Answers with chart or table data open panes below the",
        Theme::text_secondary(),
    )));
    lines.push(Line::from(Span::styled(
        "  conversation. Ctrl+E writes the focused table to disk.",
        Theme::text_secondary(),
    )));

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Help ")
            .title_bottom(Line::from(" [Esc] Close ").right_aligned())
            .borders(Borders::ALL)
            .border_style(Theme::border_focused()),
    );
    frame.render_widget(paragraph, area);
}

/// Pick the spinner frame for the current tick
fn spinner(tick: usize) -> &'static str {
    Icons::SPINNER[tick % Icons::SPINNER.len()]
}

/// Wrap a single line of text at a character width, breaking on whitespace
/// where possible
fn wrap_line(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current_len > 0 && current_len + 1 + word_len > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if word_len > width {
            // A single over-long token is hard-broken at the width.
            for ch in word.chars() {
                if current_len == width {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                current.push(ch);
                current_len += 1;
            }
            continue;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Create a centered rect using percentages of the available area
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{AnalysisBackend, AnalysisReply, ExistingData, UploadOutcome};
    use crate::config::Config;
    use crate::session::SessionEvent;
    use crate::types::{AppResult, ChartKind, Record};
    use async_trait::async_trait;
    use ratatui::{backend::TestBackend, Terminal};
    use serde_json::json;
    use std::path::Path;
    use std::sync::Arc;

    struct NullBackend;

    #[async_trait]
    impl AnalysisBackend for NullBackend {
        async fn check_existing_data(&self) -> AppResult<Option<ExistingData>> {
            Ok(None)
        }

        async fn upload_file(&self, _path: &Path) -> AppResult<UploadOutcome> {
            Ok(UploadOutcome {
                columns: vec![],
                row_count: 0,
            })
        }

        async fn submit_query(&self, _query: &str) -> AppResult<AnalysisReply> {
            Ok(AnalysisReply::default())
        }
    }

    fn test_app() -> App {
        let config = Config::load(crate::config::Overrides {
            base_url: Some("http://localhost:8000/api".to_string()),
            dialect: Some("classic".to_string()),
            export_dir: None,
            log_dir: None,
        })
        .unwrap();
        App::new(config, Arc::new(NullBackend))
    }

    fn draw(app: &mut App) -> String {
        let backend = TestBackend::new(100, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();

        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn reply_with(chart: Vec<Record>, table: Vec<Record>) -> AnalysisReply {
        AnalysisReply {
            summary: "Here is the analysis.".to_string(),
            chart_data: chart,
            chart_kind: ChartKind::Line,
            table_data: table,
        }
    }

    fn record(value: serde_json::Value) -> Record {
        match value {
            serde_json::Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_welcome_screen_has_prefix_and_hints() {
        let mut app = test_app();
        let text = draw(&mut app);
        assert!(text.contains("Analyst"));
        assert!(text.contains("AI Real Estate Analyst"));
        assert!(text.contains("No data file"));
        assert!(text.contains("Ready"));
    }

    #[test]
    fn test_table_pane_appears_only_with_rows() {
        let mut app = test_app();
        let text = draw(&mut app);
        assert!(!text.contains("Detailed Data"));

        app.session.apply(SessionEvent::QuerySucceeded {
            reply: reply_with(
                vec![],
                vec![record(json!({"locality": "Wakad", "avg_price": 4500}))],
            ),
        });
        let text = draw(&mut app);
        assert!(text.contains("Detailed Data"));
        assert!(text.contains("Locality"));
        assert!(text.contains("Avg Price"));
        assert!(text.contains("4,500"));
    }

    #[test]
    fn test_chart_pane_survives_rows_without_numbers() {
        let mut app = test_app();
        app.session.apply(SessionEvent::QuerySucceeded {
            reply: reply_with(vec![record(json!({"year": "2021", "note": "flat"}))], vec![]),
        });
        let text = draw(&mut app);
        assert!(text.contains("Visual Analysis"));
        assert!(!text.contains("Detailed Data"));
    }

    #[test]
    fn test_loading_shows_analyzing_indicator() {
        let mut app = test_app();
        app.session.apply(SessionEvent::UserSubmitted {
            text: "price trends".to_string(),
        });
        let text = draw(&mut app);
        assert!(text.contains("Analyzing..."));
        assert!(text.contains("You"));
        assert!(text.contains("price trends"));
    }

    #[test]
    fn test_wrap_line_breaks_on_words() {
        let wrapped = wrap_line("alpha beta gamma delta", 11);
        assert_eq!(wrapped, vec!["alpha beta", "gamma delta"]);
    }

    #[test]
    fn test_wrap_line_hard_breaks_long_tokens() {
        let wrapped = wrap_line("aaaaaaaaaa", 4);
        assert_eq!(wrapped, vec!["aaaa", "aaaa", "aa"]);
    }
}
