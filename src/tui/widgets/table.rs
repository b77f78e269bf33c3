//! Table Widget
//!
//! Draws a reply's table records with humanized headers and locale-style
//! numbers, in the pane below the conversation.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};

use crate::format::{display_label, format_cell};
use crate::session::Message;
use crate::tui::theme::Theme;

/// Render the table pane for a message with table data
pub fn render_table(frame: &mut Frame, area: Rect, message: &Message) {
    let records = &message.table_data;
    let Some(first) = records.first() else {
        return;
    };

    let block = Block::default()
        .title(format!(" Detailed Data ({} rows) ", records.len()))
        .title_bottom(
            Line::from(Span::styled(" [Ctrl+E] Export CSV ", Theme::text_dim()))
                .right_aligned(),
        )
        .borders(Borders::ALL)
        .border_style(Theme::border());

    let columns: Vec<&String> = first.keys().collect();
    let header = Row::new(
        columns
            .iter()
            .map(|key| Cell::from(Span::styled(display_label(key), Theme::heading()))),
    );
    let rows: Vec<Row> = records
        .iter()
        .map(|record| Row::new(record.values().map(|value| Cell::from(format_cell(value)))))
        .collect();

    let widths = vec![Constraint::Ratio(1, columns.len().max(1) as u32); columns.len()];
    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .column_spacing(1);
    frame.render_widget(table, area);
}
