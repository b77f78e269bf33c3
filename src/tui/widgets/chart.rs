//! Chart Widget
//!
//! Draws a reply's chart records as a line or bar chart in the pane below
//! the conversation.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    symbols,
    text::{Line, Span},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::chart::{series_values, x_axis_labels, ChartSpec};
use crate::format::{display_label, format_number};
use crate::session::Message;
use crate::tui::theme::Theme;
use crate::types::{ChartKind, Record};

/// Render the chart pane for a message with chart data
pub fn render_chart(frame: &mut Frame, area: Rect, message: &Message) {
    let Some(spec) = ChartSpec::build(&message.chart_data, message.chart_kind) else {
        return;
    };

    let block = Block::default()
        .title(" Visual Analysis ")
        .borders(Borders::ALL)
        .border_style(Theme::border());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height < 3 || inner.width < 12 {
        return;
    }

    match spec.kind {
        ChartKind::Line => render_line_chart(frame, inner, &spec, &message.chart_data),
        ChartKind::Bar => render_bar_chart(frame, inner, &spec, &message.chart_data),
    }
}

fn render_line_chart(frame: &mut Frame, area: Rect, spec: &ChartSpec, records: &[Record]) {
    let mut point_sets: Vec<Vec<(f64, f64)>> = Vec::with_capacity(spec.series.len());
    for series in &spec.series {
        let points = series_values(records, &series.key)
            .into_iter()
            .enumerate()
            .filter_map(|(i, value)| value.map(|v| (i as f64, v)))
            .collect();
        point_sets.push(points);
    }

    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for points in &point_sets {
        for &(_, y) in points {
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }
    if !y_min.is_finite() || !y_max.is_finite() {
        y_min = 0.0;
        y_max = 1.0;
    }
    let span = y_max - y_min;
    let (y_lo, y_hi) = if span.abs() < f64::EPSILON {
        (y_min - 1.0, y_max + 1.0)
    } else {
        (y_min - span * 0.05, y_max + span * 0.05)
    };

    let datasets: Vec<Dataset> = spec
        .series
        .iter()
        .zip(&point_sets)
        .map(|(series, points)| {
            Dataset::default()
                .name(series.label.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(series.color))
                .data(points)
        })
        .collect();

    let labels = x_axis_labels(records, &spec.x_key);
    let x_max = records.len().saturating_sub(1).max(1) as f64;

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title(Span::styled(
                    display_label(&spec.x_key),
                    Theme::text_secondary(),
                ))
                .style(Theme::text_dim())
                .bounds([0.0, x_max])
                .labels(tick_labels(&labels)),
        )
        .y_axis(
            Axis::default()
                .style(Theme::text_dim())
                .bounds([y_lo, y_hi])
                .labels(vec![
                    Span::styled(format_number(y_lo), Theme::text_secondary()),
                    Span::styled(format_number((y_lo + y_hi) / 2.0), Theme::text_secondary()),
                    Span::styled(format_number(y_hi), Theme::text_secondary()),
                ]),
        );
    frame.render_widget(chart, area);
}

fn render_bar_chart(frame: &mut Frame, area: Rect, spec: &ChartSpec, records: &[Record]) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    frame.render_widget(Paragraph::new(legend_line(spec)), rows[0]);

    let labels = x_axis_labels(records, &spec.x_key);
    let slots = records.len().max(1) * spec.series.len().max(1);
    let bar_width = (area.width as usize / slots)
        .saturating_sub(1)
        .clamp(1, 8) as u16;

    let mut chart = BarChart::default()
        .bar_width(bar_width)
        .bar_gap(0)
        .group_gap(1);

    for (record, label) in records.iter().zip(&labels) {
        let bars: Vec<Bar> = spec
            .series
            .iter()
            .map(|series| {
                let value = record
                    .get(&series.key)
                    .and_then(|v| v.as_f64())
                    .unwrap_or(0.0);
                // Terminal bars cannot go below zero; the text keeps the
                // real value either way.
                Bar::default()
                    .value(value.max(0.0).round() as u64)
                    .text_value(format_number(value))
                    .style(Style::default().fg(series.color))
            })
            .collect();
        chart = chart.data(
            BarGroup::default()
                .label(Line::from(Span::styled(
                    label.clone(),
                    Theme::text_secondary(),
                )))
                .bars(&bars),
        );
    }

    frame.render_widget(chart, rows[1]);
}

fn legend_line(spec: &ChartSpec) -> Line<'static> {
    if spec.series.is_empty() {
        return Line::from(Span::styled("no plottable series", Theme::text_dim()));
    }
    let mut spans = Vec::with_capacity(spec.series.len());
    for series in &spec.series {
        spans.push(Span::styled(
            format!("■ {}  ", series.label),
            Style::default().fg(series.color),
        ));
    }
    Line::from(spans)
}

fn tick_labels(labels: &[String]) -> Vec<Span<'static>> {
    let picks: Vec<usize> = match labels.len() {
        0 => return Vec::new(),
        1 => vec![0],
        2 => vec![0, 1],
        n => vec![0, n / 2, n - 1],
    };
    picks
        .into_iter()
        .map(|i| Span::styled(labels[i].clone(), Theme::text_secondary()))
        .collect()
}
