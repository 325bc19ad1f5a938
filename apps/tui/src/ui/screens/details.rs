use crate::app::{App, DetailState, TimelineState};
use crate::domain::Observation;
use crate::ui::screens::table::security_color;
use crate::ui::widgets::hints::key_hints;
use crate::ui::widgets::spinner::render_spinner;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};
use ratatui::Frame;

pub fn render_details(app: &App, f: &mut Frame<'_>, area: Rect) {
    let Some(detail) = app.detail.as_ref() else {
        f.render_widget(
            Paragraph::new("No row selected.").block(Block::default().borders(Borders::ALL)),
            area,
        );
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(48), Constraint::Min(20)])
        .split(area);

    render_fields(app, detail, f, chunks[0]);
    render_timeline(app, detail, f, chunks[1]);
}

fn render_fields(app: &App, detail: &DetailState, f: &mut Frame<'_>, area: Rect) {
    let record = &detail.record;
    let view = record.view_mode();
    let security = record.security();

    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!("{:<14}", "Security"),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(security.label(), Style::default().fg(security_color(security))),
    ])];
    lines.extend(
        app.registry
            .iter()
            .filter(|column| column.id != "security")
            .map(|column| {
                let value = column.display(record, view);
                Line::from(vec![
                    Span::styled(
                        format!("{:<14}", column.label),
                        Style::default().fg(Color::Gray),
                    ),
                    Span::raw(if value.is_empty() { "-".to_string() } else { value }),
                ])
            }),
    );

    let title = record
        .ssid()
        .map_or_else(|| record.bssid().to_string(), |ssid| format!("{ssid} ({})", record.bssid()));
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(format!(" {title} "))
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow)),
    );
    f.render_widget(paragraph, area);
}

fn render_timeline(app: &App, detail: &DetailState, f: &mut Frame<'_>, area: Rect) {
    let title = match &detail.timeline {
        TimelineState::Loaded(observations) => {
            format!(" Observation timeline ({}) ", observations.len())
        }
        TimelineState::Loading | TimelineState::Failed(_) => " Observation timeline ".to_string(),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .title_bottom(key_hints(&[("↑/↓", "Scroll"), ("Esc", "Back")]));

    match &detail.timeline {
        TimelineState::Loading => {
            let inner = block.inner(area);
            f.render_widget(block, area);
            render_spinner(f, inner, "Loading timeline...", &app.throbber_state);
        }
        TimelineState::Failed(message) => {
            let paragraph = Paragraph::new(vec![
                Line::from(Span::styled(
                    "Timeline unavailable",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                Line::from(message.as_str()),
            ])
            .block(block.border_style(Style::default().fg(Color::Red)));
            f.render_widget(paragraph, area);
        }
        TimelineState::Loaded(observations) if observations.is_empty() => {
            f.render_widget(
                Paragraph::new("No observations recorded for this radio.").block(block),
                area,
            );
        }
        TimelineState::Loaded(observations) => {
            let header = Row::new(["Observed", "Signal", "Lat", "Lon", "Accuracy"]).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
            let rows = observations.iter().map(timeline_row);
            let table = Table::new(
                rows,
                [
                    Constraint::Length(19),
                    Constraint::Length(8),
                    Constraint::Length(10),
                    Constraint::Length(10),
                    Constraint::Length(8),
                ],
            )
            .header(header)
            .block(block)
            .column_spacing(1)
            .row_highlight_style(Style::default().bg(Color::Rgb(0, 0, 238)).fg(Color::White));

            let mut state = TableState::default().with_selected(Some(detail.scroll));
            f.render_stateful_widget(table, area, &mut state);
        }
    }
}

fn timeline_row(observation: &Observation) -> Row<'static> {
    let optional = |value: Option<f64>, precision: usize| {
        value.map_or_else(String::new, |v| format!("{v:.precision$}"))
    };
    Row::new(vec![
        Cell::from(
            observation
                .observed_at
                .map_or_else(String::new, |t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
        ),
        Cell::from(
            observation
                .signal
                .map_or_else(String::new, |dbm| format!("{dbm} dBm")),
        ),
        Cell::from(optional(observation.latitude, 5)),
        Cell::from(optional(observation.longitude, 5)),
        Cell::from(
            observation
                .accuracy
                .map_or_else(String::new, |m| format!("{m:.0} m")),
        ),
    ])
}
