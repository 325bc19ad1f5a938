use crate::app::App;
use crate::domain::{Record, SecurityClass};
use crate::table::viewport::DEFAULT_OVERSCAN;
use crate::table::{virtual_window, ColumnDescriptor, LoadStatus, SortDirection, SortModel};
use crate::ui::widgets::hints::key_hints;
use crate::ui::widgets::spinner::render_spinner;
use ratatui::layout::{Alignment, Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;

const TABLE_HINTS: [(&str, &str); 8] = [
    ("↑/↓", "Move"),
    ("←/→", "Column"),
    ("s/S", "Sort"),
    ("/", "Search"),
    ("f", "Filters"),
    ("c", "Columns"),
    ("e", "Export"),
    ("Enter", "Details"),
];

pub fn render_table(app: &App, f: &mut Frame<'_>, area: Rect) {
    let state = app.current();
    let noun = state.view.label().to_lowercase();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(
            " {} ({} of {}) ",
            state.view.label(),
            if state.rows.is_empty() { 0 } else { state.selected + 1 },
            state.rows.len()
        ))
        .title_bottom(key_hints(&TABLE_HINTS));

    match state.query.status() {
        LoadStatus::Loading => {
            let inner = block.inner(area);
            f.render_widget(block, area);
            render_spinner(f, inner, &format!("Loading {noun}..."), &app.throbber_state);
            return;
        }
        LoadStatus::Failed(message) if state.rows.is_empty() => {
            let text = Text::from(vec![
                Line::from(Span::styled(
                    format!("Failed to load {noun}"),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                Line::from(message),
                Line::from(""),
                Line::from(Span::styled(
                    "press r to retry",
                    Style::default().fg(Color::Yellow),
                )),
            ]);
            let paragraph = Paragraph::new(text)
                .block(block.border_style(Style::default().fg(Color::Red)))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            f.render_widget(paragraph, area);
            return;
        }
        LoadStatus::Empty => {
            let mut lines = vec![Line::from(format!("No {noun} match the current filters."))];
            if state.filters.active_count() > 0 {
                lines.push(Line::from(Span::styled(
                    "x clears all filters",
                    Style::default().fg(Color::Gray),
                )));
            }
            let paragraph = Paragraph::new(Text::from(lines))
                .block(block.border_style(Style::default().fg(Color::Yellow)))
                .alignment(Alignment::Center);
            f.render_widget(paragraph, area);
            return;
        }
        LoadStatus::Failed(_) | LoadStatus::Ready => {}
    }

    let registry = state.columns.registry();
    let columns: Vec<&ColumnDescriptor> = state
        .visible_ids()
        .iter()
        .filter_map(|id| registry.get(id))
        .collect();

    let header = Row::new(columns.iter().enumerate().map(|(index, column)| {
        let style = if index == state.focused_column {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        };
        Cell::from(header_label(column, &state.sort)).style(style)
    }));

    // Borders plus the header row.
    let body_height = usize::from(area.height.saturating_sub(3));
    let total = state.rows.len();
    let window = virtual_window(total, 1, body_height, state.scroll, DEFAULT_OVERSCAN);
    let first_visible = state.scroll.min(total.saturating_sub(body_height));

    let rows = state.rows[window.range.clone()].iter().map(|record| {
        Row::new(
            columns
                .iter()
                .map(|column| Cell::from(column.display(record, state.view)).style(cell_style(column, record))),
        )
    });

    let widths: Vec<Constraint> = columns
        .iter()
        .map(|column| Constraint::Length(column.width))
        .collect();

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .column_spacing(1)
        .row_highlight_style(
            Style::default()
                .bg(Color::Rgb(0, 0, 238))
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

    let mut table_state = TableState::default()
        .with_offset(first_visible.saturating_sub(window.range.start))
        .with_selected(
            state
                .selected
                .checked_sub(window.range.start)
                .filter(|index| *index < window.range.len()),
        );
    f.render_stateful_widget(table, area, &mut table_state);

    if state.query.is_fetching_next_page() && area.width > 30 {
        let spinner_area = Rect::new(area.right().saturating_sub(22), area.y, 20, 1);
        render_spinner(f, spinner_area, "loading more", &app.throbber_state);
    }
}

/// Column label with its sort arrow, numbered when more than one key is active.
pub fn header_label(column: &ColumnDescriptor, sort: &SortModel) -> String {
    let Some(position) = sort.position(column.id) else {
        return column.label.to_string();
    };
    let arrow = sort
        .direction_of(column.id)
        .map_or("", SortDirection::arrow);
    if sort.entries().len() > 1 {
        format!("{} {arrow}{}", column.label, position + 1)
    } else {
        format!("{} {arrow}", column.label)
    }
}

fn cell_style(column: &ColumnDescriptor, record: &Record) -> Style {
    match column.id {
        "signal" => match record.signal() {
            Some(dbm) if dbm >= -60 => Style::default().fg(Color::Green),
            Some(dbm) if dbm >= -75 => Style::default().fg(Color::Yellow),
            Some(_) => Style::default().fg(Color::Red),
            None => Style::default().fg(Color::DarkGray),
        },
        "security" => Style::default().fg(security_color(record.security())),
        _ => Style::default(),
    }
}

pub const fn security_color(class: SecurityClass) -> Color {
    match class {
        SecurityClass::Open => Color::Red,
        SecurityClass::Wep => Color::LightRed,
        SecurityClass::Wpa => Color::Yellow,
        SecurityClass::Wpa2Personal | SecurityClass::Owe => Color::Cyan,
        SecurityClass::Wpa2Enterprise
        | SecurityClass::Wpa3Personal
        | SecurityClass::Wpa3Enterprise => Color::Green,
        SecurityClass::Unknown => Color::DarkGray,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ColumnRegistry;

    #[test]
    fn header_shows_priority_only_for_multi_sort() {
        let registry = ColumnRegistry::standard();
        let (Some(signal), Some(ssid)) = (registry.get("signal"), registry.get("ssid")) else {
            panic!("standard columns missing");
        };

        let mut sort = SortModel::default();
        sort.apply_sort("signal", false);
        assert_eq!(header_label(signal, &sort), "Signal ▲");
        assert_eq!(header_label(ssid, &sort), "SSID");

        sort.apply_sort("ssid", true);
        assert_eq!(header_label(signal, &sort), "Signal ▲1");
        assert_eq!(header_label(ssid, &sort), "SSID ▲2");
    }
}
