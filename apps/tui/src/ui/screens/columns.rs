use crate::app::App;
use crate::ui::widgets::hints::key_hints;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

pub fn render_columns(app: &App, f: &mut Frame<'_>, area: Rect) {
    let columns = &app.current().columns;
    let picker = &app.column_picker;
    let registry = columns.registry();
    let visibility = columns.visibility();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let query_style = if picker.typing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    };
    let cursor = if picker.typing { "_" } else { "" };
    let query = Paragraph::new(Line::from(vec![
        Span::styled("Find: ", query_style.add_modifier(Modifier::BOLD)),
        Span::raw(format!("{}{cursor}", picker.query)),
    ]))
    .block(Block::default().borders(Borders::ALL).border_style(query_style));
    f.render_widget(query, chunks[0]);

    let items: Vec<ListItem<'_>> = picker
        .matches(registry, columns.order())
        .into_iter()
        .filter_map(|id| registry.get(id))
        .map(|column| {
            let marker = if visibility.is_visible(column.id) { "[x]" } else { "[ ]" };
            let lock = if column.always_visible { " (always)" } else { "" };
            ListItem::new(Line::from(vec![
                Span::raw(format!("{marker} {:<16}", column.label)),
                Span::styled(
                    format!("{:<14}", column.group.label()),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(
                    format!("{}{lock}", column.id),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(format!(
                    " Columns: {} ({} of {} visible) ",
                    app.view.label(),
                    visibility.visible_count(),
                    registry.len()
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title_bottom(key_hints(&[
                    ("Space", "Toggle"),
                    ("</>", "Move"),
                    ("/", "Find"),
                    ("a", "All"),
                    ("n", "None"),
                    ("d", "Defaults"),
                    ("Esc", "Back"),
                ])),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Rgb(0, 0, 238))
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut list_state = ListState::default().with_selected(Some(picker.selected));
    f.render_stateful_widget(list, chunks[1], &mut list_state);
}
