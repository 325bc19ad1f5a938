use crate::app::filter_panel::{current_text, input_hint, is_text_field, options_for};
use crate::app::App;
use crate::table::FilterField;
use crate::ui::widgets::hints::key_hints;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

pub fn render_filters(app: &App, f: &mut Frame<'_>, area: Rect) {
    let filters = &app.current().filters;
    let panel = &app.filter_panel;

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let items: Vec<ListItem<'_>> = FilterField::ALL
        .iter()
        .map(|field| {
            let value = current_text(filters, *field);
            let value_style = if value.is_empty() {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::Cyan)
            };
            ListItem::new(Line::from(vec![
                Span::raw(format!("{:<18}", field.label())),
                Span::styled(
                    if value.is_empty() { "(any)".to_string() } else { value },
                    value_style,
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(format!(
                    " Filters: {} ({} active) ",
                    app.view.label(),
                    filters.active_count()
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title_bottom(key_hints(&[
                    ("↑/↓", "Field"),
                    ("Enter", "Edit"),
                    ("x", "Clear"),
                    ("X", "Clear all"),
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

    let mut list_state = ListState::default().with_selected(Some(panel.selected));
    f.render_stateful_widget(list, chunks[0], &mut list_state);

    render_field_editor(app, f, chunks[1]);
}

fn render_field_editor(app: &App, f: &mut Frame<'_>, area: Rect) {
    let panel = &app.filter_panel;
    let field = panel.field();
    let mut lines = vec![
        Line::from(Span::styled(
            field.label(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(input_hint(field), Style::default().fg(Color::Gray))),
        Line::from(""),
    ];

    if is_text_field(field) {
        if panel.editing {
            lines.push(Line::from(vec![
                Span::styled("> ", Style::default().fg(Color::Yellow)),
                Span::raw(format!("{}_", panel.input)),
            ]));
            lines.push(Line::from(""));
            lines.push(key_hints(&[("Enter", "Apply"), ("Esc", "Cancel")]));
        } else {
            lines.push(Line::from("Press Enter to edit. Empty input clears the filter."));
        }
    } else {
        let filters = &app.current().filters;
        for (index, option) in options_for(field).into_iter().enumerate() {
            let marker = if option.is_active(filters) { "[x]" } else { "[ ]" };
            let style = if index == panel.option {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            lines.push(Line::from(Span::styled(
                format!("{marker} {}", option.label()),
                style,
            )));
        }
        lines.push(Line::from(""));
        lines.push(key_hints(&[("←/→", "Option"), ("Space", "Toggle")]));
    }

    let paragraph = Paragraph::new(lines)
        .block(Block::default().title(" Value ").borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}
