use crate::ui::widgets::popup::{centered_rect, popup_frame};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

const SECTIONS: [(&str, &[(&str, &str)]); 4] = [
    (
        "Table",
        &[
            ("↑/↓ PgUp/PgDn", "Move the selection"),
            ("Home/End", "First or last loaded row"),
            ("←/→", "Focus a column"),
            ("s", "Sort by the focused column (asc, desc, off)"),
            ("S", "Add the focused column as a secondary sort key"),
            ("< >", "Move the focused column"),
            ("/", "Search SSID, BSSID and manufacturer"),
            ("Enter", "Details and observation timeline"),
            ("v / Tab", "Switch between access points and observations"),
            ("e", "Export loaded rows to CSV"),
            ("r", "Reload from the first page"),
            ("x", "Clear all filters"),
        ],
    ),
    (
        "Filters (f)",
        &[
            ("↑/↓", "Choose a filter"),
            ("Enter", "Edit a text filter or toggle an option"),
            ("←/→ Space", "Move between and toggle options"),
            ("x / X", "Clear this filter / all filters"),
        ],
    ),
    (
        "Columns (c)",
        &[
            ("Space", "Show or hide a column"),
            ("/", "Fuzzy find a column"),
            ("a / n / d", "Show all, hide all, restore defaults"),
        ],
    ),
    (
        "Anywhere",
        &[("? / F1", "Toggle this help"), ("Esc", "Back"), ("q", "Quit")],
    ),
];

pub fn render_help_popup(f: &mut Frame<'_>, area: Rect) {
    let popup_area = centered_rect(70, 80, area);
    let inner = popup_frame(f, popup_area, "Help & Keyboard Shortcuts");

    let key_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let mut lines = Vec::new();
    for (title, bindings) in SECTIONS {
        lines.push(Line::from(Span::styled(
            title,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));
        for (key, action) in bindings {
            lines.push(Line::from(vec![
                Span::styled(format!("  {key:<16}"), key_style),
                Span::raw(*action),
            ]));
        }
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        "Command line",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )));
    lines.extend(
        crate::cli::CliArgs::help_text()
            .lines()
            .skip_while(|line| !line.starts_with("Options"))
            .skip(1)
            .map(|line| Line::from(line.to_string())),
    );
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press ? or Esc to close",
        Style::default().fg(Color::Gray),
    )));

    f.render_widget(
        Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false }),
        inner,
    );
}
