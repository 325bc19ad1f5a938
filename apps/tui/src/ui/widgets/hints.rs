use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// `key: action` pairs rendered as one line, keys highlighted.
pub fn key_hints(pairs: &[(&'static str, &'static str)]) -> Line<'static> {
    let key_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let mut spans = Vec::with_capacity(pairs.len() * 2);
    for (index, (key, action)) in pairs.iter().enumerate() {
        spans.push(Span::styled(*key, key_style));
        let separator = if index + 1 == pairs.len() { "" } else { "   " };
        spans.push(Span::raw(format!(": {action}{separator}")));
    }
    Line::from(spans)
}
