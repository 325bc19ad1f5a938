use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::Frame;
use throbber_widgets_tui::symbols::throbber::BRAILLE_ONE;
use throbber_widgets_tui::{Throbber, ThrobberState};

/// Draws a labelled spinner on the first line of `area`. The app advances the shared state.
pub fn render_spinner(f: &mut Frame<'_>, area: Rect, label: &str, state: &ThrobberState) {
    if area.width < 4 || area.height == 0 {
        return;
    }
    let rect = Rect::new(area.x, area.y, area.width, 1);
    let throbber = Throbber::default()
        .label(label.to_string())
        .throbber_set(BRAILLE_ONE)
        .style(Style::default().fg(Color::Gray))
        .throbber_style(Style::default().fg(Color::Yellow));
    let mut state = state.clone();
    f.render_stateful_widget(throbber, rect, &mut state);
}
