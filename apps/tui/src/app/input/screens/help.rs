use crate::app::state::App;
use crossterm::event::KeyCode;

/// `?` or F1 opens the help overlay. While it is open every key is swallowed.
pub fn handle_help_toggle(app: &mut App, key: KeyCode) -> bool {
    if app.show_help {
        if matches!(key, KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?')) {
            app.show_help = false;
        }
        return true;
    }

    if matches!(key, KeyCode::F(1) | KeyCode::Char('?')) {
        // Typed text may contain a question mark.
        if app.search_active || app.filter_panel.editing || app.column_picker.typing {
            return false;
        }
        app.show_help = true;
        return true;
    }

    false
}
