use crate::app::column_picker::ColumnPicker;
use crate::app::state::{App, AppScreen};
use crossterm::event::KeyCode;

pub async fn handle_table_input(app: &mut App, key: KeyCode) {
    if app.search_active {
        handle_search_input(app, key).await;
        return;
    }

    let page = isize::try_from(app.viewport_rows.max(1)).unwrap_or(isize::MAX);

    match key {
        KeyCode::Char('q') => {
            app.running = false;
        }
        KeyCode::Esc => {
            app.status_message.clear();
        }
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),
        KeyCode::PageUp => app.move_selection(-page),
        KeyCode::PageDown => app.move_selection(page),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        KeyCode::Left | KeyCode::Char('h') => app.focus_column(-1),
        KeyCode::Right | KeyCode::Char('l') => app.focus_column(1),
        KeyCode::Char('s') => app.sort_focused(false),
        KeyCode::Char('S') => app.sort_focused(true),
        KeyCode::Char('<') => app.move_focused_column(-1).await,
        KeyCode::Char('>') => app.move_focused_column(1).await,
        KeyCode::Char('/') => {
            app.search_input = app.current().filters.search.clone().unwrap_or_default();
            app.search_active = true;
        }
        KeyCode::Char('f') => {
            app.filter_panel.reset_cursor();
            app.screen = AppScreen::Filters;
        }
        KeyCode::Char('c') => {
            app.column_picker = ColumnPicker::default();
            app.screen = AppScreen::Columns;
        }
        KeyCode::Char('x') => {
            app.current_mut().filters.clear_all();
            app.on_filters_changed().await;
            app.status_message = "Filters cleared".to_string();
        }
        KeyCode::Char('e') => app.export_csv(),
        KeyCode::Char('r') => app.refresh(),
        KeyCode::Char('v') | KeyCode::Tab => app.toggle_view(),
        KeyCode::Enter => app.open_details(),
        _ => {}
    }
}

async fn handle_search_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Esc => {
            app.search_active = false;
            app.search_input.clear();
        }
        KeyCode::Enter => app.apply_search().await,
        KeyCode::Backspace => {
            app.search_input.pop();
        }
        KeyCode::Char(c) => app.search_input.push(c),
        _ => {}
    }
}
