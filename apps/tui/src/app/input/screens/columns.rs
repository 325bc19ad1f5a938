use crate::app::state::{App, AppScreen};
use crossterm::event::KeyCode;

pub async fn handle_columns_input(app: &mut App, key: KeyCode) {
    if app.column_picker.typing {
        handle_query_input(app, key);
        return;
    }

    let (selected, match_count) = {
        let columns = &app.current().columns;
        let picker = &app.column_picker;
        (
            picker
                .selected_id(columns.registry(), columns.order())
                .map(str::to_string),
            picker.matches(columns.registry(), columns.order()).len(),
        )
    };

    match key {
        KeyCode::Esc | KeyCode::Char('c') => {
            app.screen = AppScreen::Table;
            app.current_mut().clamp_cursor();
        }
        KeyCode::Char('q') => {
            app.running = false;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.column_picker.selected = app.column_picker.selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.column_picker.selected += 1;
            app.column_picker.clamp(match_count);
        }
        KeyCode::Char(' ') | KeyCode::Enter => {
            let Some(id) = selected else {
                return;
            };
            if !app.current_mut().columns.toggle_column(&id).await {
                app.status_message = format!("Column '{id}' is always visible");
            }
        }
        KeyCode::Char('a') => app.current_mut().columns.show_all_columns().await,
        KeyCode::Char('n') => app.current_mut().columns.hide_all_columns().await,
        KeyCode::Char('d') => {
            app.current_mut().columns.reset_to_defaults().await;
            app.status_message = "Columns reset to defaults".to_string();
        }
        KeyCode::Char('<' | '>') => {
            let Some(id) = selected else {
                return;
            };
            let delta = if key == KeyCode::Char('<') { -1 } else { 1 };
            app.current_mut().columns.move_by(&id, delta).await;
            let position = {
                let columns = &app.current().columns;
                app.column_picker
                    .matches(columns.registry(), columns.order())
                    .iter()
                    .position(|candidate| *candidate == id)
            };
            if let Some(position) = position {
                app.column_picker.selected = position;
            }
        }
        KeyCode::Char('/') => {
            app.column_picker.typing = true;
        }
        _ => {}
    }
}

fn handle_query_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Esc => {
            app.column_picker.query.clear();
            app.column_picker.typing = false;
        }
        KeyCode::Enter => {
            app.column_picker.typing = false;
        }
        KeyCode::Backspace => {
            app.column_picker.query.pop();
        }
        KeyCode::Char(c) => app.column_picker.query.push(c),
        _ => {}
    }
    app.column_picker.selected = 0;
}
