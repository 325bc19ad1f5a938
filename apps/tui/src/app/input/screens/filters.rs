use crate::app::filter_panel::{apply_text, current_text, is_text_field, options_for};
use crate::app::input::helpers::wrap_step;
use crate::app::state::{App, AppScreen};
use crate::table::FilterField;
use crossterm::event::KeyCode;

pub async fn handle_filters_input(app: &mut App, key: KeyCode) {
    if app.filter_panel.editing {
        handle_edit_input(app, key).await;
        return;
    }

    let field = app.filter_panel.field();
    let options = options_for(field);

    match key {
        KeyCode::Esc | KeyCode::Char('f') => {
            app.filter_panel.reset_cursor();
            app.screen = AppScreen::Table;
        }
        KeyCode::Char('q') => {
            app.running = false;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.filter_panel.selected = wrap_step(app.filter_panel.selected, FilterField::ALL.len(), -1);
            app.filter_panel.reset_cursor();
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.filter_panel.selected = wrap_step(app.filter_panel.selected, FilterField::ALL.len(), 1);
            app.filter_panel.reset_cursor();
        }
        KeyCode::Left | KeyCode::Char('h') => {
            app.filter_panel.option = wrap_step(app.filter_panel.option, options.len(), -1);
        }
        KeyCode::Right | KeyCode::Char('l') => {
            app.filter_panel.option = wrap_step(app.filter_panel.option, options.len(), 1);
        }
        KeyCode::Char(' ') => {
            if let Some(option) = options.get(app.filter_panel.option).copied() {
                option.toggle(&mut app.current_mut().filters);
                app.on_filters_changed().await;
            }
        }
        KeyCode::Enter => {
            if is_text_field(field) {
                app.filter_panel.input = current_text(&app.current().filters, field);
                app.filter_panel.editing = true;
            } else if let Some(option) = options.get(app.filter_panel.option).copied() {
                option.toggle(&mut app.current_mut().filters);
                app.on_filters_changed().await;
            }
        }
        KeyCode::Char('x') => {
            app.current_mut().filters.clear_field(field);
            app.on_filters_changed().await;
        }
        KeyCode::Char('X') => {
            app.current_mut().filters.clear_all();
            app.on_filters_changed().await;
            app.status_message = "Filters cleared".to_string();
        }
        _ => {}
    }
}

async fn handle_edit_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Esc => {
            app.filter_panel.editing = false;
            app.filter_panel.input.clear();
        }
        KeyCode::Enter => {
            let field = app.filter_panel.field();
            let input = app.filter_panel.input.clone();
            match apply_text(&mut app.current_mut().filters, field, &input) {
                Ok(()) => {
                    app.filter_panel.editing = false;
                    app.filter_panel.input.clear();
                    app.status_message.clear();
                    app.on_filters_changed().await;
                }
                Err(err) => {
                    app.status_message = format!("Invalid {}: {err}", field.label());
                }
            }
        }
        KeyCode::Backspace => {
            app.filter_panel.input.pop();
        }
        KeyCode::Char(c) => app.filter_panel.input.push(c),
        _ => {}
    }
}
