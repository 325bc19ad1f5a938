use crate::app::state::{App, TimelineState};
use crossterm::event::KeyCode;

pub fn handle_details_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Esc | KeyCode::Backspace => app.close_details(),
        KeyCode::Char('q') => {
            app.running = false;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            if let Some(detail) = app.detail.as_mut() {
                detail.scroll = detail.scroll.saturating_sub(1);
            }
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if let Some(detail) = app.detail.as_mut() {
                let last = match &detail.timeline {
                    TimelineState::Loaded(observations) => observations.len().saturating_sub(1),
                    TimelineState::Loading | TimelineState::Failed(_) => 0,
                };
                detail.scroll = (detail.scroll + 1).min(last);
            }
        }
        _ => {}
    }
}
