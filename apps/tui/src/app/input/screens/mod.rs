use crate::app::state::{App, AppScreen};
use crossterm::event::KeyCode;

mod columns;
mod details;
mod filters;
mod help;
mod table;

pub async fn dispatch_input(app: &mut App, key: KeyCode) {
    if help::handle_help_toggle(app, key) {
        return;
    }

    match app.screen {
        AppScreen::Table => table::handle_table_input(app, key).await,
        AppScreen::Filters => filters::handle_filters_input(app, key).await,
        AppScreen::Columns => columns::handle_columns_input(app, key).await,
        AppScreen::Details => details::handle_details_input(app, key),
    }
}
