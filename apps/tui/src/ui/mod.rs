// Rendering for every screen. Nothing here mutates the app.

pub mod screens;
pub mod widgets;

use crate::app::{App, AppScreen};
use crate::domain::ViewMode;
use crate::table::LoadStatus;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

/// Title bar, status bar, table borders and the header row.
pub const CHROME_ROWS: u16 = 5;

/// Rows of table body that fit in a terminal `height` rows tall.
pub fn table_body_rows(height: u16) -> usize {
    usize::from(height.saturating_sub(CHROME_ROWS).max(1))
}

pub fn ui(app: &App, f: &mut Frame<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_title_bar(app, f, chunks[0]);

    match app.screen {
        AppScreen::Table => screens::table::render_table(app, f, chunks[1]),
        AppScreen::Filters => screens::filters::render_filters(app, f, chunks[1]),
        AppScreen::Columns => screens::columns::render_columns(app, f, chunks[1]),
        AppScreen::Details => screens::details::render_details(app, f, chunks[1]),
    }

    render_status_bar(app, f, chunks[2]);

    if app.show_help {
        screens::help::render_help_popup(f, f.area());
    }
}

fn render_title_bar(app: &App, f: &mut Frame<'_>, area: Rect) {
    let mut spans = vec![Span::styled(
        " ShadowCheck ",
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];

    for view in ViewMode::ALL {
        let style = if view == app.view {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(view.label(), style));
    }

    let state = app.current();
    let active = state.filters.active_count();
    if active > 0 {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!(" {active} filter{} ", if active == 1 { "" } else { "s" }),
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ));
    }

    if let Some(total) = state.query.total() {
        spans.push(Span::styled(
            format!("  {} of {total} loaded", state.rows.len()),
            Style::default().fg(Color::Gray),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_status_bar(app: &App, f: &mut Frame<'_>, area: Rect) {
    let line = if app.search_active {
        Line::from(vec![
            Span::styled(
                "Search: ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("{}_", app.search_input)),
            Span::styled("   Enter apply, Esc cancel", Style::default().fg(Color::Gray)),
        ])
    } else if !app.status_message.is_empty() {
        Line::from(Span::styled(
            app.status_message.clone(),
            Style::default().fg(Color::Cyan),
        ))
    } else if let (LoadStatus::Failed(message), false) =
        (app.current().query.status(), app.current().rows.is_empty())
    {
        Line::from(Span::styled(
            format!("Next page failed: {message} (press r to retry)"),
            Style::default().fg(Color::Red),
        ))
    } else {
        Line::from(Span::styled(
            "? help  q quit",
            Style::default().fg(Color::DarkGray),
        ))
    };

    f.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::app::AppActions;
    use crate::table::columns::tests::sample_access_point;
    use crate::table::{Page, PageMetadata};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::time::Duration;

    fn app() -> App {
        let api = match ApiClient::new("http://127.0.0.1:9", Duration::from_secs(1)) {
            Ok(api) => api,
            Err(e) => panic!("client: {e}"),
        };
        App::new(
            AppActions::with_client(api, std::env::temp_dir(), 20),
            ViewMode::AccessPoints,
        )
    }

    fn draw(app: &App) -> String {
        let mut terminal = match Terminal::new(TestBackend::new(140, 30)) {
            Ok(terminal) => terminal,
            Err(e) => panic!("terminal: {e}"),
        };
        if let Err(e) = terminal.draw(|f| ui(app, f)) {
            panic!("draw: {e}");
        }
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(usize::from(buffer.area.width))
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn load(app: &mut App, rows: Vec<crate::domain::Record>, total: u64) {
        let state = app.current_mut();
        let Some(request) = state.query.fetch_next_page() else {
            panic!("query not idle");
        };
        let returned = rows.len() as u64;
        let page = Page {
            data: rows,
            metadata: PageMetadata {
                total,
                limit: 20,
                offset: 0,
                returned,
            },
        };
        state.query.resolve(&request, Ok::<_, String>(page));
        state.rebuild_rows();
    }

    #[test]
    fn body_rows_subtract_chrome() {
        assert_eq!(table_body_rows(30), 25);
        assert_eq!(table_body_rows(2), 1);
    }

    #[test]
    fn loading_then_rows_render() {
        let mut app = app();
        assert!(draw(&app).contains("Loading"));

        load(
            &mut app,
            vec![
                sample_access_point("aa:bb:cc:dd:ee:01", Some("CoffeeShop"), Some(-48)),
                sample_access_point("aa:bb:cc:dd:ee:02", None, Some(-71)),
            ],
            2,
        );
        let screen = draw(&app);
        assert!(screen.contains("CoffeeShop"));
        assert!(screen.contains("(hidden)"));
        assert!(screen.contains("2 of 2 loaded"));
    }

    #[test]
    fn empty_and_error_states_are_distinct() {
        let mut app = app();
        load(&mut app, Vec::new(), 0);
        assert!(draw(&app).contains("No access points"));

        app.refresh();
        let state = app.current_mut();
        let Some(request) = state.query.fetch_next_page() else {
            panic!("query not idle");
        };
        state
            .query
            .resolve(&request, Err::<Page<crate::domain::Record>, _>("HTTP 502"));
        app.status_message.clear();
        let screen = draw(&app);
        assert!(screen.contains("HTTP 502"));
        assert!(screen.contains("press r to retry"));
    }

    #[test]
    fn help_overlay_draws_on_top() {
        let mut app = app();
        app.show_help = true;
        assert!(draw(&app).contains("Keyboard Shortcuts"));
    }
}
