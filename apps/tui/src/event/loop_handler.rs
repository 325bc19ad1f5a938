use color_eyre::eyre::eyre;
use color_eyre::Result;
use crossterm::event::{self, Event, KeyEventKind};
use serde::Serialize;
use std::fs::File;
use std::path::PathBuf;

use crate::api::ApiError;
use crate::app::{handle_input, App, AppActions};
use crate::domain::{Record, ViewMode};
use crate::table::{
    query_key, sort_records, write_csv, ColumnPreferenceStore, ColumnRegistry, FilterState,
    PagedQuery, SortModel,
};
use crate::terminal::Tui;
use crate::ui;

/// What a non-interactive run fetches and how it prints it.
#[derive(Debug, Clone)]
pub struct HeadlessRequest {
    pub view: ViewMode,
    pub filters: FilterState,
    pub sort: SortModel,
    pub limit: usize,
    pub json: bool,
    pub csv: Option<PathBuf>,
}

/// Run the application in headless mode (no UI)
pub async fn run_headless(actions: &AppActions, request: HeadlessRequest) -> Result<()> {
    actions
        .check_backend()
        .await
        .map_err(|e| eyre!("backend at {} is unreachable: {e}", actions.api.base_url()))?;

    let registry = ColumnRegistry::standard();
    let mut sort = request.sort.clone();
    sort.retain_known(&registry);

    let rows = collect_rows(actions, request.view, &request.filters, &sort, request.limit).await?;
    let columns =
        ColumnPreferenceStore::load(request.view, registry.clone(), actions.db_pool.clone()).await;
    let ids = columns.visible_ids();

    if let Some(path) = &request.csv {
        let file = File::create(path)
            .map_err(|e| eyre!("failed to create {}: {e}", path.display()))?;
        let written = write_csv(file, &rows, &ids, &registry, request.view)?;
        tracing::info!(rows = written, path = %path.display(), "headless export written");
        println!("Wrote {written} rows to {}", path.display());
    } else if request.json {
        let output = HeadlessOutput {
            view: request.view.as_str(),
            filters: request.filters.to_query_params().into_iter().collect(),
            returned: rows.len(),
            rows: &rows,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render_text_table(&rows, &ids, &registry, request.view));
        println!("\n{} {} shown", rows.len(), request.view.label());
    }

    Ok(())
}

/// Walks pages in order until `limit` rows are loaded or the server runs out.
pub async fn collect_rows(
    actions: &AppActions,
    view: ViewMode,
    filters: &FilterState,
    sort: &SortModel,
    limit: usize,
) -> Result<Vec<Record>> {
    let page_size = actions.page_size.min(limit as u64).max(1);
    let mut query: PagedQuery<Record> = PagedQuery::new(query_key(view, filters, sort), page_size);

    while query.loaded_len() < limit {
        let Some(page_request) = query.fetch_next_page() else {
            break;
        };
        let page = actions
            .api
            .fetch_page(
                view,
                &page_request.key.params,
                page_request.offset,
                page_request.limit,
            )
            .await
            .map_err(|e| eyre!("fetching {} failed: {e}", view.label()))?;
        query.resolve(&page_request, Ok::<_, ApiError>(page));
        if !query.has_next_page() {
            break;
        }
    }

    let mut rows = query.flatten();
    rows.truncate(limit);
    sort_records(&mut rows, sort, &ColumnRegistry::standard(), view);
    Ok(rows)
}

/// Fixed-width text rendering of rows, one line per record.
pub fn render_text_table(
    rows: &[Record],
    column_ids: &[&str],
    registry: &ColumnRegistry,
    view: ViewMode,
) -> String {
    let columns: Vec<_> = column_ids.iter().filter_map(|id| registry.get(id)).collect();
    let mut out = String::new();

    let header: Vec<String> = columns
        .iter()
        .map(|column| fit(column.label, usize::from(column.width)))
        .collect();
    out.push_str(header.join(" ").trim_end());
    out.push('\n');

    for record in rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|column| fit(&column.display(record, view), usize::from(column.width)))
            .collect();
        out.push_str(cells.join(" ").trim_end());
        out.push('\n');
    }

    out
}

fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count > width {
        let truncated: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{truncated}…")
    } else {
        format!("{text:<width$}")
    }
}

#[derive(Serialize)]
struct HeadlessOutput<'a> {
    view: &'static str,
    filters: Vec<(String, String)>,
    returned: usize,
    rows: &'a [Record],
}

/// Run the main application event loop
pub async fn run(terminal: &mut Tui, app: &mut App) -> Result<()> {
    // Configure event poll timeout (ms)
    const EVENT_POLL_TIMEOUT: u64 = 50;

    loop {
        if let Ok(size) = terminal.size() {
            app.viewport_rows = ui::table_body_rows(size.height);
        }

        app.update();

        if let Err(e) = terminal.draw(|f| ui::ui(app, f)) {
            return Err(eyre!("Terminal draw error: {e}"));
        }

        if matches!(
            event::poll(std::time::Duration::from_millis(EVENT_POLL_TIMEOUT)),
            Ok(true)
        ) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                    handle_input(app, key.code).await;
                    if !app.running {
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read terminal event");
                }
            }
        }
    }

    tracing::info!("event loop finished");
    Ok(())
}
