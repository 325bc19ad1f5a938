use std::time::{Duration, Instant};

use throbber_widgets_tui::ThrobberState;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::api::ApiError;
use crate::app::actions::AppActions;
use crate::app::column_picker::ColumnPicker;
use crate::app::filter_panel::FilterPanel;
use crate::domain::{Observation, Record, ViewMode};
use crate::table::prefs::{load_filters, save_filters};
use crate::table::viewport::FETCH_THRESHOLD;
use crate::table::{
    follow_selection, query_key, should_fetch_more, sort_records, ColumnPreferenceStore,
    ColumnRegistry, FetchState, FilterState, Page, PageRequest, PagedQuery, SortModel,
};

const THROBBER_TICK: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppScreen {
    Table,
    Filters,
    Columns,
    Details,
}

/// Results of background requests, delivered back to the event loop.
#[derive(Debug)]
pub enum FetchOutcome {
    Page {
        view: ViewMode,
        request: PageRequest,
        result: Result<Page<Record>, ApiError>,
    },
    Timeline {
        bssid: String,
        result: Result<Vec<Observation>, ApiError>,
    },
}

/// Everything one view mode owns. The two views never share any of it.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub view: ViewMode,
    pub filters: FilterState,
    pub sort: SortModel,
    pub columns: ColumnPreferenceStore,
    pub query: PagedQuery<Record>,
    /// Loaded pages, flattened and sorted.
    pub rows: Vec<Record>,
    pub selected: usize,
    pub scroll: usize,
    pub focused_column: usize,
}

impl ViewState {
    pub fn new(view: ViewMode, registry: ColumnRegistry, page_size: u64) -> Self {
        let filters = FilterState::default();
        let sort = SortModel::default();
        let key = query_key(view, &filters, &sort);
        Self {
            view,
            filters,
            sort,
            columns: ColumnPreferenceStore::new(view, registry),
            query: PagedQuery::new(key, page_size),
            rows: Vec::new(),
            selected: 0,
            scroll: 0,
            focused_column: 0,
        }
    }

    pub fn visible_ids(&self) -> Vec<&str> {
        self.columns.visible_ids()
    }

    pub fn focused_column_id(&self) -> Option<&str> {
        self.visible_ids().get(self.focused_column).copied()
    }

    pub fn selected_record(&self) -> Option<&Record> {
        self.rows.get(self.selected)
    }

    pub fn rebuild_rows(&mut self) {
        let mut rows = self.query.flatten();
        sort_records(&mut rows, &self.sort, self.columns.registry(), self.view);
        self.rows = rows;
        self.clamp_cursor();
    }

    pub fn clamp_cursor(&mut self) {
        self.selected = self.selected.min(self.rows.len().saturating_sub(1));
        let visible = self.visible_ids().len();
        self.focused_column = self.focused_column.min(visible.saturating_sub(1));
    }

    /// Recomputes the cache key. A changed key drops every loaded row.
    pub fn sync_query_key(&mut self) -> bool {
        let key = query_key(self.view, &self.filters, &self.sort);
        if !self.query.set_key(key) {
            return false;
        }
        self.rows.clear();
        self.selected = 0;
        self.scroll = 0;
        true
    }

    pub fn refresh(&mut self) {
        self.query.refresh();
        self.rows.clear();
        self.selected = 0;
        self.scroll = 0;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TimelineState {
    Loading,
    Loaded(Vec<Observation>),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct DetailState {
    pub record: Record,
    pub timeline: TimelineState,
    pub scroll: usize,
}

#[derive(Debug)]
pub struct App {
    pub running: bool,
    pub screen: AppScreen,
    pub show_help: bool,
    pub view: ViewMode,
    pub access_points: ViewState,
    pub observations: ViewState,
    pub registry: ColumnRegistry,
    pub status_message: String,
    pub search_active: bool,
    pub search_input: String,
    pub filter_panel: FilterPanel,
    pub column_picker: ColumnPicker,
    pub detail: Option<DetailState>,
    pub throbber_state: ThrobberState,
    pub last_frame: Instant,
    /// Table body height in rows, refreshed by the event loop every frame.
    pub viewport_rows: usize,
    pub actions: AppActions,
    outcome_tx: UnboundedSender<FetchOutcome>,
    outcome_rx: UnboundedReceiver<FetchOutcome>,
}

impl App {
    pub fn new(actions: AppActions, view: ViewMode) -> Self {
        let registry = ColumnRegistry::standard();
        let page_size = actions.page_size;
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        Self {
            running: true,
            screen: AppScreen::Table,
            show_help: false,
            view,
            access_points: ViewState::new(ViewMode::AccessPoints, registry.clone(), page_size),
            observations: ViewState::new(ViewMode::Observations, registry.clone(), page_size),
            registry,
            status_message: String::new(),
            search_active: false,
            search_input: String::new(),
            filter_panel: FilterPanel::default(),
            column_picker: ColumnPicker::default(),
            detail: None,
            throbber_state: ThrobberState::default(),
            last_frame: Instant::now(),
            viewport_rows: 20,
            actions,
            outcome_tx,
            outcome_rx,
        }
    }

    /// Restores persisted columns and filters for both views.
    pub async fn load_preferences(&mut self) {
        let pool = self.actions.db_pool.clone();
        for view in ViewMode::ALL {
            let columns = ColumnPreferenceStore::load(view, self.registry.clone(), pool.clone()).await;
            let filters = load_filters(pool.as_ref(), view).await;
            let state = self.view_state_mut(view);
            state.columns = columns;
            state.filters = filters;
            state.sync_query_key();
            state.clamp_cursor();
        }
    }

    /// Command-line filters and sort replace the starting view's restored state.
    pub async fn apply_startup_query(&mut self, filters: FilterState, mut sort: SortModel) {
        sort.retain_known(&self.registry);
        let view = self.view;
        let has_filters = filters.active_count() > 0;
        let state = self.current_mut();
        if has_filters {
            state.filters = filters;
        }
        if !sort.is_empty() {
            state.sort = sort;
        }
        state.sync_query_key();
        if has_filters {
            let filters = self.current().filters.clone();
            save_filters(self.actions.pool(), view, &filters).await;
        }
    }

    pub const fn view_state(&self, view: ViewMode) -> &ViewState {
        match view {
            ViewMode::AccessPoints => &self.access_points,
            ViewMode::Observations => &self.observations,
        }
    }

    pub fn view_state_mut(&mut self, view: ViewMode) -> &mut ViewState {
        match view {
            ViewMode::AccessPoints => &mut self.access_points,
            ViewMode::Observations => &mut self.observations,
        }
    }

    pub const fn current(&self) -> &ViewState {
        self.view_state(self.view)
    }

    pub fn current_mut(&mut self) -> &mut ViewState {
        self.view_state_mut(self.view)
    }

    /// Per-frame housekeeping: spinner, finished requests, next page.
    pub fn update(&mut self) {
        let now = Instant::now();
        if now.duration_since(self.last_frame) >= THROBBER_TICK {
            self.throbber_state.calc_next();
            self.last_frame = now;
        }
        self.drain_outcomes();
        self.maybe_fetch();
    }

    /// Requests the first page of an idle query, or the next page when the viewport nears the end.
    pub fn maybe_fetch(&mut self) {
        let view = self.view;
        let viewport_rows = self.viewport_rows;
        let state = self.current_mut();

        let loaded = state.rows.len();
        let first_page = state.query.pages().is_empty() && *state.query.state() == FetchState::Idle;
        let last_rendered = (state.scroll + viewport_rows).min(loaded).saturating_sub(1);
        let near_end = should_fetch_more(
            last_rendered,
            loaded,
            state.query.has_next_page(),
            state.query.is_fetching(),
            FETCH_THRESHOLD,
        );

        if !(first_page || near_end) {
            return;
        }
        if let Some(request) = state.query.fetch_next_page() {
            self.spawn_page_fetch(view, request);
        }
    }

    fn spawn_page_fetch(&self, view: ViewMode, request: PageRequest) {
        let api = self.actions.api.clone();
        let tx = self.outcome_tx.clone();
        tracing::debug!(view = view.as_str(), offset = request.offset, "requesting page");
        tokio::spawn(async move {
            let result = api
                .fetch_page(request.key.view, &request.key.params, request.offset, request.limit)
                .await;
            if tx.send(FetchOutcome::Page { view, request, result }).is_err() {
                tracing::debug!("page result dropped: app closed");
            }
        });
    }

    fn spawn_timeline_fetch(&self, bssid: String) {
        let api = self.actions.api.clone();
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let result = api.network_timeline(&bssid).await;
            if tx.send(FetchOutcome::Timeline { bssid, result }).is_err() {
                tracing::debug!("timeline result dropped: app closed");
            }
        });
    }

    pub fn drain_outcomes(&mut self) {
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.apply_outcome(outcome);
        }
    }

    pub async fn recv_outcome(&mut self) -> Option<FetchOutcome> {
        self.outcome_rx.recv().await
    }

    pub fn apply_outcome(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Page {
                view,
                request,
                result,
            } => {
                if let Err(err) = &result {
                    tracing::warn!(view = view.as_str(), %err, "page request failed");
                }
                let state = self.view_state_mut(view);
                if state.query.resolve(&request, result) {
                    state.rebuild_rows();
                }
            }
            FetchOutcome::Timeline { bssid, result } => {
                let Some(detail) = self.detail.as_mut() else {
                    return;
                };
                if detail.record.bssid() != bssid {
                    return;
                }
                detail.timeline = match result {
                    Ok(observations) => TimelineState::Loaded(observations),
                    Err(err) => TimelineState::Failed(err.to_string()),
                };
            }
        }
    }

    pub fn move_selection(&mut self, delta: isize) {
        let visible = self.viewport_rows;
        let state = self.current_mut();
        if state.rows.is_empty() {
            return;
        }
        let last = state.rows.len() - 1;
        state.selected = state.selected.saturating_add_signed(delta).min(last);
        state.scroll = follow_selection(state.scroll, state.selected, visible);
    }

    pub fn select_first(&mut self) {
        let state = self.current_mut();
        state.selected = 0;
        state.scroll = 0;
    }

    pub fn select_last(&mut self) {
        let visible = self.viewport_rows;
        let state = self.current_mut();
        state.selected = state.rows.len().saturating_sub(1);
        state.scroll = follow_selection(state.scroll, state.selected, visible);
    }

    pub fn focus_column(&mut self, delta: isize) {
        let state = self.current_mut();
        let count = state.visible_ids().len();
        if count == 0 {
            return;
        }
        state.focused_column = state
            .focused_column
            .saturating_add_signed(delta)
            .min(count - 1);
    }

    /// Sorts by the focused column. `multi` adds or cycles a secondary key.
    pub fn sort_focused(&mut self, multi: bool) {
        let state = self.current_mut();
        let Some(id) = state.focused_column_id().map(str::to_string) else {
            return;
        };
        let sortable = state
            .columns
            .registry()
            .get(&id)
            .is_some_and(|column| column.sortable);
        if !sortable {
            self.status_message = format!("Column '{id}' is not sortable");
            return;
        }
        state.sort.apply_sort(&id, multi);
        state.sync_query_key();
        self.status_message.clear();
    }

    pub async fn move_focused_column(&mut self, delta: isize) {
        let state = self.current_mut();
        let Some(id) = state.focused_column_id().map(str::to_string) else {
            return;
        };
        if state.columns.move_by(&id, delta).await {
            if let Some(index) = state.visible_ids().iter().position(|visible| *visible == id) {
                state.focused_column = index;
            }
        }
    }

    /// Persists the current view's filters and restarts its query if the key changed.
    pub async fn on_filters_changed(&mut self) {
        let view = self.view;
        let filters = self.current().filters.clone();
        save_filters(self.actions.pool(), view, &filters).await;
        self.current_mut().sync_query_key();
    }

    pub async fn apply_search(&mut self) {
        let input = std::mem::take(&mut self.search_input);
        self.search_active = false;
        self.current_mut().filters.set_search(&input);
        self.on_filters_changed().await;
    }

    pub fn toggle_view(&mut self) {
        self.view = self.view.toggle();
        self.status_message = format!("Showing {}", self.view.label());
    }

    /// Explicit retry: restarts the current key from the first page.
    pub fn refresh(&mut self) {
        self.current_mut().refresh();
        self.status_message = "Refreshing...".to_string();
    }

    pub fn export_csv(&mut self) {
        let message = {
            let state = self.current();
            let ids = state.visible_ids();
            match self
                .actions
                .export_rows(&state.rows, &ids, &self.registry, state.view)
            {
                Ok(path) => format!("Exported {} rows to {}", state.rows.len(), path.display()),
                Err(err) => {
                    tracing::warn!(%err, "export failed");
                    format!("Export failed: {err}")
                }
            }
        };
        self.status_message = message;
    }

    pub fn open_details(&mut self) {
        let Some(record) = self.current().selected_record().cloned() else {
            return;
        };
        let bssid = record.bssid().to_string();
        self.detail = Some(DetailState {
            record,
            timeline: TimelineState::Loading,
            scroll: 0,
        });
        self.screen = AppScreen::Details;
        self.spawn_timeline_fetch(bssid);
    }

    pub fn close_details(&mut self) {
        self.detail = None;
        self.screen = AppScreen::Table;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use mockito::Matcher;
    use serde_json::json;

    fn test_app(server: &mockito::ServerGuard, page_size: u64) -> App {
        let api = match ApiClient::new(&server.url(), Duration::from_secs(5)) {
            Ok(api) => api,
            Err(e) => panic!("client: {e}"),
        };
        let actions = AppActions::with_client(api, std::env::temp_dir(), page_size);
        App::new(actions, ViewMode::AccessPoints)
    }

    fn rows(range: std::ops::Range<u32>) -> Vec<serde_json::Value> {
        range
            .map(|i| json!({ "bssid": format!("00:00:00:00:00:{i:02}"), "level": -40 - i64::from(i) }))
            .collect()
    }

    async fn next_outcome(app: &mut App) -> FetchOutcome {
        match tokio::time::timeout(Duration::from_secs(5), app.recv_outcome()).await {
            Ok(Some(outcome)) => outcome,
            other => panic!("no outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn first_page_loads_then_next_page_near_the_end() {
        let mut server = mockito::Server::new_async().await;
        let _first = server
            .mock("GET", "/api/v1/access-points")
            .match_query(Matcher::UrlEncoded("offset".into(), "0".into()))
            .with_body(json!({ "ok": true, "data": rows(0..20), "metadata": { "total": 30, "limit": 20, "offset": 0, "returned": 20 } }).to_string())
            .create_async()
            .await;
        let _second = server
            .mock("GET", "/api/v1/access-points")
            .match_query(Matcher::UrlEncoded("offset".into(), "20".into()))
            .with_body(json!({ "ok": true, "data": rows(20..30), "metadata": { "total": 30, "limit": 20, "offset": 20, "returned": 10 } }).to_string())
            .create_async()
            .await;

        let mut app = test_app(&server, 20);
        app.viewport_rows = 5;

        app.maybe_fetch();
        app.maybe_fetch();
        assert!(app.current().query.is_fetching());
        let outcome = next_outcome(&mut app).await;
        app.apply_outcome(outcome);
        assert_eq!(app.current().rows.len(), 20);

        app.maybe_fetch();
        assert!(!app.current().query.is_fetching(), "far from the end");

        app.move_selection(12);
        app.maybe_fetch();
        assert!(app.current().query.is_fetching_next_page());
        let outcome = next_outcome(&mut app).await;
        app.apply_outcome(outcome);

        assert_eq!(app.current().rows.len(), 30);
        assert!(!app.current().query.has_next_page());
    }

    #[tokio::test]
    async fn result_for_old_filters_is_discarded() {
        let mut server = mockito::Server::new_async().await;
        let _any = server
            .mock("GET", "/api/v1/access-points")
            .match_query(Matcher::Any)
            .with_body(json!({ "ok": true, "data": rows(0..3) }).to_string())
            .create_async()
            .await;

        let mut app = test_app(&server, 20);
        app.maybe_fetch();
        let stale = next_outcome(&mut app).await;

        app.current_mut().filters.set_search("cafe");
        app.on_filters_changed().await;
        app.apply_outcome(stale);

        assert!(app.current().rows.is_empty());
        assert_eq!(*app.current().query.state(), FetchState::Idle);
    }

    #[tokio::test]
    async fn views_keep_separate_state() {
        let server = mockito::Server::new_async().await;
        let mut app = test_app(&server, 20);

        app.current_mut().filters.set_search("home");
        app.on_filters_changed().await;
        app.toggle_view();

        assert_eq!(app.view, ViewMode::Observations);
        assert_eq!(app.current().filters.active_count(), 0);
        assert_eq!(app.access_points.filters.active_count(), 1);
    }

    #[tokio::test]
    async fn unsortable_column_reports_status() {
        let server = mockito::Server::new_async().await;
        let mut app = test_app(&server, 20);
        let channel_index = app
            .current()
            .visible_ids()
            .iter()
            .position(|id| *id == "channel");
        app.current_mut().focused_column = channel_index.unwrap_or_default();

        app.sort_focused(false);
        assert!(app.current().sort.is_empty());
        assert!(app.status_message.contains("not sortable"));

        app.focus_column(-100);
        app.sort_focused(false);
        assert_eq!(app.current().sort.entries().len(), 1);
        app.sort_focused(true);
        app.sort_focused(true);
        assert!(app.current().sort.is_empty(), "multi-click on desc removes the key");
    }

    #[tokio::test]
    async fn backend_error_surfaces_until_refresh() {
        let mut server = mockito::Server::new_async().await;
        let _fail = server
            .mock("GET", "/api/v1/access-points")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body(json!({ "ok": false, "error": "maintenance" }).to_string())
            .create_async()
            .await;

        let mut app = test_app(&server, 20);
        app.maybe_fetch();
        let outcome = next_outcome(&mut app).await;
        app.apply_outcome(outcome);

        assert!(matches!(
            app.current().query.status(),
            crate::table::LoadStatus::Failed(msg) if msg.contains("maintenance")
        ));
        app.maybe_fetch();
        assert!(!app.current().query.is_fetching(), "no automatic retry");

        app.refresh();
        app.maybe_fetch();
        assert!(app.current().query.is_fetching());
    }
}
