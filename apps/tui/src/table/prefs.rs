use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;

use super::columns::ColumnRegistry;
use super::filters::FilterState;
use super::sort::ColumnOrder;
use crate::db::{delete_preference, load_preference, save_preference};
use crate::domain::ViewMode;

const KEY_PREFIX: &str = "shadowcheck";

pub fn columns_key(view: ViewMode) -> String {
    format!("{KEY_PREFIX}.columns.{}", view.as_str())
}

pub fn column_order_key(view: ViewMode) -> String {
    format!("{KEY_PREFIX}.column_order.{}", view.as_str())
}

pub fn filters_key(view: ViewMode) -> String {
    format!("{KEY_PREFIX}.filters.{}", view.as_str())
}

/// Column id → visible. Always holds exactly the registry's ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnVisibility {
    visible: BTreeMap<String, bool>,
}

impl ColumnVisibility {
    pub fn defaults(registry: &ColumnRegistry) -> Self {
        Self {
            visible: registry
                .iter()
                .map(|column| {
                    (
                        column.id.to_string(),
                        column.always_visible || column.default_visible,
                    )
                })
                .collect(),
        }
    }

    /// Unknown ids are dropped, missing ids take their default, always-visible ids are forced on.
    pub fn hydrate(registry: &ColumnRegistry, persisted: &BTreeMap<String, bool>) -> Self {
        let mut visibility = Self::defaults(registry);
        for column in registry.iter() {
            if column.always_visible {
                continue;
            }
            if let Some(&visible) = persisted.get(column.id) {
                visibility.visible.insert(column.id.to_string(), visible);
            }
        }
        visibility
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.visible.get(id).copied().unwrap_or(false)
    }

    pub const fn as_map(&self) -> &BTreeMap<String, bool> {
        &self.visible
    }

    pub fn visible_count(&self) -> usize {
        self.visible.values().filter(|v| **v).count()
    }

    /// Returns false for unknown or always-visible ids.
    pub fn toggle_column(&mut self, registry: &ColumnRegistry, id: &str) -> bool {
        let Some(column) = registry.get(id) else {
            return false;
        };
        if column.always_visible {
            return false;
        }
        if let Some(visible) = self.visible.get_mut(id) {
            *visible = !*visible;
            return true;
        }
        false
    }

    pub fn show_all_columns(&mut self) {
        for visible in self.visible.values_mut() {
            *visible = true;
        }
    }

    pub fn hide_all_columns(&mut self, registry: &ColumnRegistry) {
        for column in registry.iter() {
            self.visible
                .insert(column.id.to_string(), column.always_visible);
        }
    }

    pub fn reset_to_defaults(&mut self, registry: &ColumnRegistry) {
        *self = Self::defaults(registry);
    }
}

async fn load_json<T: DeserializeOwned>(pool: &SqlitePool, key: &str) -> Option<T> {
    match load_preference(pool, key).await {
        Ok(Some(record)) => match serde_json::from_str(&record.value) {
            Ok(value) => {
                tracing::debug!(%key, updated = %record.updated, "loaded preference");
                Some(value)
            }
            Err(err) => {
                tracing::warn!(%key, %err, "ignoring malformed stored preference");
                None
            }
        },
        Ok(None) => None,
        Err(err) => {
            tracing::warn!(%key, %err, "failed to read preference");
            None
        }
    }
}

/// Write failures are logged and swallowed; memory stays authoritative.
async fn store_json<T: Serialize + Sync>(pool: Option<&SqlitePool>, key: &str, value: &T) {
    let Some(pool) = pool else {
        return;
    };
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(err) => {
            tracing::warn!(%key, %err, "failed to encode preference");
            return;
        }
    };
    if let Err(err) = save_preference(pool, key, &raw).await {
        tracing::warn!(%key, %err, "failed to persist preference");
    }
}

/// Per-view column preferences backed by the preference table.
#[derive(Debug, Clone)]
pub struct ColumnPreferenceStore {
    view: ViewMode,
    registry: ColumnRegistry,
    visibility: ColumnVisibility,
    order: ColumnOrder,
    pool: Option<SqlitePool>,
}

impl ColumnPreferenceStore {
    /// In-memory store with registry defaults.
    pub fn new(view: ViewMode, registry: ColumnRegistry) -> Self {
        Self {
            view,
            visibility: ColumnVisibility::defaults(&registry),
            order: ColumnOrder::from_registry(&registry),
            registry,
            pool: None,
        }
    }

    /// Reads persisted visibility and order for `view`, falling back to defaults.
    pub async fn load(view: ViewMode, registry: ColumnRegistry, pool: Option<SqlitePool>) -> Self {
        let mut store = Self::new(view, registry);
        if let Some(pool) = &pool {
            if let Some(persisted) =
                load_json::<BTreeMap<String, bool>>(pool, &columns_key(view)).await
            {
                store.visibility = ColumnVisibility::hydrate(&store.registry, &persisted);
            }
            if let Some(persisted) = load_json::<Vec<String>>(pool, &column_order_key(view)).await
            {
                store.order = ColumnOrder::hydrate(&store.registry, &persisted);
            }
        }
        store.pool = pool;
        store
    }

    pub const fn view(&self) -> ViewMode {
        self.view
    }

    pub const fn registry(&self) -> &ColumnRegistry {
        &self.registry
    }

    pub const fn visibility(&self) -> &ColumnVisibility {
        &self.visibility
    }

    pub const fn order(&self) -> &ColumnOrder {
        &self.order
    }

    /// Visible column ids in display order.
    pub fn visible_ids(&self) -> Vec<&str> {
        self.order
            .ids()
            .iter()
            .map(String::as_str)
            .filter(|id| self.visibility.is_visible(id))
            .collect()
    }

    async fn persist_visibility(&self) {
        store_json(
            self.pool.as_ref(),
            &columns_key(self.view),
            self.visibility.as_map(),
        )
        .await;
    }

    async fn persist_order(&self) {
        store_json(self.pool.as_ref(), &column_order_key(self.view), &self.order.ids()).await;
    }

    pub async fn toggle_column(&mut self, id: &str) -> bool {
        let changed = self.visibility.toggle_column(&self.registry, id);
        if changed {
            self.persist_visibility().await;
        }
        changed
    }

    pub async fn show_all_columns(&mut self) {
        self.visibility.show_all_columns();
        self.persist_visibility().await;
    }

    pub async fn hide_all_columns(&mut self) {
        self.visibility.hide_all_columns(&self.registry);
        self.persist_visibility().await;
    }

    /// Restores default visibility and registry order and drops the stored rows, so later
    /// registry defaults apply on the next load.
    pub async fn reset_to_defaults(&mut self) {
        self.visibility.reset_to_defaults(&self.registry);
        self.order = ColumnOrder::from_registry(&self.registry);
        let Some(pool) = &self.pool else {
            return;
        };
        for key in [columns_key(self.view), column_order_key(self.view)] {
            if let Err(err) = delete_preference(pool, &key).await {
                tracing::warn!(%key, %err, "failed to clear preference");
            }
        }
    }

    pub async fn move_column(&mut self, from_id: &str, to_id: &str) -> bool {
        let moved = self.order.move_column(from_id, to_id);
        if moved {
            self.persist_order().await;
        }
        moved
    }

    pub async fn move_by(&mut self, id: &str, delta: isize) -> bool {
        let moved = self.order.move_by(id, delta);
        if moved {
            self.persist_order().await;
        }
        moved
    }
}

pub async fn load_filters(pool: Option<&SqlitePool>, view: ViewMode) -> FilterState {
    match pool {
        Some(pool) => load_json(pool, &filters_key(view)).await.unwrap_or_default(),
        None => FilterState::default(),
    }
}

pub async fn save_filters(pool: Option<&SqlitePool>, view: ViewMode, filters: &FilterState) {
    store_json(pool, &filters_key(view), filters).await;
}
