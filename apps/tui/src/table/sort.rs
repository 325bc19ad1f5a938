use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::columns::ColumnRegistry;
use crate::domain::{Record, ViewMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Asc),
            "desc" | "descending" => Some(Self::Desc),
            _ => None,
        }
    }

    pub const fn flip(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub const fn arrow(self) -> &'static str {
        match self {
            Self::Asc => "▲",
            Self::Desc => "▼",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortEntry {
    pub column_id: String,
    pub direction: SortDirection,
}

impl SortEntry {
    pub fn asc(column_id: &str) -> Self {
        Self {
            column_id: column_id.to_string(),
            direction: SortDirection::Asc,
        }
    }
}

/// Ordered sort keys; index 0 is the primary key. Column ids are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<SortEntry>", into = "Vec<SortEntry>")]
pub struct SortModel {
    entries: Vec<SortEntry>,
}

impl From<Vec<SortEntry>> for SortModel {
    fn from(entries: Vec<SortEntry>) -> Self {
        Self::new(entries)
    }
}

impl From<SortModel> for Vec<SortEntry> {
    fn from(model: SortModel) -> Self {
        model.entries
    }
}

impl SortModel {
    pub fn new(entries: Vec<SortEntry>) -> Self {
        let mut model = Self::default();
        for entry in entries {
            if model.position(&entry.column_id).is_none() {
                model.entries.push(entry);
            }
        }
        model
    }

    pub fn entries(&self) -> &[SortEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn position(&self, column_id: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.column_id == column_id)
    }

    pub fn direction_of(&self, column_id: &str) -> Option<SortDirection> {
        self.position(column_id)
            .map(|index| self.entries[index].direction)
    }

    /// Header click. `multi` is the modifier-held variant.
    pub fn apply_sort(&mut self, column_id: &str, multi: bool) {
        if multi {
            match self.position(column_id) {
                Some(index) => match self.entries[index].direction {
                    SortDirection::Asc => self.entries[index].direction = SortDirection::Desc,
                    SortDirection::Desc => {
                        self.entries.remove(index);
                    }
                },
                None => self.entries.push(SortEntry::asc(column_id)),
            }
            return;
        }

        match self.entries.as_mut_slice() {
            [only] if only.column_id == column_id => only.direction = only.direction.flip(),
            _ => self.entries = vec![SortEntry::asc(column_id)],
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// `sort` and `order` query parameters, comma-joined in priority order.
    pub fn to_query_params(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        if self.entries.is_empty() {
            return params;
        }
        let ids: Vec<&str> = self.entries.iter().map(|e| e.column_id.as_str()).collect();
        let dirs: Vec<&str> = self.entries.iter().map(|e| e.direction.as_str()).collect();
        params.insert("sort".to_string(), ids.join(","));
        params.insert("order".to_string(), dirs.join(","));
        params
    }

    /// Parses `column[:asc|desc]` specs, as given on the command line.
    pub fn parse_specs<'a>(specs: impl IntoIterator<Item = &'a str>) -> Option<Self> {
        let mut entries = Vec::new();
        for spec in specs {
            let (column, direction) = match spec.split_once(':') {
                Some((column, dir)) => (column, SortDirection::parse(dir)?),
                None => (spec, SortDirection::Asc),
            };
            let column = column.trim();
            if column.is_empty() {
                return None;
            }
            entries.push(SortEntry {
                column_id: column.to_string(),
                direction,
            });
        }
        Some(Self::new(entries))
    }

    /// Drops entries whose column is gone or no longer sortable.
    pub fn retain_known(&mut self, registry: &ColumnRegistry) {
        self.entries.retain(|entry| {
            registry
                .get(&entry.column_id)
                .is_some_and(|column| column.sortable)
        });
    }
}

/// Applies sort keys in priority order. Nulls sort last in either direction.
pub fn compare_records(
    a: &Record,
    b: &Record,
    sort: &SortModel,
    registry: &ColumnRegistry,
    view: ViewMode,
) -> Ordering {
    for entry in sort.entries() {
        let Some(column) = registry.get(&entry.column_id) else {
            continue;
        };
        let left = column.value(a, view);
        let right = column.value(b, view);

        let ordering = match (left.is_null(), right.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                let natural = left.compare(&right);
                match entry.direction {
                    SortDirection::Asc => natural,
                    SortDirection::Desc => natural.reverse(),
                }
            }
        };

        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Stable, so rows equal under every key keep their fetch order.
pub fn sort_records(
    records: &mut [Record],
    sort: &SortModel,
    registry: &ColumnRegistry,
    view: ViewMode,
) {
    if sort.is_empty() {
        return;
    }
    records.sort_by(|a, b| compare_records(a, b, sort, registry, view));
}

/// Explicit display order of column ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnOrder {
    ids: Vec<String>,
}

impl ColumnOrder {
    pub fn from_registry(registry: &ColumnRegistry) -> Self {
        Self {
            ids: registry.ids().map(str::to_string).collect(),
        }
    }

    /// Keeps a persisted order for known ids; columns added since are appended.
    pub fn hydrate(registry: &ColumnRegistry, persisted: &[String]) -> Self {
        let mut ids: Vec<String> = Vec::with_capacity(registry.len());
        for id in persisted {
            if registry.contains(id) && !ids.contains(id) {
                ids.push(id.clone());
            }
        }
        for id in registry.ids() {
            if !ids.iter().any(|known| known == id) {
                ids.push(id.to_string());
            }
        }
        Self { ids }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.ids.iter().position(|known| known == id)
    }

    /// Drag-and-drop: remove from the old index, insert at the target's index.
    pub fn move_column(&mut self, from_id: &str, to_id: &str) -> bool {
        let (Some(from), Some(to)) = (self.index_of(from_id), self.index_of(to_id)) else {
            return false;
        };
        if from == to {
            return false;
        }
        let moved = self.ids.remove(from);
        self.ids.insert(to, moved);
        true
    }

    /// Shifts a column by `delta` positions, clamped to the ends.
    pub fn move_by(&mut self, id: &str, delta: isize) -> bool {
        let Some(from) = self.index_of(id) else {
            return false;
        };
        let last = self.ids.len().saturating_sub(1);
        let to = from.saturating_add_signed(delta).min(last);
        if to == from {
            return false;
        }
        let target = self.ids[to].clone();
        self.move_column(id, &target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::columns::tests::sample_access_point;

    fn ids(model: &SortModel) -> Vec<(&str, SortDirection)> {
        model
            .entries()
            .iter()
            .map(|e| (e.column_id.as_str(), e.direction))
            .collect()
    }

    #[test]
    fn single_click_sorts_ascending_then_toggles() {
        let mut sort = SortModel::default();
        sort.apply_sort("ssid", false);
        assert_eq!(ids(&sort), vec![("ssid", SortDirection::Asc)]);
        sort.apply_sort("ssid", false);
        assert_eq!(ids(&sort), vec![("ssid", SortDirection::Desc)]);
        sort.apply_sort("ssid", false);
        assert_eq!(ids(&sort), vec![("ssid", SortDirection::Asc)]);
    }

    #[test]
    fn single_click_on_new_column_replaces_list() {
        let mut sort = SortModel::default();
        sort.apply_sort("ssid", false);
        sort.apply_sort("signal", true);
        sort.apply_sort("last_seen", false);
        assert_eq!(ids(&sort), vec![("last_seen", SortDirection::Asc)]);
    }

    #[test]
    fn multi_click_appends_secondary_keys() {
        let mut sort = SortModel::default();
        sort.apply_sort("ssid", false);
        sort.apply_sort("signal", true);
        sort.apply_sort("last_seen", true);
        assert_eq!(
            ids(&sort),
            vec![
                ("ssid", SortDirection::Asc),
                ("signal", SortDirection::Asc),
                ("last_seen", SortDirection::Asc),
            ]
        );
    }

    #[test]
    fn three_multi_clicks_restore_original_list() {
        let mut sort = SortModel::default();
        sort.apply_sort("ssid", false);
        let before = sort.clone();

        sort.apply_sort("signal", true);
        assert_eq!(sort.direction_of("signal"), Some(SortDirection::Asc));
        sort.apply_sort("signal", true);
        assert_eq!(sort.direction_of("signal"), Some(SortDirection::Desc));
        sort.apply_sort("signal", true);

        assert_eq!(sort, before);
    }

    #[test]
    fn new_drops_duplicate_columns() {
        let sort = SortModel::new(vec![SortEntry::asc("ssid"), SortEntry::asc("ssid")]);
        assert_eq!(sort.entries().len(), 1);
    }

    #[test]
    fn deserialized_model_keeps_first_entry_per_column() -> Result<(), serde_json::Error> {
        let model: SortModel = serde_json::from_str(
            r#"[
                {"column_id": "signal", "direction": "desc"},
                {"column_id": "ssid", "direction": "asc"},
                {"column_id": "signal", "direction": "asc"}
            ]"#,
        )?;
        assert_eq!(
            ids(&model),
            vec![("signal", SortDirection::Desc), ("ssid", SortDirection::Asc)]
        );
        assert_eq!(serde_json::to_value(&model)?.as_array().map(Vec::len), Some(2));
        Ok(())
    }

    #[test]
    fn query_params_keep_priority_order() {
        let mut sort = SortModel::default();
        sort.apply_sort("signal", true);
        sort.apply_sort("signal", true);
        sort.apply_sort("ssid", true);
        let params = sort.to_query_params();
        assert_eq!(params.get("sort").map(String::as_str), Some("signal,ssid"));
        assert_eq!(params.get("order").map(String::as_str), Some("desc,asc"));
    }

    #[test]
    fn parse_specs_reads_directions() {
        let sort = SortModel::parse_specs(["signal:desc", "ssid"]);
        assert_eq!(
            sort.as_ref().map(ids),
            Some(vec![("signal", SortDirection::Desc), ("ssid", SortDirection::Asc)])
        );
        assert!(SortModel::parse_specs(["signal:sideways"]).is_none());
    }

    #[test]
    fn nulls_sort_last_in_both_directions() {
        let registry = ColumnRegistry::standard();
        let view = ViewMode::AccessPoints;
        let mut rows = vec![
            sample_access_point("a", None, None),
            sample_access_point("b", None, Some(-40)),
            sample_access_point("c", None, Some(-80)),
        ];

        let mut sort = SortModel::default();
        sort.apply_sort("signal", false);
        sort_records(&mut rows, &sort, &registry, view);
        let order: Vec<_> = rows.iter().map(Record::bssid).collect();
        assert_eq!(order, vec!["c", "b", "a"]);

        sort.apply_sort("signal", false);
        sort_records(&mut rows, &sort, &registry, view);
        let order: Vec<_> = rows.iter().map(Record::bssid).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[test]
    fn secondary_key_breaks_ties() {
        let registry = ColumnRegistry::standard();
        let view = ViewMode::AccessPoints;
        let mut rows = vec![
            sample_access_point("z", Some("Cafe"), Some(-50)),
            sample_access_point("y", Some("Cafe"), Some(-70)),
            sample_access_point("x", Some("Airport"), Some(-60)),
        ];

        let sort = SortModel::new(vec![
            SortEntry::asc("ssid"),
            SortEntry {
                column_id: "signal".to_string(),
                direction: SortDirection::Desc,
            },
        ]);
        sort_records(&mut rows, &sort, &registry, view);
        let order: Vec<_> = rows.iter().map(Record::bssid).collect();
        assert_eq!(order, vec!["x", "z", "y"]);
    }

    #[test]
    fn retain_known_drops_unsortable_columns() {
        let registry = ColumnRegistry::standard();
        let mut sort = SortModel::new(vec![
            SortEntry::asc("channel"),
            SortEntry::asc("missing"),
            SortEntry::asc("ssid"),
        ]);
        sort.retain_known(&registry);
        assert_eq!(ids(&sort), vec![("ssid", SortDirection::Asc)]);
    }

    #[test]
    fn move_column_uses_splice_semantics() {
        let registry = ColumnRegistry::standard();
        let mut order = ColumnOrder::from_registry(&registry);
        // bssid, ssid, signal, radio_type, ...
        assert!(order.move_column("bssid", "radio_type"));
        assert_eq!(
            &order.ids()[..4],
            &["ssid", "signal", "radio_type", "bssid"].map(str::to_string)
        );

        assert!(order.move_column("bssid", "ssid"));
        assert_eq!(
            &order.ids()[..4],
            &["bssid", "ssid", "signal", "radio_type"].map(str::to_string)
        );
    }

    #[test]
    fn move_by_clamps_at_edges() {
        let registry = ColumnRegistry::standard();
        let mut order = ColumnOrder::from_registry(&registry);
        assert!(!order.move_by("bssid", -1));
        assert!(order.move_by("bssid", 1));
        assert_eq!(order.index_of("bssid"), Some(1));
    }

    #[test]
    fn hydrate_keeps_known_order_and_appends_new_columns() {
        let registry = ColumnRegistry::standard();
        let persisted = vec![
            "signal".to_string(),
            "gone".to_string(),
            "bssid".to_string(),
        ];
        let order = ColumnOrder::hydrate(&registry, &persisted);
        assert_eq!(&order.ids()[..3], &["signal", "bssid", "ssid"].map(str::to_string));
        assert_eq!(order.ids().len(), registry.len());
    }
}
