// Table data model shared by the interactive screens and headless output

pub mod columns;
pub mod export;
pub mod filters;
pub mod paging;
pub mod prefs;
pub mod sort;
pub mod viewport;

pub use columns::{CellValue, ColumnDescriptor, ColumnGroup, ColumnRegistry, RegistryError};
pub use export::{export_to_dir, write_csv, ExportError};
pub use filters::{
    count_active_filters, filters_to_query_params, validate_signal_range, BoundingBox, FilterError,
    FilterField, FilterState, RadiusSearch, SignalRangeCheck,
};
pub use paging::{
    FetchState, LoadStatus, Page, PageMetadata, PageRequest, PagedQuery, QueryKey,
    TransitionError,
};
pub use prefs::{ColumnPreferenceStore, ColumnVisibility};
pub use sort::{compare_records, sort_records, ColumnOrder, SortDirection, SortEntry, SortModel};
pub use viewport::{follow_selection, should_fetch_more, virtual_window, VirtualWindow};

use std::collections::BTreeMap;

use crate::domain::ViewMode;

/// Cache key for a view: every filter param plus the sort params.
pub fn query_key(view: ViewMode, filters: &FilterState, sort: &SortModel) -> QueryKey {
    let mut params: BTreeMap<String, String> = filters.to_query_params();
    params.extend(sort.to_query_params());
    QueryKey::new(view, params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_filter_or_sort_change_changes_the_key() {
        let view = ViewMode::AccessPoints;
        let mut filters = FilterState::default();
        let mut sort = SortModel::default();
        let base = query_key(view, &filters, &sort);

        filters.set_search("cafe");
        let filtered = query_key(view, &filters, &sort);
        assert_ne!(base, filtered);

        sort.apply_sort("signal", false);
        assert_ne!(filtered, query_key(view, &filters, &sort));

        assert_ne!(
            query_key(ViewMode::AccessPoints, &FilterState::default(), &SortModel::default()),
            query_key(ViewMode::Observations, &FilterState::default(), &SortModel::default())
        );
    }
}
