use std::ops::Range;

/// Rows from the end of the loaded set at which the next page is requested.
pub const FETCH_THRESHOLD: usize = 10;
pub const DEFAULT_OVERSCAN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualWindow {
    /// Row indices to render.
    pub range: Range<usize>,
    /// Height above the first rendered row, in the caller's units.
    pub offset_top: usize,
    pub total_height: usize,
}

/// Computes which rows intersect the viewport, padded by `overscan` rows each side.
pub fn virtual_window(
    total_rows: usize,
    row_height: usize,
    viewport_height: usize,
    scroll_top: usize,
    overscan: usize,
) -> VirtualWindow {
    let row_height = row_height.max(1);
    let total_height = total_rows * row_height;

    if total_rows == 0 || viewport_height == 0 {
        return VirtualWindow {
            range: 0..0,
            offset_top: 0,
            total_height,
        };
    }

    let max_scroll = total_height.saturating_sub(viewport_height);
    let scroll_top = scroll_top.min(max_scroll);

    let first_visible = scroll_top / row_height;
    let last_visible = (scroll_top + viewport_height).div_ceil(row_height);

    let start = first_visible.saturating_sub(overscan);
    let end = (last_visible + overscan).min(total_rows);

    VirtualWindow {
        range: start..end,
        offset_top: start * row_height,
        total_height,
    }
}

pub const fn should_fetch_more(
    last_rendered: usize,
    loaded: usize,
    has_next_page: bool,
    is_fetching: bool,
    threshold: usize,
) -> bool {
    has_next_page && !is_fetching && last_rendered + threshold >= loaded
}

/// Scroll offset keeping `selected` within `visible` rows, moving as little as possible.
pub const fn follow_selection(offset: usize, selected: usize, visible: usize) -> usize {
    if visible == 0 {
        return selected;
    }
    if selected < offset {
        return selected;
    }
    if selected >= offset + visible {
        return selected + 1 - visible;
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_covers_viewport_plus_overscan() {
        let window = virtual_window(1000, 1, 20, 100, 3);
        assert_eq!(window.range, 97..123);
        assert_eq!(window.offset_top, 97);
        assert_eq!(window.total_height, 1000);
    }

    #[test]
    fn window_clamps_at_edges() {
        let top = virtual_window(50, 1, 20, 0, 5);
        assert_eq!(top.range, 0..25);

        let bottom = virtual_window(50, 1, 20, 500, 5);
        assert_eq!(bottom.range, 25..50);
    }

    #[test]
    fn window_handles_tall_rows() {
        let window = virtual_window(100, 2, 10, 7, 0);
        // Rows 3..=8 intersect pixels 7..17.
        assert_eq!(window.range, 3..9);
        assert_eq!(window.offset_top, 6);
    }

    #[test]
    fn empty_table_has_empty_window() {
        let window = virtual_window(0, 1, 20, 0, 3);
        assert!(window.range.is_empty());
        assert_eq!(window.total_height, 0);
    }

    #[test]
    fn fetches_near_the_end_of_loaded_rows() {
        assert!(should_fetch_more(95, 100, true, false, FETCH_THRESHOLD));
        assert!(!should_fetch_more(50, 100, true, false, FETCH_THRESHOLD));
        assert!(!should_fetch_more(95, 100, false, false, FETCH_THRESHOLD));
        assert!(!should_fetch_more(95, 100, true, true, FETCH_THRESHOLD));
    }

    #[test]
    fn selection_scrolls_minimally() {
        assert_eq!(follow_selection(0, 5, 10), 0);
        assert_eq!(follow_selection(0, 10, 10), 1);
        assert_eq!(follow_selection(20, 15, 10), 15);
        assert_eq!(follow_selection(20, 29, 10), 20);
    }
}
