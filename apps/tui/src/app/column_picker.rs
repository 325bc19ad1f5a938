use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use crate::table::{ColumnOrder, ColumnRegistry};

#[derive(Debug, Clone, Default)]
pub struct ColumnPicker {
    pub query: String,
    pub typing: bool,
    pub selected: usize,
}

impl ColumnPicker {
    /// Column ids in display order, narrowed and ranked by the fuzzy query.
    pub fn matches<'a>(&self, registry: &'a ColumnRegistry, order: &ColumnOrder) -> Vec<&'a str> {
        let ordered = order
            .ids()
            .iter()
            .filter_map(|id| registry.get(id))
            .map(|column| (column.id, column.label));

        let query = self.query.trim();
        if query.is_empty() {
            return ordered.map(|(id, _)| id).collect();
        }

        let matcher = SkimMatcherV2::default();
        let mut scored: Vec<(i64, usize, &str)> = ordered
            .enumerate()
            .filter_map(|(position, (id, label))| {
                let label_score = matcher.fuzzy_match(label, query);
                let id_score = matcher.fuzzy_match(id, query);
                label_score
                    .max(id_score)
                    .map(|score| (score, position, id))
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        scored.into_iter().map(|(_, _, id)| id).collect()
    }

    pub fn selected_id<'a>(&self, registry: &'a ColumnRegistry, order: &ColumnOrder) -> Option<&'a str> {
        self.matches(registry, order).get(self.selected).copied()
    }

    pub fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_lists_display_order() {
        let registry = ColumnRegistry::standard();
        let mut order = ColumnOrder::from_registry(&registry);
        order.move_column("signal", "bssid");

        let picker = ColumnPicker::default();
        let matches = picker.matches(&registry, &order);
        assert_eq!(matches.len(), registry.len());
        assert_eq!(matches[0], "signal");
    }

    #[test]
    fn fuzzy_query_narrows_columns() {
        let registry = ColumnRegistry::standard();
        let order = ColumnOrder::from_registry(&registry);
        let picker = ColumnPicker {
            query: "seen".to_string(),
            ..ColumnPicker::default()
        };
        let matches = picker.matches(&registry, &order);
        assert!(matches.contains(&"first_seen"));
        assert!(matches.contains(&"last_seen"));
        assert!(!matches.contains(&"bssid"));
    }

    #[test]
    fn selected_id_follows_the_ranked_matches() {
        let registry = ColumnRegistry::standard();
        let order = ColumnOrder::from_registry(&registry);
        let mut picker = ColumnPicker {
            query: "seen".to_string(),
            ..ColumnPicker::default()
        };
        let matches = picker.matches(&registry, &order);
        assert_eq!(picker.selected_id(&registry, &order), matches.first().copied());

        picker.selected = matches.len();
        assert_eq!(picker.selected_id(&registry, &order), None);
    }

    #[test]
    fn clamp_keeps_cursor_in_range() {
        let mut picker = ColumnPicker {
            selected: 9,
            ..ColumnPicker::default()
        };
        picker.clamp(3);
        assert_eq!(picker.selected, 2);
        picker.clamp(0);
        assert_eq!(picker.selected, 0);
    }
}
