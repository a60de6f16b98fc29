use std::cmp::Ordering;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::grid::{ColumnFilter, FilterMode, SortDirection, SortSpec};

pub const PAGE_SIZE_OPTIONS: [usize; 4] = [10, 25, 50, 100];

/// Client-side grid state: free-text search, staged vs. applied column
/// filters, single-column tri-state sort and 1-based pagination.
///
/// The state is independent of the records; [`GridState::derive`] computes
/// the visible page from whatever array the caller currently holds, in a
/// fixed order: applied filters (AND) -> search -> sort -> page slice.
#[derive(Debug, Clone, PartialEq)]
pub struct GridState {
    search: String,
    staged: Vec<ColumnFilter>,
    applied: Vec<ColumnFilter>,
    sort: Option<SortSpec>,
    page: usize,
    page_size: usize,
}

/// The derived visible page plus the numbers the footer needs.
#[derive(Debug, Clone, PartialEq)]
pub struct GridView {
    pub rows: Vec<Map<String, Value>>,
    /// Count after filters and search, before the page slice.
    pub total_rows: usize,
    /// Effective page, clamped to the last valid one.
    pub page: usize,
    pub page_count: usize,
}

impl GridState {
    pub fn new(page_size: usize) -> Self {
        GridState {
            search: String::new(),
            staged: Vec::new(),
            applied: Vec::new(),
            sort: None,
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// State pre-seeded from navigation input, e.g. a `q` query parameter
    /// or a filter carried over from another screen. The filters land in
    /// both the staged and applied lists so the editor shows them too.
    pub fn with_initial(
        page_size: usize,
        search: Option<String>,
        filters: Vec<ColumnFilter>,
    ) -> Self {
        let mut state = GridState::new(page_size);
        if let Some(search) = search {
            state.search = search;
        }
        state.staged = filters.clone();
        state.applied = filters;
        state
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn staged_filters(&self) -> &[ColumnFilter] {
        &self.staged
    }

    pub fn applied_filter_count(&self) -> usize {
        self.applied.len()
    }

    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
        self.page = 1;
    }

    pub fn add_filter(&mut self) {
        self.staged.push(ColumnFilter::default());
    }

    /// Edits a staged filter slot; displayed rows are untouched until
    /// [`GridState::apply_filters`].
    pub fn set_filter(&mut self, index: usize, filter: ColumnFilter) {
        if let Some(slot) = self.staged.get_mut(index) {
            *slot = filter;
        }
    }

    pub fn remove_filter(&mut self, index: usize) {
        if index < self.staged.len() {
            self.staged.remove(index);
        }
    }

    pub fn apply_filters(&mut self) {
        self.applied = self.staged.clone();
        self.page = 1;
    }

    /// Clears staged and applied filters and the search text in one step,
    /// returning the grid to the unfiltered first-page state.
    pub fn clear_filters(&mut self) {
        self.staged.clear();
        self.applied.clear();
        self.search.clear();
        self.page = 1;
    }

    /// Advances the sort cycle for `key`: none -> asc -> desc -> none.
    /// Sorting a different column replaces the active sort, starting at
    /// ascending; at most one column is ever sorted.
    pub fn toggle_sort(&mut self, key: &str) {
        self.sort = match self.sort.take() {
            Some(current) if current.key == key => match current.direction {
                SortDirection::Asc => Some(SortSpec {
                    key: current.key,
                    direction: SortDirection::Desc,
                }),
                SortDirection::Desc => None,
            },
            _ => Some(SortSpec {
                key: key.to_string(),
                direction: SortDirection::Asc,
            }),
        };
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        if PAGE_SIZE_OPTIONS.contains(&page_size) {
            self.page_size = page_size;
        }
    }

    /// Computes the visible page. The reported total reflects the
    /// filtered and searched set, not the raw array; an out-of-range page
    /// clamps to the last valid page rather than slicing out of bounds.
    pub fn derive(&self, rows: &[Map<String, Value>]) -> GridView {
        let needle = self.search.to_lowercase();

        let mut kept: Vec<&Map<String, Value>> = rows
            .iter()
            .filter(|row| self.applied.iter().all(|filter| filter_matches(filter, row)))
            .filter(|row| search_matches(&needle, row))
            .collect();

        if let Some(sort) = &self.sort {
            kept.sort_by(|a, b| {
                let ordering = value_ordering(a.get(&sort.key), b.get(&sort.key));
                match sort.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        let total_rows = kept.len();
        let page_count = total_rows.div_ceil(self.page_size);
        let page = self.page.clamp(1, page_count.max(1));
        let start = (page - 1) * self.page_size;
        let rows = kept
            .into_iter()
            .skip(start)
            .take(self.page_size)
            .cloned()
            .collect();

        GridView {
            rows,
            total_rows,
            page,
            page_count,
        }
    }
}

/// Serializes records into the open key-value rows the grid works over.
/// Anything that does not serialize to a JSON object is skipped.
pub fn to_rows<T: Serialize>(records: &[T]) -> Vec<Map<String, Value>> {
    records
        .iter()
        .filter_map(|record| match serde_json::to_value(record) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        })
        .collect()
}

/// String form of a cell used for search, filtering and display.
/// JSON null renders as the empty string.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn filter_matches(filter: &ColumnFilter, row: &Map<String, Value>) -> bool {
    // Unconfigured editor slots match everything.
    if filter.key.is_empty() || filter.value.is_empty() {
        return true;
    }
    let cell = row.get(&filter.key).map(value_text).unwrap_or_default();
    match filter.mode {
        FilterMode::Contains => cell
            .to_lowercase()
            .contains(&filter.value.to_lowercase()),
    }
}

fn search_matches(needle: &str, row: &Map<String, Value>) -> bool {
    if needle.is_empty() {
        return true;
    }
    row.values()
        .any(|value| value_text(value).to_lowercase().contains(needle))
}

/// Natural ordering across JSON values: null < bool < number < string,
/// numbers numerically, strings case-insensitively (case-sensitive
/// tiebreak). Missing fields sort like null.
fn value_ordering(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let rank_a = value_rank(a);
    let rank_b = value_rank(b);
    if rank_a != rank_b {
        return rank_a.cmp(&rank_b);
    }
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x
            .to_lowercase()
            .cmp(&y.to_lowercase())
            .then_with(|| x.cmp(y)),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
        _ => Ordering::Equal,
    }
}

fn value_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Object(_)) => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("test rows must be json objects, got {other}"),
        }
    }

    fn two_rows() -> Vec<Map<String, Value>> {
        vec![
            row(json!({"id": 1, "name": "Acme", "status": 1})),
            row(json!({"id": 2, "name": "Globex", "status": 0})),
        ]
    }

    fn numbered_rows(count: usize) -> Vec<Map<String, Value>> {
        (1..=count)
            .map(|n| row(json!({"id": n, "name": format!("row-{n:03}")})))
            .collect()
    }

    #[test]
    fn search_is_case_insensitive_across_all_fields() {
        let rows = two_rows();
        let mut state = GridState::new(10);
        state.set_search("acme");

        let view = state.derive(&rows);

        assert_eq!(view.total_rows, 1, "only the Acme row should match");
        assert_eq!(view.rows[0]["id"], json!(1));
    }

    #[test]
    fn search_matches_non_string_fields_via_their_string_form() {
        let rows = two_rows();
        let mut state = GridState::new(10);
        state.set_search("2");

        let view = state.derive(&rows);

        assert_eq!(view.total_rows, 1, "id 2 should match the search text");
        assert_eq!(view.rows[0]["name"], json!("Globex"));
    }

    #[test]
    fn staged_filters_do_not_affect_rows_until_applied() {
        let rows = two_rows();
        let mut state = GridState::new(10);
        state.add_filter();
        state.set_filter(0, ColumnFilter::contains("status", "1"));

        assert_eq!(
            state.derive(&rows).total_rows,
            2,
            "staged filter must not filter anything"
        );

        state.apply_filters();
        let view = state.derive(&rows);
        assert_eq!(view.total_rows, 1);
        assert_eq!(view.rows[0]["id"], json!(1));
    }

    #[test]
    fn clear_filters_restores_the_unfiltered_first_page_state() {
        let rows = two_rows();
        let mut state = GridState::new(10);
        state.add_filter();
        state.set_filter(0, ColumnFilter::contains("status", "1"));
        state.apply_filters();
        state.set_search("acme");

        state.clear_filters();

        let view = state.derive(&rows);
        assert_eq!(view.total_rows, 2, "all rows should be visible again");
        assert_eq!(view.page, 1);
        assert!(state.staged_filters().is_empty(), "staged list should be empty");
        assert_eq!(state.applied_filter_count(), 0);
        assert!(state.search().is_empty());
    }

    #[test]
    fn applying_unchanged_filters_twice_is_idempotent() {
        let rows = numbered_rows(30);
        let mut state = GridState::new(10);
        state.add_filter();
        state.set_filter(0, ColumnFilter::contains("name", "row-0"));
        state.apply_filters();
        let first = state.derive(&rows);
        state.apply_filters();
        let second = state.derive(&rows);

        assert_eq!(first, second, "re-applying must not change the visible set");
    }

    #[test]
    fn multiple_filters_combine_with_and_semantics() {
        let rows = vec![
            row(json!({"id": 1, "name": "alpha", "unit": "north"})),
            row(json!({"id": 2, "name": "alpha", "unit": "south"})),
            row(json!({"id": 3, "name": "beta", "unit": "north"})),
        ];
        let mut state = GridState::new(10);
        state.add_filter();
        state.set_filter(0, ColumnFilter::contains("name", "alpha"));
        state.add_filter();
        state.set_filter(1, ColumnFilter::contains("unit", "north"));
        state.apply_filters();

        let view = state.derive(&rows);
        assert_eq!(view.total_rows, 1);
        assert_eq!(view.rows[0]["id"], json!(1));
    }

    #[test]
    fn unconfigured_filter_slots_match_everything() {
        let rows = two_rows();
        let mut state = GridState::new(10);
        state.add_filter();
        state.apply_filters();

        assert_eq!(state.derive(&rows).total_rows, 2);
    }

    #[test]
    fn derived_set_is_a_subset_satisfying_every_predicate() {
        let rows = numbered_rows(50);
        let mut state = GridState::new(100);
        state.add_filter();
        state.set_filter(0, ColumnFilter::contains("name", "row-0"));
        state.apply_filters();
        state.set_search("1");

        let view = state.derive(&rows);
        assert!(view.total_rows <= rows.len());
        for visible in &view.rows {
            let name = value_text(&visible["name"]);
            assert!(name.contains("row-0"), "filter must hold for {name}");
            let hit = visible.values().any(|v| value_text(v).contains('1'));
            assert!(hit, "search must hold for {name}");
        }
    }

    #[test]
    fn sort_cycles_asc_desc_then_back_to_original_order() {
        let rows = vec![
            row(json!({"id": 1, "name": "Charlie"})),
            row(json!({"id": 2, "name": "alice"})),
            row(json!({"id": 3, "name": "Bob"})),
        ];
        let mut state = GridState::new(10);

        state.toggle_sort("name");
        let asc: Vec<String> = state
            .derive(&rows)
            .rows
            .iter()
            .map(|r| value_text(&r["name"]))
            .collect();
        assert_eq!(
            asc,
            vec!["alice", "Bob", "Charlie"],
            "ascending sort is case-insensitive"
        );

        state.toggle_sort("name");
        let desc: Vec<String> = state
            .derive(&rows)
            .rows
            .iter()
            .map(|r| value_text(&r["name"]))
            .collect();
        assert_eq!(desc, vec!["Charlie", "Bob", "alice"]);

        state.toggle_sort("name");
        let original: Vec<Value> = state.derive(&rows).rows.iter().map(|r| r["id"].clone()).collect();
        assert_eq!(
            original,
            vec![json!(1), json!(2), json!(3)],
            "third toggle returns to the original relative order"
        );
    }

    #[test]
    fn sorting_a_new_column_resets_the_previous_one() {
        let rows = vec![
            row(json!({"a": 2, "b": "x"})),
            row(json!({"a": 1, "b": "y"})),
        ];
        let mut state = GridState::new(10);
        state.toggle_sort("a");
        state.toggle_sort("a");
        state.toggle_sort("b");

        let sort = state.sort().expect("a sort should be active");
        assert_eq!(sort.key, "b", "only the new column may be sorted");
        assert_eq!(sort.direction, SortDirection::Asc);
    }

    #[test]
    fn numbers_sort_numerically_not_lexically() {
        let rows = vec![
            row(json!({"v": 10})),
            row(json!({"v": 2})),
            row(json!({"v": 1})),
        ];
        let mut state = GridState::new(10);
        state.toggle_sort("v");

        let sorted: Vec<Value> = state.derive(&rows).rows.iter().map(|r| r["v"].clone()).collect();
        assert_eq!(sorted, vec![json!(1), json!(2), json!(10)]);
    }

    #[test]
    fn nulls_and_missing_fields_sort_first() {
        let rows = vec![
            row(json!({"v": "b"})),
            row(json!({"v": null})),
            row(json!({"other": 1})),
            row(json!({"v": "a"})),
        ];
        let mut state = GridState::new(10);
        state.toggle_sort("v");

        let view = state.derive(&rows);
        assert_eq!(view.rows[0].get("v"), Some(&Value::Null));
        assert!(view.rows[1].get("v").is_none());
        assert_eq!(view.rows[2]["v"], json!("a"));
        assert_eq!(view.rows[3]["v"], json!("b"));
    }

    #[test]
    fn pages_reconstruct_the_derived_set_without_gaps_or_duplicates() {
        let rows = numbered_rows(25);
        let mut state = GridState::new(10);

        let mut seen = Vec::new();
        for page in 1..=3 {
            state.set_page(page);
            let view = state.derive(&rows);
            assert!(view.rows.len() <= 10, "a page holds at most page_size rows");
            seen.extend(view.rows.iter().map(|r| r["id"].clone()));
        }

        let expected: Vec<Value> = (1..=25).map(|n| json!(n)).collect();
        assert_eq!(seen, expected, "pages must tile the derived set in order");
    }

    #[test]
    fn page_boundaries_match_scenario_c() {
        let rows = numbered_rows(25);
        let mut state = GridState::new(10);

        let first = state.derive(&rows);
        assert_eq!(first.rows.first().map(|r| r["id"].clone()), Some(json!(1)));
        assert_eq!(first.rows.last().map(|r| r["id"].clone()), Some(json!(10)));
        assert_eq!(first.page_count, 3);

        state.set_page(3);
        let third = state.derive(&rows);
        assert_eq!(third.rows.len(), 5, "last page holds the remainder");
        assert_eq!(third.rows.first().map(|r| r["id"].clone()), Some(json!(21)));

        state.set_page(4);
        let clamped = state.derive(&rows);
        assert_eq!(clamped.page, 3, "page past the end clamps to the last page");
        assert_eq!(clamped.rows.len(), 5);
    }

    #[test]
    fn shrinking_the_row_set_clamps_the_current_page() {
        let rows = numbered_rows(30);
        let mut state = GridState::new(10);
        state.set_page(3);
        assert_eq!(state.derive(&rows).page, 3);

        state.set_search("row-001");
        let view = state.derive(&rows);
        assert_eq!(view.page, 1, "search resets to the first page");
        assert_eq!(view.total_rows, 1);
    }

    #[test]
    fn empty_derived_set_yields_an_empty_slice_not_an_error() {
        let rows = numbered_rows(5);
        let mut state = GridState::new(10);
        state.set_search("no such row");

        let view = state.derive(&rows);
        assert_eq!(view.total_rows, 0);
        assert!(view.rows.is_empty());
        assert_eq!(view.page_count, 0);
        assert_eq!(view.page, 1);
    }

    #[test]
    fn page_size_changes_are_restricted_to_the_offered_options() {
        let mut state = GridState::new(25);
        state.set_page_size(50);
        assert_eq!(state.page_size(), 50);
        state.set_page_size(7);
        assert_eq!(state.page_size(), 50, "unknown size is ignored");
    }

    #[test]
    fn status_filter_scenario_b_round_trips_through_clear() {
        let rows = two_rows();
        let mut state = GridState::new(10);
        state.add_filter();
        state.set_filter(0, ColumnFilter::contains("status", "1"));
        state.apply_filters();
        assert_eq!(state.derive(&rows).total_rows, 1);

        state.clear_filters();
        assert_eq!(state.derive(&rows).total_rows, 2);
    }

    #[test]
    fn to_rows_serializes_structs_into_open_records() {
        #[derive(Serialize)]
        struct Thing {
            id: i64,
            label: &'static str,
        }
        let rows = to_rows(&[Thing { id: 7, label: "x" }]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], json!(7));
        assert_eq!(rows[0]["label"], json!("x"));
    }

    #[test]
    fn null_cells_render_and_search_as_empty_text() {
        assert_eq!(value_text(&Value::Null), "");
        let rows = vec![row(json!({"id": 1, "note": null}))];
        let mut state = GridState::new(10);
        state.set_search("null");
        assert_eq!(
            state.derive(&rows).total_rows,
            0,
            "the literal text 'null' must not match null cells"
        );
    }
}
