use chrono::DateTime;
use dioxus::prelude::*;
use serde_json::{Map, Value};

use crate::domain::grid::{ColumnFilter, ColumnSpec, FilterMode, SortDirection};
use crate::usecase::grid::{to_rows, value_text, GridState, PAGE_SIZE_OPTIONS};

/// A per-row button column, optionally shown only for rows passing
/// `when`. The grid reports clicks through `on_action` with the action
/// id and the full row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowAction {
    pub id: &'static str,
    pub label: &'static str,
    pub when: Option<fn(&Map<String, Value>) -> bool>,
}

impl RowAction {
    pub fn new(id: &'static str, label: &'static str) -> Self {
        RowAction {
            id,
            label,
            when: None,
        }
    }

    pub fn only_when(mut self, when: fn(&Map<String, Value>) -> bool) -> Self {
        self.when = Some(when);
        self
    }
}

/// Generic client-side data grid: quick search, staged column filters,
/// tri-state column sort and pagination over an already-fetched record
/// array. `rows: None` means the caller is still loading (or its fetch
/// failed upstream; the grid does not distinguish the two).
#[component]
pub fn DataGrid(
    columns: Vec<ColumnSpec>,
    rows: Option<Vec<Map<String, Value>>>,
    #[props(default = false)] loading: bool,
    #[props(default = 25_usize)] page_size: usize,
    #[props(default)] initial_search: Option<String>,
    #[props(default)] initial_filters: Vec<ColumnFilter>,
    #[props(default)] actions: Vec<RowAction>,
    #[props(default)] on_action: EventHandler<(&'static str, Map<String, Value>)>,
) -> Element {
    let mut state = use_signal({
        let initial_search = initial_search.clone();
        let initial_filters = initial_filters.clone();
        move || GridState::with_initial(page_size, initial_search, initial_filters)
    });
    let mut filters_open = use_signal(|| false);

    let is_loading = loading || rows.is_none();
    let view = rows.as_ref().map(|records| state.read().derive(records));

    let visible: Vec<ColumnSpec> = columns.iter().filter(|c| c.visible).cloned().collect();
    let column_options: Vec<(String, String)> = visible
        .iter()
        .map(|c| (c.key.clone(), c.label.clone()))
        .collect();
    let staged = state.read().staged_filters().to_vec();
    let applied_count = state.read().applied_filter_count();
    let filter_button_label = match applied_count {
        0 => "Filters".to_string(),
        1 => "1 filter".to_string(),
        n => format!("{n} filters"),
    };
    let search_value = state.read().search().to_string();
    let sort_state = state.read().sort().cloned();

    // Cells are pre-rendered so the markup below stays free of borrow
    // gymnastics.
    let rendered: Vec<(Map<String, Value>, Vec<String>)> = view
        .as_ref()
        .map(|view| {
            view.rows
                .iter()
                .map(|row| {
                    let cells = visible
                        .iter()
                        .map(|column| match column.format {
                            Some(format) => format(row),
                            None => value_text(row.get(&column.key).unwrap_or(&Value::Null)),
                        })
                        .collect();
                    (row.clone(), cells)
                })
                .collect()
        })
        .unwrap_or_default();

    let (total_rows, page, page_count) = view
        .as_ref()
        .map(|v| (v.total_rows, v.page, v.page_count))
        .unwrap_or((0, 1, 0));
    let current_page_size = state.read().page_size();
    let range_start = if total_rows == 0 {
        0
    } else {
        (page - 1) * current_page_size + 1
    };
    let range_end = (page * current_page_size).min(total_rows);
    let has_actions = !actions.is_empty();

    rsx! {
        div {
            style: "position: relative; display: flex; flex-direction: column; border: 1px solid #ddd; border-radius: 8px; background: #fff;",

            div {
                style: "display: flex; justify-content: flex-end; gap: 8px; padding: 8px 12px; border-bottom: 1px solid #eee;",
                button {
                    style: "border: 1px solid #bbb; background: #fff; padding: 4px 10px; border-radius: 6px; cursor: pointer;",
                    onclick: move |_| {
                        let open = filters_open();
                        filters_open.set(!open);
                    },
                    "{filter_button_label}"
                }
                input {
                    r#type: "text",
                    placeholder: "Quick search",
                    value: "{search_value}",
                    oninput: move |event| {
                        state.write().set_search(event.value());
                    },
                }
            }

            if filters_open() {
                div {
                    style: "display: flex; flex-direction: column; gap: 8px; padding: 12px; border-bottom: 1px solid #eee; background: #fafafa;",
                    {staged.iter().enumerate().map(|(index, filter)| {
                        let current = filter.clone();
                        let key_options = column_options.clone();
                        let value_filter = current.clone();
                        rsx! {
                            div {
                                key: "{index}",
                                style: "display: flex; gap: 8px; align-items: center;",
                                select {
                                    value: "{current.key}",
                                    onchange: move |event| {
                                        let previous = state.read().staged_filters()[index].clone();
                                        state.write().set_filter(index, ColumnFilter {
                                            key: event.value(),
                                            ..previous
                                        });
                                    },
                                    option { value: "", "(column)" }
                                    {key_options.iter().map(|(key, label)| rsx! {
                                        option { key: "{key}", value: "{key}", "{label}" }
                                    })}
                                }
                                select {
                                    value: "{FilterMode::Contains.label()}",
                                    option { value: "{FilterMode::Contains.label()}", "{FilterMode::Contains.label()}" }
                                }
                                input {
                                    r#type: "text",
                                    placeholder: "Value",
                                    value: "{value_filter.value}",
                                    oninput: move |event| {
                                        let previous = state.read().staged_filters()[index].clone();
                                        state.write().set_filter(index, ColumnFilter {
                                            value: event.value(),
                                            ..previous
                                        });
                                    },
                                }
                                button {
                                    style: "border: none; background: transparent; cursor: pointer;",
                                    onclick: move |_| {
                                        state.write().remove_filter(index);
                                    },
                                    "✕"
                                }
                            }
                        }
                    })}
                    div {
                        style: "display: flex; justify-content: space-between; gap: 8px;",
                        button {
                            style: "border: 1px solid #bbb; background: #fff; padding: 4px 10px; border-radius: 6px; cursor: pointer;",
                            onclick: move |_| {
                                state.write().add_filter();
                            },
                            "+ Add filter"
                        }
                        div {
                            style: "display: flex; gap: 8px;",
                            button {
                                style: "border: 1px solid #bbb; background: #fff; padding: 4px 10px; border-radius: 6px; cursor: pointer;",
                                onclick: move |_| {
                                    state.write().clear_filters();
                                    filters_open.set(false);
                                },
                                "Reset filters"
                            }
                            button {
                                style: "border: 1px solid #2b6cb0; background: #2b6cb0; color: #fff; padding: 4px 10px; border-radius: 6px; cursor: pointer;",
                                onclick: move |_| {
                                    state.write().apply_filters();
                                    filters_open.set(false);
                                },
                                "Apply filters"
                            }
                        }
                    }
                }
            }

            div {
                style: "overflow-x: auto;",
                table {
                    style: "width: 100%; border-collapse: collapse; font-size: 14px;",
                    thead {
                        tr {
                            style: "background: #f1f3f5; text-align: left;",
                            {visible.iter().map(|column| {
                                let key = column.key.clone();
                                let sortable = column.sortable;
                                let indicator = match &sort_state {
                                    Some(spec) if spec.key == column.key => match spec.direction {
                                        SortDirection::Asc => " ↑",
                                        SortDirection::Desc => " ↓",
                                    },
                                    _ if sortable => " ↕",
                                    _ => "",
                                };
                                rsx! {
                                    th {
                                        key: "{column.key}",
                                        style: if sortable {
                                            "padding: 8px 12px; cursor: pointer; white-space: nowrap;"
                                        } else {
                                            "padding: 8px 12px; white-space: nowrap;"
                                        },
                                        onclick: move |_| {
                                            if sortable {
                                                state.write().toggle_sort(&key);
                                            }
                                        },
                                        "{column.label}{indicator}"
                                    }
                                }
                            })}
                            if has_actions {
                                th { style: "padding: 8px 12px;", "" }
                            }
                        }
                    }
                    tbody {
                        {rendered.iter().map(|(row, cells)| {
                            let row_key = value_text(row.get("id").unwrap_or(&Value::Null));
                            rsx! {
                                tr {
                                    key: "{row_key}",
                                    style: "border-top: 1px solid #eee;",
                                    {cells.iter().map(|cell| rsx! {
                                        td { style: "padding: 8px 12px;", "{cell}" }
                                    })}
                                    if has_actions {
                                        td {
                                            style: "padding: 4px 12px; white-space: nowrap;",
                                            {actions.iter().filter(|action| {
                                                action.when.map(|when| when(row)).unwrap_or(true)
                                            }).map(|action| {
                                                let action = *action;
                                                let row = row.clone();
                                                rsx! {
                                                    button {
                                                        key: "{action.id}",
                                                        style: "border: 1px solid #bbb; background: #fff; padding: 2px 8px; margin-right: 6px; border-radius: 6px; cursor: pointer;",
                                                        onclick: move |_| {
                                                            on_action.call((action.id, row.clone()));
                                                        },
                                                        "{action.label}"
                                                    }
                                                }
                                            })}
                                        }
                                    }
                                }
                            }
                        })}
                    }
                }
            }

            if total_rows == 0 && !is_loading {
                div {
                    style: "padding: 32px; text-align: center; color: #868e96;",
                    "No records"
                }
            }

            if is_loading {
                div {
                    style: "position: absolute; inset: 0; display: flex; align-items: center; justify-content: center; background: rgba(255,255,255,0.7); z-index: 20;",
                    "Loading…"
                }
            }

            if page_count > 0 {
                div {
                    style: "display: flex; justify-content: space-between; align-items: center; padding: 8px 12px; border-top: 1px solid #eee; font-size: 13px;",
                    select {
                        value: "{current_page_size}",
                        onchange: move |event| {
                            if let Ok(size) = event.value().parse::<usize>() {
                                state.write().set_page_size(size);
                            }
                        },
                        {PAGE_SIZE_OPTIONS.iter().map(|size| rsx! {
                            option { key: "{size}", value: "{size}", "{size} / page" }
                        })}
                    }
                    span { "{range_start} — {range_end} of {total_rows} items" }
                    div {
                        style: "display: flex; gap: 8px; align-items: center;",
                        button {
                            disabled: page <= 1,
                            style: "border: 1px solid #bbb; background: #fff; padding: 2px 8px; border-radius: 6px; cursor: pointer;",
                            onclick: move |_| {
                                let current = state.read().page();
                                state.write().set_page(current.saturating_sub(1));
                            },
                            "‹"
                        }
                        span { "page {page} of {page_count}" }
                        button {
                            disabled: page >= page_count,
                            style: "border: 1px solid #bbb; background: #fff; padding: 2px 8px; border-radius: 6px; cursor: pointer;",
                            onclick: move |_| {
                                let current = state.read().page();
                                state.write().set_page(current + 1);
                            },
                            "›"
                        }
                    }
                }
            }
        }
    }
}

/// Convenience for callers holding typed records.
pub fn grid_rows<T: serde::Serialize>(records: &[T]) -> Vec<Map<String, Value>> {
    to_rows(records)
}

/// Renders an RFC 3339 timestamp cell as a local date, leaving anything
/// unparseable as-is.
pub fn date_text(value: Option<&Value>) -> String {
    let raw = value.map(value_text).unwrap_or_default();
    if raw.is_empty() {
        return raw;
    }
    match DateTime::parse_from_rfc3339(&raw) {
        Ok(parsed) => parsed.format("%Y-%m-%d").to_string(),
        Err(_) => raw,
    }
}

/// Like [`date_text`] but keeps the time of day.
pub fn datetime_text(value: Option<&Value>) -> String {
    let raw = value.map(value_text).unwrap_or_default();
    if raw.is_empty() {
        return raw;
    }
    match DateTime::parse_from_rfc3339(&raw) {
        Ok(parsed) => parsed.format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn date_text_formats_rfc3339_and_passes_through_the_rest() {
        assert_eq!(
            date_text(Some(&json!("2024-05-01T10:30:00+00:00"))),
            "2024-05-01"
        );
        assert_eq!(date_text(Some(&json!("not a date"))), "not a date");
        assert_eq!(date_text(Some(&Value::Null)), "");
        assert_eq!(date_text(None), "");
    }

    #[test]
    fn datetime_text_keeps_the_time_component() {
        assert_eq!(
            datetime_text(Some(&json!("2024-05-01T10:30:00+00:00"))),
            "2024-05-01 10:30"
        );
    }
}
