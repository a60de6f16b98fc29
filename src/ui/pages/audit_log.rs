use dioxus::prelude::*;
use serde_json::{Map, Value};

use crate::domain::entities::audit::AuditEntry;
use crate::domain::grid::ColumnSpec;
use crate::ui::components::form::ErrorSummary;
use crate::ui::components::grid::{datetime_text, grid_rows, DataGrid};
use crate::ui::state::app_state::{AppState, Session};

const FIXED_KEYS: [&str; 4] = ["created_at", "transaction", "username", "serial"];

fn created_at_cell(row: &Map<String, Value>) -> String {
    datetime_text(row.get("created_at"))
}

/// Read-only voucher history. The snapshot part of each entry varies with
/// backend version, so its columns are derived from the data itself.
#[component]
pub fn AuditLogPage() -> Element {
    let session = use_context::<Session>();
    let app = use_context::<AppState>();

    let api = session.api.clone();
    let epoch = app.data_epoch;
    let entries = use_resource(move || {
        let api = api.clone();
        let _ = epoch();
        async move { api.fetch_all::<AuditEntry>("voucher-history").await }
    });

    let snapshot = entries.read();
    let (rows, fetch_error) = match &*snapshot {
        None => (None, None),
        Some(Ok(items)) => (Some(grid_rows(items)), None),
        Some(Err(err)) => (Some(Vec::new()), Some(err.to_string())),
    };
    drop(snapshot);

    let mut columns = vec![
        ColumnSpec::new("created_at", "When").with_format(created_at_cell),
        ColumnSpec::new("transaction", "Transaction"),
        ColumnSpec::new("username", "User"),
        ColumnSpec::new("serial", "Serial"),
    ];
    if let Some(rows) = &rows {
        if let Some(first) = rows.first() {
            for key in first.keys() {
                if !FIXED_KEYS.contains(&key.as_str()) {
                    columns.push(ColumnSpec::new(key.clone(), key.clone()));
                }
            }
        }
    }

    rsx! {
        h2 { style: "margin: 0 0 12px;", "Audit log" }

        if let Some(error) = fetch_error {
            ErrorSummary { title: "Failed to load voucher history".to_string(), messages: vec![error] }
        }

        DataGrid {
            columns,
            rows,
            page_size: 25_usize,
        }
    }
}
