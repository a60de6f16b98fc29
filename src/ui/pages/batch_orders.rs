use dioxus::prelude::*;
use serde_json::{Map, Value};

use crate::app::Route;
use crate::domain::entities::batch::BatchOrder;
use crate::domain::grid::ColumnSpec;
use crate::ui::components::form::ErrorSummary;
use crate::ui::components::grid::{date_text, datetime_text, grid_rows, DataGrid, RowAction};
use crate::ui::state::app_state::{AppState, Session};
use crate::usecase::grid::value_text;

fn expiry_date_cell(row: &Map<String, Value>) -> String {
    date_text(row.get("expiry_date"))
}

fn created_at_cell(row: &Map<String, Value>) -> String {
    datetime_text(row.get("created_at"))
}

/// Read-only list of past batch orders. The only action drills into the
/// vouchers screen pre-filtered to the chosen batch.
#[component]
pub fn BatchOrdersPage() -> Element {
    let session = use_context::<Session>();
    let app = use_context::<AppState>();

    let api = session.api.clone();
    let epoch = app.data_epoch;
    let orders = use_resource(move || {
        let api = api.clone();
        let _ = epoch();
        async move { api.fetch_all::<BatchOrder>("batchOrder").await }
    });

    let snapshot = orders.read();
    let (rows, fetch_error) = match &*snapshot {
        None => (None, None),
        Some(Ok(items)) => (Some(grid_rows(items)), None),
        Some(Err(err)) => (Some(Vec::new()), Some(err.to_string())),
    };
    drop(snapshot);

    let columns = vec![
        ColumnSpec::new("batch_id", "Batch ID"),
        ColumnSpec::new("product_id", "Product ID"),
        ColumnSpec::new("batch_count", "Ordered"),
        ColumnSpec::new("available_voucher_count", "Available"),
        ColumnSpec::new("threshold_alert", "Alert threshold"),
        ColumnSpec::new("expiry_date", "Expiry date").with_format(expiry_date_cell),
        ColumnSpec::new("created_at", "Created").with_format(created_at_cell),
    ];
    let actions = vec![RowAction::new("view", "View vouchers")];

    let on_action = move |(action, row): (&'static str, Map<String, Value>)| {
        if action != "view" {
            return;
        }
        let batch_id = value_text(row.get("batch_id").unwrap_or(&Value::Null));
        navigator().push(Route::Vouchers {
            q: String::new(),
            batch_id,
        });
    };

    rsx! {
        h2 { style: "margin: 0 0 12px;", "Batch orders" }

        if let Some(error) = fetch_error {
            ErrorSummary { title: "Failed to load batch orders".to_string(), messages: vec![error] }
        }

        DataGrid {
            columns,
            rows,
            page_size: 25_usize,
            actions,
            on_action,
        }
    }
}
