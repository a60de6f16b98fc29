use std::collections::BTreeMap;

use dioxus::prelude::*;
use serde_json::{json, Map, Value};

use crate::domain::entities::product::Product;
use crate::domain::entities::voucher::Voucher;
use crate::domain::grid::{ColumnFilter, ColumnSpec};
use crate::infra::api::client::{field_error_map, ApiError};
use crate::ui::components::form::{ErrorSummary, ModalShell, TextField};
use crate::ui::components::grid::{date_text, datetime_text, grid_rows, DataGrid, RowAction};
use crate::ui::state::app_state::{AppState, Session, ToastKind};
use crate::usecase::ability::{Action, Subject};
use crate::usecase::grid::value_text;

/// Wire names of the free-text voucher fields, in form display order.
const TEXT_FIELDS: [(&str, &str, bool); 10] = [
    ("serial", "Serial", true),
    ("PUK", "PUK", true),
    ("expire_date", "Expiry date", false),
    ("IMEI", "IMEI", false),
    ("SIMNarrative", "SIM narrative", false),
    ("SIMNo", "SIM number", false),
    ("PCN", "PCN", false),
    ("IMSI", "IMSI", false),
    ("service_reference", "Service reference", false),
    ("business_unit", "Business unit", false),
];

fn expire_date_cell(row: &Map<String, Value>) -> String {
    date_text(row.get("expire_date"))
}

fn created_at_cell(row: &Map<String, Value>) -> String {
    datetime_text(row.get("created_at"))
}

/// Blank until the record has actually been updated after creation.
fn updated_at_cell(row: &Map<String, Value>) -> String {
    if row.get("created_at") == row.get("updated_at") {
        return String::new();
    }
    datetime_text(row.get("updated_at"))
}

fn status_cell(row: &Map<String, Value>) -> String {
    if row_is_available(row) { "Active" } else { "Inactive" }.to_string()
}

/// "No" while the voucher is live, otherwise the depletion date when the
/// backend recorded one.
fn depleted_cell(row: &Map<String, Value>) -> String {
    if row_is_available(row) {
        return "No".to_string();
    }
    let deplete_date = date_text(row.get("deplete_date"));
    if deplete_date.is_empty() {
        "Yes".to_string()
    } else {
        deplete_date
    }
}

fn row_is_available(row: &Map<String, Value>) -> bool {
    matches!(row.get("available"), Some(Value::Number(n)) if n.as_i64().unwrap_or(0) != 0)
}

fn row_is_unavailable(row: &Map<String, Value>) -> bool {
    !row_is_available(row)
}

/// The vouchers screen. `q` pre-fills the quick search (used by the
/// batch-upload conflict links); `batch_id` arrives pre-applied as a
/// filter from the batch-orders screen.
#[component]
pub fn VouchersPage(q: String, batch_id: String) -> Element {
    let session = use_context::<Session>();
    let mut app = use_context::<AppState>();

    let api = session.api.clone();
    let epoch = app.data_epoch;
    let vouchers = use_resource(move || {
        let api = api.clone();
        let _ = epoch();
        async move { api.fetch_all::<Voucher>("getAllVouchers").await }
    });
    let api_products = session.api.clone();
    let products = use_resource(move || {
        let api = api_products.clone();
        async move { api.fetch_all::<Product>("product").await }
    });

    let mut modal_open = use_signal(|| false);
    let mut editing_id = use_signal(|| None::<i64>);
    let mut form = use_signal(BTreeMap::<String, String>::new);
    let mut field_errors = use_signal(BTreeMap::<String, Vec<String>>::new);
    let mut summary = use_signal(Vec::<String>::new);
    let mut saving = use_signal(|| false);

    let snapshot = vouchers.read();
    let (rows, fetch_error) = match &*snapshot {
        None => (None, None),
        Some(Ok(items)) => (Some(grid_rows(items)), None),
        Some(Err(err)) => (Some(Vec::new()), Some(err.to_string())),
    };
    drop(snapshot);

    let product_options: Vec<(i64, String)> = products
        .read()
        .as_ref()
        .and_then(|result| result.as_ref().ok())
        .map(|items| {
            items
                .iter()
                .filter(|product| product.is_active())
                .map(|product| (product.id, product.display_label()))
                .collect()
        })
        .unwrap_or_default();

    let can_modify = session.ability.can(Action::Update, Subject::Voucher);
    let can_create = session.ability.can(Action::Create, Subject::Voucher);
    let mut actions = Vec::new();
    if can_modify {
        actions.push(RowAction::new("edit", "Edit"));
        actions.push(RowAction::new("deactivate", "Deactivate").only_when(row_is_available));
        actions.push(RowAction::new("activate", "Activate").only_when(row_is_unavailable));
    }

    let columns = vec![
        ColumnSpec::new("batch_id", "Batch ID"),
        ColumnSpec::new("serial", "Serial"),
        ColumnSpec::new("product_code", "Product code"),
        ColumnSpec::new("expire_date", "Expiry date").with_format(expire_date_cell),
        ColumnSpec::new("deplete_date", "Depleted").with_format(depleted_cell),
        ColumnSpec::new("value", "Value"),
        ColumnSpec::new("service_reference", "Service reference"),
        ColumnSpec::new("business_unit", "Business unit"),
        ColumnSpec::new("IMEI", "IMEI"),
        ColumnSpec::new("SIMNarrative", "Narrative"),
        ColumnSpec::new("SIMNo", "SIM number"),
        ColumnSpec::new("IMSI", "IMSI"),
        ColumnSpec::new("PUK", "PUK"),
        ColumnSpec::new("available", "Status").with_format(status_cell),
        ColumnSpec::new("created_at", "Created").with_format(created_at_cell),
        ColumnSpec::new("updated_at", "Updated").with_format(updated_at_cell),
    ];

    let api_for_actions = session.api.clone();
    let on_action = move |(action, row): (&'static str, Map<String, Value>)| match action {
        "edit" => {
            let mut values = BTreeMap::new();
            for (key, _, _) in TEXT_FIELDS {
                values.insert(key.to_string(), value_text(row.get(key).unwrap_or(&Value::Null)));
            }
            values.insert(
                "value".to_string(),
                value_text(row.get("value").unwrap_or(&Value::Null)),
            );
            values.insert(
                "product_id".to_string(),
                value_text(row.get("product_id").unwrap_or(&Value::Null)),
            );
            form.set(values);
            editing_id.set(row.get("id").and_then(Value::as_i64));
            field_errors.set(BTreeMap::new());
            summary.set(Vec::new());
            modal_open.set(true);
        }
        "activate" | "deactivate" => {
            let serial = value_text(row.get("serial").unwrap_or(&Value::Null));
            let path = if action == "activate" {
                format!("setActive/{serial}")
            } else {
                format!("setInactive/{serial}")
            };
            let api = api_for_actions.clone();
            let mut app = app;
            spawn(async move {
                match api.toggle::<Voucher>(&path).await {
                    Ok(updated) => {
                        let state = if updated.is_available() { "activated" } else { "deactivated" };
                        app.notify(ToastKind::Info, format!("Voucher {serial} {state}"));
                        app.invalidate_data();
                    }
                    Err(err) => app.notify(ToastKind::Error, err.to_string()),
                }
            });
        }
        _ => {}
    };

    let api_for_save = session.api.clone();
    let save = move |_| {
        if saving() {
            return;
        }
        saving.set(true);
        field_errors.set(BTreeMap::new());
        summary.set(Vec::new());
        let api = api_for_save.clone();
        let mut app = app;
        let values = form();
        let mut body = Map::new();
        for (key, _, _) in TEXT_FIELDS {
            let text = values.get(key).cloned().unwrap_or_default();
            body.insert(key.to_string(), json!(text));
        }
        let value_number: f64 = values
            .get("value")
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0.0);
        body.insert("value".to_string(), json!(value_number));
        let product_id = values.get("product_id").and_then(|raw| raw.parse::<i64>().ok());
        body.insert("product_id".to_string(), json!(product_id));
        let editing = editing_id();
        spawn(async move {
            let body = Value::Object(body);
            let result: Result<Voucher, ApiError> = match editing {
                Some(id) => api.update(&format!("editVoucher/{id}"), &body).await,
                None => api.create("createVoucher", &body).await,
            };
            match result {
                Ok(saved) => {
                    app.notify(ToastKind::Info, format!("Saved voucher {}", saved.serial));
                    app.invalidate_data();
                    modal_open.set(false);
                }
                Err(ApiError::Validation { message, errors }) => {
                    summary.set(vec![message]);
                    field_errors.set(field_error_map(&errors));
                }
                Err(err) => app.notify(ToastKind::Error, err.to_string()),
            }
            saving.set(false);
        });
    };

    let initial_search = (!q.is_empty()).then(|| q.clone());
    let initial_filters = if batch_id.is_empty() {
        Vec::new()
    } else {
        vec![ColumnFilter::contains("batch_id", batch_id.clone())]
    };
    let modal_title = if editing_id().is_some() {
        "Edit voucher"
    } else {
        "Add voucher"
    };
    let selected_product = form().get("product_id").cloned().unwrap_or_default();

    rsx! {
        div {
            style: "display: flex; justify-content: space-between; align-items: center; margin-bottom: 12px;",
            h2 { style: "margin: 0;", "Vouchers" }
            if can_create {
                button {
                    style: "border: 1px solid #2b6cb0; background: #2b6cb0; color: #fff; padding: 6px 12px; border-radius: 6px; cursor: pointer;",
                    onclick: move |_| {
                        form.set(BTreeMap::new());
                        editing_id.set(None);
                        field_errors.set(BTreeMap::new());
                        summary.set(Vec::new());
                        modal_open.set(true);
                    },
                    "+ Add voucher"
                }
            }
        }

        if let Some(error) = fetch_error {
            ErrorSummary { title: "Failed to load vouchers".to_string(), messages: vec![error] }
        }

        DataGrid {
            columns,
            rows,
            page_size: 25_usize,
            initial_search,
            initial_filters,
            actions,
            on_action,
        }

        if modal_open() {
            ModalShell {
                title: modal_title.to_string(),
                on_close: move |_| modal_open.set(false),
                ErrorSummary { messages: summary() }

                div {
                    style: "display: flex; flex-direction: column; gap: 4px; margin-bottom: 10px;",
                    label { style: "font-size: 13px; font-weight: 600;", "Product" }
                    select {
                        style: "border: 1px solid #ccc; border-radius: 6px; padding: 6px 8px;",
                        value: "{selected_product}",
                        onchange: move |event| {
                            form.write().insert("product_id".to_string(), event.value());
                        },
                        option { value: "", "(no product)" }
                        {product_options.iter().map(|(id, label)| rsx! {
                            option { key: "{id}", value: "{id}", "{label}" }
                        })}
                    }
                    {field_errors().get("product_id").cloned().unwrap_or_default().iter().map(|error| rsx! {
                        span { key: "{error}", style: "color: #c92a2a; font-size: 12px;", "{error}" }
                    })}
                }

                TextField {
                    label: "Value",
                    value: form().get("value").cloned().unwrap_or_default(),
                    errors: field_errors().get("value").cloned().unwrap_or_default(),
                    on_input: move |value: String| {
                        form.write().insert("value".to_string(), value);
                    },
                }

                {TEXT_FIELDS.iter().map(|(key, label, required)| {
                    let key = key.to_string();
                    let input_key = key.clone();
                    rsx! {
                        TextField {
                            key: "{key}",
                            label: label.to_string(),
                            value: form().get(&key).cloned().unwrap_or_default(),
                            required: *required,
                            errors: field_errors().get(&key).cloned().unwrap_or_default(),
                            on_input: move |value: String| {
                                form.write().insert(input_key.clone(), value);
                            },
                        }
                    }
                })}

                div {
                    style: "display: flex; justify-content: flex-end; gap: 8px; margin-top: 12px;",
                    button {
                        style: "border: 1px solid #bbb; background: #fff; padding: 6px 12px; border-radius: 6px; cursor: pointer;",
                        onclick: move |_| modal_open.set(false),
                        "Cancel"
                    }
                    button {
                        disabled: saving(),
                        style: "border: 1px solid #2b6cb0; background: #2b6cb0; color: #fff; padding: 6px 12px; border-radius: 6px; cursor: pointer;",
                        onclick: save,
                        "Save"
                    }
                }
            }
        }
    }
}
