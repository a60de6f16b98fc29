use std::collections::BTreeMap;

use dioxus::prelude::*;
use serde_json::{json, Map, Value};

use crate::domain::entities::product::Product;
use crate::domain::entities::voucher::VoucherType;
use crate::domain::grid::ColumnSpec;
use crate::infra::api::client::{field_error_map, ApiError};
use crate::ui::components::form::{ErrorSummary, ModalShell, TextField};
use crate::ui::components::grid::{datetime_text, grid_rows, DataGrid, RowAction};
use crate::ui::state::app_state::{AppState, Session, ToastKind};
use crate::usecase::ability::{Action, Subject};
use crate::usecase::grid::value_text;

fn status_cell(row: &Map<String, Value>) -> String {
    let active = matches!(row.get("status"), Some(Value::Number(n)) if n.as_i64().unwrap_or(0) != 0);
    if active { "Active" } else { "Inactive" }.to_string()
}

fn created_at_cell(row: &Map<String, Value>) -> String {
    datetime_text(row.get("created_at"))
}

#[component]
pub fn VoucherTypesPage() -> Element {
    let session = use_context::<Session>();
    let mut app = use_context::<AppState>();

    let api = session.api.clone();
    let epoch = app.data_epoch;
    let voucher_types = use_resource(move || {
        let api = api.clone();
        let _ = epoch();
        async move { api.fetch_all::<VoucherType>("voucherType").await }
    });
    let api_products = session.api.clone();
    let products = use_resource(move || {
        let api = api_products.clone();
        async move { api.fetch_all::<Product>("product").await }
    });

    let mut modal_open = use_signal(|| false);
    let mut editing_id = use_signal(|| None::<i64>);
    let mut voucher_code = use_signal(String::new);
    let mut voucher_name = use_signal(String::new);
    let mut product_id = use_signal(String::new);
    let mut active = use_signal(|| true);
    let mut field_errors = use_signal(BTreeMap::<String, Vec<String>>::new);
    let mut summary = use_signal(Vec::<String>::new);
    let mut saving = use_signal(|| false);

    // Product list doubles as the dropdown source and a lookup table for
    // showing the product name instead of its numeric id in the grid.
    let product_options: Vec<(i64, String)> = products
        .read()
        .as_ref()
        .and_then(|result| result.as_ref().ok())
        .map(|items| {
            items
                .iter()
                .map(|product| (product.id, product.display_label()))
                .collect()
        })
        .unwrap_or_default();
    let product_names: BTreeMap<i64, String> = product_options.iter().cloned().collect();

    let snapshot = voucher_types.read();
    let (rows, fetch_error) = match &*snapshot {
        None => (None, None),
        Some(Ok(items)) => {
            let mut rows = grid_rows(items);
            for row in &mut rows {
                let name = row
                    .get("product_id")
                    .and_then(Value::as_i64)
                    .and_then(|id| product_names.get(&id).cloned())
                    .unwrap_or_default();
                row.insert("product_name".to_string(), Value::String(name));
            }
            (Some(rows), None)
        }
        Some(Err(err)) => (Some(Vec::new()), Some(err.to_string())),
    };
    drop(snapshot);

    let can_create = session.ability.can(Action::Create, Subject::Management);
    let mut actions = Vec::new();
    if session.ability.can(Action::Update, Subject::Management) {
        actions.push(RowAction::new("edit", "Edit"));
    }

    let columns = vec![
        ColumnSpec::new("voucher_code", "Voucher code"),
        ColumnSpec::new("voucher_name", "Voucher name"),
        ColumnSpec::new("product_name", "Product"),
        ColumnSpec::new("status", "Status").with_format(status_cell),
        ColumnSpec::new("created_at", "Created").with_format(created_at_cell),
    ];

    let on_action = move |(action, row): (&'static str, Map<String, Value>)| {
        if action != "edit" {
            return;
        }
        editing_id.set(row.get("id").and_then(Value::as_i64));
        voucher_code.set(value_text(row.get("voucher_code").unwrap_or(&Value::Null)));
        voucher_name.set(value_text(row.get("voucher_name").unwrap_or(&Value::Null)));
        product_id.set(value_text(row.get("product_id").unwrap_or(&Value::Null)));
        active.set(matches!(row.get("status"), Some(Value::Number(n)) if n.as_i64().unwrap_or(0) != 0));
        field_errors.set(BTreeMap::new());
        summary.set(Vec::new());
        modal_open.set(true);
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
        let body = json!({
            "voucher_code": voucher_code(),
            "voucher_name": voucher_name(),
            "product_id": product_id().parse::<i64>().ok(),
            "status": if active() { 1 } else { 0 },
        });
        let editing = editing_id();
        spawn(async move {
            let result: Result<VoucherType, ApiError> = match editing {
                Some(id) => api.update(&format!("voucherType/{id}"), &body).await,
                None => api.create("voucherType", &body).await,
            };
            match result {
                Ok(saved) => {
                    app.notify(ToastKind::Info, format!("Saved voucher type {}", saved.voucher_code));
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

    let modal_title = if editing_id().is_some() {
        "Edit voucher type"
    } else {
        "Add voucher type"
    };
    let selected_product = product_id();
    let status_value = if active() { "1" } else { "0" };

    rsx! {
        div {
            style: "display: flex; justify-content: space-between; align-items: center; margin-bottom: 12px;",
            h2 { style: "margin: 0;", "Voucher types" }
            if can_create {
                button {
                    style: "border: 1px solid #2b6cb0; background: #2b6cb0; color: #fff; padding: 6px 12px; border-radius: 6px; cursor: pointer;",
                    onclick: move |_| {
                        editing_id.set(None);
                        voucher_code.set(String::new());
                        voucher_name.set(String::new());
                        product_id.set(String::new());
                        active.set(true);
                        field_errors.set(BTreeMap::new());
                        summary.set(Vec::new());
                        modal_open.set(true);
                    },
                    "+ Add voucher type"
                }
            }
        }

        if let Some(error) = fetch_error {
            ErrorSummary { title: "Failed to load voucher types".to_string(), messages: vec![error] }
        }

        DataGrid {
            columns,
            rows,
            page_size: 25_usize,
            actions,
            on_action,
        }

        if modal_open() {
            ModalShell {
                title: modal_title.to_string(),
                on_close: move |_| modal_open.set(false),
                ErrorSummary { messages: summary() }
                TextField {
                    label: "Voucher code",
                    value: voucher_code(),
                    required: true,
                    errors: field_errors().get("voucher_code").cloned().unwrap_or_default(),
                    on_input: move |value| voucher_code.set(value),
                }
                TextField {
                    label: "Voucher name",
                    value: voucher_name(),
                    required: true,
                    errors: field_errors().get("voucher_name").cloned().unwrap_or_default(),
                    on_input: move |value| voucher_name.set(value),
                }
                div {
                    style: "display: flex; flex-direction: column; gap: 4px; margin-bottom: 10px;",
                    label { style: "font-size: 13px; font-weight: 600;", "Product *" }
                    select {
                        style: "border: 1px solid #ccc; border-radius: 6px; padding: 6px 8px;",
                        value: "{selected_product}",
                        onchange: move |event| product_id.set(event.value()),
                        option { value: "", "(select a product)" }
                        {product_options.iter().map(|(id, label)| rsx! {
                            option { key: "{id}", value: "{id}", "{label}" }
                        })}
                    }
                    {field_errors().get("product_id").cloned().unwrap_or_default().iter().map(|error| rsx! {
                        span { key: "{error}", style: "color: #c92a2a; font-size: 12px;", "{error}" }
                    })}
                }
                div {
                    style: "display: flex; flex-direction: column; gap: 4px; margin-bottom: 10px;",
                    label { style: "font-size: 13px; font-weight: 600;", "Status" }
                    select {
                        style: "border: 1px solid #ccc; border-radius: 6px; padding: 6px 8px;",
                        value: "{status_value}",
                        onchange: move |event| active.set(event.value() == "1"),
                        option { value: "1", "Active" }
                        option { value: "0", "Inactive" }
                    }
                }
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
