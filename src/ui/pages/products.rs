use std::collections::BTreeMap;

use dioxus::prelude::*;
use rfd::{MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use serde_json::{json, Map, Value};

use crate::domain::entities::product::Product;
use crate::domain::grid::ColumnSpec;
use crate::infra::api::client::{field_error_map, ApiError};
use crate::ui::components::form::{ErrorSummary, ModalShell, TextField};
use crate::ui::components::grid::{date_text, grid_rows, DataGrid, RowAction};
use crate::ui::state::app_state::{AppState, Session, ToastKind};
use crate::usecase::ability::{Action, Subject};
use crate::usecase::grid::value_text;

fn created_at_cell(row: &Map<String, Value>) -> String {
    date_text(row.get("created_at"))
}

#[component]
pub fn ProductsPage() -> Element {
    let session = use_context::<Session>();
    let mut app = use_context::<AppState>();

    let api = session.api.clone();
    let epoch = app.data_epoch;
    let products = use_resource(move || {
        let api = api.clone();
        let _ = epoch();
        async move { api.fetch_all::<Product>("product").await }
    });

    let mut modal_open = use_signal(|| false);
    let mut editing_code = use_signal(|| None::<String>);
    let mut product_code = use_signal(String::new);
    let mut product_type = use_signal(String::new);
    let mut product_name = use_signal(String::new);
    let mut supplier = use_signal(String::new);
    let mut field_errors = use_signal(BTreeMap::<String, Vec<String>>::new);
    let mut summary = use_signal(Vec::<String>::new);
    let mut saving = use_signal(|| false);

    let snapshot = products.read();
    let (rows, fetch_error) = match &*snapshot {
        None => (None, None),
        Some(Ok(items)) => (Some(grid_rows(items)), None),
        Some(Err(err)) => (Some(Vec::new()), Some(err.to_string())),
    };
    drop(snapshot);

    let can_create = session.ability.can(Action::Create, Subject::Product);
    let mut actions = Vec::new();
    if session.ability.can(Action::Update, Subject::Product) {
        actions.push(RowAction::new("edit", "Edit"));
    }
    if session.ability.can(Action::Delete, Subject::Product) {
        actions.push(RowAction::new("delete", "Delete"));
    }

    let columns = vec![
        ColumnSpec::new("product_code", "Product code"),
        ColumnSpec::new("product_type", "Product type"),
        ColumnSpec::new("product_name", "Product name"),
        ColumnSpec::new("supplier", "Supplier"),
        ColumnSpec::new("created_at", "Created").with_format(created_at_cell),
    ];

    let api_for_actions = session.api.clone();
    let on_action = move |(action, row): (&'static str, Map<String, Value>)| match action {
        "edit" => {
            editing_code.set(Some(value_text(row.get("product_code").unwrap_or(&Value::Null))));
            product_code.set(value_text(row.get("product_code").unwrap_or(&Value::Null)));
            product_type.set(value_text(row.get("product_type").unwrap_or(&Value::Null)));
            product_name.set(value_text(row.get("product_name").unwrap_or(&Value::Null)));
            supplier.set(value_text(row.get("supplier").unwrap_or(&Value::Null)));
            field_errors.set(BTreeMap::new());
            summary.set(Vec::new());
            modal_open.set(true);
        }
        "delete" => {
            let code = value_text(row.get("product_code").unwrap_or(&Value::Null));
            let confirmed = MessageDialog::new()
                .set_level(MessageLevel::Warning)
                .set_title("Delete product")
                .set_description(format!("Delete product {code}? This cannot be undone."))
                .set_buttons(MessageButtons::YesNo)
                .show()
                == MessageDialogResult::Yes;
            if !confirmed {
                return;
            }
            let api = api_for_actions.clone();
            let mut app = app;
            spawn(async move {
                match api.delete(&format!("product/{code}")).await {
                    Ok(()) => {
                        app.notify(ToastKind::Info, format!("Deleted product {code}"));
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
        let body = json!({
            "product_code": product_code(),
            "product_type": product_type(),
            "product_name": product_name(),
            "supplier": supplier(),
        });
        let editing = editing_code();
        spawn(async move {
            let result: Result<Product, ApiError> = match &editing {
                Some(code) => api.update(&format!("product/{code}"), &body).await,
                None => api.create("product", &body).await,
            };
            match result {
                Ok(saved) => {
                    app.notify(ToastKind::Info, format!("Saved product {}", saved.product_code));
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

    let modal_title = if editing_code().is_some() {
        "Edit product"
    } else {
        "Add product"
    };

    rsx! {
        div {
            style: "display: flex; justify-content: space-between; align-items: center; margin-bottom: 12px;",
            h2 { style: "margin: 0;", "Products" }
            if can_create {
                button {
                    style: "border: 1px solid #2b6cb0; background: #2b6cb0; color: #fff; padding: 6px 12px; border-radius: 6px; cursor: pointer;",
                    onclick: move |_| {
                        editing_code.set(None);
                        product_code.set(String::new());
                        product_type.set(String::new());
                        product_name.set(String::new());
                        supplier.set(String::new());
                        field_errors.set(BTreeMap::new());
                        summary.set(Vec::new());
                        modal_open.set(true);
                    },
                    "+ Add product"
                }
            }
        }

        if let Some(error) = fetch_error {
            ErrorSummary { title: "Failed to load products".to_string(), messages: vec![error] }
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
                    label: "Product code",
                    value: product_code(),
                    required: true,
                    errors: field_errors().get("product_code").cloned().unwrap_or_default(),
                    on_input: move |value| product_code.set(value),
                }
                TextField {
                    label: "Product type",
                    value: product_type(),
                    errors: field_errors().get("product_type").cloned().unwrap_or_default(),
                    on_input: move |value| product_type.set(value),
                }
                TextField {
                    label: "Product name",
                    value: product_name(),
                    required: true,
                    errors: field_errors().get("product_name").cloned().unwrap_or_default(),
                    on_input: move |value| product_name.set(value),
                }
                TextField {
                    label: "Supplier",
                    value: supplier(),
                    errors: field_errors().get("supplier").cloned().unwrap_or_default(),
                    on_input: move |value| supplier.set(value),
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
