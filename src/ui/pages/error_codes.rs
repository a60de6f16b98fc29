use std::collections::BTreeMap;

use dioxus::prelude::*;
use serde_json::{json, Map, Value};

use crate::domain::entities::config::ErrorCode;
use crate::domain::grid::ColumnSpec;
use crate::infra::api::client::{field_error_map, ApiError};
use crate::ui::components::form::{ErrorSummary, ModalShell, TextField};
use crate::ui::components::grid::{datetime_text, grid_rows, DataGrid, RowAction};
use crate::ui::state::app_state::{AppState, Session, ToastKind};
use crate::usecase::ability::{Action, Subject};
use crate::usecase::grid::value_text;

fn created_at_cell(row: &Map<String, Value>) -> String {
    datetime_text(row.get("created_at"))
}

/// Catalogue of backend error codes and the operator-facing message shown
/// for each. Codes are never deleted, only reworded.
#[component]
pub fn ErrorCodesPage() -> Element {
    let session = use_context::<Session>();
    let mut app = use_context::<AppState>();

    let api = session.api.clone();
    let epoch = app.data_epoch;
    let error_codes = use_resource(move || {
        let api = api.clone();
        let _ = epoch();
        async move { api.fetch_all::<ErrorCode>("errorCodes").await }
    });

    let mut modal_open = use_signal(|| false);
    let mut editing_id = use_signal(|| None::<i64>);
    let mut error_code = use_signal(String::new);
    let mut error_message = use_signal(String::new);
    let mut field_errors = use_signal(BTreeMap::<String, Vec<String>>::new);
    let mut summary = use_signal(Vec::<String>::new);
    let mut saving = use_signal(|| false);

    let snapshot = error_codes.read();
    let (rows, fetch_error) = match &*snapshot {
        None => (None, None),
        Some(Ok(items)) => (Some(grid_rows(items)), None),
        Some(Err(err)) => (Some(Vec::new()), Some(err.to_string())),
    };
    drop(snapshot);

    let can_create = session.ability.can(Action::Create, Subject::Management);
    let mut actions = Vec::new();
    if session.ability.can(Action::Update, Subject::Management) {
        actions.push(RowAction::new("edit", "Edit"));
    }

    let columns = vec![
        ColumnSpec::new("error_code", "Code"),
        ColumnSpec::new("error_message", "Message"),
        ColumnSpec::new("created_at", "Created").with_format(created_at_cell),
    ];

    let on_action = move |(action, row): (&'static str, Map<String, Value>)| {
        if action != "edit" {
            return;
        }
        editing_id.set(row.get("id").and_then(Value::as_i64));
        error_code.set(value_text(row.get("error_code").unwrap_or(&Value::Null)));
        error_message.set(value_text(row.get("error_message").unwrap_or(&Value::Null)));
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
            "error_code": error_code(),
            "error_message": error_message(),
        });
        let editing = editing_id();
        spawn(async move {
            let result: Result<ErrorCode, ApiError> = match editing {
                Some(id) => api.update(&format!("errorCodes/{id}"), &body).await,
                None => api.create("errorCodes", &body).await,
            };
            match result {
                Ok(saved) => {
                    app.notify(ToastKind::Info, format!("Saved error code {}", saved.error_code));
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
        "Edit error code"
    } else {
        "Add error code"
    };

    rsx! {
        div {
            style: "display: flex; justify-content: space-between; align-items: center; margin-bottom: 12px;",
            h2 { style: "margin: 0;", "Error codes" }
            if can_create {
                button {
                    style: "border: 1px solid #2b6cb0; background: #2b6cb0; color: #fff; padding: 6px 12px; border-radius: 6px; cursor: pointer;",
                    onclick: move |_| {
                        editing_id.set(None);
                        error_code.set(String::new());
                        error_message.set(String::new());
                        field_errors.set(BTreeMap::new());
                        summary.set(Vec::new());
                        modal_open.set(true);
                    },
                    "+ Add error code"
                }
            }
        }

        if let Some(error) = fetch_error {
            ErrorSummary { title: "Failed to load error codes".to_string(), messages: vec![error] }
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
                    label: "Error code",
                    value: error_code(),
                    required: true,
                    errors: field_errors().get("error_code").cloned().unwrap_or_default(),
                    on_input: move |value| error_code.set(value),
                }
                TextField {
                    label: "Error message",
                    value: error_message(),
                    required: true,
                    errors: field_errors().get("error_message").cloned().unwrap_or_default(),
                    on_input: move |value| error_message.set(value),
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
