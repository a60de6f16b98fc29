use std::collections::BTreeMap;

use dioxus::prelude::*;
use rfd::{MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use serde_json::{json, Map, Value};

use crate::domain::entities::config::{EmailConfiguration, EmailRecipient};
use crate::domain::grid::ColumnSpec;
use crate::infra::api::client::{field_error_map, ApiError};
use crate::ui::components::form::{ErrorSummary, ModalShell, TextField};
use crate::ui::components::grid::{grid_rows, DataGrid, RowAction};
use crate::ui::state::app_state::{AppState, Session, ToastKind};
use crate::usecase::ability::{Action, Subject};
use crate::usecase::grid::value_text;

const INTERVAL_OPTIONS: [i64; 5] = [15, 30, 60, 120, 1440];

/// Low-stock alerting: the digest interval plus the recipient list.
#[component]
pub fn AlertEmailsPage() -> Element {
    let session = use_context::<Session>();
    let mut app = use_context::<AppState>();

    let api = session.api.clone();
    let epoch = app.data_epoch;
    let configurations = use_resource(move || {
        let api = api.clone();
        let _ = epoch();
        async move {
            api.fetch_all::<EmailConfiguration>("alertEmailConfigurationPrivate")
                .await
        }
    });
    let api_recipients = session.api.clone();
    let recipients = use_resource(move || {
        let api = api_recipients.clone();
        let _ = epoch();
        async move { api.fetch_all::<EmailRecipient>("alertEmailGroup").await }
    });

    let mut modal_open = use_signal(|| false);
    let mut editing_id = use_signal(|| None::<i64>);
    let mut name = use_signal(String::new);
    let mut email = use_signal(String::new);
    let mut field_errors = use_signal(BTreeMap::<String, Vec<String>>::new);
    let mut summary = use_signal(Vec::<String>::new);
    let mut saving = use_signal(|| false);

    let interval = configurations
        .read()
        .as_ref()
        .and_then(|result| result.as_ref().ok())
        .and_then(|items| {
            items
                .iter()
                .find(|config| config.configuration_name == "alert_interval")
                .cloned()
        });

    let snapshot = recipients.read();
    let (rows, fetch_error) = match &*snapshot {
        None => (None, None),
        Some(Ok(items)) => (Some(grid_rows(items)), None),
        Some(Err(err)) => (Some(Vec::new()), Some(err.to_string())),
    };
    drop(snapshot);

    let can_modify = session.ability.can(Action::Update, Subject::Management);
    let mut actions = Vec::new();
    if can_modify {
        actions.push(RowAction::new("edit", "Edit"));
        actions.push(RowAction::new("delete", "Delete"));
    }

    let columns = vec![
        ColumnSpec::new("name", "Name"),
        ColumnSpec::new("email", "E-mail"),
    ];

    let api_for_interval = session.api.clone();
    let interval_for_change = interval.clone();
    let on_interval_change = move |event: Event<FormData>| {
        let Some(config) = interval_for_change.clone() else {
            return;
        };
        let Ok(minutes) = event.value().parse::<i64>() else {
            return;
        };
        let api = api_for_interval.clone();
        let mut app = app;
        spawn(async move {
            let body = json!({
                "configuration_name": config.configuration_name,
                "configuration_value": minutes,
            });
            let result: Result<EmailConfiguration, ApiError> = api
                .update(&format!("alertEmailConfiguration/{}", config.id), &body)
                .await;
            match result {
                Ok(_) => {
                    app.notify(ToastKind::Info, format!("Alert interval set to {minutes} minutes"));
                    app.invalidate_data();
                }
                Err(err) => app.notify(ToastKind::Error, err.to_string()),
            }
        });
    };

    let api_for_actions = session.api.clone();
    let on_action = move |(action, row): (&'static str, Map<String, Value>)| match action {
        "edit" => {
            editing_id.set(row.get("id").and_then(Value::as_i64));
            name.set(value_text(row.get("name").unwrap_or(&Value::Null)));
            email.set(value_text(row.get("email").unwrap_or(&Value::Null)));
            field_errors.set(BTreeMap::new());
            summary.set(Vec::new());
            modal_open.set(true);
        }
        "delete" => {
            let Some(id) = row.get("id").and_then(Value::as_i64) else {
                return;
            };
            let address = value_text(row.get("email").unwrap_or(&Value::Null));
            let confirmed = MessageDialog::new()
                .set_level(MessageLevel::Warning)
                .set_title("Remove recipient")
                .set_description(format!("Stop sending alerts to {address}?"))
                .set_buttons(MessageButtons::YesNo)
                .show()
                == MessageDialogResult::Yes;
            if !confirmed {
                return;
            }
            let api = api_for_actions.clone();
            let mut app = app;
            spawn(async move {
                match api.delete(&format!("alertEmailGroup/{id}")).await {
                    Ok(()) => {
                        app.notify(ToastKind::Info, format!("Removed {address}"));
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
        let body = json!({ "name": name(), "email": email() });
        let editing = editing_id();
        spawn(async move {
            let result: Result<EmailRecipient, ApiError> = match editing {
                Some(id) => api.update(&format!("alertEmailGroup/{id}"), &body).await,
                None => api.create("alertEmailGroup", &body).await,
            };
            match result {
                Ok(saved) => {
                    app.notify(ToastKind::Info, format!("Saved recipient {}", saved.email));
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
        "Edit recipient"
    } else {
        "Add recipient"
    };
    let interval_value = interval
        .as_ref()
        .map(|config| config.configuration_value.to_string())
        .unwrap_or_default();

    rsx! {
        div {
            style: "display: flex; justify-content: space-between; align-items: center; margin-bottom: 12px;",
            h2 { style: "margin: 0;", "Alert e-mails" }
            if can_modify {
                button {
                    style: "border: 1px solid #2b6cb0; background: #2b6cb0; color: #fff; padding: 6px 12px; border-radius: 6px; cursor: pointer;",
                    onclick: move |_| {
                        editing_id.set(None);
                        name.set(String::new());
                        email.set(String::new());
                        field_errors.set(BTreeMap::new());
                        summary.set(Vec::new());
                        modal_open.set(true);
                    },
                    "+ Add recipient"
                }
            }
        }

        if let Some(error) = fetch_error {
            ErrorSummary { title: "Failed to load alert settings".to_string(), messages: vec![error] }
        }

        div {
            style: "background: #fff; border: 1px solid #e0e0e0; border-radius: 8px; padding: 12px 16px; margin-bottom: 16px; display: flex; align-items: center; gap: 12px;",
            label { style: "font-size: 13px; font-weight: 600;", "Send low-stock digests every" }
            select {
                style: "border: 1px solid #ccc; border-radius: 6px; padding: 6px 8px;",
                disabled: !can_modify || interval.is_none(),
                value: "{interval_value}",
                onchange: on_interval_change,
                {INTERVAL_OPTIONS.iter().map(|minutes| rsx! {
                    option { key: "{minutes}", value: "{minutes}", "{minutes} minutes" }
                })}
            }
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
                    label: "Name",
                    value: name(),
                    required: true,
                    errors: field_errors().get("name").cloned().unwrap_or_default(),
                    on_input: move |value| name.set(value),
                }
                TextField {
                    label: "E-mail",
                    value: email(),
                    required: true,
                    errors: field_errors().get("email").cloned().unwrap_or_default(),
                    on_input: move |value| email.set(value),
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
