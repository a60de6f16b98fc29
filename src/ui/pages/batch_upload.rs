use std::collections::BTreeMap;
use std::path::PathBuf;

use dioxus::prelude::*;
use rfd::FileDialog;
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::app::Route;
use crate::domain::entities::batch::VoucherCredential;
use crate::domain::entities::product::Product;
use crate::domain::grid::ColumnSpec;
use crate::infra::api::client::{field_error_map, ApiError, BatchOrderSubmission};
use crate::infra::import::csv::{read_credential_columns, CredentialColumns};
use crate::ui::components::form::{ErrorSummary, SuccessSummary, TextField};
use crate::ui::components::grid::{grid_rows, DataGrid, RowAction};
use crate::ui::state::app_state::{AppState, Session, ToastKind};
use crate::usecase::grid::value_text;
use crate::usecase::reconcile::{reconcile, reconcile_with_columns, UploadReport};

fn report_rows(report: &UploadReport) -> Vec<Map<String, Value>> {
    report
        .rows
        .iter()
        .map(|row| {
            let mut map = Map::new();
            map.insert("row_number".to_string(), json!(row.row_number));
            map.insert("serial".to_string(), json!(row.serial));
            map.insert("PUK".to_string(), json!(row.puk));
            map.insert("status".to_string(), json!(row.status_label()));
            map.insert("cause".to_string(), json!(row.cause_label()));
            map.insert(
                "lookup".to_string(),
                json!(row.lookup_value().unwrap_or_default()),
            );
            map
        })
        .collect()
}

fn row_has_lookup(row: &Map<String, Value>) -> bool {
    matches!(row.get("lookup"), Some(Value::String(value)) if !value.is_empty())
}

/// Batch order form. A successful submission lists the created
/// credentials; a rejected one renders the reconciliation table with one
/// verdict per CSV row.
#[component]
pub fn BatchUploadPage() -> Element {
    let session = use_context::<Session>();
    let mut app = use_context::<AppState>();

    let api_products = session.api.clone();
    let products = use_resource(move || {
        let api = api_products.clone();
        async move { api.fetch_all::<Product>("product").await }
    });

    let mut batch_id = use_signal(String::new);
    let mut product_id = use_signal(String::new);
    let mut batch_count = use_signal(String::new);
    let mut expiry_date = use_signal(String::new);
    let mut expiry_days = use_signal(String::new);
    let mut file_path = use_signal(|| None::<PathBuf>);
    let mut columns_read = use_signal(|| None::<CredentialColumns>);
    let mut field_errors = use_signal(BTreeMap::<String, Vec<String>>::new);
    let mut report = use_signal(|| None::<UploadReport>);
    let mut success = use_signal(|| None::<String>);
    let mut credentials = use_signal(Vec::<VoucherCredential>::new);
    let mut submitting = use_signal(|| false);

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

    let pick_file = move |_| {
        let Some(path) = FileDialog::new()
            .add_filter("CSV", &["csv"])
            .set_title("Choose voucher CSV")
            .pick_file()
        else {
            return;
        };
        match read_credential_columns(&path) {
            Ok(columns) => {
                columns_read.set(Some(columns));
                file_path.set(Some(path));
            }
            Err(err) => {
                warn!(path = %path.display(), "rejected csv pick: {err:#}");
                app.notify(ToastKind::Error, format!("{err:#}"));
                columns_read.set(None);
                file_path.set(None);
            }
        }
    };

    let mut reset = move || {
        batch_id.set(String::new());
        product_id.set(String::new());
        batch_count.set(String::new());
        expiry_date.set(String::new());
        expiry_days.set(String::new());
        file_path.set(None);
        columns_read.set(None);
        field_errors.set(BTreeMap::new());
        report.set(None);
        success.set(None);
        credentials.set(Vec::new());
    };

    let api_for_submit = session.api.clone();
    let submit = move |_| {
        if submitting() {
            return;
        }
        let Some(path) = file_path() else {
            field_errors.write().insert(
                "file".to_string(),
                vec!["A voucher CSV file is required".to_string()],
            );
            return;
        };
        let contents = match std::fs::read(&path) {
            Ok(contents) => contents,
            Err(err) => {
                app.notify(ToastKind::Error, format!("failed to read {}: {err}", path.display()));
                return;
            }
        };
        submitting.set(true);
        field_errors.set(BTreeMap::new());
        report.set(None);
        success.set(None);
        credentials.set(Vec::new());

        let submission = BatchOrderSubmission {
            batch_id: batch_id(),
            product_id: product_id().parse().unwrap_or(0),
            batch_count: batch_count().parse().unwrap_or(0),
            expiry_date: Some(expiry_date()).filter(|value| !value.is_empty()),
            expiry_days: expiry_days().parse().ok(),
            file_name: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "batch.csv".to_string()),
            file_contents: contents,
        };
        let api = api_for_submit.clone();
        let mut app = app;
        let local_columns = columns_read();
        spawn(async move {
            match api.submit_batch_order(submission).await {
                Ok(created) => {
                    success.set(Some(format!("{} vouchers created", created.len())));
                    credentials.set(created);
                    app.invalidate_data();
                }
                Err(ApiError::BatchRejected(rejection)) => {
                    let reconciled = if rejection.csv.serial.is_empty() {
                        match &local_columns {
                            Some(columns) => {
                                reconcile_with_columns(&rejection, &columns.serial, &columns.puk)
                            }
                            None => reconcile(&rejection),
                        }
                    } else {
                        reconcile(&rejection)
                    };
                    report.set(Some(reconciled));
                }
                Err(ApiError::Validation { message, errors }) => {
                    field_errors.set(field_error_map(&errors));
                    app.notify(ToastKind::Error, message);
                }
                Err(err) => app.notify(ToastKind::Error, err.to_string()),
            }
            submitting.set(false);
        });
    };

    let on_report_action = move |(action, row): (&'static str, Map<String, Value>)| {
        if action != "view" {
            return;
        }
        let value = value_text(row.get("lookup").unwrap_or(&Value::Null));
        navigator().push(Route::Vouchers {
            q: value,
            batch_id: String::new(),
        });
    };

    let selected_product = product_id();
    let file_label = file_path()
        .map(|path| {
            let rows = columns_read().map(|columns| columns.row_count()).unwrap_or(0);
            format!("{} ({rows} rows)", path.display())
        })
        .unwrap_or_else(|| "No file chosen".to_string());

    let report_columns = vec![
        ColumnSpec::new("row_number", "Row"),
        ColumnSpec::new("serial", "Serial"),
        ColumnSpec::new("PUK", "PUK"),
        ColumnSpec::new("status", "Status"),
        ColumnSpec::new("cause", "Cause"),
    ];
    let credential_columns = vec![
        ColumnSpec::new("serial", "Serial"),
        ColumnSpec::new("PUK", "PUK"),
    ];

    rsx! {
        h2 { style: "margin: 0 0 12px;", "Batch upload" }

        div {
            style: "background: #fff; border: 1px solid #e0e0e0; border-radius: 8px; padding: 16px; max-width: 560px; margin-bottom: 16px;",
            TextField {
                label: "Batch ID",
                value: batch_id(),
                required: true,
                errors: field_errors().get("batch_id").cloned().unwrap_or_default(),
                on_input: move |value| batch_id.set(value),
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
            TextField {
                label: "Batch count",
                value: batch_count(),
                required: true,
                errors: field_errors().get("batch_count").cloned().unwrap_or_default(),
                on_input: move |value| batch_count.set(value),
            }
            TextField {
                label: "Expiry date (YYYY-MM-DD)",
                value: expiry_date(),
                errors: field_errors().get("expiry_date").cloned().unwrap_or_default(),
                on_input: move |value| expiry_date.set(value),
            }
            TextField {
                label: "Expiry days",
                value: expiry_days(),
                errors: field_errors().get("expiry_days").cloned().unwrap_or_default(),
                on_input: move |value| expiry_days.set(value),
            }
            div {
                style: "display: flex; align-items: center; gap: 8px; margin-bottom: 10px;",
                button {
                    style: "border: 1px solid #bbb; background: #fff; padding: 6px 12px; border-radius: 6px; cursor: pointer;",
                    onclick: pick_file,
                    "Choose CSV…"
                }
                span { style: "font-size: 13px; color: #555;", "{file_label}" }
            }
            {field_errors().get("file").cloned().unwrap_or_default().iter().map(|error| rsx! {
                span { key: "{error}", style: "color: #c92a2a; font-size: 12px; display: block; margin-bottom: 8px;", "{error}" }
            })}
            div {
                style: "display: flex; justify-content: flex-end; gap: 8px; margin-top: 12px;",
                button {
                    style: "border: 1px solid #bbb; background: #fff; padding: 6px 12px; border-radius: 6px; cursor: pointer;",
                    onclick: move |_| reset(),
                    "Reset"
                }
                button {
                    disabled: submitting(),
                    style: "border: 1px solid #2b6cb0; background: #2b6cb0; color: #fff; padding: 6px 12px; border-radius: 6px; cursor: pointer;",
                    onclick: submit,
                    "Submit"
                }
            }
        }

        if let Some(message) = success() {
            SuccessSummary { message }
            DataGrid {
                columns: credential_columns,
                rows: Some(grid_rows(&credentials())),
                page_size: 25_usize,
            }
        }

        if let Some(current) = report() {
            ErrorSummary {
                title: "Upload rejected".to_string(),
                messages: current.messages.clone(),
            }
            DataGrid {
                columns: report_columns,
                rows: Some(report_rows(&current)),
                page_size: 25_usize,
                actions: vec![RowAction::new("view", "View").only_when(row_has_lookup)],
                on_action: on_report_action,
            }
        }
    }
}
