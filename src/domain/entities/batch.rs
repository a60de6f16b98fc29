use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOrder {
    pub id: i64,
    pub batch_id: String,
    pub product_id: i64,
    pub batch_count: i64,
    #[serde(default)]
    pub expiry_date: Option<String>,
    #[serde(default)]
    pub threshold_alert: Option<i64>,
    #[serde(default)]
    pub available_voucher_count: i64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// One serial/PUK pair created by a successful batch upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherCredential {
    pub serial: String,
    #[serde(rename = "PUK")]
    pub puk: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub error_field: String,
    pub error_code: String,
    pub error_message: String,
}

/// One group of rows that collide on a single value, either among
/// themselves inside the uploaded CSV or against a stored record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DuplicateGroup {
    pub rows: Vec<u32>,
    #[serde(default)]
    pub serial: Option<String>,
    #[serde(rename = "PUK", default)]
    pub puk: Option<String>,
}

/// The serial and PUK columns of the uploaded CSV, echoed back by the
/// backend in the same row order they were submitted in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CsvEcho {
    #[serde(default)]
    pub serial: Vec<String>,
    #[serde(rename = "PUK", default)]
    pub puk: Vec<String>,
}

/// Structured 4xx body returned by `POST batchOrder`.
///
/// `csv_duplicates` is keyed by 1-based row number (as a string on the
/// wire) and lists the conflicting fields for that row. `duplicated_rows`
/// names the groups of rows that collide with each other inside the CSV;
/// membership there is what separates a CSV-internal duplicate from a
/// collision with a pre-existing database record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BatchUploadRejection {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub return_code: String,
    #[serde(default)]
    pub errors: Vec<FieldError>,
    #[serde(rename = "csvDuplicates", default)]
    pub csv_duplicates: BTreeMap<String, Vec<FieldError>>,
    #[serde(default)]
    pub duplicated_rows: Vec<DuplicateGroup>,
    #[serde(default)]
    pub csv: CsvEcho,
}

impl BatchUploadRejection {
    /// True when the body carries nothing the reconciliation table could
    /// render; such failures surface as a plain notification instead.
    pub fn is_plain_failure(&self) -> bool {
        self.errors.is_empty() && self.csv_duplicates.is_empty() && self.duplicated_rows.is_empty()
    }
}
