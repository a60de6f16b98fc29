use std::collections::BTreeSet;

use serde::Serialize;

use crate::domain::entities::batch::BatchUploadRejection;

/// Where a duplicate value collides: with another row of the same upload,
/// or with a record already stored in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConflictCause {
    #[serde(rename = "CSV")]
    Csv,
    Database,
}

/// One reconciled CSV input line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadRow {
    pub row_number: usize,
    pub serial: String,
    pub puk: String,
    pub conflicts: Vec<String>,
    pub cause: ConflictCause,
}

impl UploadRow {
    pub fn passed(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// "Pass", or a label naming the conflicting fields, e.g.
    /// "Duplicate Serial, PUK".
    pub fn status_label(&self) -> String {
        if self.conflicts.is_empty() {
            return "Pass".to_string();
        }
        let fields: Vec<String> = self.conflicts.iter().map(|f| capitalize(f)).collect();
        format!("Duplicate {}", fields.join(", "))
    }

    pub fn cause_label(&self) -> &'static str {
        if self.conflicts.is_empty() {
            return "";
        }
        match self.cause {
            ConflictCause::Csv => "CSV",
            ConflictCause::Database => "Database",
        }
    }

    /// The value to pre-filter the vouchers screen by when the operator
    /// wants to inspect the stored record this row collided with. Only
    /// database-side conflicts have one.
    pub fn lookup_value(&self) -> Option<&str> {
        if self.conflicts.is_empty() || self.cause != ConflictCause::Database {
            return None;
        }
        let serial_conflict = self
            .conflicts
            .iter()
            .any(|field| field.eq_ignore_ascii_case("serial"));
        if serial_conflict {
            Some(&self.serial)
        } else {
            Some(&self.puk)
        }
    }
}

/// The reconciled view of one failed upload attempt: summary messages for
/// the alert box plus one row per CSV input line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadReport {
    pub messages: Vec<String>,
    pub rows: Vec<UploadRow>,
}

impl UploadReport {
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.rows.is_empty()
    }
}

/// Zips the rejection payload into the per-row table.
///
/// The pairing source is the server's echoed `csv` columns, which are in
/// the submitted row order; when the echo is absent the caller can pass
/// the locally re-read columns via [`reconcile_with_columns`]. A row's
/// `conflicts` are the field names reported for its 1-based row number,
/// and its cause is CSV exactly when that number appears in any
/// duplicate group's row list.
pub fn reconcile(rejection: &BatchUploadRejection) -> UploadReport {
    reconcile_with_columns(rejection, &rejection.csv.serial, &rejection.csv.puk)
}

pub fn reconcile_with_columns(
    rejection: &BatchUploadRejection,
    serials: &[String],
    puks: &[String],
) -> UploadReport {
    let csv_rows: BTreeSet<u32> = rejection
        .duplicated_rows
        .iter()
        .flat_map(|group| group.rows.iter().copied())
        .collect();

    let rows: Vec<UploadRow> = serials
        .iter()
        .enumerate()
        .map(|(index, serial)| {
            let row_number = index + 1;
            let conflicts = rejection
                .csv_duplicates
                .get(&row_number.to_string())
                .map(|errors| errors.iter().map(|e| e.error_field.clone()).collect())
                .unwrap_or_default();
            UploadRow {
                row_number,
                serial: serial.clone(),
                puk: puks.get(index).cloned().unwrap_or_default(),
                conflicts,
                cause: if csv_rows.contains(&(row_number as u32)) {
                    ConflictCause::Csv
                } else {
                    ConflictCause::Database
                },
            }
        })
        .collect();

    let mut messages: Vec<String> = rejection
        .errors
        .iter()
        .map(|error| error.error_message.clone())
        .collect();
    let conflicted = rows.iter().filter(|row| !row.passed());
    if conflicted.clone().any(|row| row.cause == ConflictCause::Database) {
        messages.push("Duplicate entries were found in the database.".to_string());
    }
    if conflicted.clone().any(|row| row.cause == ConflictCause::Csv) {
        messages.push("Duplicate entries were found in the CSV file.".to_string());
    }

    UploadReport { messages, rows }
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::batch::{CsvEcho, DuplicateGroup, FieldError};
    use std::collections::BTreeMap;

    fn field_error(field: &str) -> FieldError {
        FieldError {
            error_field: field.to_string(),
            error_code: "E_DUP".to_string(),
            error_message: format!("duplicate {field}"),
        }
    }

    /// Scenario: 3 rows; row 2's serial duplicates row 1 inside the CSV,
    /// row 3's PUK collides with a stored record.
    fn scenario_d() -> BatchUploadRejection {
        let mut csv_duplicates = BTreeMap::new();
        csv_duplicates.insert("1".to_string(), vec![field_error("serial")]);
        csv_duplicates.insert("2".to_string(), vec![field_error("serial")]);
        csv_duplicates.insert("3".to_string(), vec![field_error("PUK")]);
        BatchUploadRejection {
            message: "validation failed".to_string(),
            return_code: "400".to_string(),
            errors: Vec::new(),
            csv_duplicates,
            duplicated_rows: vec![DuplicateGroup {
                rows: vec![1, 2],
                serial: Some("S-001".to_string()),
                puk: None,
            }],
            csv: CsvEcho {
                serial: vec!["S-001".into(), "S-001".into(), "S-003".into()],
                puk: vec!["P-001".into(), "P-002".into(), "P-003".into()],
            },
        }
    }

    #[test]
    fn emits_exactly_one_record_per_csv_row() {
        let report = reconcile(&scenario_d());
        assert_eq!(report.rows.len(), 3);
        let numbers: Vec<usize> = report.rows.iter().map(|r| r.row_number).collect();
        assert_eq!(numbers, vec![1, 2, 3], "row numbers are 1-based and dense");
    }

    #[test]
    fn cause_is_csv_exactly_for_rows_in_a_duplicate_group() {
        let report = reconcile(&scenario_d());
        assert_eq!(report.rows[0].cause, ConflictCause::Csv);
        assert_eq!(report.rows[1].cause, ConflictCause::Csv);
        assert_eq!(report.rows[2].cause, ConflictCause::Database);
    }

    #[test]
    fn conflicts_come_from_the_per_row_field_map() {
        let report = reconcile(&scenario_d());
        assert_eq!(report.rows[1].conflicts, vec!["serial"]);
        assert_eq!(report.rows[2].conflicts, vec!["PUK"]);
    }

    #[test]
    fn clean_rows_render_pass_and_carry_no_lookup() {
        let mut rejection = scenario_d();
        rejection.csv_duplicates.remove("1");
        rejection.duplicated_rows.clear();
        let report = reconcile(&rejection);

        let first = &report.rows[0];
        assert!(first.passed());
        assert_eq!(first.status_label(), "Pass");
        assert_eq!(first.cause_label(), "");
        assert_eq!(first.lookup_value(), None);
    }

    #[test]
    fn conflicted_rows_render_a_capitalized_field_label() {
        let mut rejection = scenario_d();
        rejection
            .csv_duplicates
            .insert("3".to_string(), vec![field_error("serial"), field_error("PUK")]);
        let report = reconcile(&rejection);
        assert_eq!(report.rows[2].status_label(), "Duplicate Serial, PUK");
    }

    #[test]
    fn database_conflicts_link_to_the_colliding_value() {
        let report = reconcile(&scenario_d());
        let third = &report.rows[2];
        assert_eq!(
            third.lookup_value(),
            Some("P-003"),
            "a PUK conflict links by PUK"
        );

        let mut rejection = scenario_d();
        rejection
            .csv_duplicates
            .insert("3".to_string(), vec![field_error("serial")]);
        let by_serial = reconcile(&rejection);
        assert_eq!(by_serial.rows[2].lookup_value(), Some("S-003"));
    }

    #[test]
    fn csv_conflicts_never_link_anywhere() {
        let report = reconcile(&scenario_d());
        assert_eq!(report.rows[0].lookup_value(), None);
        assert_eq!(report.rows[1].lookup_value(), None);
    }

    #[test]
    fn summary_messages_name_both_conflict_sources() {
        let report = reconcile(&scenario_d());
        assert!(report
            .messages
            .iter()
            .any(|m| m.contains("CSV file")), "csv duplicates must be summarized");
        assert!(report
            .messages
            .iter()
            .any(|m| m.contains("database")), "database duplicates must be summarized");
    }

    #[test]
    fn field_level_errors_are_carried_into_the_summary() {
        let mut rejection = scenario_d();
        rejection.errors.push(FieldError {
            error_field: "batch_id".to_string(),
            error_code: "E_REQ".to_string(),
            error_message: "Batch ID is required".to_string(),
        });
        let report = reconcile(&rejection);
        assert_eq!(report.messages[0], "Batch ID is required");
    }

    #[test]
    fn plain_failures_produce_an_empty_report() {
        let rejection = BatchUploadRejection {
            message: "internal error".to_string(),
            ..Default::default()
        };
        assert!(rejection.is_plain_failure());
        let report = reconcile(&rejection);
        assert!(report.is_empty(), "nothing to reconcile without errors");
    }

    #[test]
    fn local_columns_substitute_for_a_missing_echo() {
        let mut rejection = scenario_d();
        rejection.csv = CsvEcho::default();
        let serials = vec!["S-001".to_string(), "S-001".to_string(), "S-003".to_string()];
        let puks = vec!["P-001".to_string(), "P-002".to_string(), "P-003".to_string()];

        let report = reconcile_with_columns(&rejection, &serials, &puks);
        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.rows[2].puk, "P-003");
    }

    #[test]
    fn missing_puk_entries_fall_back_to_empty() {
        let mut rejection = scenario_d();
        rejection.csv.puk.pop();
        let report = reconcile(&rejection);
        assert_eq!(report.rows[2].puk, "", "short PUK column must not panic");
    }
}
