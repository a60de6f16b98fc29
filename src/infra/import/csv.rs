use std::path::Path;

use anyhow::{Context, Result};

/// The serial and PUK columns of a voucher CSV, in file row order.
///
/// The backend echoes these columns back when it rejects an upload; this
/// local read covers the pre-submit row count shown next to the file
/// picker and serves as the pairing source if the echo is ever missing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CredentialColumns {
    pub serial: Vec<String>,
    pub puk: Vec<String>,
}

impl CredentialColumns {
    pub fn row_count(&self) -> usize {
        self.serial.len()
    }
}

pub fn read_credential_columns(csv_path: &Path) -> Result<CredentialColumns> {
    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open csv: {}", csv_path.display()))?;
    let headers = reader
        .headers()
        .with_context(|| format!("failed to read headers from csv: {}", csv_path.display()))?
        .clone();

    if headers.is_empty() {
        anyhow::bail!("csv header is required")
    }

    let serial_idx = column_index(&headers, "serial")
        .with_context(|| format!("csv has no serial column: {}", csv_path.display()))?;
    let puk_idx = column_index(&headers, "puk")
        .with_context(|| format!("csv has no PUK column: {}", csv_path.display()))?;

    let mut columns = CredentialColumns::default();
    for record in reader.records() {
        let record = record.context("failed to parse csv record")?;
        columns
            .serial
            .push(record.get(serial_idx).unwrap_or("").trim().to_string());
        columns
            .puk
            .push(record.get(puk_idx).unwrap_or("").trim().to_string());
    }

    Ok(columns)
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_test_dir(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after epoch")
            .as_nanos();
        std::env::temp_dir().join(format!("pvms-{prefix}-{nanos}"))
    }

    #[test]
    fn reads_serial_and_puk_columns_in_row_order() {
        let temp_dir = unique_test_dir("csv-read");
        fs::create_dir_all(&temp_dir).expect("should create temp dir");
        let csv_path = temp_dir.join("batch.csv");
        fs::write(&csv_path, "serial,PUK,value\nS-1,P-1,10\nS-2,P-2,20\n")
            .expect("should write csv fixture");

        let columns = read_credential_columns(&csv_path).expect("read should succeed");

        assert_eq!(columns.serial, vec!["S-1", "S-2"]);
        assert_eq!(columns.puk, vec!["P-1", "P-2"]);
        assert_eq!(columns.row_count(), 2);

        fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
    }

    #[test]
    fn header_lookup_ignores_case_and_padding() {
        let temp_dir = unique_test_dir("csv-headers");
        fs::create_dir_all(&temp_dir).expect("should create temp dir");
        let csv_path = temp_dir.join("batch.csv");
        fs::write(&csv_path, "Serial , puk\nS-1, P-1\n").expect("should write csv fixture");

        let columns = read_credential_columns(&csv_path).expect("read should succeed");
        assert_eq!(columns.serial, vec!["S-1"]);
        assert_eq!(columns.puk, vec!["P-1"]);

        fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
    }

    #[test]
    fn missing_credential_columns_are_an_error() {
        let temp_dir = unique_test_dir("csv-missing");
        fs::create_dir_all(&temp_dir).expect("should create temp dir");
        let csv_path = temp_dir.join("batch.csv");
        fs::write(&csv_path, "serial,value\nS-1,10\n").expect("should write csv fixture");

        let result = read_credential_columns(&csv_path);
        assert!(result.is_err(), "a csv without a PUK column must fail");

        fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
    }
}
