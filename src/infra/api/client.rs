use std::collections::BTreeMap;

use reqwest::{multipart, Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::domain::entities::batch::{BatchUploadRejection, FieldError, VoucherCredential};

/// Errors a request can surface, mirrored onto the three places the UI
/// shows them: inline field errors, the reconciliation table, or a toast.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 4xx with per-field validation errors.
    #[error("{message}")]
    Validation {
        message: String,
        errors: Vec<FieldError>,
    },
    /// Batch upload rejected with the duplicate-conflict payload.
    #[error("{}", .0.message)]
    BatchRejected(Box<BatchUploadRejection>),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{0}")]
    Unexpected(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// `{ message, return_code, results }` envelope every read/write returns.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    message: String,
    results: T,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<FieldError>,
}

/// Everything `POST batchOrder` takes, file included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOrderSubmission {
    pub batch_id: String,
    pub product_id: i64,
    pub batch_count: u32,
    pub expiry_date: Option<String>,
    pub expiry_days: Option<u32>,
    pub file_name: String,
    pub file_contents: Vec<u8>,
}

/// Thin REST client. Every request carries the session bearer token; a
/// 401 is left to the identity layer and intentionally not interpreted
/// here. Writes are never retried.
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        ApiClient {
            http: Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, join_url(&self.base_url, path))
            .bearer_auth(&self.token)
    }

    pub async fn fetch_all<T: DeserializeOwned>(&self, path: &str) -> ApiResult<Vec<T>> {
        let response = self.request(Method::GET, path).send().await?;
        decode(response).await
    }

    pub async fn create<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let response = self.request(Method::POST, path).json(body).send().await?;
        decode(response).await
    }

    pub async fn update<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let response = self.request(Method::PUT, path).json(body).send().await?;
        decode(response).await
    }

    /// Body-less PATCH, e.g. `setActive/{serial}`.
    pub async fn toggle<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self.request(Method::PATCH, path).send().await?;
        decode(response).await
    }

    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        let response = self.request(Method::DELETE, path).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(failure_from_body(status, &body))
    }

    /// Multipart submission to `batchOrder`. A structured rejection body
    /// comes back as [`ApiError::BatchRejected`] for the reconciliation
    /// table; a 4xx without reconcilable content degrades to the generic
    /// forms.
    pub async fn submit_batch_order(
        &self,
        submission: BatchOrderSubmission,
    ) -> ApiResult<Vec<VoucherCredential>> {
        let mut form = multipart::Form::new()
            .text("batch_id", submission.batch_id)
            .text("product_id", submission.product_id.to_string())
            .text("batch_count", submission.batch_count.to_string());
        if let Some(expiry_date) = submission.expiry_date {
            form = form.text("expiry_date", expiry_date);
        }
        if let Some(expiry_days) = submission.expiry_days {
            form = form.text("expiry_days", expiry_days.to_string());
        }
        let file = multipart::Part::bytes(submission.file_contents)
            .file_name(submission.file_name)
            .mime_str("text/csv")?;
        form = form.part("file", file);

        let response = self
            .request(Method::POST, "batchOrder")
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            #[derive(Deserialize)]
            struct Created {
                vouchers: Vec<VoucherCredential>,
            }
            let created: Created = response.json().await?;
            return Ok(created.vouchers);
        }

        let body = response.text().await.unwrap_or_default();
        if status.is_client_error() {
            if let Ok(rejection) = serde_json::from_str::<BatchUploadRejection>(&body) {
                if !rejection.is_plain_failure() {
                    return Err(ApiError::BatchRejected(Box::new(rejection)));
                }
            }
        }
        warn!(%status, "batch order submission failed without a reconcilable body");
        Err(failure_from_body(status, &body))
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
    let status = response.status();
    if status.is_success() {
        let envelope: Envelope<T> = response.json().await?;
        return Ok(envelope.results);
    }
    let body = response.text().await.unwrap_or_default();
    Err(failure_from_body(status, &body))
}

fn failure_from_body(status: StatusCode, body: &str) -> ApiError {
    if status.is_client_error() {
        if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
            if !parsed.errors.is_empty() {
                let message = if parsed.message.is_empty() {
                    "Validation failed".to_string()
                } else {
                    parsed.message
                };
                return ApiError::Validation {
                    message,
                    errors: parsed.errors,
                };
            }
            if !parsed.message.is_empty() {
                return ApiError::Unexpected(parsed.message);
            }
        }
    }
    ApiError::Unexpected(format!("request failed with status {status}"))
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Groups field errors by field name for inline rendering next to the
/// matching form input.
pub fn field_error_map(errors: &[FieldError]) -> BTreeMap<String, Vec<String>> {
    let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for error in errors {
        map.entry(error.error_field.clone())
            .or_default()
            .push(error.error_message.clone());
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn join_url_tolerates_slashes_on_either_side() {
        assert_eq!(join_url("http://api/", "/product"), "http://api/product");
        assert_eq!(join_url("http://api", "product"), "http://api/product");
    }

    #[test]
    fn envelope_unwraps_the_results_array() {
        let body = json!({
            "message": "ok",
            "return_code": "200",
            "results": [{"error_field": "f", "error_code": "c", "error_message": "m"}]
        });
        let envelope: Envelope<Vec<FieldError>> =
            serde_json::from_value(body).expect("envelope should parse");
        assert_eq!(envelope.results.len(), 1);
        assert_eq!(envelope.message, "ok");
    }

    #[test]
    fn field_errors_become_a_validation_error() {
        let body = json!({
            "message": "Validation failed",
            "errors": [
                {"error_field": "batch_id", "error_code": "E_REQ", "error_message": "Batch ID is required"},
                {"error_field": "batch_id", "error_code": "E_LEN", "error_message": "Batch ID too long"},
                {"error_field": "file", "error_code": "E_REQ", "error_message": "File is required"}
            ]
        })
        .to_string();

        match failure_from_body(StatusCode::UNPROCESSABLE_ENTITY, &body) {
            ApiError::Validation { message, errors } => {
                assert_eq!(message, "Validation failed");
                let map = field_error_map(&errors);
                assert_eq!(map["batch_id"].len(), 2);
                assert_eq!(map["file"], vec!["File is required"]);
            }
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn message_only_bodies_become_generic_errors() {
        let body = json!({"message": "quota exceeded"}).to_string();
        match failure_from_body(StatusCode::BAD_REQUEST, &body) {
            ApiError::Unexpected(message) => assert_eq!(message, "quota exceeded"),
            other => panic!("expected a generic error, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_bodies_fall_back_to_the_status_line() {
        match failure_from_body(StatusCode::BAD_GATEWAY, "<html>oops</html>") {
            ApiError::Unexpected(message) => {
                assert!(message.contains("502"), "status should be named: {message}")
            }
            other => panic!("expected a generic error, got {other:?}"),
        }
    }

    #[test]
    fn rejection_payload_round_trips_from_wire_names() {
        let body = json!({
            "message": "validation failed",
            "return_code": "400",
            "errors": [],
            "csvDuplicates": {"2": [{"error_field": "serial", "error_code": "E_DUP", "error_message": "dup"}]},
            "duplicated_rows": [{"rows": [1, 2], "serial": "S-1"}],
            "csv": {"serial": ["S-1", "S-1"], "PUK": ["P-1", "P-2"]}
        })
        .to_string();

        let rejection: BatchUploadRejection =
            serde_json::from_str(&body).expect("rejection should parse");
        assert!(!rejection.is_plain_failure());
        assert_eq!(rejection.csv.puk, vec!["P-1", "P-2"]);
        assert_eq!(rejection.csv_duplicates["2"][0].error_field, "serial");
        assert_eq!(rejection.duplicated_rows[0].rows, vec![1, 2]);
    }
}
