use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailRecipient {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// A named alerting knob, e.g. the e-mail digest interval in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailConfiguration {
    pub id: i64,
    pub configuration_name: String,
    pub configuration_value: i64,
    #[serde(default)]
    pub configuration_description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorCode {
    pub id: i64,
    pub error_code: String,
    pub error_message: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}
