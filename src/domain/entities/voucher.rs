use serde::{Deserialize, Serialize};

/// A single prepaid voucher as returned by `getAllVouchers`.
///
/// Wire field names follow the backend exactly; the SIM-related ones are
/// upper-cased on the wire and renamed here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voucher {
    pub id: i64,
    pub serial: String,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub expire_date: Option<String>,
    #[serde(default)]
    pub product_code: String,
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(rename = "IMEI", default)]
    pub imei: String,
    #[serde(rename = "SIMNarrative", default)]
    pub sim_narrative: String,
    #[serde(rename = "PCN", default)]
    pub pcn: String,
    #[serde(rename = "SIMNo", default)]
    pub sim_no: String,
    #[serde(rename = "PUK", default)]
    pub puk: String,
    #[serde(rename = "IMSI", default)]
    pub imsi: String,
    #[serde(default)]
    pub service_reference: String,
    #[serde(default)]
    pub business_unit: String,
    #[serde(default)]
    pub deplete_date: Option<String>,
    #[serde(default)]
    pub available: Option<i64>,
    #[serde(default)]
    pub batch_id: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub created_by: Option<i64>,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub updated_by: Option<i64>,
}

impl Voucher {
    pub fn is_available(&self) -> bool {
        self.available.unwrap_or(0) != 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoucherType {
    pub id: i64,
    pub product_id: i64,
    pub voucher_code: String,
    pub voucher_name: String,
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}
