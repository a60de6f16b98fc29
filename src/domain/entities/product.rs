use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub product_code: String,
    pub product_type: String,
    pub product_name: String,
    #[serde(default)]
    pub supplier: String,
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Product {
    pub fn is_active(&self) -> bool {
        self.status != 0
    }

    /// Label used wherever a product is picked from a dropdown.
    pub fn display_label(&self) -> String {
        if self.supplier.is_empty() {
            self.product_name.clone()
        } else {
            format!("{}: {}", self.supplier, self.product_name)
        }
    }
}
