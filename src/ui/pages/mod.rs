pub mod alert_emails;
pub mod audit_log;
pub mod batch_orders;
pub mod batch_upload;
pub mod error_codes;
pub mod products;
pub mod voucher_types;
pub mod vouchers;
