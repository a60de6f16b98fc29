pub mod audit;
pub mod batch;
pub mod config;
pub mod product;
pub mod voucher;
