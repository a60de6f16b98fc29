pub mod ability;
pub mod grid;
pub mod reconcile;
