//! Data models
//!
//! Collaborator entities referenced by the order engine. All IDs are `i64`;
//! the catalog these records come from is managed outside this subsystem.

pub mod dining_table;
pub mod kitchen_station;
pub mod reservation;

// Re-exports
pub use dining_table::*;
pub use kitchen_station::*;
pub use reservation::*;
