//! Shared types for the order coordination subsystem
//!
//! Wire-level types used by the engine and its transport adapters:
//! commands, events, snapshots, and collaborator entity models.

pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
