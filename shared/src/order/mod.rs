//! Order Event Sourcing Module
//!
//! This module provides types for the order event sourcing system:
//! - Commands: Requests from clients to modify orders
//! - Events: Immutable facts recorded after command processing
//! - Snapshots: Computed order state from event stream

pub mod command;
pub mod event;
pub mod item;
pub mod snapshot;
pub mod types;

// Re-exports
pub use command::{items_from_inputs, OrderCommand, OrderCommandPayload};
pub use event::{EventPayload, OrderEvent, OrderEventType};
pub use item::{ItemStatus, OrderItem};
pub use snapshot::{OrderSnapshot, OrderStatus};
pub use types::*;
