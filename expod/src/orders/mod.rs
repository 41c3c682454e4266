//! Order Event Sourcing Module
//!
//! This module implements order and item lifecycle coordination using
//! event sourcing:
//!
//! - **manager**: Core OrdersManager for command processing and event generation
//! - **storage**: redb-based persistence layer for events, snapshots, and indices
//! - **transitions**: Item state machine (the only writer of item status)
//! - **reducer**: Aggregate order status derived from the item set
//! - **router**: Station visibility filtering for scoped transitions
//! - **occupancy**: Table claim/release bookkeeping
//! - **sync**: Reconnection synchronization API
//!
//! # Architecture
//!
//! ```text
//! Command → OrdersManager → Event → Storage (redb)
//!                 ↓                      ↓
//!              Broadcast          Snapshot Update
//!                 ↓
//!           All Subscribers
//! ```
//!
//! # Data Flow
//!
//! 1. Client sends OrderCommand
//! 2. OrdersManager validates and processes command
//! 3. OrderEvents are generated with global sequences
//! 4. Events are persisted to redb (transactional)
//! 5. Snapshots are updated in the same transaction
//! 6. Events are broadcast to all subscribers
//! 7. CommandResponse is returned to client

pub mod actions;
pub mod appliers;
pub mod manager;
pub mod money;
pub mod occupancy;
pub mod reducer;
pub mod router;
pub mod storage;
pub mod sync;
pub mod traits;
pub mod transitions;

// Re-exports
pub use manager::OrdersManager;
pub use reducer::derive_order_status;
pub use storage::OrderStorage;
pub use sync::{SyncRequest, SyncResponse, SyncService};
pub use traits::{CommandContext, CommandHandler, CommandMetadata, EventApplier, OrderError};

// Re-export shared types for convenience
pub use shared::order::{
    CommandError, CommandErrorCode, CommandResponse, EventPayload, OrderCommand,
    OrderCommandPayload, OrderEvent, OrderEventType, OrderSnapshot, OrderStatus,
};
