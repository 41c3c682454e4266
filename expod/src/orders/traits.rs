//! Core traits and context for command processing and event application

use crate::orders::appliers::{
    CancellationRejectedApplier, CancellationRequestedApplier, DeliveryStatusChangedApplier,
    EventAction, ItemsAddedApplier, ItemsTransitionedApplier, OrderCancelledApplier,
    OrderCompletedApplier, OrderConfirmedApplier, OrderOpenedApplier, OrderStatusChangedApplier,
    ReservationCancelledApplier, TableStatusChangedApplier,
};
use crate::orders::storage::{OrderStorage, StorageError};
use async_trait::async_trait;
use enum_dispatch::enum_dispatch;
use redb::WriteTransaction;
use shared::models::Reservation;
use shared::order::{OrderEvent, OrderSnapshot};
use std::collections::HashMap;
use thiserror::Error;

/// Domain errors raised while validating and executing commands
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Item {item_id} does not belong to order {order_id}")]
    OwnershipMismatch { item_id: String, order_id: String },

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Order already completed: {0}")]
    OrderAlreadyCompleted(String),

    #[error("Order already cancelled: {0}")]
    OrderAlreadyCancelled(String),

    #[error("Table occupied: {0}")]
    TableOccupied(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<StorageError> for OrderError {
    fn from(e: StorageError) -> Self {
        OrderError::Storage(e.to_string())
    }
}

/// Command metadata passed to every handler
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    pub command_id: String,
    pub operator_id: i64,
    pub operator_name: String,
    /// Client timestamp from the command (server time goes on events)
    pub timestamp: i64,
}

/// Execution context for command handlers
///
/// Wraps the open write transaction so every read a handler performs sees
/// the same state the commit will act on. Sequence numbers are handed out
/// from here and only become durable when the manager commits.
pub struct CommandContext<'a> {
    txn: &'a WriteTransaction,
    storage: &'a OrderStorage,
    current_sequence: u64,
    /// Snapshots created by the running handler, visible to later reads
    /// within the same command
    modified: HashMap<String, OrderSnapshot>,
}

impl<'a> CommandContext<'a> {
    pub fn new(txn: &'a WriteTransaction, storage: &'a OrderStorage, current_sequence: u64) -> Self {
        Self {
            txn,
            storage,
            current_sequence,
            modified: HashMap::new(),
        }
    }

    /// Allocate the next global sequence number.
    pub fn next_sequence(&mut self) -> u64 {
        self.current_sequence += 1;
        self.current_sequence
    }

    /// Load a snapshot, preferring one modified earlier in this command.
    pub fn load_snapshot(&self, order_id: &str) -> Result<OrderSnapshot, OrderError> {
        if let Some(snapshot) = self.modified.get(order_id) {
            return Ok(snapshot.clone());
        }
        self.storage
            .get_snapshot_txn(self.txn, order_id)?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))
    }

    /// Create a fresh snapshot for a new order.
    pub fn create_snapshot(&self, order_id: String) -> OrderSnapshot {
        OrderSnapshot::new(order_id)
    }

    /// Stage a snapshot so later reads in this command observe it.
    pub fn save_snapshot(&mut self, snapshot: OrderSnapshot) {
        self.modified.insert(snapshot.order_id.clone(), snapshot);
    }

    /// Drain the staged snapshots for the manager's applier loop.
    pub fn take_modified_snapshots(&mut self) -> HashMap<String, OrderSnapshot> {
        std::mem::take(&mut self.modified)
    }

    /// Find the active order holding a table, as primary or linked.
    pub fn find_active_order_for_table(&self, table_id: i64) -> Result<Option<String>, OrderError> {
        self.find_other_active_order_for_table(table_id, None)
    }

    /// Same as [`find_active_order_for_table`](Self::find_active_order_for_table)
    /// but ignoring one order, used when deciding whether closing that order
    /// frees the table.
    pub fn find_other_active_order_for_table(
        &self,
        table_id: i64,
        exclude_order: Option<&str>,
    ) -> Result<Option<String>, OrderError> {
        for snapshot in self.modified.values() {
            if Some(snapshot.order_id.as_str()) != exclude_order
                && !snapshot.is_terminal()
                && snapshot.referenced_tables().contains(&table_id)
            {
                return Ok(Some(snapshot.order_id.clone()));
            }
        }
        let found = self
            .storage
            .find_active_order_for_table_txn(self.txn, table_id, exclude_order)?;
        Ok(found)
    }

    /// Resolve which order owns an item via the item index.
    pub fn resolve_item_owner(&self, item_id: &str) -> Result<String, OrderError> {
        for snapshot in self.modified.values() {
            if snapshot.find_item(item_id).is_some() {
                return Ok(snapshot.order_id.clone());
            }
        }
        self.storage
            .get_item_owner_txn(self.txn, item_id)?
            .ok_or_else(|| OrderError::ItemNotFound(item_id.to_string()))
    }

    /// Read a reservation record inside the transaction.
    pub fn get_reservation(&self, reservation_id: i64) -> Result<Option<Reservation>, OrderError> {
        Ok(self.storage.get_reservation_txn(self.txn, reservation_id)?)
    }
}

/// Command handler - validates state and emits events
///
/// Handlers never mutate stored snapshots directly; the manager folds the
/// returned events through the appliers so that live execution and replay
/// share one code path. Creation handlers additionally stage the new
/// snapshot via [`CommandContext::save_snapshot`] so follow-up reads inside
/// the same command can see it.
#[async_trait]
pub trait CommandHandler {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError>;
}

/// Event applier - folds one event into a snapshot
///
/// Appliers must be deterministic and idempotent: they read only facts
/// carried on the event, never external state, and re-applying an event
/// over an already-updated snapshot must produce the same result.
#[enum_dispatch]
pub trait EventApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent);
}
