//! OrdersManager - Core command processing and event generation
//!
//! This module handles:
//! - Command validation and processing
//! - Event generation with global sequence numbers
//! - Persistence to redb (transactional)
//! - Snapshot updates
//! - Event broadcasting (via channel)
//! - Post-commit refund calls for cancelled paid orders
//!
//! # Command Flow
//!
//! ```text
//! execute_command(cmd)
//!     ├─ 1. Idempotency check (command_id)
//!     ├─ 2. Begin write transaction
//!     ├─ 3. Create CommandContext
//!     ├─ 4. Convert command to action and execute
//!     ├─ 5. Apply events to snapshots via EventApplier
//!     ├─ 6. Persist events, item index, reservation writes, snapshots
//!     ├─ 7. Mark command processed
//!     ├─ 8. Commit transaction
//!     ├─ 9. Broadcast event(s), call refund collaborator
//!     └─ 10. Return response
//! ```

mod error;
pub use error::*;

use super::actions::{CommandAction, TransitionOrderAction};
use super::appliers::EventAction;
use super::storage::{OrderStorage, StorageError};
use super::traits::{CommandContext, CommandHandler, CommandMetadata, EventApplier};
use crate::services::refund::RefundService;
use crate::services::station_catalog::StationCatalog;
use shared::order::{
    CommandResponse, EventPayload, OrderCommand, OrderCommandPayload, OrderEvent, OrderSnapshot,
};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Event broadcast channel capacity (sized for 10000 orders x ~6 events)
const EVENT_CHANNEL_CAPACITY: usize = 65536;

/// OrdersManager for command processing
///
/// The `epoch` field is a unique identifier generated on each startup.
/// Clients use it to detect server restarts and trigger full resync.
pub struct OrdersManager {
    storage: OrderStorage,
    event_tx: broadcast::Sender<OrderEvent>,
    /// Server instance epoch - unique ID generated on startup
    /// Used by clients to detect server restarts
    epoch: String,
    /// Dish-to-station routing lookup for station-scoped transitions
    station_catalog: StationCatalog,
    /// Payment collaborator, called after commit when a cancellation owes money
    refund_service: Option<Arc<dyn RefundService>>,
}

impl std::fmt::Debug for OrdersManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdersManager")
            .field("storage", &"<OrderStorage>")
            .field("event_tx", &"<broadcast::Sender>")
            .field("epoch", &self.epoch)
            .finish()
    }
}

impl OrdersManager {
    /// Create a new OrdersManager with the given database path
    pub fn new(db_path: impl AsRef<Path>) -> ManagerResult<Self> {
        let storage = OrderStorage::open(db_path)?;
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let epoch = uuid::Uuid::new_v4().to_string();
        tracing::info!(epoch = %epoch, "OrdersManager started with new epoch");
        Ok(Self {
            storage,
            event_tx,
            epoch,
            station_catalog: StationCatalog::new(),
            refund_service: None,
        })
    }

    /// Create an OrdersManager with existing storage (for testing)
    #[cfg(test)]
    pub fn with_storage(storage: OrderStorage) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let epoch = uuid::Uuid::new_v4().to_string();
        Self {
            storage,
            event_tx,
            epoch,
            station_catalog: StationCatalog::new(),
            refund_service: None,
        }
    }

    /// Set the payment collaborator for refund creation
    pub fn set_refund_service(&mut self, service: Arc<dyn RefundService>) {
        self.refund_service = Some(service);
    }

    /// Get the server epoch (unique instance ID)
    pub fn epoch(&self) -> &str {
        &self.epoch
    }

    /// Get the station catalog (loaded from the dish catalog at startup)
    pub fn station_catalog(&self) -> &StationCatalog {
        &self.station_catalog
    }

    /// Subscribe to event broadcasts
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.event_tx.subscribe()
    }

    /// Get the underlying storage
    pub fn storage(&self) -> &OrderStorage {
        &self.storage
    }

    /// Execute a command and return the response
    pub fn execute_command(&self, cmd: OrderCommand) -> CommandResponse {
        match self.process_command(cmd.clone()) {
            Ok((response, events)) => {
                // Broadcast events after successful commit
                for event in &events {
                    if self.event_tx.send(event.clone()).is_err() {
                        tracing::warn!("Event broadcast failed: no active receivers");
                        break;
                    }
                }
                // Refund creation is also post-commit: the cancellation is
                // already durable, a refund failure must not roll it back
                self.create_refunds(&events);
                response
            }
            Err(err) => CommandResponse::error(cmd.command_id, err.into()),
        }
    }

    /// Call the payment collaborator for every cancellation that owes money
    fn create_refunds(&self, events: &[OrderEvent]) {
        for event in events {
            let EventPayload::OrderCancelled {
                refund_due: Some(amount),
                refund_method,
                ..
            } = &event.payload
            else {
                continue;
            };

            let Some(service) = &self.refund_service else {
                tracing::warn!(
                    order_id = %event.order_id,
                    amount,
                    "Refund due but no refund service configured, reconcile manually"
                );
                continue;
            };

            match service.create_refund(&event.order_id, *amount, refund_method.as_deref()) {
                Ok(()) => {
                    tracing::info!(order_id = %event.order_id, amount, "Refund created");
                }
                Err(e) => {
                    tracing::error!(
                        order_id = %event.order_id,
                        amount,
                        error = %e,
                        "Refund creation failed, surfaced via payment reconciliation"
                    );
                }
            }
        }
    }

    /// Process command and return response with events
    ///
    /// Uses the action-based architecture:
    /// 1. Convert command to CommandAction
    /// 2. Execute action to generate events
    /// 3. Apply events to snapshots via EventApplier
    /// 4. Persist everything atomically
    fn process_command(
        &self,
        cmd: OrderCommand,
    ) -> ManagerResult<(CommandResponse, Vec<OrderEvent>)> {
        tracing::debug!(command_id = %cmd.command_id, payload = ?cmd.payload, "Processing command");

        // 1. Idempotency check (before transaction)
        if self.storage.is_command_processed(&cmd.command_id)? {
            tracing::warn!(command_id = %cmd.command_id, "Duplicate command");
            return Ok((CommandResponse::duplicate(cmd.command_id), vec![]));
        }

        // 2. Begin write transaction
        let txn = self.storage.begin_write()?;

        // Double-check idempotency within transaction
        if self
            .storage
            .is_command_processed_txn(&txn, &cmd.command_id)?
        {
            return Ok((CommandResponse::duplicate(cmd.command_id), vec![]));
        }

        // 3. Get current sequence for context initialization
        let current_sequence = self.storage.get_current_sequence()?;

        // 4. Create context and metadata
        let mut ctx = CommandContext::new(&txn, &self.storage, current_sequence);
        let metadata = CommandMetadata {
            command_id: cmd.command_id.clone(),
            operator_id: cmd.operator_id,
            operator_name: cmd.operator_name.clone(),
            timestamp: cmd.timestamp,
        };

        // 5. Convert to action and execute
        // For TransitionOrder: resolve the station slug against the catalog.
        // Unknown slugs degrade to the unscoped case instead of failing.
        let action: CommandAction = match &cmd.payload {
            OrderCommandPayload::TransitionOrder {
                order_id,
                action,
                station,
                reason,
            } => {
                let station_id = station.as_deref().and_then(|slug| {
                    let resolved = self.station_catalog.resolve(slug);
                    if resolved.is_none() {
                        tracing::debug!(
                            station = %slug,
                            "Unknown station slug, applying transition unscoped"
                        );
                    }
                    resolved
                });
                CommandAction::TransitionOrder(TransitionOrderAction {
                    order_id: order_id.clone(),
                    action: *action,
                    station_id,
                    reason: reason.clone(),
                })
            }
            _ => (&cmd).into(),
        };
        let events = futures::executor::block_on(action.execute(&mut ctx, &metadata))
            .map_err(ManagerError::from)?;

        // 6. Apply events to snapshots
        for event in &events {
            // Load or create snapshot for this order
            let mut snapshot = ctx
                .load_snapshot(&event.order_id)
                .unwrap_or_else(|_| OrderSnapshot::new(event.order_id.clone()));

            // Apply event using EventApplier
            let applier: EventAction = event.into();
            applier.apply(&mut snapshot, event);

            // Save updated snapshot to context
            ctx.save_snapshot(snapshot);
        }

        // 7. Persist events and run collaborator writes they imply
        for event in &events {
            self.storage.store_event(&txn, event)?;

            match &event.payload {
                // New item IDs go into the item index so item-level commands
                // can resolve their order without a scan
                EventPayload::OrderOpened { items, .. } | EventPayload::ItemsAdded { items } => {
                    let item_ids: Vec<String> =
                        items.iter().map(|i| i.item_id.clone()).collect();
                    self.storage.index_items(&txn, &event.order_id, &item_ids)?;
                }
                // Reservation close shares the command transaction
                EventPayload::ReservationCancelled { reservation_id } => {
                    self.storage.cancel_reservation_txn(&txn, *reservation_id)?;
                }
                _ => {}
            }
        }

        // 8. Persist snapshots and update active order tracking
        let modified = ctx.take_modified_snapshots();
        for snapshot in modified.values() {
            self.storage.store_snapshot(&txn, snapshot)?;

            if snapshot.status.is_terminal() {
                self.storage.mark_order_inactive(&txn, &snapshot.order_id)?;
            } else {
                self.storage.mark_order_active(&txn, &snapshot.order_id)?;
            }
        }

        // 9. Update sequence counter
        let max_sequence = events
            .iter()
            .map(|e| e.sequence)
            .max()
            .unwrap_or(current_sequence);
        if max_sequence > current_sequence {
            self.storage.set_sequence(&txn, max_sequence)?;
        }

        // 10. Mark command processed
        self.storage.mark_command_processed(&txn, &cmd.command_id)?;

        // 11. Commit transaction
        txn.commit().map_err(StorageError::from)?;

        // 12. Return response with the command's primary snapshot
        let order_id = events
            .first()
            .map(|e| e.order_id.clone())
            .ok_or_else(|| ManagerError::Internal("action produced no events".to_string()))?;
        let snapshot = modified
            .get(&order_id)
            .cloned()
            .ok_or_else(|| ManagerError::Internal(format!("no snapshot staged for {order_id}")))?;
        tracing::info!(
            command_id = %cmd.command_id,
            order_id = %order_id,
            event_count = events.len(),
            "Command processed successfully"
        );
        Ok((
            CommandResponse::success(cmd.command_id, order_id, snapshot),
            events,
        ))
    }

    // ========== Public Query Methods ==========

    /// Get a snapshot by order ID
    pub fn get_snapshot(&self, order_id: &str) -> ManagerResult<Option<OrderSnapshot>> {
        Ok(self.storage.get_snapshot(order_id)?)
    }

    /// Get all active order snapshots
    pub fn get_active_orders(&self) -> ManagerResult<Vec<OrderSnapshot>> {
        Ok(self.storage.get_active_orders()?)
    }

    /// Get current sequence number
    pub fn get_current_sequence(&self) -> ManagerResult<u64> {
        Ok(self.storage.get_current_sequence()?)
    }

    /// Get events since a given sequence
    pub fn get_events_since(&self, since_sequence: u64) -> ManagerResult<Vec<OrderEvent>> {
        Ok(self.storage.get_events_since(since_sequence)?)
    }

    /// Get events for active orders since a given sequence
    pub fn get_active_events_since(&self, since_sequence: u64) -> ManagerResult<Vec<OrderEvent>> {
        Ok(self.storage.get_active_events_since(since_sequence)?)
    }

    /// Get all events for a specific order
    pub fn get_events_for_order(&self, order_id: &str) -> ManagerResult<Vec<OrderEvent>> {
        Ok(self.storage.get_events_for_order(order_id)?)
    }

    /// Rebuild a snapshot from events (for verification)
    ///
    /// Uses EventApplier to apply each event to build the snapshot.
    pub fn rebuild_snapshot(&self, order_id: &str) -> ManagerResult<OrderSnapshot> {
        let events = self.storage.get_events_for_order(order_id)?;
        if events.is_empty() {
            return Err(ManagerError::OrderNotFound(order_id.to_string()));
        }

        let mut snapshot = OrderSnapshot::new(order_id.to_string());
        for event in &events {
            let applier: EventAction = event.into();
            applier.apply(&mut snapshot, event);
        }

        Ok(snapshot)
    }
}

// Make OrdersManager Clone-able via Arc
impl Clone for OrdersManager {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            event_tx: self.event_tx.clone(),
            epoch: self.epoch.clone(),
            station_catalog: self.station_catalog.clone(),
            refund_service: self.refund_service.clone(),
        }
    }
}

#[cfg(test)]
mod tests;
