//! Synchronization API for reconnecting clients
//!
//! Terminals drop off the floor network all the time; this module lets
//! them catch up without replaying history they already hold.
//!
//! # Protocol
//!
//! 1. Client reconnects with its last known sequence
//! 2. Server measures the gap
//! 3. Small gap: incremental events for still-active orders
//! 4. Large gap (or unknown epoch): full sync with every active snapshot
//!
//! The response carries the server `epoch`. Sequences from different
//! epochs are incomparable, so a client that sees the epoch change must
//! discard its position and take the full sync path.

use super::manager::{ManagerError, ManagerResult, OrdersManager};
use serde::{Deserialize, Serialize};
use shared::order::{OrderEvent, OrderSnapshot};

/// Maximum events returned by an incremental sync; beyond this a full
/// sync is cheaper than replaying the backlog.
const MAX_INCREMENTAL_EVENTS: usize = 1000;

/// Sync request from a reconnecting client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRequest {
    /// Client's last processed sequence number
    pub since_sequence: u64,
}

/// Sync response to the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncResponse {
    /// Events since the requested sequence (incremental path)
    pub events: Vec<OrderEvent>,
    /// Every active order snapshot (full sync path)
    pub active_orders: Vec<OrderSnapshot>,
    /// Server's current sequence number
    pub server_sequence: u64,
    /// Client must replace its state instead of folding events
    pub requires_full_sync: bool,
    /// Server instance epoch; changes whenever the engine restarts
    pub server_epoch: String,
}

impl SyncResponse {
    pub fn full_sync(
        active_orders: Vec<OrderSnapshot>,
        server_sequence: u64,
        epoch: String,
    ) -> Self {
        Self {
            events: vec![],
            active_orders,
            server_sequence,
            requires_full_sync: true,
            server_epoch: epoch,
        }
    }

    pub fn incremental(events: Vec<OrderEvent>, server_sequence: u64, epoch: String) -> Self {
        Self {
            events,
            active_orders: vec![],
            server_sequence,
            requires_full_sync: false,
            server_epoch: epoch,
        }
    }
}

/// Server-side reconnection handler
pub struct SyncService {
    manager: OrdersManager,
}

impl SyncService {
    pub fn new(manager: OrdersManager) -> Self {
        Self { manager }
    }

    /// Answer a reconnection request.
    ///
    /// Incremental responses only carry events of orders that are still
    /// active: a terminal order's snapshot leaves the active set with it,
    /// so the client has nothing left to fold those events into.
    pub fn sync(&self, request: SyncRequest) -> ManagerResult<SyncResponse> {
        let server_sequence = self.manager.get_current_sequence()?;
        let epoch = self.manager.epoch().to_string();

        // Client is already current
        if request.since_sequence >= server_sequence {
            return Ok(SyncResponse::incremental(vec![], server_sequence, epoch));
        }

        let gap = server_sequence - request.since_sequence;
        if gap > MAX_INCREMENTAL_EVENTS as u64 {
            let active_orders = self.manager.get_active_orders()?;
            return Ok(SyncResponse::full_sync(active_orders, server_sequence, epoch));
        }

        let events = self.manager.get_active_events_since(request.since_sequence)?;

        // The gap check measures raw sequences; re-check the actual batch
        if events.len() > MAX_INCREMENTAL_EVENTS {
            let active_orders = self.manager.get_active_orders()?;
            return Ok(SyncResponse::full_sync(active_orders, server_sequence, epoch));
        }

        Ok(SyncResponse::incremental(events, server_sequence, epoch))
    }

    /// Active order snapshots for a client's initial connection.
    pub fn get_all_active_orders(&self) -> ManagerResult<Vec<OrderSnapshot>> {
        self.manager.get_active_orders()
    }

    pub fn get_server_sequence(&self) -> ManagerResult<u64> {
        self.manager.get_current_sequence()
    }

    /// Check a stored snapshot against a fresh replay of its events.
    ///
    /// `paid_amount` is maintained by the payment collaborator, not by the
    /// event fold, so the comparison covers the event-sourced fields only.
    pub fn verify_snapshot(&self, order_id: &str) -> ManagerResult<bool> {
        let Some(stored) = self.manager.get_snapshot(order_id)? else {
            // No snapshot is consistent only while no events exist either
            return Ok(self.manager.get_events_for_order(order_id)?.is_empty());
        };
        let rebuilt = self.manager.rebuild_snapshot(order_id)?;

        Ok(stored.status == rebuilt.status
            && stored.delivery_status == rebuilt.delivery_status
            && stored.items == rebuilt.items
            && (stored.total - rebuilt.total).abs() < 0.01
            && stored.last_sequence == rebuilt.last_sequence)
    }

    /// Replay-verify every active order, for a startup integrity pass.
    pub fn verify_all_snapshots(&self) -> ManagerResult<Vec<(String, bool)>> {
        let active_orders = self.manager.get_active_orders()?;
        let mut results = Vec::new();

        for order in active_orders {
            let is_valid = self.verify_snapshot(&order.order_id)?;
            results.push((order.order_id, is_valid));
        }

        Ok(results)
    }
}

/// Client-side sync position tracker
#[derive(Debug, Default)]
pub struct ClientSyncState {
    /// Last processed sequence
    pub last_sequence: u64,
    /// Epoch the sequence belongs to
    pub last_epoch: Option<String>,
    pub connected: bool,
    pub needs_full_sync: bool,
}

impl ClientSyncState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_connect(&mut self) {
        self.connected = true;
    }

    pub fn on_disconnect(&mut self) {
        self.connected = false;
    }

    /// Adopt a sync response as the new position.
    ///
    /// An incremental answer from a different epoch is unusable: the
    /// events were cut against a sequence from a previous engine life.
    pub fn on_sync_response(&mut self, response: &SyncResponse) {
        let epoch_changed = self
            .last_epoch
            .as_deref()
            .is_some_and(|previous| previous != response.server_epoch);

        self.last_sequence = response.server_sequence;
        self.last_epoch = Some(response.server_epoch.clone());
        self.needs_full_sync = epoch_changed && !response.requires_full_sync;
    }

    /// Fold one live event into the position; a sequence gap means missed
    /// events and flags a resync.
    pub fn on_event(&mut self, event: &OrderEvent) {
        if event.sequence > self.last_sequence + 1 {
            self.needs_full_sync = true;
        }
        self.last_sequence = event.sequence;
    }

    pub fn should_sync(&self) -> bool {
        !self.connected || self.needs_full_sync
    }

    pub fn create_sync_request(&self) -> SyncRequest {
        SyncRequest {
            since_sequence: self.last_sequence,
        }
    }
}
