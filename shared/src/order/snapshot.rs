//! Order snapshot - computed state from event stream

use super::item::{ItemStatus, OrderItem};
use super::types::{DeliveryStatus, OrderType};
use serde::{Deserialize, Serialize};

/// Order-level aggregate status
///
/// `Cooking` and `Ready` are derived from the item set by the reducer;
/// the other four are only ever set by explicit administrative actions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    New,
    Confirmed,
    Cooking,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Active preparation band: the only statuses the reducer may rewrite.
    pub fn is_active_prep(&self) -> bool {
        matches!(
            self,
            OrderStatus::Confirmed | OrderStatus::Cooking | OrderStatus::Ready
        )
    }
}

/// Order snapshot - the current state of an order
///
/// Snapshots are a fold of the order's event stream. They can always be
/// rebuilt by replaying events through the appliers, and `state_checksum`
/// exists to detect drift between the stored fold and a fresh replay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderSnapshot {
    pub order_id: String,
    pub status: OrderStatus,
    /// Projection of `status` for delivery-class orders; `None` for dine-in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_status: Option<DeliveryStatus>,
    pub order_type: OrderType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<i64>,
    /// Extra tables held by this order, released together with the
    /// primary when it closes
    #[serde(default)]
    pub linked_table_ids: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<i64>,
    pub items: Vec<OrderItem>,

    // Cancellation request fields, populated only while a request is pending
    #[serde(default)]
    pub pending_cancellation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_request_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_requested_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_requested_at: Option<i64>,

    // Terminal cancellation metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,
    #[serde(default)]
    pub is_write_off: bool,

    /// Sum over non-cancelled items, decimal-precise
    pub subtotal: f64,
    pub total: f64,
    /// Maintained by the payment collaborator; read for the refund decision
    pub paid_amount: f64,

    pub guest_count: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    pub start_time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,

    /// Sequence of the last event folded into this snapshot
    pub last_sequence: u64,
    /// Drift-detection hash over the critical fields
    pub state_checksum: String,
}

impl OrderSnapshot {
    pub fn new(order_id: String) -> Self {
        let now = crate::util::now_millis();
        let mut snapshot = Self {
            order_id,
            status: OrderStatus::New,
            delivery_status: None,
            order_type: OrderType::DineIn,
            table_id: None,
            linked_table_ids: Vec::new(),
            reservation_id: None,
            items: Vec::new(),
            pending_cancellation: false,
            cancel_request_reason: None,
            cancel_requested_by: None,
            cancel_requested_at: None,
            cancelled_at: None,
            cancelled_by: None,
            cancel_reason: None,
            is_write_off: false,
            subtotal: 0.0,
            total: 0.0,
            paid_amount: 0.0,
            guest_count: 0,
            note: None,
            start_time: now,
            end_time: None,
            created_at: now,
            updated_at: now,
            last_sequence: 0,
            state_checksum: String::new(),
        };
        snapshot.update_checksum();
        snapshot
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Items still participating in preparation.
    pub fn active_items(&self) -> impl Iterator<Item = &OrderItem> {
        self.items.iter().filter(|i| i.is_active())
    }

    pub fn find_item(&self, item_id: &str) -> Option<&OrderItem> {
        self.items.iter().find(|i| i.item_id == item_id)
    }

    pub fn find_item_mut(&mut self, item_id: &str) -> Option<&mut OrderItem> {
        self.items.iter_mut().find(|i| i.item_id == item_id)
    }

    /// Every table this order holds: the primary first, then linked tables,
    /// deduplicated.
    pub fn referenced_tables(&self) -> Vec<i64> {
        let mut tables = Vec::new();
        if let Some(tid) = self.table_id {
            tables.push(tid);
        }
        for tid in &self.linked_table_ids {
            if !tables.contains(tid) {
                tables.push(*tid);
            }
        }
        tables
    }

    /// Recompute the drift-detection checksum.
    ///
    /// Must be called after every applier mutation. The hash covers the
    /// fields whose silent divergence would be hardest to notice: item
    /// count, money, sequence position, and the two status fields.
    pub fn update_checksum(&mut self) {
        self.state_checksum = self.compute_checksum();
    }

    /// Verify the stored checksum against a fresh computation.
    pub fn verify_checksum(&self) -> bool {
        self.state_checksum == self.compute_checksum()
    }

    fn compute_checksum(&self) -> String {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        self.items.len().hash(&mut hasher);
        // Money as integer cents so float noise can't flip the hash
        ((self.total * 100.0).round() as i64).hash(&mut hasher);
        ((self.paid_amount * 100.0).round() as i64).hash(&mut hasher);
        self.last_sequence.hash(&mut hasher);
        (self.status as u8).hash(&mut hasher);
        self.delivery_status
            .map(|d| d as u8)
            .unwrap_or(u8::MAX)
            .hash(&mut hasher);
        self.pending_cancellation.hash(&mut hasher);
        format!("{:016x}", hasher.finish())
    }
}

impl Default for OrderSnapshot {
    fn default() -> Self {
        Self::new(String::new())
    }
}
