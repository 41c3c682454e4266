//! Order line items
//!
//! An item is the unit the kitchen works on. Its `status` field is driven
//! exclusively by the item state machine in the engine; the fields here are
//! plain data so that events, snapshots, and transport adapters share one
//! shape.

use serde::{Deserialize, Serialize};

/// Line item status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    #[default]
    Pending,
    Cooking,
    Ready,
    Served,
    Cancelled,
    PendingCancel,
}

impl ItemStatus {
    /// Terminal statuses accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ItemStatus::Served | ItemStatus::Cancelled)
    }
}

/// One line within an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    /// Unique across all orders (uuid)
    pub item_id: String,
    pub product_id: i64,
    pub name: String,
    pub status: ItemStatus,
    /// `None` means the item is visible to every station
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kitchen_station_id: Option<i64>,
    /// Set when a station actually starts working the item, not when it
    /// merely enters the cooking queue
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooking_started_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooking_finished_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    /// Status stashed by `request_cancel` so `reject_cancel` can restore it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_before_cancel: Option<ItemStatus>,
    #[serde(default)]
    pub is_write_off: bool,
    pub price: f64,
    pub quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl OrderItem {
    /// Build a pending item with a fresh unique ID.
    pub fn new(product_id: i64, name: String, price: f64, quantity: i32) -> Self {
        Self {
            item_id: uuid::Uuid::new_v4().to_string(),
            product_id,
            name,
            status: ItemStatus::Pending,
            kitchen_station_id: None,
            cooking_started_at: None,
            cooking_finished_at: None,
            cancellation_reason: None,
            status_before_cancel: None,
            is_write_off: false,
            price,
            quantity,
            note: None,
        }
    }

    /// Still participating in preparation (neither served nor cancelled).
    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == ItemStatus::Cancelled
    }
}
