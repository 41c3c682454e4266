//! Order events - immutable facts recorded after command processing

use super::item::OrderItem;
use super::snapshot::OrderStatus;
use super::types::{DeliveryStatus, ItemTransition, OrderType, TransitionAction};
use crate::models::TableStatus;
use serde::{Deserialize, Serialize};

/// Order event - immutable audit record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEvent {
    /// Event unique ID
    pub event_id: String,
    /// Global sequence number (for ordering and replay)
    /// This is the AUTHORITATIVE ordering mechanism for state evolution
    pub sequence: u64,
    /// Order this event belongs to
    pub order_id: String,
    /// Server timestamp (Unix milliseconds) - AUTHORITATIVE for state evolution
    /// Always set by server when event is created
    pub timestamp: i64,
    /// Client timestamp (Unix milliseconds) - for audit and debugging
    /// Preserved from original command, may differ from server time due to clock skew
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_timestamp: Option<i64>,
    /// Operator who triggered this event
    pub operator_id: i64,
    /// Operator name (snapshot for audit)
    pub operator_name: String,
    /// Command that triggered this event (for audit tracing)
    pub command_id: String,
    /// Event type
    pub event_type: OrderEventType,
    /// Event payload
    pub payload: EventPayload,
}

/// Event type enumeration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEventType {
    // Lifecycle
    OrderOpened,
    OrderConfirmed,
    OrderCompleted,
    OrderCancelled,

    // Items
    ItemsAdded,
    ItemsTransitioned,

    // Derived state
    OrderStatusChanged,
    DeliveryStatusChanged,

    // Cancellation workflow
    CancellationRequested,
    CancellationRejected,

    // Collaborators
    TableStatusChanged,
    ReservationCancelled,
}

impl std::fmt::Display for OrderEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderEventType::OrderOpened => write!(f, "ORDER_OPENED"),
            OrderEventType::OrderConfirmed => write!(f, "ORDER_CONFIRMED"),
            OrderEventType::OrderCompleted => write!(f, "ORDER_COMPLETED"),
            OrderEventType::OrderCancelled => write!(f, "ORDER_CANCELLED"),
            OrderEventType::ItemsAdded => write!(f, "ITEMS_ADDED"),
            OrderEventType::ItemsTransitioned => write!(f, "ITEMS_TRANSITIONED"),
            OrderEventType::OrderStatusChanged => write!(f, "ORDER_STATUS_CHANGED"),
            OrderEventType::DeliveryStatusChanged => write!(f, "DELIVERY_STATUS_CHANGED"),
            OrderEventType::CancellationRequested => write!(f, "CANCELLATION_REQUESTED"),
            OrderEventType::CancellationRejected => write!(f, "CANCELLATION_REJECTED"),
            OrderEventType::TableStatusChanged => write!(f, "TABLE_STATUS_CHANGED"),
            OrderEventType::ReservationCancelled => write!(f, "RESERVATION_CANCELLED"),
        }
    }
}

/// Event payload variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    // ========== Lifecycle ==========
    OrderOpened {
        #[serde(default)]
        order_type: OrderType,
        #[serde(skip_serializing_if = "Option::is_none")]
        table_id: Option<i64>,
        #[serde(default)]
        linked_table_ids: Vec<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        reservation_id: Option<i64>,
        guest_count: i32,
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
        /// Opened straight into `Confirmed`
        confirmed: bool,
        /// Complete snapshots of initial items, IDs already assigned
        items: Vec<OrderItem>,
    },

    OrderConfirmed {},

    OrderCompleted {
        final_total: f64,
    },

    OrderCancelled {
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        /// Items carried work in progress when the order died
        write_off: bool,
        /// Items cancelled by the cascade (terminal items are untouched)
        cancelled_item_ids: Vec<String>,
        /// Amount the refund collaborator must return, if any was paid
        #[serde(skip_serializing_if = "Option::is_none")]
        refund_due: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        refund_method: Option<String>,
    },

    // ========== Items ==========
    ItemsAdded {
        /// Complete snapshots of added items
        items: Vec<OrderItem>,
    },

    ItemsTransitioned {
        action: TransitionAction,
        /// Station that drove the transition; `None` for unscoped
        #[serde(skip_serializing_if = "Option::is_none")]
        station_id: Option<i64>,
        /// Post-transition facts, one per affected item
        changes: Vec<ItemTransition>,
    },

    // ========== Derived state ==========
    OrderStatusChanged {
        previous: OrderStatus,
        status: OrderStatus,
    },

    DeliveryStatusChanged {
        #[serde(skip_serializing_if = "Option::is_none")]
        previous: Option<DeliveryStatus>,
        status: DeliveryStatus,
    },

    // ========== Cancellation workflow ==========
    CancellationRequested {
        reason: String,
    },

    CancellationRejected {},

    // ========== Collaborators ==========
    TableStatusChanged {
        table_id: i64,
        status: TableStatus,
    },

    ReservationCancelled {
        reservation_id: i64,
    },
}

impl OrderEvent {
    /// Create a new event
    ///
    /// # Arguments
    /// * `sequence` - Global sequence number (authoritative ordering)
    /// * `order_id` - Order this event belongs to
    /// * `operator_id` - Operator who triggered this event
    /// * `operator_name` - Operator name (snapshot for audit)
    /// * `command_id` - Command that triggered this event
    /// * `client_timestamp` - Client-provided timestamp (for audit, may have clock skew)
    /// * `event_type` - Event type
    /// * `payload` - Event payload
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sequence: u64,
        order_id: String,
        operator_id: i64,
        operator_name: String,
        command_id: String,
        client_timestamp: Option<i64>,
        event_type: OrderEventType,
        payload: EventPayload,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            sequence,
            order_id,
            // Server timestamp is ALWAYS set by server - this is authoritative
            timestamp: chrono::Utc::now().timestamp_millis(),
            // Client timestamp preserved for audit (may differ due to clock skew)
            client_timestamp,
            operator_id,
            operator_name,
            command_id,
            event_type,
            payload,
        }
    }

    /// Create event from command (extracts metadata including client timestamp)
    pub fn from_command(
        sequence: u64,
        order_id: String,
        command: &super::OrderCommand,
        event_type: OrderEventType,
        payload: EventPayload,
    ) -> Self {
        Self::new(
            sequence,
            order_id,
            command.operator_id,
            command.operator_name.clone(),
            command.command_id.clone(),
            Some(command.timestamp), // Preserve client timestamp
            event_type,
            payload,
        )
    }
}
