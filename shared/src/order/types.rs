//! Common order types: service classes, transitions, command plumbing

use super::item::{ItemStatus, OrderItem};
use super::snapshot::OrderSnapshot;
use serde::{Deserialize, Serialize};

/// Service class of an order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    #[default]
    DineIn,
    Delivery,
    Pickup,
    Preorder,
}

impl OrderType {
    /// Delivery-class orders carry a `delivery_status` projection.
    pub fn tracks_delivery(&self) -> bool {
        !matches!(self, OrderType::DineIn)
    }
}

/// Courier-facing progress for delivery-class orders
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Pending,
    Preparing,
    Ready,
    PickedUp,
    InTransit,
    Delivered,
    Cancelled,
}

/// A workflow action applied to one item or to a station's slice of an order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransitionAction {
    Cooking,
    Ready,
    ReturnToNew,
    ReturnToCooking,
    Served,
    Cancel,
    RequestCancel,
    ApproveCancel,
    RejectCancel,
}

/// Client-supplied item data, before the engine assigns an item ID
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemInput {
    pub product_id: i64,
    pub name: String,
    pub price: f64,
    pub quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kitchen_station_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl From<OrderItemInput> for OrderItem {
    fn from(input: OrderItemInput) -> Self {
        let mut item = OrderItem::new(input.product_id, input.name, input.price, input.quantity);
        item.kitchen_station_id = input.kitchen_station_id;
        item.note = input.note;
        item
    }
}

/// Post-transition facts for a single item, baked into the event stream
///
/// Actions run the state machine against a working copy and capture the
/// outcome here; appliers replay the outcome verbatim so a rebuild never
/// re-evaluates guards against state that no longer exists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemTransition {
    pub item_id: String,
    pub status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooking_started_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooking_finished_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_before_cancel: Option<ItemStatus>,
    #[serde(default)]
    pub is_write_off: bool,
}

impl ItemTransition {
    /// Capture the transition-relevant fields of an already-mutated item.
    pub fn capture(item: &OrderItem) -> Self {
        Self {
            item_id: item.item_id.clone(),
            status: item.status,
            cooking_started_at: item.cooking_started_at,
            cooking_finished_at: item.cooking_finished_at,
            cancellation_reason: item.cancellation_reason.clone(),
            status_before_cancel: item.status_before_cancel,
            is_write_off: item.is_write_off,
        }
    }

    /// Overwrite an item with the captured outcome.
    pub fn apply_to(&self, item: &mut OrderItem) {
        item.status = self.status;
        item.cooking_started_at = self.cooking_started_at;
        item.cooking_finished_at = self.cooking_finished_at;
        item.cancellation_reason = self.cancellation_reason.clone();
        item.status_before_cancel = self.status_before_cancel;
        item.is_write_off = self.is_write_off;
    }
}

/// Synchronous result of a command execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    pub command_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Box<OrderSnapshot>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandError>,
}

impl CommandResponse {
    pub fn success(command_id: String, order_id: String, snapshot: OrderSnapshot) -> Self {
        Self {
            command_id,
            success: true,
            order_id: Some(order_id),
            snapshot: Some(Box::new(snapshot)),
            error: None,
        }
    }

    pub fn error(command_id: String, error: CommandError) -> Self {
        Self {
            command_id,
            success: false,
            order_id: None,
            snapshot: None,
            error: None,
        }
        .with_error(error)
    }

    /// Replay of an already-processed command. Reported as success with no
    /// snapshot so retries stay harmless.
    pub fn duplicate(command_id: String) -> Self {
        Self {
            command_id,
            success: true,
            order_id: None,
            snapshot: None,
            error: None,
        }
    }

    fn with_error(mut self, error: CommandError) -> Self {
        self.error = Some(error);
        self
    }
}

/// Structured command failure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandError {
    pub code: CommandErrorCode,
    pub message: String,
}

impl CommandError {
    pub fn new(code: CommandErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

/// Machine-readable failure classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandErrorCode {
    OrderNotFound,
    OrderAlreadyCompleted,
    OrderAlreadyCancelled,
    ItemNotFound,
    OwnershipMismatch,
    InvalidTransition,
    InvalidOperation,
    DuplicateCommand,
    TableOccupied,
    InternalError,
    StorageFull,
    OutOfMemory,
    StorageCorrupted,
    SystemBusy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_type_delivery_tracking() {
        assert!(!OrderType::DineIn.tracks_delivery());
        assert!(OrderType::Delivery.tracks_delivery());
        assert!(OrderType::Pickup.tracks_delivery());
        assert!(OrderType::Preorder.tracks_delivery());
    }

    #[test]
    fn test_transition_action_serde_format() {
        let json = serde_json::to_string(&TransitionAction::ReturnToCooking).unwrap();
        assert_eq!(json, "\"RETURN_TO_COOKING\"");

        let parsed: TransitionAction = serde_json::from_str("\"REQUEST_CANCEL\"").unwrap();
        assert_eq!(parsed, TransitionAction::RequestCancel);
    }

    #[test]
    fn test_item_transition_capture_apply_roundtrip() {
        let mut item = OrderItem::new(1, "Latte".to_string(), 4.5, 1);
        item.status = ItemStatus::Cooking;
        item.cooking_started_at = Some(1000);

        let transition = ItemTransition::capture(&item);

        let mut other = OrderItem::new(1, "Latte".to_string(), 4.5, 1);
        other.item_id = item.item_id.clone();
        transition.apply_to(&mut other);

        assert_eq!(other, item);
    }

    #[test]
    fn test_duplicate_response_is_success_without_snapshot() {
        let response = CommandResponse::duplicate("cmd-1".to_string());
        assert!(response.success);
        assert!(response.snapshot.is_none());
        assert!(response.error.is_none());
    }

    #[test]
    fn test_error_response() {
        let response = CommandResponse::error(
            "cmd-1".to_string(),
            CommandError::new(CommandErrorCode::OrderNotFound, "order missing"),
        );
        assert!(!response.success);
        let error = response.error.unwrap();
        assert_eq!(error.code, CommandErrorCode::OrderNotFound);
    }
}
