//! Order commands - client requests to modify orders

use super::item::OrderItem;
use super::types::{DeliveryStatus, OrderItemInput, OrderType, TransitionAction};
use serde::{Deserialize, Serialize};

/// A request to modify an order
///
/// `command_id` is the idempotency key: the engine records processed IDs
/// and replays return a duplicate response instead of re-executing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCommand {
    pub command_id: String,
    pub operator_id: i64,
    pub operator_name: String,
    /// Client wall clock, carried onto events as `client_timestamp`
    pub timestamp: i64,
    pub payload: OrderCommandPayload,
}

impl OrderCommand {
    pub fn new(operator_id: i64, operator_name: String, payload: OrderCommandPayload) -> Self {
        Self {
            command_id: uuid::Uuid::new_v4().to_string(),
            operator_id,
            operator_name,
            timestamp: crate::util::now_millis(),
            payload,
        }
    }
}

/// Command payload variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderCommandPayload {
    // ========== Lifecycle ==========
    OpenOrder {
        #[serde(default)]
        order_type: OrderType,
        #[serde(skip_serializing_if = "Option::is_none")]
        table_id: Option<i64>,
        #[serde(default)]
        linked_table_ids: Vec<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        reservation_id: Option<i64>,
        #[serde(default)]
        guest_count: i32,
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
        /// Open straight into `Confirmed`, skipping the draft stage
        #[serde(default)]
        confirmed: bool,
        #[serde(default)]
        items: Vec<OrderItemInput>,
    },
    ConfirmOrder {
        order_id: String,
    },
    CompleteOrder {
        order_id: String,
    },

    // ========== Items ==========
    AddItems {
        order_id: String,
        items: Vec<OrderItemInput>,
    },
    /// Run one workflow action over a station's visible slice of an order
    TransitionOrder {
        order_id: String,
        action: TransitionAction,
        /// Station slug scoping the transition; absent means unscoped
        #[serde(skip_serializing_if = "Option::is_none")]
        station: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// Run one workflow action against a single item
    TransitionItem {
        order_id: String,
        item_id: String,
        action: TransitionAction,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    // ========== Order cancellation ==========
    CancelOrder {
        order_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    RequestCancellation {
        order_id: String,
        reason: String,
    },
    ApproveCancellation {
        order_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        refund_method: Option<String>,
    },
    RejectCancellation {
        order_id: String,
    },

    // ========== Item cancellation (owner resolved via item index) ==========
    RequestItemCancellation {
        item_id: String,
        reason: String,
    },
    ApproveItemCancellation {
        item_id: String,
    },
    RejectItemCancellation {
        item_id: String,
    },

    // ========== Delivery ==========
    UpdateDeliveryProgress {
        order_id: String,
        status: DeliveryStatus,
    },
}

impl OrderCommandPayload {
    /// Order the command addresses, when it names one directly.
    ///
    /// `OpenOrder` creates its order and the item-cancellation commands
    /// resolve theirs through the item index, so both return `None`.
    pub fn order_id(&self) -> Option<&str> {
        match self {
            OrderCommandPayload::ConfirmOrder { order_id }
            | OrderCommandPayload::CompleteOrder { order_id }
            | OrderCommandPayload::AddItems { order_id, .. }
            | OrderCommandPayload::TransitionOrder { order_id, .. }
            | OrderCommandPayload::TransitionItem { order_id, .. }
            | OrderCommandPayload::CancelOrder { order_id, .. }
            | OrderCommandPayload::RequestCancellation { order_id, .. }
            | OrderCommandPayload::ApproveCancellation { order_id, .. }
            | OrderCommandPayload::RejectCancellation { order_id }
            | OrderCommandPayload::UpdateDeliveryProgress { order_id, .. } => Some(order_id),
            OrderCommandPayload::OpenOrder { .. }
            | OrderCommandPayload::RequestItemCancellation { .. }
            | OrderCommandPayload::ApproveItemCancellation { .. }
            | OrderCommandPayload::RejectItemCancellation { .. } => None,
        }
    }
}

/// Convert client inputs into engine items in one pass.
pub fn items_from_inputs(inputs: &[OrderItemInput]) -> Vec<OrderItem> {
    inputs.iter().cloned().map(OrderItem::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_gets_unique_ids() {
        let a = OrderCommand::new(
            1,
            "Alice".to_string(),
            OrderCommandPayload::ConfirmOrder {
                order_id: "order-1".to_string(),
            },
        );
        let b = OrderCommand::new(
            1,
            "Alice".to_string(),
            OrderCommandPayload::ConfirmOrder {
                order_id: "order-1".to_string(),
            },
        );
        assert_ne!(a.command_id, b.command_id);
    }

    #[test]
    fn test_payload_tag_format() {
        let payload = OrderCommandPayload::RequestCancellation {
            order_id: "order-1".to_string(),
            reason: "guest left".to_string(),
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("\"type\":\"REQUEST_CANCELLATION\""));
    }

    #[test]
    fn test_open_order_defaults() {
        let json = r#"{"type":"OPEN_ORDER"}"#;
        let payload: OrderCommandPayload = serde_json::from_str(json).unwrap();
        match payload {
            OrderCommandPayload::OpenOrder {
                order_type,
                table_id,
                linked_table_ids,
                confirmed,
                items,
                ..
            } => {
                assert_eq!(order_type, OrderType::DineIn);
                assert!(table_id.is_none());
                assert!(linked_table_ids.is_empty());
                assert!(!confirmed);
                assert!(items.is_empty());
            }
            _ => panic!("Expected OpenOrder payload"),
        }
    }

    #[test]
    fn test_order_id_resolution() {
        let direct = OrderCommandPayload::CompleteOrder {
            order_id: "order-9".to_string(),
        };
        assert_eq!(direct.order_id(), Some("order-9"));

        let indexed = OrderCommandPayload::ApproveItemCancellation {
            item_id: "item-1".to_string(),
        };
        assert_eq!(indexed.order_id(), None);
    }

    #[test]
    fn test_items_from_inputs_assigns_ids() {
        let inputs = vec![OrderItemInput {
            product_id: 3,
            name: "Ramen".to_string(),
            price: 12.0,
            quantity: 2,
            kitchen_station_id: Some(1),
            note: None,
        }];
        let items = items_from_inputs(&inputs);
        assert_eq!(items.len(), 1);
        assert!(!items[0].item_id.is_empty());
        assert_eq!(items[0].kitchen_station_id, Some(1));
    }
}
