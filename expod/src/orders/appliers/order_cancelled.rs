//! OrderCancelled event applier
//!
//! Marks the order terminally cancelled and cascades to the items the
//! event names. Terminal metadata comes off the event envelope so replay
//! reproduces exactly who cancelled and when.

use crate::orders::money;
use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, ItemStatus, OrderEvent, OrderSnapshot, OrderStatus};

/// OrderCancelled applier
pub struct OrderCancelledApplier;

impl EventApplier for OrderCancelledApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::OrderCancelled {
            reason,
            write_off,
            cancelled_item_ids,
            refund_due: _,
            refund_method: _,
        } = &event.payload
        {
            snapshot.status = OrderStatus::Cancelled;
            snapshot.cancel_reason = reason.clone();
            snapshot.cancelled_at = Some(event.timestamp);
            snapshot.cancelled_by = Some(event.operator_name.clone());
            snapshot.is_write_off = *write_off;
            snapshot.end_time = Some(event.timestamp);

            // Cascade exactly to the items the command saw as active
            for item_id in cancelled_item_ids {
                if let Some(item) = snapshot.find_item_mut(item_id) {
                    item.status = ItemStatus::Cancelled;
                    item.is_write_off = true;
                    item.status_before_cancel = None;
                }
            }

            // A pending request dies with the order
            snapshot.pending_cancellation = false;
            snapshot.cancel_request_reason = None;
            snapshot.cancel_requested_by = None;
            snapshot.cancel_requested_at = None;

            // Update sequence and timestamp
            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;

            // Recalculate totals using precise decimal arithmetic
            money::recalculate_totals(snapshot);

            // Update checksum
            snapshot.update_checksum();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{OrderEventType, OrderItem};

    fn create_order_cancelled_event(
        seq: u64,
        reason: Option<&str>,
        cancelled_item_ids: Vec<String>,
        refund_due: Option<f64>,
    ) -> OrderEvent {
        OrderEvent::new(
            seq,
            "order-1".to_string(),
            9,
            "Manager".to_string(),
            "cmd-1".to_string(),
            Some(1234567890),
            OrderEventType::OrderCancelled,
            EventPayload::OrderCancelled {
                reason: reason.map(String::from),
                write_off: true,
                cancelled_item_ids,
                refund_due,
                refund_method: None,
            },
        )
    }

    fn snapshot_with_items() -> OrderSnapshot {
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        snapshot.status = OrderStatus::Cooking;
        let mut cooking = OrderItem::new(1, "Cooking".to_string(), 10.0, 1);
        cooking.status = ItemStatus::Cooking;
        let mut served = OrderItem::new(2, "Served".to_string(), 8.0, 1);
        served.status = ItemStatus::Served;
        snapshot.items = vec![cooking, served];
        snapshot
    }

    #[test]
    fn test_cancel_sets_terminal_metadata() {
        let mut snapshot = snapshot_with_items();
        let event = create_order_cancelled_event(7, Some("kitchen fire"), vec![], None);

        let applier = OrderCancelledApplier;
        applier.apply(&mut snapshot, &event);

        assert_eq!(snapshot.status, OrderStatus::Cancelled);
        assert_eq!(snapshot.cancel_reason.as_deref(), Some("kitchen fire"));
        assert_eq!(snapshot.cancelled_by.as_deref(), Some("Manager"));
        assert_eq!(snapshot.cancelled_at, Some(event.timestamp));
        assert_eq!(snapshot.end_time, Some(event.timestamp));
        assert!(snapshot.is_write_off);
        assert_eq!(snapshot.last_sequence, 7);
    }

    #[test]
    fn test_cancel_cascades_to_named_items_only() {
        let mut snapshot = snapshot_with_items();
        let cascade_id = snapshot.items[0].item_id.clone();
        let event = create_order_cancelled_event(1, None, vec![cascade_id], None);

        let applier = OrderCancelledApplier;
        applier.apply(&mut snapshot, &event);

        assert_eq!(snapshot.items[0].status, ItemStatus::Cancelled);
        assert!(snapshot.items[0].is_write_off);
        // Served item was not named and keeps its terminal state
        assert_eq!(snapshot.items[1].status, ItemStatus::Served);
        assert!(!snapshot.items[1].is_write_off);
    }

    #[test]
    fn test_cancel_excludes_dead_items_from_totals() {
        let mut snapshot = snapshot_with_items();
        let cascade_id = snapshot.items[0].item_id.clone();
        let event = create_order_cancelled_event(1, None, vec![cascade_id], None);

        let applier = OrderCancelledApplier;
        applier.apply(&mut snapshot, &event);

        // Only the served 8.0 item still counts
        assert_eq!(snapshot.subtotal, 8.0);
        assert_eq!(snapshot.total, 8.0);
    }

    #[test]
    fn test_cancel_clears_pending_request() {
        let mut snapshot = snapshot_with_items();
        snapshot.pending_cancellation = true;
        snapshot.cancel_request_reason = Some("wrong table".to_string());
        snapshot.cancel_requested_by = Some("Waiter".to_string());
        snapshot.cancel_requested_at = Some(100);

        let event = create_order_cancelled_event(1, Some("wrong table"), vec![], None);

        let applier = OrderCancelledApplier;
        applier.apply(&mut snapshot, &event);

        assert!(!snapshot.pending_cancellation);
        assert_eq!(snapshot.cancel_request_reason, None);
        assert_eq!(snapshot.cancel_requested_by, None);
        assert_eq!(snapshot.cancel_requested_at, None);
        // The terminal reason survives on its own field
        assert_eq!(snapshot.cancel_reason.as_deref(), Some("wrong table"));
    }

    #[test]
    fn test_cancel_idempotent() {
        let mut snapshot = snapshot_with_items();
        let cascade_id = snapshot.items[0].item_id.clone();
        let event = create_order_cancelled_event(1, Some("x"), vec![cascade_id], Some(10.0));

        let applier = OrderCancelledApplier;
        applier.apply(&mut snapshot, &event);
        let checksum_after_first = snapshot.state_checksum.clone();

        applier.apply(&mut snapshot, &event);

        assert_eq!(snapshot.state_checksum, checksum_after_first);
        assert!(snapshot.verify_checksum());
    }
}
