//! OrderStatusChanged event applier
//!
//! Records the reducer's verdict. The applier trusts the event; it never
//! re-runs the reducer, so replay cannot diverge from live execution.

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// OrderStatusChanged applier
pub struct OrderStatusChangedApplier;

impl EventApplier for OrderStatusChangedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::OrderStatusChanged { status, .. } = &event.payload {
            snapshot.status = *status;

            // Update sequence and timestamp
            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;

            // Update checksum
            snapshot.update_checksum();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{OrderEventType, OrderStatus};

    #[test]
    fn test_status_change_applies_new_status() {
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        snapshot.status = OrderStatus::Confirmed;

        let event = OrderEvent::new(
            8,
            "order-1".to_string(),
            1,
            "Test User".to_string(),
            "cmd-1".to_string(),
            Some(1234567890),
            OrderEventType::OrderStatusChanged,
            EventPayload::OrderStatusChanged {
                previous: OrderStatus::Confirmed,
                status: OrderStatus::Cooking,
            },
        );

        let applier = OrderStatusChangedApplier;
        applier.apply(&mut snapshot, &event);

        assert_eq!(snapshot.status, OrderStatus::Cooking);
        assert_eq!(snapshot.last_sequence, 8);
        assert!(snapshot.verify_checksum());
    }
}
