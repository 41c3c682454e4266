//! CancellationRequested event applier
//!
//! Flags the order and records the request trail. The requester identity
//! comes off the event envelope.

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// CancellationRequested applier
pub struct CancellationRequestedApplier;

impl EventApplier for CancellationRequestedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::CancellationRequested { reason } = &event.payload {
            snapshot.pending_cancellation = true;
            snapshot.cancel_request_reason = Some(reason.clone());
            snapshot.cancel_requested_by = Some(event.operator_name.clone());
            snapshot.cancel_requested_at = Some(event.timestamp);

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
    fn test_request_flags_order_and_records_trail() {
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        snapshot.status = OrderStatus::Cooking;

        let event = OrderEvent::new(
            5,
            "order-1".to_string(),
            2,
            "Waiter".to_string(),
            "cmd-1".to_string(),
            Some(1234567890),
            OrderEventType::CancellationRequested,
            EventPayload::CancellationRequested {
                reason: "guest left".to_string(),
            },
        );

        let applier = CancellationRequestedApplier;
        applier.apply(&mut snapshot, &event);

        assert!(snapshot.pending_cancellation);
        assert_eq!(snapshot.cancel_request_reason.as_deref(), Some("guest left"));
        assert_eq!(snapshot.cancel_requested_by.as_deref(), Some("Waiter"));
        assert_eq!(snapshot.cancel_requested_at, Some(event.timestamp));
        // The order itself keeps running
        assert_eq!(snapshot.status, OrderStatus::Cooking);
        assert!(snapshot.verify_checksum());
    }
}
