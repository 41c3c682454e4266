//! ReservationCancelled event applier
//!
//! The reservation record lives in its own table and is closed by the
//! manager inside the command transaction. The snapshot keeps its
//! reservation_id for audit, so only bookkeeping moves here.

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// ReservationCancelled applier
pub struct ReservationCancelledApplier;

impl EventApplier for ReservationCancelledApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::ReservationCancelled { .. } = &event.payload {
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
    fn test_reservation_id_survives_for_audit() {
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        snapshot.status = OrderStatus::Cancelled;
        snapshot.reservation_id = Some(42);

        let event = OrderEvent::new(
            7,
            "order-1".to_string(),
            1,
            "Manager".to_string(),
            "cmd-1".to_string(),
            Some(1234567890),
            OrderEventType::ReservationCancelled,
            EventPayload::ReservationCancelled { reservation_id: 42 },
        );

        let applier = ReservationCancelledApplier;
        applier.apply(&mut snapshot, &event);

        assert_eq!(snapshot.reservation_id, Some(42));
        assert_eq!(snapshot.last_sequence, 7);
        assert!(snapshot.verify_checksum());
    }
}
