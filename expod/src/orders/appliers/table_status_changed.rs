//! TableStatusChanged event applier
//!
//! The payload targets the floor plan, not the order. Occupancy itself is
//! derived from the active order index, so the event carries the fact for
//! subscribers; here we only advance the snapshot's bookkeeping so live and
//! replayed folds produce the same checksum.

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// TableStatusChanged applier
pub struct TableStatusChangedApplier;

impl EventApplier for TableStatusChangedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::TableStatusChanged { .. } = &event.payload {
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
    use shared::models::TableStatus;
    use shared::order::{OrderEventType, OrderStatus};

    #[test]
    fn test_apply_advances_bookkeeping_only() {
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        snapshot.status = OrderStatus::Completed;
        snapshot.table_id = Some(5);

        let event = OrderEvent::new(
            9,
            "order-1".to_string(),
            1,
            "Waiter".to_string(),
            "cmd-1".to_string(),
            Some(1234567890),
            OrderEventType::TableStatusChanged,
            EventPayload::TableStatusChanged {
                table_id: 5,
                status: TableStatus::Free,
            },
        );

        let applier = TableStatusChangedApplier;
        applier.apply(&mut snapshot, &event);

        // Order fields untouched, only bookkeeping moves
        assert_eq!(snapshot.status, OrderStatus::Completed);
        assert_eq!(snapshot.table_id, Some(5));
        assert_eq!(snapshot.last_sequence, 9);
        assert_eq!(snapshot.updated_at, event.timestamp);
        assert!(snapshot.verify_checksum());
    }
}
