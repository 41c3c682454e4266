//! OrderCompleted event applier
//!
//! Applies the OrderCompleted event to mark the order as completed.

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot, OrderStatus};

/// OrderCompleted applier
pub struct OrderCompletedApplier;

impl EventApplier for OrderCompletedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        // final_total on the event is an audit fact; totals live on the snapshot
        if let EventPayload::OrderCompleted { final_total: _ } = &event.payload {
            snapshot.status = OrderStatus::Completed;

            // Set end time
            snapshot.end_time = Some(event.timestamp);

            // Update sequence and timestamp
            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;

            // Update checksum
            snapshot.update_checksum();
        }
    }
}
