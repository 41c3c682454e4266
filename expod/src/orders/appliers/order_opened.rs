//! OrderOpened event applier
//!
//! Applies the OrderOpened event to create initial snapshot state.

use crate::orders::money;
use crate::orders::traits::EventApplier;
use shared::order::{DeliveryStatus, EventPayload, OrderEvent, OrderSnapshot, OrderStatus};

/// OrderOpened applier
pub struct OrderOpenedApplier;

impl EventApplier for OrderOpenedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::OrderOpened {
            order_type,
            table_id,
            linked_table_ids,
            reservation_id,
            guest_count,
            note,
            confirmed,
            items,
        } = &event.payload
        {
            // Set order_id from event (important for replay scenarios)
            snapshot.order_id = event.order_id.clone();
            snapshot.order_type = *order_type;
            snapshot.table_id = *table_id;
            snapshot.linked_table_ids = linked_table_ids.clone();
            snapshot.reservation_id = *reservation_id;
            snapshot.guest_count = *guest_count;
            snapshot.note = note.clone();
            snapshot.items = items.clone();
            snapshot.status = if *confirmed {
                OrderStatus::Confirmed
            } else {
                OrderStatus::New
            };
            // Delivery-class orders start their projection at Pending
            snapshot.delivery_status = order_type
                .tracks_delivery()
                .then_some(DeliveryStatus::Pending);
            snapshot.start_time = event.timestamp;
            snapshot.created_at = event.timestamp;
            snapshot.updated_at = event.timestamp;
            snapshot.last_sequence = event.sequence;

            // Recalculate totals using precise decimal arithmetic
            money::recalculate_totals(snapshot);

            // Update checksum
            snapshot.update_checksum();
        }
    }
}
