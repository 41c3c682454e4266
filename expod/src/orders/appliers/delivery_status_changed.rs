//! DeliveryStatusChanged event applier

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// DeliveryStatusChanged applier
pub struct DeliveryStatusChangedApplier;

impl EventApplier for DeliveryStatusChangedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::DeliveryStatusChanged { status, .. } = &event.payload {
            snapshot.delivery_status = Some(*status);

            // Update sequence and timestamp
            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;

            // Update checksum
            snapshot.update_checksum();
        }
    }
}
