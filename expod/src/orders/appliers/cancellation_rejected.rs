//! CancellationRejected event applier
//!
//! Clears the four request fields and nothing else; the rest of the
//! snapshot must come out exactly as it went in.

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// CancellationRejected applier
pub struct CancellationRejectedApplier;

impl EventApplier for CancellationRejectedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::CancellationRejected {} = &event.payload {
            snapshot.pending_cancellation = false;
            snapshot.cancel_request_reason = None;
            snapshot.cancel_requested_by = None;
            snapshot.cancel_requested_at = None;

            // Update sequence and timestamp
            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;

            // Update checksum
            snapshot.update_checksum();
        }
    }
}
