//! CancelOrder command handler
//!
//! One-step privileged write-off. The cascade it emits is shared with
//! approval of a pending request: both paths must kill the order the same
//! way (item cascade, reservation, delivery projection, table release,
//! refund flag) so the event stream looks identical downstream.

use async_trait::async_trait;

use crate::orders::occupancy;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::models::TableStatus;
use shared::order::{
    DeliveryStatus, EventPayload, OrderEvent, OrderEventType, OrderSnapshot, OrderStatus,
};

/// CancelOrder action
#[derive(Debug, Clone)]
pub struct CancelOrderAction {
    pub order_id: String,
    pub reason: Option<String>,
}

/// Emit the full write-off cascade for a dying order.
///
/// Still-active items are listed for the cascade; terminal items stay as
/// they ended. `refund_due` is set from `paid_amount` so the manager can
/// place the refund call after commit without re-reading state.
pub(super) fn cancellation_events(
    ctx: &mut CommandContext<'_>,
    metadata: &CommandMetadata,
    snapshot: &OrderSnapshot,
    reason: Option<String>,
    refund_method: Option<String>,
) -> Result<Vec<OrderEvent>, OrderError> {
    let cancelled_item_ids: Vec<String> = snapshot
        .items
        .iter()
        .filter(|item| item.is_active())
        .map(|item| item.item_id.clone())
        .collect();
    let refund_due = (snapshot.paid_amount > 0.0).then_some(snapshot.paid_amount);

    let mut events = vec![OrderEvent::new(
        ctx.next_sequence(),
        snapshot.order_id.clone(),
        metadata.operator_id,
        metadata.operator_name.clone(),
        metadata.command_id.clone(),
        Some(metadata.timestamp),
        OrderEventType::OrderCancelled,
        EventPayload::OrderCancelled {
            reason,
            write_off: true,
            cancelled_item_ids,
            refund_due,
            refund_method,
        },
    )];

    // Cascade to the reservation only while the booking is still open
    if let Some(reservation_id) = snapshot.reservation_id
        && let Some(reservation) = ctx.get_reservation(reservation_id)?
        && reservation.status.is_open()
    {
        events.push(OrderEvent::new(
            ctx.next_sequence(),
            snapshot.order_id.clone(),
            metadata.operator_id,
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            OrderEventType::ReservationCancelled,
            EventPayload::ReservationCancelled { reservation_id },
        ));
    }

    if snapshot.order_type.tracks_delivery()
        && snapshot.delivery_status != Some(DeliveryStatus::Cancelled)
    {
        events.push(OrderEvent::new(
            ctx.next_sequence(),
            snapshot.order_id.clone(),
            metadata.operator_id,
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            OrderEventType::DeliveryStatusChanged,
            EventPayload::DeliveryStatusChanged {
                previous: snapshot.delivery_status,
                status: DeliveryStatus::Cancelled,
            },
        ));
    }

    for table_id in occupancy::releasable_tables(ctx, snapshot)? {
        events.push(OrderEvent::new(
            ctx.next_sequence(),
            snapshot.order_id.clone(),
            metadata.operator_id,
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            OrderEventType::TableStatusChanged,
            EventPayload::TableStatusChanged {
                table_id,
                status: TableStatus::Free,
            },
        ));
    }

    Ok(events)
}

#[async_trait]
impl CommandHandler for CancelOrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        // 1. Load existing snapshot
        let snapshot = ctx.load_snapshot(&self.order_id)?;

        // 2. Validate order status
        match snapshot.status {
            OrderStatus::Completed => {
                return Err(OrderError::OrderAlreadyCompleted(self.order_id.clone()));
            }
            OrderStatus::Cancelled => {
                return Err(OrderError::OrderAlreadyCancelled(self.order_id.clone()));
            }
            _ => {}
        }

        // 3. Emit the cascade
        cancellation_events(ctx, metadata, &snapshot, self.reason.clone(), None)
    }
}
