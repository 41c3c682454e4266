//! CompleteOrder command handler
//!
//! Closes an order as fulfilled. Completion is administrative: it bypasses
//! the reducer, releases the order's tables, and projects `Delivered` for
//! delivery-class orders.

use async_trait::async_trait;

use crate::orders::occupancy;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::models::TableStatus;
use shared::order::{DeliveryStatus, EventPayload, OrderEvent, OrderEventType, OrderStatus};

/// CompleteOrder action
#[derive(Debug, Clone)]
pub struct CompleteOrderAction {
    pub order_id: String,
}

#[async_trait]
impl CommandHandler for CompleteOrderAction {
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

        // 3. Create the terminal event
        let mut events = vec![OrderEvent::new(
            ctx.next_sequence(),
            self.order_id.clone(),
            metadata.operator_id,
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            OrderEventType::OrderCompleted,
            EventPayload::OrderCompleted {
                final_total: snapshot.total,
            },
        )];

        // 4. Delivery projection follows the terminal status
        if snapshot.order_type.tracks_delivery()
            && snapshot.delivery_status != Some(DeliveryStatus::Delivered)
        {
            events.push(OrderEvent::new(
                ctx.next_sequence(),
                self.order_id.clone(),
                metadata.operator_id,
                metadata.operator_name.clone(),
                metadata.command_id.clone(),
                Some(metadata.timestamp),
                OrderEventType::DeliveryStatusChanged,
                EventPayload::DeliveryStatusChanged {
                    previous: snapshot.delivery_status,
                    status: DeliveryStatus::Delivered,
                },
            ));
        }

        // 5. Release tables inside the same transaction
        for table_id in occupancy::releasable_tables(ctx, &snapshot)? {
            events.push(OrderEvent::new(
                ctx.next_sequence(),
                self.order_id.clone(),
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
}
