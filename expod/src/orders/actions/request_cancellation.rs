//! RequestCancellation command handler
//!
//! First half of the two-step cancel: flags the order and records who
//! asked, why, and when. The order stays fully operable until a manager
//! approves or rejects.

use async_trait::async_trait;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, OrderEvent, OrderEventType, OrderStatus};

/// RequestCancellation action
#[derive(Debug, Clone)]
pub struct RequestCancellationAction {
    pub order_id: String,
    pub reason: String,
}

#[async_trait]
impl CommandHandler for RequestCancellationAction {
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
        if snapshot.pending_cancellation {
            return Err(OrderError::InvalidOperation(format!(
                "order {} already has a pending cancellation request",
                self.order_id
            )));
        }

        // 3. Create event
        let event = OrderEvent::new(
            ctx.next_sequence(),
            self.order_id.clone(),
            metadata.operator_id,
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            OrderEventType::CancellationRequested,
            EventPayload::CancellationRequested {
                reason: self.reason.clone(),
            },
        );

        Ok(vec![event])
    }
}
