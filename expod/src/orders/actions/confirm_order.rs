//! ConfirmOrder command handler
//!
//! Moves a draft order out of `New`. Items stay `Pending` until a cooking
//! transition queues them.

use async_trait::async_trait;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, OrderEvent, OrderEventType, OrderStatus};

/// ConfirmOrder action
#[derive(Debug, Clone)]
pub struct ConfirmOrderAction {
    pub order_id: String,
}

#[async_trait]
impl CommandHandler for ConfirmOrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        // 1. Load existing snapshot
        let snapshot = ctx.load_snapshot(&self.order_id)?;

        // 2. Validate order status
        match snapshot.status {
            OrderStatus::New => {}
            OrderStatus::Completed => {
                return Err(OrderError::OrderAlreadyCompleted(self.order_id.clone()));
            }
            OrderStatus::Cancelled => {
                return Err(OrderError::OrderAlreadyCancelled(self.order_id.clone()));
            }
            other => {
                return Err(OrderError::InvalidTransition(format!(
                    "order {} cannot be confirmed from {:?}",
                    self.order_id, other
                )));
            }
        }

        // 3. Create event
        let event = OrderEvent::new(
            ctx.next_sequence(),
            self.order_id.clone(),
            metadata.operator_id,
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            OrderEventType::OrderConfirmed,
            EventPayload::OrderConfirmed {},
        );

        Ok(vec![event])
    }
}
