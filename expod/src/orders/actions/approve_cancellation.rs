//! ApproveCancellation command handler
//!
//! Second half of the two-step cancel. Executes exactly the immediate
//! write-off cascade; the recorded reason is the requester's, the
//! cancelling operator is the approver on the event envelope.

use async_trait::async_trait;

use crate::orders::actions::cancel_order::cancellation_events;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{OrderEvent, OrderStatus};

/// ApproveCancellation action
#[derive(Debug, Clone)]
pub struct ApproveCancellationAction {
    pub order_id: String,
    pub refund_method: Option<String>,
}

#[async_trait]
impl CommandHandler for ApproveCancellationAction {
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
        if !snapshot.pending_cancellation {
            return Err(OrderError::InvalidOperation(format!(
                "order {} has no pending cancellation request",
                self.order_id
            )));
        }

        // 3. Cascade with the requested reason
        let reason = snapshot.cancel_request_reason.clone();
        cancellation_events(ctx, metadata, &snapshot, reason, self.refund_method.clone())
    }
}
