//! ApproveItemCancellation command handler
//!
//! Confirms a parked item cancellation. The item dies as a write-off and
//! the order's derived status and totals move on without it; the totals
//! recompute happens when the event is folded into the snapshot.

use async_trait::async_trait;

use crate::orders::actions::derive_status_events;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use crate::orders::transitions;
use shared::order::{
    EventPayload, ItemTransition, OrderEvent, OrderEventType, OrderStatus, TransitionAction,
};

/// ApproveItemCancellation action
#[derive(Debug, Clone)]
pub struct ApproveItemCancellationAction {
    pub item_id: String,
}

#[async_trait]
impl CommandHandler for ApproveItemCancellationAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        // 1. Resolve the owning order through the item index
        let order_id = ctx.resolve_item_owner(&self.item_id)?;
        let snapshot = ctx.load_snapshot(&order_id)?;

        // 2. Validate order status
        match snapshot.status {
            OrderStatus::Completed => {
                return Err(OrderError::OrderAlreadyCompleted(order_id));
            }
            OrderStatus::Cancelled => {
                return Err(OrderError::OrderAlreadyCancelled(order_id));
            }
            _ => {}
        }

        // 3. Kill the item; only a parked item can be approved
        let mut items = snapshot.items.clone();
        let item = items
            .iter_mut()
            .find(|i| i.item_id == self.item_id)
            .ok_or_else(|| OrderError::ItemNotFound(self.item_id.clone()))?;
        if !transitions::try_apply(
            item,
            TransitionAction::ApproveCancel,
            None,
            metadata.timestamp,
        ) {
            return Err(OrderError::InvalidTransition(format!(
                "item {} in {:?} has no cancellation to approve",
                self.item_id, item.status
            )));
        }
        let change = ItemTransition::capture(item);

        // 4. Create event
        let mut events = vec![OrderEvent::new(
            ctx.next_sequence(),
            order_id,
            metadata.operator_id,
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            OrderEventType::ItemsTransitioned,
            EventPayload::ItemsTransitioned {
                action: TransitionAction::ApproveCancel,
                station_id: None,
                changes: vec![change],
            },
        )];

        // 5. Re-derive order status over the surviving items
        events.extend(derive_status_events(ctx, metadata, &snapshot, &items));

        Ok(events)
    }
}
