//! TransitionItem command handler
//!
//! Runs one workflow action against a single named item. Unlike the
//! station-scoped variant, a guard miss here is an explicit rejection:
//! the caller pointed at one item and needs to know nothing happened.

use async_trait::async_trait;

use crate::orders::actions::derive_status_events;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use crate::orders::transitions;
use shared::order::{
    EventPayload, ItemTransition, OrderEvent, OrderEventType, OrderStatus, TransitionAction,
};

/// TransitionItem action
#[derive(Debug, Clone)]
pub struct TransitionItemAction {
    pub order_id: String,
    pub item_id: String,
    pub action: TransitionAction,
    pub reason: Option<String>,
}

#[async_trait]
impl CommandHandler for TransitionItemAction {
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

        // 3. Locate the item; a foreign owner is a mismatch, not a miss
        let mut items = snapshot.items.clone();
        let Some(item) = items.iter_mut().find(|i| i.item_id == self.item_id) else {
            ctx.resolve_item_owner(&self.item_id)?;
            return Err(OrderError::OwnershipMismatch {
                item_id: self.item_id.clone(),
                order_id: self.order_id.clone(),
            });
        };

        // 4. Apply the action; single-item guard misses are explicit errors
        if !transitions::try_apply(item, self.action, self.reason.as_deref(), metadata.timestamp)
        {
            return Err(OrderError::InvalidTransition(format!(
                "item {} in {:?} does not accept {:?}",
                self.item_id, item.status, self.action
            )));
        }
        let change = ItemTransition::capture(item);

        // 5. Create event
        let mut events = vec![OrderEvent::new(
            ctx.next_sequence(),
            self.order_id.clone(),
            metadata.operator_id,
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            OrderEventType::ItemsTransitioned,
            EventPayload::ItemsTransitioned {
                action: self.action,
                station_id: None,
                changes: vec![change],
            },
        )];

        // 6. Re-derive order status over the updated item set
        events.extend(derive_status_events(ctx, metadata, &snapshot, &items));

        Ok(events)
    }
}
