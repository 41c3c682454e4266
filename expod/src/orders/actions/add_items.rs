//! AddItems command handler
//!
//! Appends items to an existing order. Items joining a confirmed-or-later
//! order queue straight to their stations, which can pull a `Ready` order
//! back into prep.

use async_trait::async_trait;

use crate::orders::actions::derive_status_events;
use crate::orders::money;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{
    items_from_inputs, EventPayload, ItemStatus, OrderEvent, OrderEventType, OrderItemInput,
    OrderStatus,
};

/// AddItems action
#[derive(Debug, Clone)]
pub struct AddItemsAction {
    pub order_id: String,
    pub items: Vec<OrderItemInput>,
}

#[async_trait]
impl CommandHandler for AddItemsAction {
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

        // 3. Validate inputs
        if self.items.is_empty() {
            return Err(OrderError::InvalidOperation(
                "no items to add".to_string(),
            ));
        }
        for input in &self.items {
            money::validate_item_input(input)?;
        }

        // 4. Assign item IDs; queue to stations unless the order is a draft
        let mut items = items_from_inputs(&self.items);
        if snapshot.status != OrderStatus::New {
            for item in &mut items {
                item.status = ItemStatus::Cooking;
            }
        }

        // 5. Create event
        let mut events = vec![OrderEvent::new(
            ctx.next_sequence(),
            self.order_id.clone(),
            metadata.operator_id,
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            OrderEventType::ItemsAdded,
            EventPayload::ItemsAdded {
                items: items.clone(),
            },
        )];

        // 6. Re-derive order status over the grown item set
        let mut all_items = snapshot.items.clone();
        all_items.extend(items);
        events.extend(derive_status_events(ctx, metadata, &snapshot, &all_items));

        Ok(events)
    }
}
