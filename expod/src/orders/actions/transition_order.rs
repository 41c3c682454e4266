//! TransitionOrder command handler
//!
//! Runs one workflow action over the station-visible slice of an order.
//! Per-item guard misses are skipped; the command fails only when nothing
//! was eligible, so callers can tell "already done" from "done now".

use async_trait::async_trait;

use crate::orders::actions::derive_status_events;
use crate::orders::router;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use crate::orders::transitions;
use shared::order::{
    EventPayload, ItemTransition, OrderEvent, OrderEventType, OrderStatus, TransitionAction,
};

/// TransitionOrder action
#[derive(Debug, Clone)]
pub struct TransitionOrderAction {
    pub order_id: String,
    pub action: TransitionAction,
    /// Station scope resolved by the manager; `None` means unscoped
    pub station_id: Option<i64>,
    pub reason: Option<String>,
}

#[async_trait]
impl CommandHandler for TransitionOrderAction {
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

        // 3. Apply the action to every in-scope item that passes its guard
        let mut items = snapshot.items.clone();
        let mut changes: Vec<ItemTransition> = Vec::new();
        for item in items.iter_mut() {
            if router::visible_to(item, self.station_id)
                && transitions::try_apply(item, self.action, self.reason.as_deref(), metadata.timestamp)
            {
                changes.push(ItemTransition::capture(item));
            }
        }
        if changes.is_empty() {
            return Err(OrderError::InvalidTransition(format!(
                "no items eligible for {:?} on order {}",
                self.action, self.order_id
            )));
        }

        // 4. Create event
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
                station_id: self.station_id,
                changes,
            },
        )];

        // 5. Re-derive order status over the global item set
        events.extend(derive_status_events(ctx, metadata, &snapshot, &items));

        Ok(events)
    }
}
