//! RequestItemCancellation command handler
//!
//! Addressed by `item_id` alone; the owning order is resolved through the
//! persistent item index. The item parks in `PendingCancel` with its prior
//! status stashed for a possible reject-restore.

use async_trait::async_trait;

use crate::orders::actions::derive_status_events;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use crate::orders::transitions;
use shared::order::{
    EventPayload, ItemTransition, OrderEvent, OrderEventType, OrderStatus, TransitionAction,
};

/// RequestItemCancellation action
#[derive(Debug, Clone)]
pub struct RequestItemCancellationAction {
    pub item_id: String,
    pub reason: String,
}

#[async_trait]
impl CommandHandler for RequestItemCancellationAction {
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

        // 3. Park the item in PendingCancel
        let mut items = snapshot.items.clone();
        let item = items
            .iter_mut()
            .find(|i| i.item_id == self.item_id)
            .ok_or_else(|| OrderError::ItemNotFound(self.item_id.clone()))?;
        if !transitions::try_apply(
            item,
            TransitionAction::RequestCancel,
            Some(&self.reason),
            metadata.timestamp,
        ) {
            return Err(OrderError::InvalidTransition(format!(
                "item {} in {:?} cannot enter cancellation review",
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
                action: TransitionAction::RequestCancel,
                station_id: None,
                changes: vec![change],
            },
        )];

        // 5. An item leaving the cooking set can move the derived status
        events.extend(derive_status_events(ctx, metadata, &snapshot, &items));

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::storage::OrderStorage;
    use crate::orders::traits::CommandContext;
    use shared::order::{ItemStatus, OrderItem, OrderSnapshot};

    fn create_test_metadata() -> CommandMetadata {
        CommandMetadata {
            command_id: "cmd-1".to_string(),
            operator_id: 1,
            operator_name: "Waiter".to_string(),
            timestamp: 1234567890,
        }
    }

    fn store_indexed_order(
        storage: &OrderStorage,
        txn: &redb::WriteTransaction,
        status: ItemStatus,
        started: Option<i64>,
    ) -> String {
        let mut item = OrderItem::new(1, "Item".to_string(), 10.0, 1);
        item.status = status;
        item.cooking_started_at = started;
        let item_id = item.item_id.clone();

        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        snapshot.status = OrderStatus::Cooking;
        snapshot.items = vec![item];
        storage.store_snapshot(txn, &snapshot).unwrap();
        storage
            .index_items(txn, "order-1", &[item_id.clone()])
            .unwrap();
        item_id
    }

    #[tokio::test]
    async fn test_request_stashes_prior_status() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let item_id = store_indexed_order(&storage, &txn, ItemStatus::Ready, Some(100));

        let current_seq = storage.get_next_sequence(&txn).unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, current_seq);

        let action = RequestItemCancellationAction {
            item_id: item_id.clone(),
            reason: "ordered by mistake".to_string(),
        };
        let events = action
            .execute(&mut ctx, &create_test_metadata())
            .await
            .unwrap();

        if let EventPayload::ItemsTransitioned { action, changes, .. } = &events[0].payload {
            assert_eq!(*action, TransitionAction::RequestCancel);
            assert_eq!(changes[0].status, ItemStatus::PendingCancel);
            assert_eq!(changes[0].status_before_cancel, Some(ItemStatus::Ready));
            assert_eq!(
                changes[0].cancellation_reason.as_deref(),
                Some("ordered by mistake")
            );
        } else {
            panic!("Expected ItemsTransitioned payload");
        }
    }

    #[tokio::test]
    async fn test_request_moves_started_item_out_of_cooking_set() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let item_id = store_indexed_order(&storage, &txn, ItemStatus::Cooking, Some(100));

        let current_seq = storage.get_next_sequence(&txn).unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, current_seq);

        let action = RequestItemCancellationAction {
            item_id,
            reason: "too slow".to_string(),
        };
        let events = action
            .execute(&mut ctx, &create_test_metadata())
            .await
            .unwrap();

        // The only started item now awaits review, so nothing is cooking
        assert_eq!(events.len(), 2);
        if let EventPayload::OrderStatusChanged { previous, status } = &events[1].payload {
            assert_eq!(*previous, OrderStatus::Cooking);
            assert_eq!(*status, OrderStatus::Ready);
        } else {
            panic!("Expected OrderStatusChanged payload");
        }
    }

    #[tokio::test]
    async fn test_request_on_pending_cancel_item_fails() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let item_id = store_indexed_order(&storage, &txn, ItemStatus::PendingCancel, None);

        let current_seq = storage.get_next_sequence(&txn).unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, current_seq);

        let action = RequestItemCancellationAction {
            item_id,
            reason: "again".to_string(),
        };
        let result = action.execute(&mut ctx, &create_test_metadata()).await;

        assert!(matches!(result, Err(OrderError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn test_request_unknown_item_fails() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let current_seq = storage.get_next_sequence(&txn).unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, current_seq);

        let action = RequestItemCancellationAction {
            item_id: "ghost-item".to_string(),
            reason: "?".to_string(),
        };
        let result = action.execute(&mut ctx, &create_test_metadata()).await;

        assert!(matches!(result, Err(OrderError::ItemNotFound(_))));
    }
}
