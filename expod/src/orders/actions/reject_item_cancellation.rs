//! RejectItemCancellation command handler
//!
//! Sends a parked item back to work. The stashed status is restored and
//! the request metadata is wiped; a stash lost to replay gaps falls back
//! to `Cooking` inside the state machine.

use async_trait::async_trait;

use crate::orders::actions::derive_status_events;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use crate::orders::transitions;
use shared::order::{
    EventPayload, ItemTransition, OrderEvent, OrderEventType, OrderStatus, TransitionAction,
};

/// RejectItemCancellation action
#[derive(Debug, Clone)]
pub struct RejectItemCancellationAction {
    pub item_id: String,
}

#[async_trait]
impl CommandHandler for RejectItemCancellationAction {
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

        // 3. Restore the item; only a parked item can be rejected
        let mut items = snapshot.items.clone();
        let item = items
            .iter_mut()
            .find(|i| i.item_id == self.item_id)
            .ok_or_else(|| OrderError::ItemNotFound(self.item_id.clone()))?;
        if !transitions::try_apply(
            item,
            TransitionAction::RejectCancel,
            None,
            metadata.timestamp,
        ) {
            return Err(OrderError::InvalidTransition(format!(
                "item {} in {:?} has no cancellation to reject",
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
                action: TransitionAction::RejectCancel,
                station_id: None,
                changes: vec![change],
            },
        )];

        // 5. A restored cooking item can pull the order back into prep
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
            operator_id: 9,
            operator_name: "Manager".to_string(),
            timestamp: 1234567890,
        }
    }

    fn parked_item(stash: Option<ItemStatus>, started: Option<i64>) -> OrderItem {
        let mut item = OrderItem::new(1, "Item".to_string(), 10.0, 1);
        item.status = ItemStatus::PendingCancel;
        item.status_before_cancel = stash;
        item.cancellation_reason = Some("cold".to_string());
        item.cooking_started_at = started;
        item
    }

    fn store_indexed(
        storage: &OrderStorage,
        txn: &redb::WriteTransaction,
        status: OrderStatus,
        items: Vec<OrderItem>,
    ) -> Vec<String> {
        let ids: Vec<String> = items.iter().map(|i| i.item_id.clone()).collect();
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        snapshot.status = status;
        snapshot.items = items;
        storage.store_snapshot(txn, &snapshot).unwrap();
        storage.index_items(txn, "order-1", &ids).unwrap();
        ids
    }

    #[tokio::test]
    async fn test_reject_restores_stashed_status() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let ids = store_indexed(
            &storage,
            &txn,
            OrderStatus::Ready,
            vec![parked_item(Some(ItemStatus::Ready), Some(100))],
        );

        let current_seq = storage.get_next_sequence(&txn).unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, current_seq);

        let action = RejectItemCancellationAction {
            item_id: ids[0].clone(),
        };
        let events = action
            .execute(&mut ctx, &create_test_metadata())
            .await
            .unwrap();

        if let EventPayload::ItemsTransitioned { changes, .. } = &events[0].payload {
            assert_eq!(changes[0].status, ItemStatus::Ready);
            assert_eq!(changes[0].status_before_cancel, None);
            assert_eq!(changes[0].cancellation_reason, None);
            assert!(!changes[0].is_write_off);
        } else {
            panic!("Expected ItemsTransitioned payload");
        }
    }

    #[tokio::test]
    async fn test_reject_pulls_order_back_into_cooking() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let ids = store_indexed(
            &storage,
            &txn,
            OrderStatus::Ready,
            vec![parked_item(Some(ItemStatus::Cooking), Some(100))],
        );

        let current_seq = storage.get_next_sequence(&txn).unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, current_seq);

        let action = RejectItemCancellationAction {
            item_id: ids[0].clone(),
        };
        let events = action
            .execute(&mut ctx, &create_test_metadata())
            .await
            .unwrap();

        // The restored item is cooking with its start marker intact
        assert_eq!(events.len(), 2);
        if let EventPayload::OrderStatusChanged { previous, status } = &events[1].payload {
            assert_eq!(*previous, OrderStatus::Ready);
            assert_eq!(*status, OrderStatus::Cooking);
        } else {
            panic!("Expected OrderStatusChanged payload");
        }
    }

    #[tokio::test]
    async fn test_reject_without_stash_falls_back_to_cooking() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();
        let ids = store_indexed(
            &storage,
            &txn,
            OrderStatus::Cooking,
            vec![parked_item(None, None)],
        );

        let current_seq = storage.get_next_sequence(&txn).unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, current_seq);

        let action = RejectItemCancellationAction {
            item_id: ids[0].clone(),
        };
        let events = action
            .execute(&mut ctx, &create_test_metadata())
            .await
            .unwrap();

        if let EventPayload::ItemsTransitioned { changes, .. } = &events[0].payload {
            assert_eq!(changes[0].status, ItemStatus::Cooking);
        } else {
            panic!("Expected ItemsTransitioned payload");
        }
    }

    #[tokio::test]
    async fn test_reject_unparked_item_fails() {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();

        let mut item = OrderItem::new(1, "Item".to_string(), 10.0, 1);
        item.status = ItemStatus::Ready;
        let ids = store_indexed(&storage, &txn, OrderStatus::Ready, vec![item]);

        let current_seq = storage.get_next_sequence(&txn).unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, current_seq);

        let action = RejectItemCancellationAction {
            item_id: ids[0].clone(),
        };
        let result = action.execute(&mut ctx, &create_test_metadata()).await;

        assert!(matches!(result, Err(OrderError::InvalidTransition(_))));
    }
}
