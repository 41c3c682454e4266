//! ItemsTransitioned event applier
//!
//! Overwrites each named item with the outcome the state machine computed
//! at command time. The event carries post-transition facts, so applying
//! is a plain field copy and needs no guard re-evaluation.

use crate::orders::money;
use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// ItemsTransitioned applier
pub struct ItemsTransitionedApplier;

impl EventApplier for ItemsTransitionedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent) {
        if let EventPayload::ItemsTransitioned { changes, .. } = &event.payload {
            for change in changes {
                if let Some(item) = snapshot.find_item_mut(&change.item_id) {
                    change.apply_to(item);
                }
            }

            // Update sequence and timestamp
            snapshot.last_sequence = event.sequence;
            snapshot.updated_at = event.timestamp;

            // Cancel approvals drop items out of the totals
            money::recalculate_totals(snapshot);

            // Update checksum
            snapshot.update_checksum();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{
        ItemStatus, ItemTransition, OrderEventType, OrderItem, OrderStatus, TransitionAction,
    };

    fn create_items_transitioned_event(
        seq: u64,
        action: TransitionAction,
        changes: Vec<ItemTransition>,
    ) -> OrderEvent {
        OrderEvent::new(
            seq,
            "order-1".to_string(),
            1,
            "Test User".to_string(),
            "cmd-1".to_string(),
            Some(1234567890),
            OrderEventType::ItemsTransitioned,
            EventPayload::ItemsTransitioned {
                action,
                station_id: Some(7),
                changes,
            },
        )
    }

    fn cooking_snapshot() -> OrderSnapshot {
        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        snapshot.status = OrderStatus::Cooking;
        let mut item = OrderItem::new(1, "Dish".to_string(), 10.0, 2);
        item.status = ItemStatus::Cooking;
        item.cooking_started_at = Some(100);
        snapshot.items = vec![item];
        money::recalculate_totals(&mut snapshot);
        snapshot
    }

    #[test]
    fn test_transition_overwrites_item_fields() {
        let mut snapshot = cooking_snapshot();
        let mut outcome = snapshot.items[0].clone();
        outcome.status = ItemStatus::Ready;
        outcome.cooking_finished_at = Some(200);

        let event = create_items_transitioned_event(
            5,
            TransitionAction::Ready,
            vec![ItemTransition::capture(&outcome)],
        );

        let applier = ItemsTransitionedApplier;
        applier.apply(&mut snapshot, &event);

        assert_eq!(snapshot.items[0].status, ItemStatus::Ready);
        assert_eq!(snapshot.items[0].cooking_finished_at, Some(200));
        assert_eq!(snapshot.last_sequence, 5);
        assert!(snapshot.verify_checksum());
    }

    #[test]
    fn test_approved_cancel_drops_item_from_totals() {
        let mut snapshot = cooking_snapshot();
        let mut outcome = snapshot.items[0].clone();
        outcome.status = ItemStatus::Cancelled;
        outcome.is_write_off = true;

        let event = create_items_transitioned_event(
            2,
            TransitionAction::ApproveCancel,
            vec![ItemTransition::capture(&outcome)],
        );

        let applier = ItemsTransitionedApplier;
        applier.apply(&mut snapshot, &event);

        assert_eq!(snapshot.items[0].status, ItemStatus::Cancelled);
        assert_eq!(snapshot.subtotal, 0.0);
        assert_eq!(snapshot.total, 0.0);
    }

    #[test]
    fn test_unknown_item_change_is_skipped() {
        let mut snapshot = cooking_snapshot();
        let mut ghost = OrderItem::new(9, "Ghost".to_string(), 1.0, 1);
        ghost.status = ItemStatus::Ready;

        let event = create_items_transitioned_event(
            2,
            TransitionAction::Ready,
            vec![ItemTransition::capture(&ghost)],
        );

        let applier = ItemsTransitionedApplier;
        applier.apply(&mut snapshot, &event);

        // Real item untouched, bookkeeping still advanced
        assert_eq!(snapshot.items[0].status, ItemStatus::Cooking);
        assert_eq!(snapshot.last_sequence, 2);
    }

    #[test]
    fn test_transition_idempotent() {
        let mut snapshot = cooking_snapshot();
        let mut outcome = snapshot.items[0].clone();
        outcome.status = ItemStatus::Ready;
        outcome.cooking_finished_at = Some(200);

        let event = create_items_transitioned_event(
            2,
            TransitionAction::Ready,
            vec![ItemTransition::capture(&outcome)],
        );

        let applier = ItemsTransitionedApplier;
        applier.apply(&mut snapshot, &event);
        let checksum_after_first = snapshot.state_checksum.clone();

        applier.apply(&mut snapshot, &event);

        assert_eq!(snapshot.state_checksum, checksum_after_first);
    }
}
