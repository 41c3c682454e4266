//! UpdateDeliveryProgress command handler
//!
//! Records courier progress in the window between `Ready` and completion.
//! Order status always leads: any later status change re-projects the
//! delivery view and overwrites whatever the courier reported.

use async_trait::async_trait;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{DeliveryStatus, EventPayload, OrderEvent, OrderEventType, OrderStatus};

/// UpdateDeliveryProgress action
#[derive(Debug, Clone)]
pub struct UpdateDeliveryProgressAction {
    pub order_id: String,
    pub status: DeliveryStatus,
}

/// Position in the courier window; `None` for states outside it.
fn progress_rank(status: DeliveryStatus) -> Option<u8> {
    match status {
        DeliveryStatus::Ready => Some(0),
        DeliveryStatus::PickedUp => Some(1),
        DeliveryStatus::InTransit => Some(2),
        _ => None,
    }
}

#[async_trait]
impl CommandHandler for UpdateDeliveryProgressAction {
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
        if !snapshot.order_type.tracks_delivery() {
            return Err(OrderError::InvalidOperation(format!(
                "{:?} orders do not track delivery",
                snapshot.order_type
            )));
        }
        if snapshot.status != OrderStatus::Ready {
            return Err(OrderError::InvalidTransition(format!(
                "courier progress requires a ready order, {} is {:?}",
                self.order_id, snapshot.status
            )));
        }

        // 3. Target must be courier progress, and the move must be forward
        let Some(target_rank) = progress_rank(self.status) else {
            return Err(OrderError::InvalidOperation(format!(
                "{:?} is not courier progress",
                self.status
            )));
        };
        if self.status == DeliveryStatus::Ready {
            return Err(OrderError::InvalidOperation(
                "Ready is projected from order status, not reported".to_string(),
            ));
        }
        let current = snapshot.delivery_status.unwrap_or(DeliveryStatus::Ready);
        match progress_rank(current) {
            Some(current_rank) if current_rank < target_rank => {}
            _ => {
                return Err(OrderError::InvalidTransition(format!(
                    "delivery cannot move {:?} -> {:?}",
                    current, self.status
                )));
            }
        }

        // 4. Create event
        let event = OrderEvent::new(
            ctx.next_sequence(),
            self.order_id.clone(),
            metadata.operator_id,
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            OrderEventType::DeliveryStatusChanged,
            EventPayload::DeliveryStatusChanged {
                previous: snapshot.delivery_status,
                status: self.status,
            },
        );

        Ok(vec![event])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::storage::OrderStorage;
    use crate::orders::traits::CommandContext;
    use shared::order::{OrderSnapshot, OrderType};

    fn create_test_metadata() -> CommandMetadata {
        CommandMetadata {
            command_id: "cmd-1".to_string(),
            operator_id: 1,
            operator_name: "Dispatch".to_string(),
            timestamp: 1234567890,
        }
    }

    async fn progress_from(
        order_type: OrderType,
        order_status: OrderStatus,
        current: Option<DeliveryStatus>,
        target: DeliveryStatus,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let storage = OrderStorage::open_in_memory().unwrap();
        let txn = storage.begin_write().unwrap();

        let mut snapshot = OrderSnapshot::new("order-1".to_string());
        snapshot.status = order_status;
        snapshot.order_type = order_type;
        snapshot.delivery_status = current;
        storage.store_snapshot(&txn, &snapshot).unwrap();

        let current_seq = storage.get_next_sequence(&txn).unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, current_seq);

        let action = UpdateDeliveryProgressAction {
            order_id: "order-1".to_string(),
            status: target,
        };
        action.execute(&mut ctx, &create_test_metadata()).await
    }

    #[tokio::test]
    async fn test_pickup_from_ready() {
        let events = progress_from(
            OrderType::Delivery,
            OrderStatus::Ready,
            Some(DeliveryStatus::Ready),
            DeliveryStatus::PickedUp,
        )
        .await
        .unwrap();

        assert_eq!(events.len(), 1);
        if let EventPayload::DeliveryStatusChanged { previous, status } = &events[0].payload {
            assert_eq!(*previous, Some(DeliveryStatus::Ready));
            assert_eq!(*status, DeliveryStatus::PickedUp);
        } else {
            panic!("Expected DeliveryStatusChanged payload");
        }
    }

    #[tokio::test]
    async fn test_in_transit_after_pickup() {
        let events = progress_from(
            OrderType::Delivery,
            OrderStatus::Ready,
            Some(DeliveryStatus::PickedUp),
            DeliveryStatus::InTransit,
        )
        .await
        .unwrap();

        if let EventPayload::DeliveryStatusChanged { previous, status } = &events[0].payload {
            assert_eq!(*previous, Some(DeliveryStatus::PickedUp));
            assert_eq!(*status, DeliveryStatus::InTransit);
        } else {
            panic!("Expected DeliveryStatusChanged payload");
        }
    }

    #[tokio::test]
    async fn test_backward_move_fails() {
        let result = progress_from(
            OrderType::Delivery,
            OrderStatus::Ready,
            Some(DeliveryStatus::InTransit),
            DeliveryStatus::PickedUp,
        )
        .await;

        assert!(matches!(result, Err(OrderError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn test_progress_before_ready_fails() {
        let result = progress_from(
            OrderType::Delivery,
            OrderStatus::Cooking,
            Some(DeliveryStatus::Preparing),
            DeliveryStatus::PickedUp,
        )
        .await;

        assert!(matches!(result, Err(OrderError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn test_progress_on_dine_in_fails() {
        let result = progress_from(
            OrderType::DineIn,
            OrderStatus::Ready,
            None,
            DeliveryStatus::PickedUp,
        )
        .await;

        assert!(matches!(result, Err(OrderError::InvalidOperation(_))));
    }

    #[tokio::test]
    async fn test_reporting_projected_state_fails() {
        let result = progress_from(
            OrderType::Pickup,
            OrderStatus::Ready,
            Some(DeliveryStatus::Ready),
            DeliveryStatus::Delivered,
        )
        .await;

        assert!(matches!(result, Err(OrderError::InvalidOperation(_))));
    }
}
