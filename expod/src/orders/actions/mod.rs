//! Command action implementations
//!
//! Each action implements the `CommandHandler` trait and handles
//! one specific command type.

use async_trait::async_trait;

use crate::orders::reducer;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{
    EventPayload, OrderCommand, OrderCommandPayload, OrderEvent, OrderEventType, OrderItem,
    OrderSnapshot,
};

mod add_items;
mod approve_cancellation;
mod approve_item_cancellation;
mod cancel_order;
mod complete_order;
mod confirm_order;
mod open_order;
mod reject_cancellation;
mod reject_item_cancellation;
mod request_cancellation;
mod request_item_cancellation;
mod transition_item;
pub mod transition_order;
mod update_delivery_progress;

pub use add_items::AddItemsAction;
pub use approve_cancellation::ApproveCancellationAction;
pub use approve_item_cancellation::ApproveItemCancellationAction;
pub use cancel_order::CancelOrderAction;
pub use complete_order::CompleteOrderAction;
pub use confirm_order::ConfirmOrderAction;
pub use open_order::OpenOrderAction;
pub use reject_cancellation::RejectCancellationAction;
pub use reject_item_cancellation::RejectItemCancellationAction;
pub use request_cancellation::RequestCancellationAction;
pub use request_item_cancellation::RequestItemCancellationAction;
pub use transition_item::TransitionItemAction;
pub use transition_order::TransitionOrderAction;
pub use update_delivery_progress::UpdateDeliveryProgressAction;

/// Re-derive the order status after a change to the item set and emit the
/// follow-up events the change implies.
///
/// Runs only while the order sits in the active-prep band; draft and
/// terminal orders never move on item evidence alone. When the derived
/// status differs from the stored one an `OrderStatusChanged` event is
/// emitted, and for delivery-tracked orders the new status is projected
/// onto the delivery view in the same pass. Manual courier progress
/// (`PickedUp`, `InTransit`) is untouched while the status holds steady.
pub(crate) fn derive_status_events(
    ctx: &mut CommandContext<'_>,
    metadata: &CommandMetadata,
    snapshot: &OrderSnapshot,
    items: &[OrderItem],
) -> Vec<OrderEvent> {
    let mut events = Vec::new();
    if !snapshot.status.is_active_prep() {
        return events;
    }

    let derived = reducer::derive_order_status(items);
    if derived == snapshot.status {
        return events;
    }

    events.push(OrderEvent::new(
        ctx.next_sequence(),
        snapshot.order_id.clone(),
        metadata.operator_id,
        metadata.operator_name.clone(),
        metadata.command_id.clone(),
        Some(metadata.timestamp),
        OrderEventType::OrderStatusChanged,
        EventPayload::OrderStatusChanged {
            previous: snapshot.status,
            status: derived,
        },
    ));

    if snapshot.order_type.tracks_delivery() {
        let projected = reducer::project_delivery_status(derived);
        if snapshot.delivery_status != Some(projected) {
            events.push(OrderEvent::new(
                ctx.next_sequence(),
                snapshot.order_id.clone(),
                metadata.operator_id,
                metadata.operator_name.clone(),
                metadata.command_id.clone(),
                Some(metadata.timestamp),
                OrderEventType::DeliveryStatusChanged,
                EventPayload::DeliveryStatusChanged {
                    previous: snapshot.delivery_status,
                    status: projected,
                },
            ));
        }
    }

    events
}

/// CommandAction enum - dispatches to concrete action implementations
pub enum CommandAction {
    OpenOrder(OpenOrderAction),
    ConfirmOrder(ConfirmOrderAction),
    AddItems(AddItemsAction),
    TransitionOrder(TransitionOrderAction),
    TransitionItem(TransitionItemAction),
    CompleteOrder(CompleteOrderAction),
    CancelOrder(CancelOrderAction),
    RequestCancellation(RequestCancellationAction),
    ApproveCancellation(ApproveCancellationAction),
    RejectCancellation(RejectCancellationAction),
    RequestItemCancellation(RequestItemCancellationAction),
    ApproveItemCancellation(ApproveItemCancellationAction),
    RejectItemCancellation(RejectItemCancellationAction),
    UpdateDeliveryProgress(UpdateDeliveryProgressAction),
}

/// Manual implementation of CommandHandler for CommandAction
#[async_trait]
impl CommandHandler for CommandAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        match self {
            CommandAction::OpenOrder(action) => action.execute(ctx, metadata).await,
            CommandAction::ConfirmOrder(action) => action.execute(ctx, metadata).await,
            CommandAction::AddItems(action) => action.execute(ctx, metadata).await,
            CommandAction::TransitionOrder(action) => action.execute(ctx, metadata).await,
            CommandAction::TransitionItem(action) => action.execute(ctx, metadata).await,
            CommandAction::CompleteOrder(action) => action.execute(ctx, metadata).await,
            CommandAction::CancelOrder(action) => action.execute(ctx, metadata).await,
            CommandAction::RequestCancellation(action) => action.execute(ctx, metadata).await,
            CommandAction::ApproveCancellation(action) => action.execute(ctx, metadata).await,
            CommandAction::RejectCancellation(action) => action.execute(ctx, metadata).await,
            CommandAction::RequestItemCancellation(action) => action.execute(ctx, metadata).await,
            CommandAction::ApproveItemCancellation(action) => action.execute(ctx, metadata).await,
            CommandAction::RejectItemCancellation(action) => action.execute(ctx, metadata).await,
            CommandAction::UpdateDeliveryProgress(action) => action.execute(ctx, metadata).await,
        }
    }
}

/// Convert OrderCommand to CommandAction
///
/// This is the ONLY place with a match on OrderCommandPayload.
impl From<&OrderCommand> for CommandAction {
    fn from(cmd: &OrderCommand) -> Self {
        match &cmd.payload {
            OrderCommandPayload::OpenOrder {
                order_type,
                table_id,
                linked_table_ids,
                reservation_id,
                guest_count,
                note,
                confirmed,
                items,
            } => CommandAction::OpenOrder(OpenOrderAction {
                order_type: *order_type,
                table_id: *table_id,
                linked_table_ids: linked_table_ids.clone(),
                reservation_id: *reservation_id,
                guest_count: *guest_count,
                note: note.clone(),
                confirmed: *confirmed,
                items: items.clone(),
            }),
            OrderCommandPayload::ConfirmOrder { order_id } => {
                CommandAction::ConfirmOrder(ConfirmOrderAction {
                    order_id: order_id.clone(),
                })
            }
            OrderCommandPayload::AddItems { order_id, items } => {
                CommandAction::AddItems(AddItemsAction {
                    order_id: order_id.clone(),
                    items: items.clone(),
                })
            }
            OrderCommandPayload::TransitionOrder { .. } => {
                // TransitionOrder carries a station slug that only the
                // OrdersManager can resolve against the station catalog
                unreachable!("TransitionOrder should be handled by OrdersManager, not From<&OrderCommand>")
            }
            OrderCommandPayload::TransitionItem {
                order_id,
                item_id,
                action,
                reason,
            } => CommandAction::TransitionItem(TransitionItemAction {
                order_id: order_id.clone(),
                item_id: item_id.clone(),
                action: *action,
                reason: reason.clone(),
            }),
            OrderCommandPayload::CompleteOrder { order_id } => {
                CommandAction::CompleteOrder(CompleteOrderAction {
                    order_id: order_id.clone(),
                })
            }
            OrderCommandPayload::CancelOrder { order_id, reason } => {
                CommandAction::CancelOrder(CancelOrderAction {
                    order_id: order_id.clone(),
                    reason: reason.clone(),
                })
            }
            OrderCommandPayload::RequestCancellation { order_id, reason } => {
                CommandAction::RequestCancellation(RequestCancellationAction {
                    order_id: order_id.clone(),
                    reason: reason.clone(),
                })
            }
            OrderCommandPayload::ApproveCancellation {
                order_id,
                refund_method,
            } => CommandAction::ApproveCancellation(ApproveCancellationAction {
                order_id: order_id.clone(),
                refund_method: refund_method.clone(),
            }),
            OrderCommandPayload::RejectCancellation { order_id } => {
                CommandAction::RejectCancellation(RejectCancellationAction {
                    order_id: order_id.clone(),
                })
            }
            OrderCommandPayload::RequestItemCancellation { item_id, reason } => {
                CommandAction::RequestItemCancellation(RequestItemCancellationAction {
                    item_id: item_id.clone(),
                    reason: reason.clone(),
                })
            }
            OrderCommandPayload::ApproveItemCancellation { item_id } => {
                CommandAction::ApproveItemCancellation(ApproveItemCancellationAction {
                    item_id: item_id.clone(),
                })
            }
            OrderCommandPayload::RejectItemCancellation { item_id } => {
                CommandAction::RejectItemCancellation(RejectItemCancellationAction {
                    item_id: item_id.clone(),
                })
            }
            OrderCommandPayload::UpdateDeliveryProgress { order_id, status } => {
                CommandAction::UpdateDeliveryProgress(UpdateDeliveryProgressAction {
                    order_id: order_id.clone(),
                    status: *status,
                })
            }
        }
    }
}
