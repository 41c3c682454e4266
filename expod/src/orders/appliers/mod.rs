//! Event applier implementations
//!
//! Each applier implements the `EventApplier` trait and handles
//! one specific event type. Appliers are PURE functions.

use enum_dispatch::enum_dispatch;

use shared::order::{EventPayload, OrderEvent};

mod cancellation_rejected;
mod cancellation_requested;
mod delivery_status_changed;
mod items_added;
mod items_transitioned;
mod order_cancelled;
mod order_completed;
mod order_confirmed;
mod order_opened;
mod order_status_changed;
mod reservation_cancelled;
mod table_status_changed;

pub use cancellation_rejected::CancellationRejectedApplier;
pub use cancellation_requested::CancellationRequestedApplier;
pub use delivery_status_changed::DeliveryStatusChangedApplier;
pub use items_added::ItemsAddedApplier;
pub use items_transitioned::ItemsTransitionedApplier;
pub use order_cancelled::OrderCancelledApplier;
pub use order_completed::OrderCompletedApplier;
pub use order_confirmed::OrderConfirmedApplier;
pub use order_opened::OrderOpenedApplier;
pub use order_status_changed::OrderStatusChangedApplier;
pub use reservation_cancelled::ReservationCancelledApplier;
pub use table_status_changed::TableStatusChangedApplier;

/// EventAction enum - dispatches to concrete applier implementations
///
/// Uses enum_dispatch for zero-cost static dispatch.
#[enum_dispatch(EventApplier)]
pub enum EventAction {
    OrderOpened(OrderOpenedApplier),
    OrderConfirmed(OrderConfirmedApplier),
    OrderCompleted(OrderCompletedApplier),
    OrderCancelled(OrderCancelledApplier),
    ItemsAdded(ItemsAddedApplier),
    ItemsTransitioned(ItemsTransitionedApplier),
    OrderStatusChanged(OrderStatusChangedApplier),
    DeliveryStatusChanged(DeliveryStatusChangedApplier),
    CancellationRequested(CancellationRequestedApplier),
    CancellationRejected(CancellationRejectedApplier),
    TableStatusChanged(TableStatusChangedApplier),
    ReservationCancelled(ReservationCancelledApplier),
}

/// Convert OrderEvent reference to EventAction
///
/// This is the ONLY place with a match on EventPayload.
impl From<&OrderEvent> for EventAction {
    fn from(event: &OrderEvent) -> Self {
        match &event.payload {
            EventPayload::OrderOpened { .. } => EventAction::OrderOpened(OrderOpenedApplier),
            EventPayload::OrderConfirmed { .. } => {
                EventAction::OrderConfirmed(OrderConfirmedApplier)
            }
            EventPayload::OrderCompleted { .. } => {
                EventAction::OrderCompleted(OrderCompletedApplier)
            }
            EventPayload::OrderCancelled { .. } => {
                EventAction::OrderCancelled(OrderCancelledApplier)
            }
            EventPayload::ItemsAdded { .. } => EventAction::ItemsAdded(ItemsAddedApplier),
            EventPayload::ItemsTransitioned { .. } => {
                EventAction::ItemsTransitioned(ItemsTransitionedApplier)
            }
            EventPayload::OrderStatusChanged { .. } => {
                EventAction::OrderStatusChanged(OrderStatusChangedApplier)
            }
            EventPayload::DeliveryStatusChanged { .. } => {
                EventAction::DeliveryStatusChanged(DeliveryStatusChangedApplier)
            }
            EventPayload::CancellationRequested { .. } => {
                EventAction::CancellationRequested(CancellationRequestedApplier)
            }
            EventPayload::CancellationRejected { .. } => {
                EventAction::CancellationRejected(CancellationRejectedApplier)
            }
            EventPayload::TableStatusChanged { .. } => {
                EventAction::TableStatusChanged(TableStatusChangedApplier)
            }
            EventPayload::ReservationCancelled { .. } => {
                EventAction::ReservationCancelled(ReservationCancelledApplier)
            }
        }
    }
}
