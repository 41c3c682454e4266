//! Aggregate order status reducer and delivery projection
//!
//! The reducer is a pure function over the full item set. It only ever
//! yields the active-prep statuses (`Confirmed`, `Cooking`, `Ready`);
//! `New`, `Completed`, and `Cancelled` are set by explicit actions and the
//! callers skip the reducer entirely when the order is outside the
//! active-prep band.

use shared::order::{DeliveryStatus, ItemStatus, OrderItem, OrderStatus};

/// Derive the order-level status from the current item set.
///
/// - Any item cooking with its start marker set: the kitchen is working,
///   the order is `Cooking`.
/// - No item cooking at all: every station is done with what it has, the
///   order is `Ready`.
/// - Cooking items exist but none were started: work is queued, the order
///   stays `Confirmed`.
///
/// A station finishing its own slice re-runs this over the *global* item
/// set, which is what lets the last station's `ready` flip the whole order.
pub fn derive_order_status(items: &[OrderItem]) -> OrderStatus {
    let mut has_cooking = false;

    for item in items {
        if item.status == ItemStatus::Cooking {
            if item.cooking_started_at.is_some() {
                return OrderStatus::Cooking;
            }
            has_cooking = true;
        }
    }

    if has_cooking {
        OrderStatus::Confirmed
    } else {
        OrderStatus::Ready
    }
}

/// Project the order status onto the courier-facing delivery status.
///
/// Total and one-directional: order status always leads, and the courier
/// progress markers (`PickedUp`, `InTransit`) are the only values that do
/// not come from here. Callers gate on
/// [`OrderType::tracks_delivery`](shared::order::OrderType::tracks_delivery);
/// dine-in orders never carry a projection.
pub fn project_delivery_status(status: OrderStatus) -> DeliveryStatus {
    match status {
        OrderStatus::New | OrderStatus::Confirmed => DeliveryStatus::Pending,
        OrderStatus::Cooking => DeliveryStatus::Preparing,
        OrderStatus::Ready => DeliveryStatus::Ready,
        OrderStatus::Completed => DeliveryStatus::Delivered,
        OrderStatus::Cancelled => DeliveryStatus::Cancelled,
    }
}
