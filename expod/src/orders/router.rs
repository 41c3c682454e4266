//! Kitchen station routing
//!
//! Items carry an optional `kitchen_station_id`. A station-scoped bulk
//! transition touches the items routed to that station *plus* every
//! unrouted item; unrouted items belong to the shared pass and move with
//! whichever station gets to them first. An unscoped transition touches
//! everything.

use shared::order::OrderItem;

/// Whether `item` is in scope for a transition issued by `station`.
pub fn visible_to(item: &OrderItem, station: Option<i64>) -> bool {
    match station {
        None => true,
        Some(station_id) => match item.kitchen_station_id {
            None => true,
            Some(item_station) => item_station == station_id,
        },
    }
}
