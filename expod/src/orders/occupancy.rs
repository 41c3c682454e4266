//! Table occupancy rules
//!
//! Dine-in orders hold their primary and linked tables exclusively for
//! their whole active life. Claims are validated when the order opens and
//! the holds are released when it reaches a terminal status, both inside
//! the command's transaction so concurrent opens cannot double-book.

use crate::orders::traits::{CommandContext, OrderError};
use shared::order::OrderSnapshot;

/// Reject a claim if any requested table is already held by an active order.
pub fn ensure_tables_free(ctx: &CommandContext<'_>, tables: &[i64]) -> Result<(), OrderError> {
    for &table_id in tables {
        if let Some(holder) = ctx.find_active_order_for_table(table_id)? {
            return Err(OrderError::TableOccupied(format!(
                "table {table_id} is held by order {holder}"
            )));
        }
    }
    Ok(())
}

/// Tables freed when `snapshot` leaves the active set.
///
/// The primary table is freed only while no other active order still
/// references it. Linked tables were merged into this order alone, so they
/// are freed without the cross-check.
pub fn releasable_tables(
    ctx: &CommandContext<'_>,
    snapshot: &OrderSnapshot,
) -> Result<Vec<i64>, OrderError> {
    let mut released = Vec::new();
    if let Some(table_id) = snapshot.table_id
        && ctx
            .find_other_active_order_for_table(table_id, Some(&snapshot.order_id))?
            .is_none()
    {
        released.push(table_id);
    }
    for &linked in &snapshot.linked_table_ids {
        if Some(linked) != snapshot.table_id && !released.contains(&linked) {
            released.push(linked);
        }
    }
    Ok(released)
}
