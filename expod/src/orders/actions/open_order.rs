//! OpenOrder command handler
//!
//! Creates a new order, claims its tables, and validates an attached
//! reservation. The only handler that stages a snapshot itself.

use async_trait::async_trait;

use crate::orders::money;
use crate::orders::occupancy;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::models::TableStatus;
use shared::order::{
    items_from_inputs, EventPayload, ItemStatus, OrderEvent, OrderEventType, OrderItemInput,
    OrderType,
};

/// OpenOrder action
#[derive(Debug, Clone)]
pub struct OpenOrderAction {
    pub order_type: OrderType,
    pub table_id: Option<i64>,
    pub linked_table_ids: Vec<i64>,
    pub reservation_id: Option<i64>,
    pub guest_count: i32,
    pub note: Option<String>,
    /// Open straight into `Confirmed`; items queue to their stations
    pub confirmed: bool,
    pub items: Vec<OrderItemInput>,
}

#[async_trait]
impl CommandHandler for OpenOrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        // 1. Validate inputs
        if self.guest_count < 0 {
            return Err(OrderError::InvalidOperation(
                "guest_count cannot be negative".to_string(),
            ));
        }
        for input in &self.items {
            money::validate_item_input(input)?;
        }

        // 2. Validate the table claim (dine-in only)
        let mut claim = Vec::new();
        if let Some(table_id) = self.table_id {
            claim.push(table_id);
        }
        for &linked in &self.linked_table_ids {
            if !claim.contains(&linked) {
                claim.push(linked);
            }
        }
        if self.order_type != OrderType::DineIn && !claim.is_empty() {
            return Err(OrderError::InvalidOperation(format!(
                "{:?} orders cannot claim tables",
                self.order_type
            )));
        }
        occupancy::ensure_tables_free(ctx, &claim)?;

        // 3. Validate the attached reservation
        if let Some(reservation_id) = self.reservation_id {
            let reservation = ctx.get_reservation(reservation_id)?.ok_or_else(|| {
                OrderError::InvalidOperation(format!("reservation {reservation_id} not found"))
            })?;
            if !reservation.status.is_open() {
                return Err(OrderError::InvalidOperation(format!(
                    "reservation {reservation_id} is not open"
                )));
            }
        }

        // 4. Assign item IDs; confirmed opens queue items straight to the stations
        let mut items = items_from_inputs(&self.items);
        if self.confirmed {
            for item in &mut items {
                item.status = ItemStatus::Cooking;
            }
        }

        let order_id = uuid::Uuid::new_v4().to_string();

        // 5. Build events: the open itself, then one occupancy event per table
        let mut events = vec![OrderEvent::new(
            ctx.next_sequence(),
            order_id.clone(),
            metadata.operator_id,
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            OrderEventType::OrderOpened,
            EventPayload::OrderOpened {
                order_type: self.order_type,
                table_id: self.table_id,
                linked_table_ids: self.linked_table_ids.clone(),
                reservation_id: self.reservation_id,
                guest_count: self.guest_count,
                note: self.note.clone(),
                confirmed: self.confirmed,
                items,
            },
        )];
        for &table_id in &claim {
            events.push(OrderEvent::new(
                ctx.next_sequence(),
                order_id.clone(),
                metadata.operator_id,
                metadata.operator_name.clone(),
                metadata.command_id.clone(),
                Some(metadata.timestamp),
                OrderEventType::TableStatusChanged,
                EventPayload::TableStatusChanged {
                    table_id,
                    status: TableStatus::Occupied,
                },
            ));
        }

        // 6. Stage the snapshot so same-command reads can resolve the order
        let snapshot = ctx.create_snapshot(order_id);
        ctx.save_snapshot(snapshot);

        Ok(events)
    }
}
