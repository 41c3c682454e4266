use super::*;
use shared::models::{KitchenStation, Reservation, ReservationStatus};
use shared::order::{
    CommandErrorCode, DeliveryStatus, ItemStatus, OrderEventType, OrderItemInput, OrderStatus,
    OrderType, TransitionAction,
};

fn create_test_manager() -> OrdersManager {
    let storage = OrderStorage::open_in_memory().unwrap();
    OrdersManager::with_storage(storage)
}

fn station(id: i64, slug: &str) -> KitchenStation {
    KitchenStation {
        id,
        slug: slug.to_string(),
        name: slug.to_string(),
        is_active: true,
    }
}

/// Manager with the grill (1) and bar (2) stations loaded
fn manager_with_stations() -> OrdersManager {
    let manager = create_test_manager();
    manager
        .station_catalog()
        .load(vec![station(1, "grill"), station(2, "bar")]);
    manager
}

fn simple_item(product_id: i64, name: &str, price: f64, quantity: i32) -> OrderItemInput {
    OrderItemInput {
        product_id,
        name: name.to_string(),
        price,
        quantity,
        kitchen_station_id: None,
        note: None,
    }
}

fn routed_item(product_id: i64, name: &str, price: f64, station_id: i64) -> OrderItemInput {
    OrderItemInput {
        product_id,
        name: name.to_string(),
        price,
        quantity: 1,
        kitchen_station_id: Some(station_id),
        note: None,
    }
}

// ========================================================================
// Helpers: open orders
// ========================================================================

/// Open a confirmed dine-in order; items queue straight to `Cooking`.
fn open_order_with_items(
    manager: &OrdersManager,
    table_id: i64,
    items: Vec<OrderItemInput>,
) -> String {
    let cmd = OrderCommand::new(
        1,
        "Test Operator".to_string(),
        OrderCommandPayload::OpenOrder {
            order_type: OrderType::DineIn,
            table_id: Some(table_id),
            linked_table_ids: vec![],
            reservation_id: None,
            guest_count: 2,
            note: None,
            confirmed: true,
            items,
        },
    );
    let response = manager.execute_command(cmd);
    assert!(response.success, "Failed to open order: {:?}", response.error);
    response.order_id.unwrap()
}

/// Open a draft dine-in order; items stay `Pending` until confirmed and queued.
fn open_draft_order(manager: &OrdersManager, table_id: i64, items: Vec<OrderItemInput>) -> String {
    let cmd = OrderCommand::new(
        1,
        "Test Operator".to_string(),
        OrderCommandPayload::OpenOrder {
            order_type: OrderType::DineIn,
            table_id: Some(table_id),
            linked_table_ids: vec![],
            reservation_id: None,
            guest_count: 2,
            note: None,
            confirmed: false,
            items,
        },
    );
    let response = manager.execute_command(cmd);
    assert!(response.success, "Failed to open draft: {:?}", response.error);
    response.order_id.unwrap()
}

fn open_delivery_order(manager: &OrdersManager, items: Vec<OrderItemInput>) -> String {
    let cmd = OrderCommand::new(
        1,
        "Test Operator".to_string(),
        OrderCommandPayload::OpenOrder {
            order_type: OrderType::Delivery,
            table_id: None,
            linked_table_ids: vec![],
            reservation_id: None,
            guest_count: 1,
            note: None,
            confirmed: true,
            items,
        },
    );
    let response = manager.execute_command(cmd);
    assert!(response.success, "Failed to open delivery: {:?}", response.error);
    response.order_id.unwrap()
}

// ========================================================================
// Helpers: transitions and terminals
// ========================================================================

fn transition(
    manager: &OrdersManager,
    order_id: &str,
    action: TransitionAction,
    station: Option<&str>,
) -> CommandResponse {
    let cmd = OrderCommand::new(
        1,
        "Test Operator".to_string(),
        OrderCommandPayload::TransitionOrder {
            order_id: order_id.to_string(),
            action,
            station: station.map(str::to_string),
            reason: None,
        },
    );
    manager.execute_command(cmd)
}

fn transition_item(
    manager: &OrdersManager,
    order_id: &str,
    item_id: &str,
    action: TransitionAction,
) -> CommandResponse {
    let cmd = OrderCommand::new(
        1,
        "Test Operator".to_string(),
        OrderCommandPayload::TransitionItem {
            order_id: order_id.to_string(),
            item_id: item_id.to_string(),
            action,
            reason: None,
        },
    );
    manager.execute_command(cmd)
}

fn confirm_order(manager: &OrdersManager, order_id: &str) -> CommandResponse {
    let cmd = OrderCommand::new(
        1,
        "Test Operator".to_string(),
        OrderCommandPayload::ConfirmOrder {
            order_id: order_id.to_string(),
        },
    );
    manager.execute_command(cmd)
}

fn complete_order(manager: &OrdersManager, order_id: &str) -> CommandResponse {
    let cmd = OrderCommand::new(
        1,
        "Test Operator".to_string(),
        OrderCommandPayload::CompleteOrder {
            order_id: order_id.to_string(),
        },
    );
    manager.execute_command(cmd)
}

fn cancel_order(manager: &OrdersManager, order_id: &str, reason: Option<&str>) -> CommandResponse {
    let cmd = OrderCommand::new(
        1,
        "Test Operator".to_string(),
        OrderCommandPayload::CancelOrder {
            order_id: order_id.to_string(),
            reason: reason.map(str::to_string),
        },
    );
    manager.execute_command(cmd)
}

fn request_cancellation(manager: &OrdersManager, order_id: &str, reason: &str) -> CommandResponse {
    let cmd = OrderCommand::new(
        1,
        "Test Operator".to_string(),
        OrderCommandPayload::RequestCancellation {
            order_id: order_id.to_string(),
            reason: reason.to_string(),
        },
    );
    manager.execute_command(cmd)
}

fn approve_cancellation(
    manager: &OrdersManager,
    order_id: &str,
    refund_method: Option<&str>,
) -> CommandResponse {
    let cmd = OrderCommand::new(
        9,
        "Shift Manager".to_string(),
        OrderCommandPayload::ApproveCancellation {
            order_id: order_id.to_string(),
            refund_method: refund_method.map(str::to_string),
        },
    );
    manager.execute_command(cmd)
}

fn reject_cancellation(manager: &OrdersManager, order_id: &str) -> CommandResponse {
    let cmd = OrderCommand::new(
        9,
        "Shift Manager".to_string(),
        OrderCommandPayload::RejectCancellation {
            order_id: order_id.to_string(),
        },
    );
    manager.execute_command(cmd)
}

fn request_item_cancellation(
    manager: &OrdersManager,
    item_id: &str,
    reason: &str,
) -> CommandResponse {
    let cmd = OrderCommand::new(
        1,
        "Test Operator".to_string(),
        OrderCommandPayload::RequestItemCancellation {
            item_id: item_id.to_string(),
            reason: reason.to_string(),
        },
    );
    manager.execute_command(cmd)
}

fn approve_item_cancellation(manager: &OrdersManager, item_id: &str) -> CommandResponse {
    let cmd = OrderCommand::new(
        9,
        "Shift Manager".to_string(),
        OrderCommandPayload::ApproveItemCancellation {
            item_id: item_id.to_string(),
        },
    );
    manager.execute_command(cmd)
}

fn reject_item_cancellation(manager: &OrdersManager, item_id: &str) -> CommandResponse {
    let cmd = OrderCommand::new(
        9,
        "Shift Manager".to_string(),
        OrderCommandPayload::RejectItemCancellation {
            item_id: item_id.to_string(),
        },
    );
    manager.execute_command(cmd)
}

fn update_delivery(
    manager: &OrdersManager,
    order_id: &str,
    status: DeliveryStatus,
) -> CommandResponse {
    let cmd = OrderCommand::new(
        1,
        "Dispatcher".to_string(),
        OrderCommandPayload::UpdateDeliveryProgress {
            order_id: order_id.to_string(),
            status,
        },
    );
    manager.execute_command(cmd)
}

// ========================================================================
// Helpers: assertions and fixtures
// ========================================================================

fn snapshot_of(manager: &OrdersManager, order_id: &str) -> OrderSnapshot {
    manager.get_snapshot(order_id).unwrap().unwrap()
}

fn assert_order_status(manager: &OrdersManager, order_id: &str, expected: OrderStatus) {
    let snapshot = snapshot_of(manager, order_id);
    assert_eq!(
        snapshot.status, expected,
        "Expected order status {:?}, got {:?}",
        expected, snapshot.status
    );
}

fn error_code(response: &CommandResponse) -> CommandErrorCode {
    assert!(!response.success, "Expected a failed response");
    response.error.as_ref().expect("error missing").code
}

fn booked_reservation(id: i64) -> Reservation {
    Reservation {
        id,
        table_id: Some(5),
        guest_name: "Guest".to_string(),
        guest_phone: None,
        party_size: 2,
        scheduled_at: 1234567890,
        status: ReservationStatus::Booked,
        note: None,
        created_at: 1234567890,
        updated_at: 1234567890,
    }
}

/// The payment collaborator maintains `paid_amount` outside the engine;
/// tests write it straight into the stored snapshot.
fn set_paid_amount(manager: &OrdersManager, order_id: &str, amount: f64) {
    let mut snapshot = snapshot_of(manager, order_id);
    snapshot.paid_amount = amount;
    snapshot.update_checksum();
    let txn = manager.storage().begin_write().unwrap();
    manager.storage().store_snapshot(&txn, &snapshot).unwrap();
    txn.commit().unwrap();
}

/// Refund double recording every call it receives
#[derive(Default)]
struct RecordingRefundService {
    calls: parking_lot::Mutex<Vec<(String, f64, Option<String>)>>,
}

impl crate::services::refund::RefundService for RecordingRefundService {
    fn create_refund(
        &self,
        order_id: &str,
        amount: f64,
        method: Option<&str>,
    ) -> Result<(), crate::services::refund::RefundError> {
        self.calls
            .lock()
            .push((order_id.to_string(), amount, method.map(str::to_string)));
        Ok(())
    }
}
