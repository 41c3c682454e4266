//! Money calculation utilities using rust_decimal for precision
//!
//! All arithmetic runs on `Decimal` internally and is converted back to
//! `f64` for storage/serialization, rounded to 2 decimal places.

use crate::orders::traits::OrderError;
use rust_decimal::prelude::*;
use shared::order::{OrderItem, OrderItemInput, OrderSnapshot};

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed price per item
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per item
const MAX_QUANTITY: i32 = 9999;

/// Validate that a f64 value is finite (not NaN, not Infinity)
#[inline]
fn require_finite(value: f64, field_name: &str) -> Result<(), OrderError> {
    if !value.is_finite() {
        return Err(OrderError::InvalidOperation(format!(
            "{} must be a finite number, got {}",
            field_name, value
        )));
    }
    Ok(())
}

/// Validate an OrderItemInput before it becomes an item
pub fn validate_item_input(input: &OrderItemInput) -> Result<(), OrderError> {
    require_finite(input.price, "price")?;
    if input.price < 0.0 {
        return Err(OrderError::InvalidOperation(format!(
            "price must be non-negative, got {}",
            input.price
        )));
    }
    if input.price > MAX_PRICE {
        return Err(OrderError::InvalidOperation(format!(
            "price exceeds maximum allowed ({}), got {}",
            MAX_PRICE, input.price
        )));
    }

    if input.quantity <= 0 {
        return Err(OrderError::InvalidOperation(format!(
            "quantity must be positive, got {}",
            input.quantity
        )));
    }
    if input.quantity > MAX_QUANTITY {
        return Err(OrderError::InvalidOperation(format!(
            "quantity exceeds maximum allowed ({}), got {}",
            MAX_QUANTITY, input.quantity
        )));
    }

    if input.name.trim().is_empty() {
        return Err(OrderError::InvalidOperation(
            "item name must not be empty".to_string(),
        ));
    }

    Ok(())
}

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Calculate item line total with precise decimal arithmetic
pub fn calculate_item_total(item: &OrderItem) -> Decimal {
    let unit_price = to_decimal(item.price);
    let quantity = Decimal::from(item.quantity);

    (unit_price * quantity)
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Recalculate order totals from items using precise decimal arithmetic
///
/// Cancelled items drop out of the totals; a write-off records the loss on
/// the item but still removes it from what the guest owes.
pub fn recalculate_totals(snapshot: &mut OrderSnapshot) {
    let mut subtotal = Decimal::ZERO;

    for item in &snapshot.items {
        if item.is_cancelled() {
            continue;
        }
        subtotal += calculate_item_total(item);
    }

    snapshot.subtotal = to_f64(subtotal);
    snapshot.total = to_f64(subtotal);
}
