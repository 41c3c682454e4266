//! Refund interface to the payment collaborator
//!
//! Refund creation is a post-commit side effect: the cancellation event is
//! already durable when the call happens, so a failure here is logged and
//! surfaced through payment reconciliation, never retried inline and never
//! able to roll back the cancellation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RefundError {
    #[error("Payment collaborator rejected refund: {0}")]
    Rejected(String),

    #[error("Payment collaborator unreachable: {0}")]
    Unreachable(String),
}

/// Payment-side refund creation
///
/// Implementations live with the payment integration; the engine only
/// holds a `dyn RefundService` and calls it after a paid order is
/// cancelled.
pub trait RefundService: Send + Sync {
    /// Create a refund for a cancelled order. `method` is the operator's
    /// requested channel; `None` lets the payment side pick the original
    /// capture method.
    fn create_refund(
        &self,
        order_id: &str,
        amount: f64,
        method: Option<&str>,
    ) -> Result<(), RefundError>;
}
