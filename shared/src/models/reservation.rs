//! Reservation Model

use serde::{Deserialize, Serialize};

/// Reservation status
///
/// The order engine only ever writes `Cancelled`, and only onto
/// reservations that are still open (`Booked` or `Seated`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Booked,
    Seated,
    Completed,
    Cancelled,
    NoShow,
}

impl ReservationStatus {
    /// Open reservations are the only ones a cancelled order cascades to.
    pub fn is_open(&self) -> bool {
        matches!(self, ReservationStatus::Booked | ReservationStatus::Seated)
    }
}

/// Reservation entity (预订)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i64,
    pub table_id: Option<i64>,
    pub guest_name: String,
    pub guest_phone: Option<String>,
    pub party_size: i32,
    /// Scheduled arrival (epoch ms)
    pub scheduled_at: i64,
    pub status: ReservationStatus,
    pub note: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}
