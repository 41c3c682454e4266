//! Kitchen Station Model

use serde::{Deserialize, Serialize};

/// Kitchen station entity (出品工位)
///
/// Items carry a `kitchen_station_id`; a missing id means the item is
/// visible to every station.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KitchenStation {
    pub id: i64,
    /// Stable identifier used by station tablets ("grill", "bar", ...)
    pub slug: String,
    pub name: String,
    pub is_active: bool,
}

/// Create kitchen station payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KitchenStationCreate {
    pub slug: String,
    pub name: String,
}

/// Update kitchen station payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KitchenStationUpdate {
    pub slug: Option<String>,
    pub name: Option<String>,
    pub is_active: Option<bool>,
}
