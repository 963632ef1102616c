//! Database models for occupancy claims.

use crate::types::{ClaimId, EquipmentId, UserId};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// The currently active claim on an equipment unit, with the holder's name
/// for conflict messages. At most one exists per equipment.
#[derive(Debug, Clone, FromRow)]
pub struct ActiveClaimDBResponse {
    pub id: ClaimId,
    pub user_id: UserId,
    pub holder: String,
}

/// A full claim row
#[derive(Debug, Clone, FromRow)]
pub struct ClaimDBResponse {
    pub id: ClaimId,
    pub equipment_id: EquipmentId,
    pub user_id: UserId,
    pub active: bool,
    pub subscribe_time: DateTime<Utc>,
    pub unsubscribe_time: Option<DateTime<Utc>>,
    pub minutes_to_live: i32,
}
