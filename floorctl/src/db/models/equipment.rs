//! Database models for equipment.

use crate::types::{EquipmentId, GroupId, UserId};
use sqlx::FromRow;

/// Equipment unit with its occupancy projection (active claim holder, if any).
///
/// Listing always carries the occupancy columns; the dashboard has no use for
/// equipment rows without them.
#[derive(Debug, Clone, FromRow)]
pub struct EquipmentDBResponse {
    pub id: EquipmentId,
    pub group_id: GroupId,
    pub name: String,
    pub sort_order: i32,
    pub occupied: bool,
    pub holder_id: Option<UserId>,
    pub holder: Option<String>,
}
