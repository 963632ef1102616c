//! API models for equipment and claim toggling.

use crate::api::models::pagination::Pagination;
use crate::db::models::equipment::EquipmentDBResponse;
use crate::occupancy::ToggleOutcome;
use crate::types::{EquipmentId, GroupId};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query parameters for listing equipment
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ListEquipmentQuery {
    /// Shop whose equipment to list
    pub group_id: GroupId,

    /// Pagination parameters
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,
}

/// Equipment unit with its current occupancy
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EquipmentResponse {
    pub id: EquipmentId,
    pub group_id: GroupId,
    pub name: String,
    /// Whether an active claim exists for this unit
    pub occupied: bool,
    /// Username of the current holder, if occupied
    pub holder: Option<String>,
}

impl From<EquipmentDBResponse> for EquipmentResponse {
    fn from(db: EquipmentDBResponse) -> Self {
        Self {
            id: db.id,
            group_id: db.group_id,
            name: db.name,
            occupied: db.occupied,
            holder: db.holder,
        }
    }
}

/// Result of toggling a claim
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ToggleClaimResponse {
    pub equipment_id: EquipmentId,
    /// Whether the acting user holds the unit after the toggle
    pub now_active: bool,
}

impl From<ToggleOutcome> for ToggleClaimResponse {
    fn from(outcome: ToggleOutcome) -> Self {
        Self {
            equipment_id: outcome.equipment_id,
            now_active: outcome.now_active,
        }
    }
}
