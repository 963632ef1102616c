//! API models for groups (shops).

use crate::db::models::groups::GroupDBResponse;
use crate::types::GroupId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GroupResponse {
    pub id: GroupId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<GroupDBResponse> for GroupResponse {
    fn from(db: GroupDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            created_at: db.created_at,
        }
    }
}
