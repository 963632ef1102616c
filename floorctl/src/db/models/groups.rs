//! Database models for groups (shops).

use crate::types::GroupId;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database response for a group
#[derive(Debug, Clone, FromRow)]
pub struct GroupDBResponse {
    pub id: GroupId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
