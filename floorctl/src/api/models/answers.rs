//! API models for downtime reason codes.

use crate::db::models::answers::AnswerDBResponse;
use crate::types::AnswerId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnswerResponse {
    pub id: AnswerId,
    pub text: String,
    pub category: String,
    pub color: String,
    pub is_system: bool,
}

impl From<AnswerDBResponse> for AnswerResponse {
    fn from(db: AnswerDBResponse) -> Self {
        Self {
            id: db.id,
            text: db.text,
            category: db.category,
            color: db.color,
            is_system: db.is_system,
        }
    }
}
