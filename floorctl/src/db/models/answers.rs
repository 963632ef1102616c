//! Database models for downtime reason codes.

use crate::types::AnswerId;
use sqlx::FromRow;

/// Reason code with its category name resolved
#[derive(Debug, Clone, FromRow)]
pub struct AnswerDBResponse {
    pub id: AnswerId,
    pub text: String,
    pub category_id: i32,
    pub category: String,
    pub color: String,
    pub is_system: bool,
}
