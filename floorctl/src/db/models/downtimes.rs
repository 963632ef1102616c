//! Database models for downtime intervals.

use crate::types::{AnswerId, DowntimeStartId};
use sqlx::FromRow;

/// Downtime interval row with the classification text resolved, if any.
///
/// `equipment_id` is BIGINT in the monitoring schema, unlike the INTEGER key
/// of the `equipment` table; the monitoring process owns this table.
#[derive(Debug, Clone, FromRow)]
pub struct DowntimeDBResponse {
    pub equipment_id: i64,
    pub start_id: DowntimeStartId,
    pub stop_id: Option<i64>,
    pub answer_id: Option<AnswerId>,
    pub answer_text: Option<String>,
}
