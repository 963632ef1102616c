//! API models for downtime intervals and their classification.

use crate::api::models::pagination::Pagination;
use crate::db::models::downtimes::DowntimeDBResponse;
use crate::types::{AnswerId, DowntimeStartId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query parameters for listing downtimes
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ListDowntimesQuery {
    /// Pagination parameters
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,
}

/// Request to classify one downtime interval with a reason code
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DowntimeClassifyRequest {
    pub answer_id: AnswerId,
}

/// Downtime interval with its classification, if any.
///
/// `start_id`/`stop_id` are the raw epoch-second markers the monitoring
/// process writes; `start_time`/`stop_time` are the same instants as
/// timestamps for display.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DowntimeResponse {
    pub equipment_id: i64,
    pub start_id: DowntimeStartId,
    pub start_time: Option<DateTime<Utc>>,
    pub stop_id: Option<i64>,
    pub stop_time: Option<DateTime<Utc>>,
    pub answer_id: Option<AnswerId>,
    pub answer_text: Option<String>,
}

impl From<DowntimeDBResponse> for DowntimeResponse {
    fn from(db: DowntimeDBResponse) -> Self {
        Self {
            equipment_id: db.equipment_id,
            start_id: db.start_id,
            start_time: DateTime::from_timestamp(db.start_id, 0),
            stop_time: db.stop_id.and_then(|stop| DateTime::from_timestamp(stop, 0)),
            stop_id: db.stop_id,
            answer_id: db.answer_id,
            answer_text: db.answer_text,
        }
    }
}
