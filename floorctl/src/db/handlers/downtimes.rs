//! Database repository for downtime intervals.
//!
//! Downtime rows are produced by the external monitoring process; the only
//! mutation owned by this service is classification (setting `answer_id`).

use crate::db::{errors::Result, models::downtimes::DowntimeDBResponse};
use crate::types::{AnswerId, DowntimeStartId};
use sqlx::PgConnection;
use tracing::instrument;

/// Filter for listing downtimes of one equipment unit
#[derive(Debug, Clone)]
pub struct DowntimeFilter {
    pub equipment_id: i64,
    pub skip: i64,
    pub limit: i64,
}

pub struct Downtimes<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Downtimes<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, filter), fields(equipment_id = filter.equipment_id, limit = filter.limit, skip = filter.skip), err)]
    pub async fn list(&mut self, filter: &DowntimeFilter) -> Result<Vec<DowntimeDBResponse>> {
        let downtimes = sqlx::query_as::<_, DowntimeDBResponse>(
            "SELECT w.equipment_id, w.start_id, w.stop_id, w.answer_id, a.text AS answer_text
             FROM downtimes w
             LEFT JOIN answers a ON a.id = w.answer_id
             WHERE w.equipment_id = $1
             ORDER BY w.start_id DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(filter.equipment_id)
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(downtimes)
    }

    #[instrument(skip(self), err)]
    pub async fn count_for_equipment(&mut self, equipment_id: i64) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM downtimes WHERE equipment_id = $1")
            .bind(equipment_id)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }

    /// Attach a reason code to one downtime interval. Update-if-exists:
    /// returns None when no row matches the key.
    #[instrument(skip(self), err)]
    pub async fn classify(
        &mut self,
        equipment_id: i64,
        start_id: DowntimeStartId,
        answer_id: AnswerId,
    ) -> Result<Option<DowntimeDBResponse>> {
        let updated = sqlx::query_as::<_, DowntimeDBResponse>(
            "UPDATE downtimes
             SET answer_id = $3
             WHERE equipment_id = $1 AND start_id = $2
             RETURNING equipment_id, start_id, stop_id, answer_id,
                       (SELECT text FROM answers WHERE id = $3) AS answer_text",
        )
        .bind(equipment_id)
        .bind(start_id)
        .bind(answer_id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(updated)
    }
}
