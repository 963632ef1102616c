//! Database repository for downtime reason codes.

use crate::db::{errors::Result, models::answers::AnswerDBResponse};
use sqlx::PgConnection;
use tracing::instrument;

pub struct Answers<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Answers<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), err)]
    pub async fn list(&mut self) -> Result<Vec<AnswerDBResponse>> {
        let answers = sqlx::query_as::<_, AnswerDBResponse>(
            "SELECT a.id, a.text, a.category_id, c.name AS category, a.color, a.is_system
             FROM answers a
             JOIN answer_categories c ON c.id = a.category_id
             ORDER BY a.id",
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(answers)
    }
}
