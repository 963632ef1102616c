//! Database repository for groups (shops).

use crate::db::{errors::Result, models::groups::GroupDBResponse};
use crate::types::GroupId;
use sqlx::PgConnection;
use tracing::instrument;

pub struct Groups<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Groups<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), err)]
    pub async fn list(&mut self) -> Result<Vec<GroupDBResponse>> {
        let groups = sqlx::query_as::<_, GroupDBResponse>("SELECT id, name, created_at FROM groups ORDER BY id")
            .fetch_all(&mut *self.db)
            .await?;

        Ok(groups)
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_id(&mut self, id: GroupId) -> Result<Option<GroupDBResponse>> {
        let group = sqlx::query_as::<_, GroupDBResponse>("SELECT id, name, created_at FROM groups WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(group)
    }

    #[instrument(skip(self, name), err)]
    pub async fn create(&mut self, name: &str) -> Result<GroupDBResponse> {
        let group = sqlx::query_as::<_, GroupDBResponse>("INSERT INTO groups (name) VALUES ($1) RETURNING id, name, created_at")
            .bind(name)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(group)
    }
}
