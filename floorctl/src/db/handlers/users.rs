//! Database repository for users.

use crate::types::{GroupId, UserId, abbrev_uuid};
use crate::db::{
    errors::Result,
    models::users::{UserCreateDBRequest, UserDBResponse},
};
use sqlx::PgConnection;
use tracing::instrument;

const USER_COLUMNS: &str = "id, username, display_name, role, password_hash, created_at, updated_at";

pub struct Users<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(username = %request.username), err)]
    pub async fn create(&mut self, request: &UserCreateDBRequest) -> Result<UserDBResponse> {
        let user = sqlx::query_as::<_, UserDBResponse>(&format!(
            "INSERT INTO users (username, display_name, role, password_hash)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&request.username)
        .bind(&request.display_name)
        .bind(&request.role)
        .bind(&request.password_hash)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: UserId) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, UserDBResponse>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }

    #[instrument(skip(self, username), err)]
    pub async fn get_by_username(&mut self, username: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, UserDBResponse>(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1"))
            .bind(username)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }

    /// Users of one shop, for the operator selection screen
    #[instrument(skip(self), err)]
    pub async fn list_in_group(&mut self, group_id: GroupId) -> Result<Vec<UserDBResponse>> {
        let users = sqlx::query_as::<_, UserDBResponse>(
            "SELECT u.id, u.username, u.display_name, u.role, u.password_hash, u.created_at, u.updated_at
             FROM users u
             JOIN users_groups ug ON ug.user_id = u.id
             WHERE ug.group_id = $1
             ORDER BY u.username",
        )
        .bind(group_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(users)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn is_member_of(&mut self, user_id: UserId, group_id: GroupId) -> Result<bool> {
        let member = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users_groups WHERE user_id = $1 AND group_id = $2)",
        )
        .bind(user_id)
        .bind(group_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(member)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn add_to_group(&mut self, user_id: UserId, group_id: GroupId) -> Result<()> {
        sqlx::query("INSERT INTO users_groups (user_id, group_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
            .bind(user_id)
            .bind(group_id)
            .execute(&mut *self.db)
            .await?;

        Ok(())
    }

    #[instrument(skip(self, password_hash), fields(user_id = %abbrev_uuid(&id)), err)]
    pub async fn set_password(&mut self, id: UserId, password_hash: &str) -> Result<()> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&mut *self.db)
            .await?;

        Ok(())
    }
}
