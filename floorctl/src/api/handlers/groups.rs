use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    AppState,
    api::models::{groups::GroupResponse, users::UserResponse},
    db::handlers::{Groups, Users},
    errors::{Error, Result},
    types::GroupId,
};

/// List all shops. Served before authentication: this backs the shop
/// selection screen.
#[utoipa::path(
    get,
    path = "/api/v1/groups",
    tag = "groups",
    summary = "List shops",
    responses(
        (status = 200, description = "List of shops", body = Vec<GroupResponse>),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_groups(State(state): State<AppState>) -> Result<Json<Vec<GroupResponse>>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Groups::new(&mut pool_conn);

    let groups = repo.list().await?;
    Ok(Json(groups.into_iter().map(GroupResponse::from).collect()))
}

/// List the users of one shop. Served before authentication: this backs the
/// operator selection screen shown before the password prompt.
#[utoipa::path(
    get,
    path = "/api/v1/groups/{group_id}/users",
    tag = "groups",
    summary = "List shop users",
    params(
        ("group_id" = GroupId, Path, description = "Shop ID")
    ),
    responses(
        (status = 200, description = "Users of the shop", body = Vec<UserResponse>),
        (status = 404, description = "Shop not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_group_users(State(state): State<AppState>, Path(group_id): Path<GroupId>) -> Result<Json<Vec<UserResponse>>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    Groups::new(&mut pool_conn)
        .get_by_id(group_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "group".to_string(),
            id: group_id.to_string(),
        })?;

    let users = Users::new(&mut pool_conn).list_in_group(group_id).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[cfg(test)]
mod tests {
    use crate::api::models::{groups::GroupResponse, users::{Role, UserResponse}};
    use crate::test_utils::{create_test_app, create_test_group, create_test_user};
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_groups(pool: PgPool) {
        create_test_group(&pool, "press shop").await;
        create_test_group(&pool, "lathe shop").await;

        let server = create_test_app(pool).await;
        let response = server.get("/api/v1/groups").await;

        response.assert_status_ok();
        let groups: Vec<GroupResponse> = response.json();
        assert_eq!(groups.len(), 2);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_group_users(pool: PgPool) {
        let group = create_test_group(&pool, "press shop").await;
        let user = create_test_user(&pool, "ivan", Role::Operator).await;
        sqlx::query("INSERT INTO users_groups (user_id, group_id) VALUES ($1, $2)")
            .bind(user.id)
            .bind(group.id)
            .execute(&pool)
            .await
            .unwrap();

        let server = create_test_app(pool).await;

        let response = server.get(&format!("/api/v1/groups/{}/users", group.id)).await;
        response.assert_status_ok();
        let users: Vec<UserResponse> = response.json();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "ivan");

        let missing = server.get("/api/v1/groups/9999/users").await;
        missing.assert_status(axum::http::StatusCode::NOT_FOUND);
    }
}
