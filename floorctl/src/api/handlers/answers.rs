use axum::{Json, extract::State};

use crate::{
    AppState,
    api::models::{answers::AnswerResponse, users::CurrentSession},
    db::handlers::Answers,
    errors::{Error, Result},
};

/// List all downtime reason codes
#[utoipa::path(
    get,
    path = "/api/v1/answers",
    tag = "answers",
    summary = "List reason codes",
    responses(
        (status = 200, description = "Reason codes", body = Vec<AnswerResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("session_cookie" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_answers(State(state): State<AppState>, _session: CurrentSession) -> Result<Json<Vec<AnswerResponse>>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Answers::new(&mut pool_conn);

    let answers = repo.list().await?;
    Ok(Json(answers.into_iter().map(AnswerResponse::from).collect()))
}

#[cfg(test)]
mod tests {
    use crate::api::models::answers::AnswerResponse;
    use crate::api::models::users::Role;
    use crate::test_utils::{create_test_app, create_test_group, login_as};
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_answers(pool: PgPool) {
        let group = create_test_group(&pool, "press shop").await;
        let mut server = create_test_app(pool.clone()).await;
        login_as(&mut server, &pool, "ivan", Role::Operator, group.id).await;

        let response = server.get("/api/v1/answers").await;
        response.assert_status_ok();

        let answers: Vec<AnswerResponse> = response.json();
        assert!(!answers.is_empty());
        assert!(answers.iter().all(|a| !a.category.is_empty()));
    }
}
