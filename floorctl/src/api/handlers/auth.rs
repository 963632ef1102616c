use axum::{Json, extract::State};

use crate::{
    AppState,
    api::models::{
        auth::{AuthResponse, AuthSuccessResponse, LoginInfo, LoginRequest, LoginResponse, LogoutResponse},
        users::{CurrentSession, Role, UserResponse},
    },
    auth::{password, session},
    db::handlers::{Groups, Users},
    errors::Error,
};

/// Get login information
#[utoipa::path(
    get,
    path = "/authentication/login",
    tag = "authentication",
    responses(
        (status = 200, description = "Login info", body = LoginInfo),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_login_info(State(state): State<AppState>) -> Result<Json<LoginInfo>, Error> {
    Ok(Json(LoginInfo {
        default_group_id: state.config.default_group_id,
    }))
}

/// Login with username, password and the selected shop
#[utoipa::path(
    post,
    path = "/authentication/login",
    request_body = LoginRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 404, description = "Selected shop does not exist"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<LoginResponse, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    // The selected shop must exist
    let group = Groups::new(&mut pool_conn)
        .get_by_id(request.group_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "group".to_string(),
            id: request.group_id.to_string(),
        })?;

    let mut user_repo = Users::new(&mut pool_conn);

    // Find the user; failures stay indistinguishable from a bad password
    let user = user_repo
        .get_by_username(&request.username)
        .await?
        .ok_or_else(|| Error::Unauthenticated {
            message: Some("Invalid username or password".to_string()),
        })?;

    // Operators may only log into shops they belong to; masters roam freely
    if user.role == Role::Operator && !user_repo.is_member_of(user.id, group.id).await? {
        return Err(Error::Unauthenticated {
            message: Some("Invalid username or password".to_string()),
        });
    }

    // A user without a password cannot authenticate
    let password_hash = user.password_hash.clone().ok_or_else(|| Error::Unauthenticated {
        message: Some("Invalid username or password".to_string()),
    })?;

    // Verify password on a blocking thread to avoid blocking async runtime
    let password = request.password.clone();
    let is_valid = tokio::task::spawn_blocking(move || password::verify_string(&password, &password_hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;

    if !is_valid {
        return Err(Error::Unauthenticated {
            message: Some("Invalid username or password".to_string()),
        });
    }

    // Create session token bound to both the user and the selected shop
    let current = CurrentSession {
        user_id: user.id,
        group_id: group.id,
        username: user.username.clone(),
        role: user.role.clone(),
    };
    let token = session::create_session_token(&current, &state.config)?;
    let cookie = create_session_cookie(&token, &state.config);

    Ok(LoginResponse {
        auth_response: AuthResponse {
            user: UserResponse::from(user),
            group_id: group.id,
            message: "Login successful".to_string(),
        },
        cookie,
    })
}

/// Logout (clear session)
#[utoipa::path(
    post,
    path = "/authentication/logout",
    tag = "authentication",
    responses(
        (status = 200, description = "Logout successful", body = AuthSuccessResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn logout(State(state): State<AppState>) -> Result<LogoutResponse, Error> {
    // Create expired cookie to clear session
    let cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite={}; Max-Age=0",
        state.config.session.cookie_name, state.config.session.cookie_same_site
    );

    Ok(LogoutResponse {
        auth_response: AuthSuccessResponse {
            message: "Logout successful".to_string(),
        },
        cookie,
    })
}

/// Helper function to create a session cookie
fn create_session_cookie(token: &str, config: &crate::config::Config) -> String {
    let session_config = &config.session;
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite={}; Max-Age={}",
        session_config.cookie_name,
        token,
        session_config.cookie_same_site,
        session_config.timeout.as_secs()
    );
    if session_config.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use crate::api::models::auth::AuthResponse;
    use crate::api::models::users::Role;
    use crate::test_utils::{create_test_app, create_test_group, create_test_user_with_password};
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_login_success_sets_cookie(pool: PgPool) {
        let group = create_test_group(&pool, "press shop").await;
        let user = create_test_user_with_password(&pool, "ivan", Role::Operator, "hunter2").await;
        sqlx::query("INSERT INTO users_groups (user_id, group_id) VALUES ($1, $2)")
            .bind(user.id)
            .bind(group.id)
            .execute(&pool)
            .await
            .unwrap();

        let server = create_test_app(pool).await;

        let response = server
            .post("/authentication/login")
            .json(&serde_json::json!({
                "username": "ivan",
                "password": "hunter2",
                "group_id": group.id,
            }))
            .await;

        response.assert_status_ok();
        assert!(response.headers().get("set-cookie").is_some());

        let body: AuthResponse = response.json();
        assert_eq!(body.user.username, "ivan");
        assert_eq!(body.group_id, group.id);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_login_wrong_password(pool: PgPool) {
        let group = create_test_group(&pool, "press shop").await;
        let user = create_test_user_with_password(&pool, "ivan", Role::Operator, "hunter2").await;
        sqlx::query("INSERT INTO users_groups (user_id, group_id) VALUES ($1, $2)")
            .bind(user.id)
            .bind(group.id)
            .execute(&pool)
            .await
            .unwrap();

        let server = create_test_app(pool).await;

        let response = server
            .post("/authentication/login")
            .json(&serde_json::json!({
                "username": "ivan",
                "password": "wrong",
                "group_id": group.id,
            }))
            .await;

        response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_operator_cannot_log_into_foreign_shop(pool: PgPool) {
        let _home = create_test_group(&pool, "press shop").await;
        let foreign = create_test_group(&pool, "lathe shop").await;
        // Operator is not a member of any shop
        create_test_user_with_password(&pool, "ivan", Role::Operator, "hunter2").await;

        let server = create_test_app(pool).await;

        let response = server
            .post("/authentication/login")
            .json(&serde_json::json!({
                "username": "ivan",
                "password": "hunter2",
                "group_id": foreign.id,
            }))
            .await;

        response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_master_may_select_any_shop(pool: PgPool) {
        let group = create_test_group(&pool, "press shop").await;
        create_test_user_with_password(&pool, "master1", Role::Master, "hunter2").await;

        let server = create_test_app(pool).await;

        let response = server
            .post("/authentication/login")
            .json(&serde_json::json!({
                "username": "master1",
                "password": "hunter2",
                "group_id": group.id,
            }))
            .await;

        response.assert_status_ok();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_login_unknown_group(pool: PgPool) {
        create_test_user_with_password(&pool, "ivan", Role::Operator, "hunter2").await;
        let server = create_test_app(pool).await;

        let response = server
            .post("/authentication/login")
            .json(&serde_json::json!({
                "username": "ivan",
                "password": "hunter2",
                "group_id": 9999,
            }))
            .await;

        response.assert_status(axum::http::StatusCode::NOT_FOUND);
    }
}
