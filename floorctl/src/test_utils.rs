//! Shared helpers for database-backed tests.

use axum_test::TestServer;
use sqlx::PgPool;

use crate::{
    AppState, Config, build_router,
    api::models::users::Role,
    auth::password,
    db::handlers::{Equipment, Groups, Users},
    db::models::{groups::GroupDBResponse, users::{UserCreateDBRequest, UserDBResponse}},
    types::{AnswerId, EquipmentId, GroupId},
};

pub fn create_test_config() -> Config {
    Config {
        secret_key: Some("test-secret-key".to_string()),
        ..Default::default()
    }
}

/// Build a test server over the full router
pub async fn create_test_app(pool: PgPool) -> TestServer {
    let state = AppState {
        db: pool,
        config: create_test_config(),
    };
    let router = build_router(state).expect("Failed to build router");
    TestServer::new(router).expect("Failed to create test server")
}

pub async fn create_test_group(pool: &PgPool, name: &str) -> GroupDBResponse {
    let mut conn = pool.acquire().await.unwrap();
    Groups::new(&mut conn).create(name).await.unwrap()
}

pub async fn create_test_user(pool: &PgPool, username: &str, role: Role) -> UserDBResponse {
    let mut conn = pool.acquire().await.unwrap();
    Users::new(&mut conn)
        .create(&UserCreateDBRequest {
            username: username.to_string(),
            display_name: None,
            role,
            password_hash: None,
        })
        .await
        .unwrap()
}

pub async fn create_test_user_with_password(pool: &PgPool, username: &str, role: Role, password: &str) -> UserDBResponse {
    let hash = password::hash_string(password).unwrap();
    let mut conn = pool.acquire().await.unwrap();
    Users::new(&mut conn)
        .create(&UserCreateDBRequest {
            username: username.to_string(),
            display_name: None,
            role,
            password_hash: Some(hash),
        })
        .await
        .unwrap()
}

pub async fn create_test_equipment(pool: &PgPool, group_id: GroupId, name: &str) -> EquipmentId {
    let mut conn = pool.acquire().await.unwrap();
    Equipment::new(&mut conn).create(group_id, name).await.unwrap()
}

pub async fn create_test_downtime(pool: &PgPool, equipment_id: i64, start_id: i64, stop_id: Option<i64>) {
    sqlx::query("INSERT INTO downtimes (equipment_id, start_id, stop_id) VALUES ($1, $2, $3)")
        .bind(equipment_id)
        .bind(start_id)
        .bind(stop_id)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn first_answer_id(pool: &PgPool) -> AnswerId {
    sqlx::query_scalar("SELECT id FROM answers ORDER BY id LIMIT 1")
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn active_claim_count(pool: &PgPool, equipment_id: EquipmentId) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM claims WHERE equipment_id = $1 AND active")
        .bind(equipment_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Provision a user with the standard test password and log the server's
/// cookie jar into their session.
pub async fn login_as(server: &mut TestServer, pool: &PgPool, username: &str, role: Role, group_id: GroupId) -> UserDBResponse {
    let user = create_test_user_with_password(pool, username, role.clone(), "hunter2").await;
    if role == Role::Operator {
        let mut conn = pool.acquire().await.unwrap();
        Users::new(&mut conn).add_to_group(user.id, group_id).await.unwrap();
    }

    server.save_cookies();
    let response = server
        .post("/authentication/login")
        .json(&serde_json::json!({
            "username": username,
            "password": "hunter2",
            "group_id": group_id,
        }))
        .await;
    response.assert_status_ok();

    user
}
