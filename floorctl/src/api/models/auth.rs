//! API models for authentication: login, logout, and session cookies.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::models::users::UserResponse;
use crate::types::GroupId;

/// Login request: the operator picks a shop, then authenticates
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub group_id: GroupId,
}

/// Login configuration surfaced to clients before authentication.
///
/// Kiosk terminals pinned to one shop get `default_group_id` and skip the
/// shop selection screen.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginInfo {
    pub default_group_id: Option<GroupId>,
}

/// Successful authentication payload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub group_id: GroupId,
    pub message: String,
}

/// Simple success message payload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthSuccessResponse {
    pub message: String,
}

/// Login response: JSON body plus the session cookie
#[derive(Debug)]
pub struct LoginResponse {
    pub auth_response: AuthResponse,
    pub cookie: String,
}

impl IntoResponse for LoginResponse {
    fn into_response(self) -> Response {
        let mut response = (StatusCode::OK, Json(self.auth_response)).into_response();
        if let Ok(value) = header::HeaderValue::from_str(&self.cookie) {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
        response
    }
}

/// Logout response: JSON body plus the expired session cookie
#[derive(Debug)]
pub struct LogoutResponse {
    pub auth_response: AuthSuccessResponse,
    pub cookie: String,
}

impl IntoResponse for LogoutResponse {
    fn into_response(self) -> Response {
        let mut response = (StatusCode::OK, Json(self.auth_response)).into_response();
        if let Ok(value) = header::HeaderValue::from_str(&self.cookie) {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
        response
    }
}
