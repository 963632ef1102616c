//! API request/response models for users.

use crate::db::models::users::UserDBResponse;
use crate::types::{GroupId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User role. `master` is the privileged role: it may force-transfer an
/// active claim away from another holder.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::Type, PartialEq, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Operator,
    Master,
}

/// User as exposed through the API (never carries the password hash)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(value_type = Uuid)]
    pub id: UserId,
    pub username: String,
    pub display_name: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserDBResponse> for UserResponse {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            username: db.username,
            display_name: db.display_name,
            role: db.role,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// The acting `(user, shop)` pair resolved from the session cookie.
///
/// Handlers receive this from the extractor and pass the ids on explicitly;
/// nothing below the request layer reads session state.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrentSession {
    #[schema(value_type = Uuid)]
    pub user_id: UserId,
    pub group_id: GroupId,
    pub username: String,
    pub role: Role,
}
