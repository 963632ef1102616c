//! OpenAPI documentation configuration.
//!
//! The generated spec is served through a Scalar UI at `/docs`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

use crate::api;

/// Session-cookie security scheme for authenticated endpoints
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "session_cookie".to_string(),
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("floorctl_session"))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    paths(
        api::handlers::auth::get_login_info,
        api::handlers::auth::login,
        api::handlers::auth::logout,
        api::handlers::groups::list_groups,
        api::handlers::groups::list_group_users,
        api::handlers::equipment::list_equipment,
        api::handlers::equipment::toggle_claim,
        api::handlers::downtimes::list_downtimes,
        api::handlers::downtimes::classify_downtime,
        api::handlers::answers::list_answers,
    ),
    components(schemas(
        api::models::auth::LoginRequest,
        api::models::auth::LoginInfo,
        api::models::auth::AuthResponse,
        api::models::auth::AuthSuccessResponse,
        api::models::users::Role,
        api::models::users::UserResponse,
        api::models::groups::GroupResponse,
        api::models::equipment::EquipmentResponse,
        api::models::equipment::ToggleClaimResponse,
        api::models::downtimes::DowntimeResponse,
        api::models::downtimes::DowntimeClassifyRequest,
        api::models::answers::AnswerResponse,
    )),
    tags(
        (name = "authentication", description = "Login and session management"),
        (name = "groups", description = "Shops and their operators"),
        (name = "equipment", description = "Equipment occupancy"),
        (name = "downtimes", description = "Downtime intervals and classification"),
        (name = "answers", description = "Downtime reason codes"),
    )
)]
pub struct ApiDoc;
