use axum::{
    Json,
    extract::{Path, Query, State},
};
use sqlx::Acquire;

use crate::{
    AppState,
    api::models::{
        equipment::{EquipmentResponse, ListEquipmentQuery, ToggleClaimResponse},
        pagination::PaginatedResponse,
        users::CurrentSession,
    },
    db::handlers::{Equipment, equipment::EquipmentFilter},
    errors::{Error, Result},
    occupancy::OccupancyEngine,
    types::EquipmentId,
};

/// List equipment of one shop with its current occupancy
#[utoipa::path(
    get,
    path = "/api/v1/equipment",
    tag = "equipment",
    summary = "List equipment",
    params(ListEquipmentQuery),
    responses(
        (status = 200, description = "Equipment with occupancy", body = PaginatedResponse<EquipmentResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("session_cookie" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_equipment(
    State(state): State<AppState>,
    _session: CurrentSession,
    Query(query): Query<ListEquipmentQuery>,
) -> Result<Json<PaginatedResponse<EquipmentResponse>>> {
    let (skip, limit) = query.pagination.params();

    // One transaction so the page and its total count are consistent
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let mut repo = Equipment::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
    let total_count = repo.count_for_group(query.group_id).await?;
    let equipment = repo
        .list(&EquipmentFilter {
            group_id: query.group_id,
            skip,
            limit,
        })
        .await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    let data = equipment.into_iter().map(EquipmentResponse::from).collect();
    Ok(Json(PaginatedResponse::new(data, total_count, skip, limit)))
}

/// Toggle the acting user's claim on an equipment unit.
///
/// Claims idle equipment, releases the caller's own claim, or (for masters)
/// takes the unit over from its current holder.
#[utoipa::path(
    post,
    path = "/api/v1/equipment/{equipment_id}/claim",
    tag = "equipment",
    summary = "Toggle claim",
    params(
        ("equipment_id" = EquipmentId, Path, description = "Equipment ID")
    ),
    responses(
        (status = 200, description = "Claim toggled", body = ToggleClaimResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Equipment occupied by another user"),
        (status = 404, description = "Acting user not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("session_cookie" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn toggle_claim(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(equipment_id): Path<EquipmentId>,
) -> Result<Json<ToggleClaimResponse>> {
    let engine = OccupancyEngine::new(state.db.clone(), state.config.claim_ttl_minutes);
    let outcome = engine.toggle_claim(session.user_id, equipment_id).await?;
    Ok(Json(ToggleClaimResponse::from(outcome)))
}
