use axum::{
    Json,
    extract::{Path, Query, State},
};
use sqlx::Acquire;

use crate::{
    AppState,
    api::models::{
        downtimes::{DowntimeClassifyRequest, DowntimeResponse, ListDowntimesQuery},
        pagination::PaginatedResponse,
        users::CurrentSession,
    },
    db::handlers::{Downtimes, downtimes::DowntimeFilter},
    errors::{Error, Result},
    types::DowntimeStartId,
};

/// List downtime intervals of one equipment unit, newest first
#[utoipa::path(
    get,
    path = "/api/v1/equipment/{equipment_id}/downtimes",
    tag = "downtimes",
    summary = "List downtimes",
    params(
        ("equipment_id" = i64, Path, description = "Equipment ID"),
        ListDowntimesQuery
    ),
    responses(
        (status = 200, description = "Downtime intervals", body = PaginatedResponse<DowntimeResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("session_cookie" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_downtimes(
    State(state): State<AppState>,
    _session: CurrentSession,
    Path(equipment_id): Path<i64>,
    Query(query): Query<ListDowntimesQuery>,
) -> Result<Json<PaginatedResponse<DowntimeResponse>>> {
    let (skip, limit) = query.pagination.params();

    // One transaction so the page and its total count are consistent
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let mut repo = Downtimes::new(tx.acquire().await.map_err(|e| Error::Database(e.into()))?);
    let total_count = repo.count_for_equipment(equipment_id).await?;
    let downtimes = repo
        .list(&DowntimeFilter {
            equipment_id,
            skip,
            limit,
        })
        .await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    let data = downtimes.into_iter().map(DowntimeResponse::from).collect();
    Ok(Json(PaginatedResponse::new(data, total_count, skip, limit)))
}

/// Classify one downtime interval with a reason code
#[utoipa::path(
    put,
    path = "/api/v1/equipment/{equipment_id}/downtimes/{start_id}",
    tag = "downtimes",
    summary = "Classify downtime",
    params(
        ("equipment_id" = i64, Path, description = "Equipment ID"),
        ("start_id" = i64, Path, description = "Start marker of the interval (epoch seconds)")
    ),
    request_body = DowntimeClassifyRequest,
    responses(
        (status = 200, description = "Downtime classified", body = DowntimeResponse),
        (status = 400, description = "Unknown reason code"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Downtime interval not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("session_cookie" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn classify_downtime(
    State(state): State<AppState>,
    _session: CurrentSession,
    Path((equipment_id, start_id)): Path<(i64, DowntimeStartId)>,
    Json(request): Json<DowntimeClassifyRequest>,
) -> Result<Json<DowntimeResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Downtimes::new(&mut pool_conn);

    let updated = repo
        .classify(equipment_id, start_id, request.answer_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "downtime".to_string(),
            id: format!("{equipment_id}/{start_id}"),
        })?;

    Ok(Json(DowntimeResponse::from(updated)))
}
