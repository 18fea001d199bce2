//! Admin CRUD for academic positions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::PositionService;
use crate::error::{on_conflict, ApiError, ApiResult};
use crate::models::Position;

use super::MessageResponse;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionPayload {
    pub name: String,
    pub details: String,
    pub min_credits: i32,
}

pub fn create_position_router(pool: PgPool) -> Router {
    Router::new()
        .route(
            "/api/admin/positions",
            get(list_positions).post(create_position),
        )
        .route(
            "/api/admin/positions/:id",
            axum::routing::put(update_position).delete(delete_position),
        )
        .with_state(PositionService::new(pool))
}

async fn list_positions(State(svc): State<PositionService>) -> ApiResult<Json<Vec<Position>>> {
    Ok(Json(svc.list().await?))
}

async fn create_position(
    State(svc): State<PositionService>,
    Json(payload): Json<PositionPayload>,
) -> ApiResult<(StatusCode, Json<Position>)> {
    let position = svc
        .create(&payload.name, &payload.details, payload.min_credits)
        .await
        .map_err(|e| on_conflict(e, "Position name already exists"))?;

    Ok((StatusCode::CREATED, Json(position)))
}

async fn update_position(
    State(svc): State<PositionService>,
    Path(position_id): Path<Uuid>,
    Json(payload): Json<PositionPayload>,
) -> ApiResult<Json<Position>> {
    svc.update(position_id, &payload.name, &payload.details, payload.min_credits)
        .await
        .map_err(|e| on_conflict(e, "Position name already exists"))?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Position not found"))
}

async fn delete_position(
    State(svc): State<PositionService>,
    Path(position_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    if svc.faculty_count(position_id).await? > 0 {
        return Err(ApiError::bad_request(
            "Cannot delete position that is assigned to faculty members. Reassign faculty first.",
        ));
    }

    if !svc.delete(position_id).await? {
        return Err(ApiError::not_found("Position not found"));
    }

    Ok(Json(MessageResponse::new("Position deleted successfully")))
}
