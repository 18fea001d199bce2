//! Admin CRUD for faculty accounts.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::hash_password;
use crate::database::FacultyService;
use crate::error::{on_conflict, ApiError, ApiResult};
use crate::models::FacultyDetail;

use super::MessageResponse;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFacultyRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub position_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFacultyRequest {
    pub name: String,
    pub email: String,
    /// Blank or absent leaves the current credential in place.
    pub password: Option<String>,
    pub position_id: Uuid,
}

pub fn create_faculty_router(pool: PgPool) -> Router {
    Router::new()
        .route("/api/admin/faculty", get(list_faculty).post(create_faculty))
        .route(
            "/api/admin/faculty/:id",
            axum::routing::put(update_faculty).delete(delete_faculty),
        )
        .with_state(FacultyService::new(pool))
}

async fn list_faculty(State(svc): State<FacultyService>) -> ApiResult<Json<Vec<FacultyDetail>>> {
    Ok(Json(svc.list_detailed().await?))
}

async fn create_faculty(
    State(svc): State<FacultyService>,
    Json(payload): Json<CreateFacultyRequest>,
) -> ApiResult<(StatusCode, Json<FacultyDetail>)> {
    let password_hash = hash_password(&payload.password)
        .map_err(|e| ApiError::Internal(anyhow::Error::new(e)))?;

    let faculty = svc
        .create(&payload.name, &payload.email, &password_hash, payload.position_id)
        .await
        .map_err(|e| on_conflict(e, "Email already exists"))?;

    Ok((StatusCode::CREATED, Json(faculty)))
}

async fn update_faculty(
    State(svc): State<FacultyService>,
    Path(faculty_id): Path<Uuid>,
    Json(payload): Json<UpdateFacultyRequest>,
) -> ApiResult<Json<FacultyDetail>> {
    let password_hash = match payload.password.as_deref() {
        Some(password) if !password.trim().is_empty() => Some(
            hash_password(password).map_err(|e| ApiError::Internal(anyhow::Error::new(e)))?,
        ),
        _ => None,
    };

    svc.update(
        faculty_id,
        &payload.name,
        &payload.email,
        password_hash.as_deref(),
        payload.position_id,
    )
    .await
    .map_err(|e| on_conflict(e, "Email already exists"))?
    .map(Json)
    .ok_or_else(|| ApiError::not_found("Faculty not found"))
}

async fn delete_faculty(
    State(svc): State<FacultyService>,
    Path(faculty_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    if svc.assignment_count(faculty_id).await? > 0 {
        return Err(ApiError::bad_request(
            "Cannot delete faculty that is assigned to sessions. Remove from sessions first.",
        ));
    }

    if !svc.delete(faculty_id).await? {
        return Err(ApiError::not_found("Faculty not found"));
    }

    Ok(Json(MessageResponse::new("Faculty deleted successfully")))
}
