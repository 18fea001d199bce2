//! Admin CRUD for the course catalog.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::CourseService;
use crate::error::{on_conflict, ApiError, ApiResult};
use crate::models::Course;

use super::MessageResponse;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePayload {
    pub course_name: String,
    pub course_code: String,
    pub details: Option<String>,
    pub credits: i32,
    #[serde(default)]
    pub is_elective: bool,
}

pub fn create_course_router(pool: PgPool) -> Router {
    Router::new()
        .route("/api/admin/courses", get(list_courses).post(create_course))
        .route(
            "/api/admin/courses/:id",
            axum::routing::put(update_course).delete(delete_course),
        )
        .with_state(CourseService::new(pool))
}

async fn list_courses(State(svc): State<CourseService>) -> ApiResult<Json<Vec<Course>>> {
    Ok(Json(svc.list().await?))
}

async fn create_course(
    State(svc): State<CourseService>,
    Json(payload): Json<CoursePayload>,
) -> ApiResult<(StatusCode, Json<Course>)> {
    let course = svc
        .create(
            &payload.course_name,
            &payload.course_code,
            payload.details.as_deref(),
            payload.credits,
            payload.is_elective,
        )
        .await
        .map_err(|e| on_conflict(e, "Course code already exists"))?;

    Ok((StatusCode::CREATED, Json(course)))
}

async fn update_course(
    State(svc): State<CourseService>,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<CoursePayload>,
) -> ApiResult<Json<Course>> {
    svc.update(
        course_id,
        &payload.course_name,
        &payload.course_code,
        payload.details.as_deref(),
        payload.credits,
        payload.is_elective,
    )
    .await
    .map_err(|e| on_conflict(e, "Course code already exists"))?
    .map(Json)
    .ok_or_else(|| ApiError::not_found("Course not found"))
}

async fn delete_course(
    State(svc): State<CourseService>,
    Path(course_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    if svc.session_reference_count(course_id).await? > 0 {
        return Err(ApiError::bad_request(
            "Cannot delete course that is assigned to sessions. Remove from sessions first.",
        ));
    }

    if !svc.delete(course_id).await? {
        return Err(ApiError::not_found("Course not found"));
    }

    Ok(Json(MessageResponse::new("Course deleted successfully")))
}
