//! Admin CRUD for scheduling sessions and their course/faculty links.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::SessionService;
use crate::error::{on_conflict, ApiError, ApiResult};
use crate::models::{Session, SessionCourseDetail, SessionDetail, SessionFacultyDetail};

use super::MessageResponse;

const DEFAULT_MAX_COURSES: i32 = 5;
const DEFAULT_MAX_ELECTIVES: i32 = 2;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub name: String,
    pub details: Option<String>,
    pub is_active: Option<bool>,
    pub max_courses: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSessionRequest {
    pub name: String,
    pub details: Option<String>,
    pub is_active: Option<bool>,
    pub max_courses: Option<i32>,
    pub max_electives: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachCoursesRequest {
    pub course_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetachCourseRequest {
    pub course_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachFacultyRequest {
    pub faculty_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetachFacultyRequest {
    pub faculty_id: Uuid,
}

pub fn create_session_router(pool: PgPool) -> Router {
    Router::new()
        .route(
            "/api/admin/sessions",
            get(list_sessions).post(create_session),
        )
        .route(
            "/api/admin/sessions/:id",
            axum::routing::put(update_session).delete(delete_session),
        )
        .route(
            "/api/admin/sessions/:id/courses",
            axum::routing::post(attach_courses).delete(detach_course),
        )
        .route(
            "/api/admin/sessions/:id/faculty",
            axum::routing::post(attach_faculty).delete(detach_faculty),
        )
        .with_state(SessionService::new(pool))
}

async fn list_sessions(State(svc): State<SessionService>) -> ApiResult<Json<Vec<SessionDetail>>> {
    Ok(Json(svc.list_detailed().await?))
}

async fn create_session(
    State(svc): State<SessionService>,
    Json(payload): Json<CreateSessionRequest>,
) -> ApiResult<(StatusCode, Json<Session>)> {
    let session = svc
        .create(
            &payload.name,
            payload.details.as_deref(),
            payload.is_active.unwrap_or(true),
            payload.max_courses.unwrap_or(DEFAULT_MAX_COURSES),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(session)))
}

async fn update_session(
    State(svc): State<SessionService>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<UpdateSessionRequest>,
) -> ApiResult<Json<SessionDetail>> {
    let updated = svc
        .update(
            session_id,
            &payload.name,
            payload.details.as_deref(),
            payload.is_active.unwrap_or(true),
            payload.max_courses.unwrap_or(DEFAULT_MAX_COURSES),
            payload.max_electives.unwrap_or(DEFAULT_MAX_ELECTIVES),
        )
        .await?;

    if updated.is_none() {
        return Err(ApiError::not_found("Session not found"));
    }

    svc.detail(session_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Session not found"))
}

async fn delete_session(
    State(svc): State<SessionService>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let (faculty_refs, course_refs, elective_refs) = svc.reference_counts(session_id).await?;
    if faculty_refs > 0 || course_refs > 0 || elective_refs > 0 {
        return Err(ApiError::bad_request(
            "Cannot delete session that has faculty assignments, course assignments, \
             or elective proposals. Remove all assignments first.",
        ));
    }

    if !svc.delete(session_id).await? {
        return Err(ApiError::not_found("Session not found"));
    }

    Ok(Json(MessageResponse::new("Session deleted successfully")))
}

async fn attach_courses(
    State(svc): State<SessionService>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<AttachCoursesRequest>,
) -> ApiResult<(StatusCode, Json<Vec<SessionCourseDetail>>)> {
    let links = svc
        .attach_courses(session_id, &payload.course_ids)
        .await
        .map_err(|e| on_conflict(e, "Course already added to session"))?;

    Ok((StatusCode::CREATED, Json(links)))
}

async fn detach_course(
    State(svc): State<SessionService>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<DetachCourseRequest>,
) -> ApiResult<Json<MessageResponse>> {
    if !svc.detach_course(session_id, payload.course_id).await? {
        return Err(ApiError::not_found("Course is not part of this session"));
    }
    Ok(Json(MessageResponse::new("Course removed from session")))
}

async fn attach_faculty(
    State(svc): State<SessionService>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<AttachFacultyRequest>,
) -> ApiResult<(StatusCode, Json<Vec<SessionFacultyDetail>>)> {
    let links = svc
        .attach_faculty(session_id, &payload.faculty_ids)
        .await
        .map_err(|e| on_conflict(e, "Faculty already added to session"))?;

    Ok((StatusCode::CREATED, Json(links)))
}

async fn detach_faculty(
    State(svc): State<SessionService>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<DetachFacultyRequest>,
) -> ApiResult<Json<MessageResponse>> {
    if !svc.detach_faculty(session_id, payload.faculty_id).await? {
        return Err(ApiError::not_found("Faculty is not assigned to this session"));
    }
    Ok(Json(MessageResponse::new("Faculty removed from session")))
}
