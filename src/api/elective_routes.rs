//! Elective proposal endpoints for both portals: faculty propose and manage
//! their own proposals, admins review and decide them.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::database::{CourseService, ElectiveService, SessionService};
use crate::error::{on_conflict, ApiError, ApiResult};
use crate::models::{ElectiveDetail, ElectiveStatus};

use super::MessageResponse;

#[derive(Clone)]
struct ElectiveState {
    electives: ElectiveService,
    courses: CourseService,
    sessions: SessionService,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacultyElectivesQuery {
    pub faculty_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateElectiveRequest {
    pub faculty_id: Option<Uuid>,
    pub course_name: Option<String>,
    pub course_code: Option<String>,
    pub description: Option<String>,
    pub credits: Option<i32>,
    /// Binding a proposal to a session subjects it to the session's
    /// elective cap.
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateElectiveRequest {
    pub course_name: String,
    pub course_code: String,
    pub description: String,
    pub credits: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecideElectiveRequest {
    pub status: Option<String>,
    pub admin_notes: Option<String>,
}

pub fn create_elective_router(pool: PgPool) -> Router {
    let state = ElectiveState {
        electives: ElectiveService::new(pool.clone()),
        courses: CourseService::new(pool.clone()),
        sessions: SessionService::new(pool),
    };

    Router::new()
        .route(
            "/api/faculty/electives",
            get(list_faculty_electives).post(create_elective),
        )
        .route(
            "/api/faculty/electives/:id",
            axum::routing::put(update_elective).delete(delete_elective),
        )
        .route("/api/admin/electives", get(list_for_review))
        .route("/api/admin/electives/:id", axum::routing::put(decide_elective))
        .with_state(state)
}

async fn list_faculty_electives(
    State(state): State<ElectiveState>,
    Query(query): Query<FacultyElectivesQuery>,
) -> ApiResult<Json<Vec<ElectiveDetail>>> {
    let faculty_id = query
        .faculty_id
        .ok_or_else(|| ApiError::bad_request("Faculty ID is required"))?;

    Ok(Json(state.electives.list_by_faculty(faculty_id).await?))
}

async fn create_elective(
    State(state): State<ElectiveState>,
    Json(request): Json<CreateElectiveRequest>,
) -> ApiResult<(StatusCode, Json<ElectiveDetail>)> {
    let (Some(faculty_id), Some(course_name), Some(course_code), Some(description), Some(credits)) = (
        request.faculty_id,
        request.course_name,
        request.course_code,
        request.description,
        request.credits,
    ) else {
        return Err(ApiError::bad_request("All fields are required"));
    };

    if state
        .electives
        .has_code_conflict(faculty_id, &course_code, None)
        .await?
    {
        return Err(ApiError::bad_request(
            "You have already proposed an elective with this course code",
        ));
    }

    if state.courses.find_by_code(&course_code).await?.is_some() {
        return Err(ApiError::bad_request(
            "A course with this code already exists in the system",
        ));
    }

    if let Some(session_id) = request.session_id {
        let session = state
            .sessions
            .find(session_id)
            .await?
            .ok_or_else(|| ApiError::bad_request("Session not found"))?;
        let proposed = state
            .electives
            .session_proposal_count(faculty_id, session_id)
            .await?;
        if proposed >= session.max_electives as i64 {
            return Err(ApiError::bad_request(format!(
                "Cannot propose more than {} electives for this session",
                session.max_electives
            )));
        }
    }

    let elective = state
        .electives
        .create(
            faculty_id,
            request.session_id,
            &course_name,
            &course_code,
            &description,
            credits,
        )
        .await
        .map_err(|e| {
            on_conflict(e, "You have already proposed an elective with this course code")
        })?;

    let detail = state
        .electives
        .detail(elective.elective_id)
        .await?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("created elective disappeared")))?;

    Ok((StatusCode::CREATED, Json(detail)))
}

async fn update_elective(
    State(state): State<ElectiveState>,
    Path(elective_id): Path<Uuid>,
    Json(request): Json<UpdateElectiveRequest>,
) -> ApiResult<Json<ElectiveDetail>> {
    let existing = state
        .electives
        .find(elective_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Elective not found"))?;

    if existing.status != ElectiveStatus::Pending {
        return Err(ApiError::bad_request(
            "Cannot edit elective that has been reviewed",
        ));
    }

    if request.course_code != existing.course_code {
        if state
            .courses
            .find_by_code(&request.course_code)
            .await?
            .is_some()
        {
            return Err(ApiError::bad_request(
                "A course with this code already exists",
            ));
        }
        if state
            .electives
            .has_code_conflict(existing.faculty_id, &request.course_code, Some(elective_id))
            .await?
        {
            return Err(ApiError::bad_request(
                "You have already proposed an elective with this course code",
            ));
        }
    }

    let updated = state
        .electives
        .update_proposal(
            elective_id,
            &request.course_name,
            &request.course_code,
            &request.description,
            request.credits,
        )
        .await
        .map_err(|e| {
            on_conflict(e, "You have already proposed an elective with this course code")
        })?;

    if updated.is_none() {
        return Err(ApiError::not_found("Elective not found"));
    }

    state
        .electives
        .detail(elective_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Elective not found"))
}

async fn delete_elective(
    State(state): State<ElectiveState>,
    Path(elective_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let existing = state
        .electives
        .find(elective_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Elective not found"))?;

    if existing.status == ElectiveStatus::Approved {
        return Err(ApiError::bad_request("Cannot delete approved elective"));
    }

    if !state.electives.delete(elective_id).await? {
        return Err(ApiError::not_found("Elective not found"));
    }

    Ok(Json(MessageResponse::new("Elective deleted successfully")))
}

async fn list_for_review(
    State(state): State<ElectiveState>,
    Query(query): Query<ReviewQuery>,
) -> ApiResult<Json<Vec<ElectiveDetail>>> {
    // Unknown filter values are ignored, matching the portal's behavior of
    // showing everything when no valid filter is selected.
    let status = query.status.as_deref().and_then(ElectiveStatus::parse);
    Ok(Json(state.electives.list_for_review(status).await?))
}

async fn decide_elective(
    State(state): State<ElectiveState>,
    Path(elective_id): Path<Uuid>,
    Json(request): Json<DecideElectiveRequest>,
) -> ApiResult<Json<ElectiveDetail>> {
    let status = request
        .status
        .as_deref()
        .and_then(ElectiveStatus::parse)
        .filter(|s| *s != ElectiveStatus::Pending)
        .ok_or_else(|| ApiError::bad_request("Invalid status"))?;

    let existing = state
        .electives
        .find(elective_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Elective not found"))?;

    if status == ElectiveStatus::Approved
        && state
            .courses
            .find_by_code(&existing.course_code)
            .await?
            .is_some()
    {
        return Err(ApiError::bad_request("Course code already exists in system"));
    }

    let detail = state
        .electives
        .decide(elective_id, status, request.admin_notes.as_deref())
        .await
        .map_err(|e| on_conflict(e, "Course code already exists in system"))?
        .ok_or_else(|| ApiError::not_found("Elective not found"))?;

    info!("Elective {} decided as {}", elective_id, status);
    Ok(Json(detail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    fn test_router() -> Router {
        let pool = PgPool::connect_lazy("postgresql://localhost:5432/unreachable")
            .expect("lazy pool");
        create_elective_router(pool)
    }

    #[tokio::test]
    async fn propose_rejects_missing_fields() {
        let body = format!(
            r#"{{"facultyId":"{}","courseName":"Quantum Computing"}}"#,
            Uuid::new_v4()
        );
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/faculty/electives")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], "All fields are required");
    }

    #[tokio::test]
    async fn faculty_listing_requires_faculty_id() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/api/faculty/electives")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn decision_rejects_invalid_status() {
        for status_body in [
            r#"{"status":"PENDING"}"#,
            r#"{"status":"approved"}"#,
            r#"{}"#,
        ] {
            let response = test_router()
                .oneshot(
                    Request::builder()
                        .method("PUT")
                        .uri(format!("/api/admin/electives/{}", Uuid::new_v4()))
                        .header(header::CONTENT_TYPE, "application/json")
                        .body(Body::from(status_body))
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);

            let bytes = to_bytes(response.into_body(), 1024).await.unwrap();
            let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(json["error"], "Invalid status");
        }
    }
}
