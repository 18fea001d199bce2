//! Course-preference endpoints: the faculty portal view, ranked submission,
//! and the admin roster overview.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::database::PreferenceService;
use crate::error::{on_conflict, ApiError, ApiResult};
use crate::models::{AssignmentOverview, CourseChoiceDetail, FacultySessionView};
use crate::ranking;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacultySessionsQuery {
    pub faculty_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewQuery {
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceEntry {
    pub session_course_id: Uuid,
    pub preference_order: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPreferencesRequest {
    pub session_faculty_id: Option<Uuid>,
    pub course_preferences: Option<Vec<PreferenceEntry>>,
}

pub fn create_preference_router(pool: PgPool) -> Router {
    Router::new()
        .route("/api/faculty/sessions", get(faculty_sessions))
        .route("/api/faculty/preferences", post(submit_preferences))
        .route("/api/admin/preferences", get(admin_overview))
        .with_state(PreferenceService::new(pool))
}

async fn faculty_sessions(
    State(svc): State<PreferenceService>,
    Query(query): Query<FacultySessionsQuery>,
) -> ApiResult<Json<Vec<FacultySessionView>>> {
    let faculty_id = query
        .faculty_id
        .ok_or_else(|| ApiError::bad_request("Faculty ID is required"))?;

    Ok(Json(svc.faculty_session_views(faculty_id).await?))
}

async fn submit_preferences(
    State(svc): State<PreferenceService>,
    Json(request): Json<SubmitPreferencesRequest>,
) -> ApiResult<(StatusCode, Json<Vec<CourseChoiceDetail>>)> {
    let (Some(session_faculty_id), Some(preferences)) =
        (request.session_faculty_id, request.course_preferences)
    else {
        return Err(ApiError::bad_request("Invalid request data"));
    };

    let orders: Vec<i32> = preferences.iter().map(|p| p.preference_order).collect();
    if !ranking::is_dense_ranking(&orders) {
        return Err(ApiError::bad_request(
            "Preference orders must be a contiguous ranking starting at 1",
        ));
    }

    let context = svc
        .assignment_context(session_faculty_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Session faculty not found"))?;

    if preferences.len() as i64 > context.max_courses as i64 {
        return Err(ApiError::bad_request(format!(
            "Cannot select more than {} courses for this session",
            context.max_courses
        )));
    }

    let course_ids: Vec<Uuid> = preferences.iter().map(|p| p.session_course_id).collect();
    let total_credits = svc.credit_total(&course_ids).await?;
    if total_credits < context.min_credits as i64 {
        return Err(ApiError::bad_request(format!(
            "Selected courses ({} credits) do not meet minimum requirement of {} credits \
             for {} position",
            total_credits, context.min_credits, context.position_name
        )));
    }

    let entries: Vec<(Uuid, i32)> = preferences
        .iter()
        .map(|p| (p.session_course_id, p.preference_order))
        .collect();

    let stored = svc
        .replace_choices(session_faculty_id, &entries)
        .await
        .map_err(|e| on_conflict(e, "Duplicate course selection"))?;

    info!(
        "Faculty {} saved {} preference(s) for session {}",
        context.faculty_id,
        stored.len(),
        context.session_id
    );
    Ok((StatusCode::CREATED, Json(stored)))
}

async fn admin_overview(
    State(svc): State<PreferenceService>,
    Query(query): Query<OverviewQuery>,
) -> ApiResult<Json<Vec<AssignmentOverview>>> {
    Ok(Json(svc.assignments_overview(query.session_id).await?))
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
        create_preference_router(pool)
    }

    fn post_preferences(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/faculty/preferences")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn faculty_sessions_requires_faculty_id() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/api/faculty/sessions")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Faculty ID is required");
    }

    #[tokio::test]
    async fn submit_rejects_missing_fields() {
        let response = test_router()
            .oneshot(post_preferences(r#"{"coursePreferences":[]}"#.to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn submit_rejects_gapped_ranking() {
        let body = format!(
            r#"{{"sessionFacultyId":"{}","coursePreferences":[
                {{"sessionCourseId":"{}","preferenceOrder":1}},
                {{"sessionCourseId":"{}","preferenceOrder":3}}
            ]}}"#,
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4()
        );
        let response = test_router().oneshot(post_preferences(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            json["error"],
            "Preference orders must be a contiguous ranking starting at 1"
        );
    }

    #[tokio::test]
    async fn submit_rejects_duplicate_orders() {
        let body = format!(
            r#"{{"sessionFacultyId":"{}","coursePreferences":[
                {{"sessionCourseId":"{}","preferenceOrder":1}},
                {{"sessionCourseId":"{}","preferenceOrder":1}}
            ]}}"#,
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4()
        );
        let response = test_router().oneshot(post_preferences(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
