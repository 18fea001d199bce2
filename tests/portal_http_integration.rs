//! HTTP-level integration tests for the course-preference portal.
//!
//! These prove the served contract: login, admin CRUD with conflict and
//! referential guards, preference submission rules, and the elective
//! approval lifecycle.
//!
//! Requires a running PostgreSQL database with schema.sql applied.
//! Run with: DATABASE_URL="postgresql:///coursechoice" cargo test --test portal_http_integration -- --ignored --nocapture

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use uuid::Uuid;

use coursechoice::api::build_router;

async fn build_test_app() -> Router {
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("failed to connect to test database");

    build_router(pool)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            builder.body(Body::from(value.to_string())).unwrap()
        }
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.expect("request failed");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("failed to read body")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("non-JSON body")
    };
    (status, value)
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", &Uuid::new_v4().to_string()[..8])
}

/// Create a position/faculty pair and return (position_id, faculty_id, email).
async fn create_member(app: &Router, min_credits: i32) -> (String, String, String) {
    let position_name = unique("Visiting Professor");
    let (status, position) = send(
        app,
        "POST",
        "/api/admin/positions",
        Some(json!({
            "name": position_name,
            "details": "Created by integration tests",
            "minCredits": min_credits,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let position_id = position["positionId"].as_str().unwrap().to_string();

    let email = format!("{}@integration.test", unique("member"));
    let (status, faculty) = send(
        app,
        "POST",
        "/api/admin/faculty",
        Some(json!({
            "name": "Integration Member",
            "email": email,
            "password": "faculty123",
            "positionId": position_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let faculty_id = faculty["facultyId"].as_str().unwrap().to_string();

    (position_id, faculty_id, email)
}

async fn create_course(app: &Router, credits: i32) -> (String, String) {
    let code = unique("CSX");
    let (status, course) = send(
        app,
        "POST",
        "/api/admin/courses",
        Some(json!({
            "courseName": format!("Integration Course {code}"),
            "courseCode": code,
            "details": "Created by integration tests",
            "credits": credits,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    (course["courseId"].as_str().unwrap().to_string(), code)
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    // Health never touches the database, so a lazy pool is enough.
    let pool = sqlx::PgPool::connect_lazy("postgresql://localhost:5432/unreachable").unwrap();
    let app = build_router(pool);

    let (status, body) = send(&app, "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
#[ignore]
async fn login_round_trip() {
    let app = build_test_app().await;
    let (_, _, email) = create_member(&app, 6).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({ "email": email, "password": "faculty123", "role": "faculty" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["role"], "faculty");
    assert_eq!(body["user"]["email"], email);
    assert!(body["user"]["position"]["minCredits"].is_number());
    assert!(body["user"].get("passwordHash").is_none());

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({ "email": email, "password": "wrong", "role": "faculty" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({ "email": email, "password": "faculty123", "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn course_code_conflicts_are_rejected() {
    let app = build_test_app().await;
    let (_, code) = create_course(&app, 3).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/admin/courses",
        Some(json!({
            "courseName": "Duplicate",
            "courseCode": code,
            "credits": 3,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Course code already exists");
}

#[tokio::test]
#[ignore]
async fn referential_guards_block_deletes() {
    let app = build_test_app().await;
    let (position_id, faculty_id, _) = create_member(&app, 6).await;
    let (course_id, _) = create_course(&app, 3).await;

    let (status, session) = send(
        &app,
        "POST",
        "/api/admin/sessions",
        Some(json!({ "name": unique("Guard Session") })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let session_id = session["sessionId"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/admin/sessions/{session_id}/courses"),
        Some(json!({ "courseIds": [course_id] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/admin/sessions/{session_id}/faculty"),
        Some(json!({ "facultyIds": [faculty_id] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Everything now referenced: all four deletes must refuse.
    let (status, _) = send(&app, "DELETE", &format!("/api/admin/courses/{course_id}"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, "DELETE", &format!("/api/admin/faculty/{faculty_id}"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) =
        send(&app, "DELETE", &format!("/api/admin/positions/{position_id}"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) =
        send(&app, "DELETE", &format!("/api/admin/sessions/{session_id}"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Detach and tear down in dependency order.
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/admin/sessions/{session_id}/courses"),
        Some(json!({ "courseId": course_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/admin/sessions/{session_id}/faculty"),
        Some(json!({ "facultyId": faculty_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) =
        send(&app, "DELETE", &format!("/api/admin/sessions/{session_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
#[ignore]
async fn preference_submission_enforces_the_rules() {
    let app = build_test_app().await;
    let (_, faculty_id, _) = create_member(&app, 6).await;

    let (status, session) = send(
        &app,
        "POST",
        "/api/admin/sessions",
        Some(json!({ "name": unique("Pref Session"), "maxCourses": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let session_id = session["sessionId"].as_str().unwrap().to_string();

    let mut course_ids = Vec::new();
    for credits in [3, 4, 3] {
        let (course_id, _) = create_course(&app, credits).await;
        course_ids.push(course_id);
    }

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/admin/sessions/{session_id}/courses"),
        Some(json!({ "courseIds": course_ids })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, links) = send(
        &app,
        "POST",
        &format!("/api/admin/sessions/{session_id}/faculty"),
        Some(json!({ "facultyIds": [faculty_id] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let session_faculty_id = links[0]["sessionFacultyId"].as_str().unwrap().to_string();

    let (_, views) = send(
        &app,
        "GET",
        &format!("/api/faculty/sessions?facultyId={faculty_id}"),
        None,
    )
    .await;
    let view = views
        .as_array()
        .unwrap()
        .iter()
        .find(|v| v["sessionFacultyId"] == links[0]["sessionFacultyId"])
        .expect("assignment visible in faculty view");
    let offerings: Vec<String> = view["session"]["sessionCourses"]
        .as_array()
        .unwrap()
        .iter()
        .map(|sc| sc["sessionCourseId"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(offerings.len(), 3);

    // Over the session cap.
    let over_cap: Vec<Value> = offerings
        .iter()
        .enumerate()
        .map(|(i, id)| json!({ "sessionCourseId": id, "preferenceOrder": i + 1 }))
        .collect();
    let (status, body) = send(
        &app,
        "POST",
        "/api/faculty/preferences",
        Some(json!({ "sessionFacultyId": session_faculty_id, "coursePreferences": over_cap })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Cannot select more than 2 courses for this session"
    );

    // Under the position's credit floor (one 3-credit pick against a 6 minimum).
    let (status, body) = send(
        &app,
        "POST",
        "/api/faculty/preferences",
        Some(json!({
            "sessionFacultyId": session_faculty_id,
            "coursePreferences": [{ "sessionCourseId": offerings[0], "preferenceOrder": 1 }],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("do not meet minimum requirement"));

    // A valid two-course ranking lands.
    let (status, stored) = send(
        &app,
        "POST",
        "/api/faculty/preferences",
        Some(json!({
            "sessionFacultyId": session_faculty_id,
            "coursePreferences": [
                { "sessionCourseId": offerings[0], "preferenceOrder": 2 },
                { "sessionCourseId": offerings[1], "preferenceOrder": 1 },
            ],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let stored = stored.as_array().unwrap();
    assert_eq!(stored.len(), 2);
    // Returned in preference order, not submission order.
    assert_eq!(stored[0]["preferenceOrder"], 1);
    assert_eq!(stored[0]["sessionCourseId"].as_str().unwrap(), offerings[1]);

    // Resubmission replaces the previous ranking entirely.
    let (status, stored) = send(
        &app,
        "POST",
        "/api/faculty/preferences",
        Some(json!({
            "sessionFacultyId": session_faculty_id,
            "coursePreferences": [
                { "sessionCourseId": offerings[1], "preferenceOrder": 1 },
                { "sessionCourseId": offerings[2], "preferenceOrder": 2 },
            ],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let stored = stored.as_array().unwrap();
    assert_eq!(stored.len(), 2);

    // The admin roster shows the stored ranking.
    let (status, roster) = send(
        &app,
        "GET",
        &format!("/api/admin/preferences?sessionId={session_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let row = &roster.as_array().unwrap()[0];
    assert_eq!(row["facultyId"].as_str().unwrap(), faculty_id);
    assert_eq!(row["courseChoices"].as_array().unwrap().len(), 2);
}

#[tokio::test]
#[ignore]
async fn elective_lifecycle_promotes_into_catalog() {
    let app = build_test_app().await;
    let (_, faculty_id, _) = create_member(&app, 6).await;
    let code = unique("ELX");

    let (status, elective) = send(
        &app,
        "POST",
        "/api/faculty/electives",
        Some(json!({
            "facultyId": faculty_id,
            "courseName": "Advanced Topics",
            "courseCode": code,
            "description": "Proposed by integration tests",
            "credits": 3,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(elective["status"], "PENDING");
    let elective_id = elective["electiveId"].as_str().unwrap().to_string();

    // Same proposer, same code: refused.
    let (status, body) = send(
        &app,
        "POST",
        "/api/faculty/electives",
        Some(json!({
            "facultyId": faculty_id,
            "courseName": "Advanced Topics Again",
            "courseCode": code,
            "description": "Duplicate",
            "credits": 3,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "You have already proposed an elective with this course code"
    );

    // Approve: the proposal becomes a catalog course.
    let (status, decided) = send(
        &app,
        "PUT",
        &format!("/api/admin/electives/{elective_id}"),
        Some(json!({ "status": "APPROVED", "adminNotes": "Looks solid" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decided["status"], "APPROVED");
    assert_eq!(decided["adminNotes"], "Looks solid");
    assert_eq!(decided["course"]["courseCode"].as_str().unwrap(), code);
    assert_eq!(decided["course"]["isElective"], true);

    // Approved proposals cannot be edited or deleted.
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/faculty/electives/{elective_id}"),
        Some(json!({
            "courseName": "Renamed",
            "courseCode": code,
            "description": "x",
            "credits": 3,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/faculty/electives/{elective_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Cannot delete approved elective");

    // The code is now taken in the catalog, so even another member's fresh
    // proposal is refused.
    let (_, other_faculty_id, _) = create_member(&app, 6).await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/faculty/electives",
        Some(json!({
            "facultyId": other_faculty_id,
            "courseName": "Recycled Code",
            "courseCode": code,
            "description": "Should collide with the catalog",
            "credits": 3,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "A course with this code already exists in the system"
    );

    // Pending proposals appear ahead of decided ones in review order.
    let (status, listed) = send(&app, "GET", "/api/admin/electives", None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = listed.as_array().unwrap();
    let first_decided = listed
        .iter()
        .position(|e| e["status"] != "PENDING")
        .unwrap_or(listed.len());
    assert!(listed[first_decided..]
        .iter()
        .all(|e| e["status"] != "PENDING"));
}

#[tokio::test]
#[ignore]
async fn session_elective_cap_is_enforced() {
    let app = build_test_app().await;
    let (_, faculty_id, _) = create_member(&app, 6).await;

    let (status, session) = send(
        &app,
        "POST",
        "/api/admin/sessions",
        Some(json!({ "name": unique("Elective Cap Session") })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let session_id = session["sessionId"].as_str().unwrap().to_string();
    assert_eq!(session["maxElectives"], 2);

    for _ in 0..2 {
        let (status, _) = send(
            &app,
            "POST",
            "/api/faculty/electives",
            Some(json!({
                "facultyId": faculty_id,
                "courseName": "Session-bound Elective",
                "courseCode": unique("ELS"),
                "description": "Counts toward the session cap",
                "credits": 3,
                "sessionId": session_id,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(
        &app,
        "POST",
        "/api/faculty/electives",
        Some(json!({
            "facultyId": faculty_id,
            "courseName": "One Too Many",
            "courseCode": unique("ELS"),
            "description": "Over the cap",
            "credits": 3,
            "sessionId": session_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Cannot propose more than 2 electives for this session"
    );
}
