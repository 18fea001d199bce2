//! REST API module for the course-preference portal
//!
//! Each route group lives in its own module with a `create_*_router`
//! constructor taking the shared connection pool; [`build_router`] composes
//! them into the served application.

use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod auth_routes;
pub mod course_routes;
pub mod elective_routes;
pub mod faculty_routes;
pub mod position_routes;
pub mod preference_routes;
pub mod session_routes;

pub use auth_routes::create_auth_router;
pub use course_routes::create_course_router;
pub use elective_routes::create_elective_router;
pub use faculty_routes::create_faculty_router;
pub use position_routes::create_position_router;
pub use preference_routes::create_preference_router;
pub use session_routes::create_session_router;

/// Body for delete/detach confirmations.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Compose every route group plus health, CORS, and request tracing.
pub fn build_router(pool: PgPool) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .merge(create_auth_router(pool.clone()))
        .merge(create_position_router(pool.clone()))
        .merge(create_course_router(pool.clone()))
        .merge(create_faculty_router(pool.clone()))
        .merge(create_session_router(pool.clone()))
        .merge(create_preference_router(pool.clone()))
        .merge(create_elective_router(pool))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
}

async fn health_check() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}
