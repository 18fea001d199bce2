//! Login endpoint shared by the admin and faculty portals.

use axum::extract::State;
use axum::response::Json;
use axum::routing::post;
use axum::Router;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;

use crate::auth::verify_password;
use crate::database::{AdminService, FacultyService};
use crate::error::{ApiError, ApiResult};
use crate::models::{Admin, FacultyDetail, Role};

#[derive(Clone)]
struct AuthState {
    admins: AdminService,
    faculty: FacultyService,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

/// The authenticated account, shaped per role, with the role echoed back.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum LoginUser {
    Admin {
        #[serde(flatten)]
        account: Admin,
        role: Role,
    },
    Faculty {
        #[serde(flatten)]
        account: FacultyDetail,
        role: Role,
    },
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: LoginUser,
}

pub fn create_auth_router(pool: PgPool) -> Router {
    let state = AuthState {
        admins: AdminService::new(pool.clone()),
        faculty: FacultyService::new(pool),
    };

    Router::new()
        .route("/api/auth/login", post(login))
        .with_state(state)
}

async fn login(
    State(state): State<AuthState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let (Some(email), Some(password), Some(role)) =
        (request.email, request.password, request.role)
    else {
        return Err(ApiError::bad_request(
            "Email, password, and role are required",
        ));
    };

    let invalid = || ApiError::Unauthorized("Invalid credentials".to_string());

    let user = match role {
        Role::Admin => {
            let account = state
                .admins
                .find_account_by_email(&email)
                .await?
                .ok_or_else(invalid)?;
            if !verify_password(&password, &account.password_hash) {
                return Err(invalid());
            }
            LoginUser::Admin {
                account: account.into_public(),
                role,
            }
        }
        Role::Faculty => {
            let account = state
                .faculty
                .find_account_by_email(&email)
                .await?
                .ok_or_else(invalid)?;
            if !verify_password(&password, &account.password_hash) {
                return Err(invalid());
            }
            let position = state.faculty.position_of(account.position_id).await?;
            LoginUser::Faculty {
                account: FacultyDetail {
                    faculty: account.into_public(),
                    position,
                },
                role,
            }
        }
    };

    info!("Login successful for {email} ({role:?})");
    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        user,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    fn test_router() -> Router {
        let pool = PgPool::connect_lazy("postgresql://localhost:5432/unreachable")
            .expect("lazy pool");
        create_auth_router(pool)
    }

    fn login_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn login_rejects_missing_fields() {
        let response = test_router()
            .oneshot(login_request(
                r#"{"email":"dean@university.edu","role":"admin"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn login_rejects_empty_body_fields() {
        let response = test_router()
            .oneshot(login_request(r#"{}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
