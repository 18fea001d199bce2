//! Administrator account lookups.
//!
//! Admin accounts are created by the seed tool, not over REST, so the only
//! operation the portal needs is the login lookup.

use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::models::Admin;

/// Admin row including the stored credential hash. Never serialized; the
/// login handler converts to [`Admin`] before responding.
#[derive(Debug, Clone, FromRow)]
pub struct AdminAccount {
    pub admin_id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl AdminAccount {
    pub fn into_public(self) -> Admin {
        Admin {
            admin_id: self.admin_id,
            name: self.name,
            email: self.email,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct AdminService {
    pool: PgPool,
}

impl AdminService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Look up an admin account by email for credential verification.
    pub async fn find_account_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AdminAccount>, sqlx::Error> {
        sqlx::query_as::<_, AdminAccount>(
            r#"
            SELECT admin_id, name, email, password_hash, created_at, updated_at
            FROM coursechoice.admins
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }
}
