//! Faculty account management.

use std::collections::HashMap;

use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::models::{Faculty, FacultyDetail, Position};

const FACULTY_COLUMNS: &str =
    "faculty_id, name, email, position_id, created_at, updated_at";

/// Faculty row including the stored credential hash. Never serialized; the
/// login handler converts to the public shape before responding.
#[derive(Debug, Clone, FromRow)]
pub struct FacultyAccount {
    pub faculty_id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub position_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl FacultyAccount {
    pub fn into_public(self) -> Faculty {
        Faculty {
            faculty_id: self.faculty_id,
            name: self.name,
            email: self.email,
            position_id: self.position_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct FacultyService {
    pool: PgPool,
}

impl FacultyService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Look up a faculty account by email for credential verification.
    pub async fn find_account_by_email(
        &self,
        email: &str,
    ) -> Result<Option<FacultyAccount>, sqlx::Error> {
        sqlx::query_as::<_, FacultyAccount>(
            r#"
            SELECT faculty_id, name, email, password_hash, position_id, created_at, updated_at
            FROM coursechoice.faculty
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    /// All faculty ordered by name, positions embedded.
    pub async fn list_detailed(&self) -> Result<Vec<FacultyDetail>, sqlx::Error> {
        let faculty = sqlx::query_as::<_, Faculty>(&format!(
            "SELECT {FACULTY_COLUMNS} FROM coursechoice.faculty ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        let positions = self.positions_by_id().await?;
        Ok(join_positions(faculty, &positions))
    }

    pub async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        position_id: Uuid,
    ) -> Result<FacultyDetail, sqlx::Error> {
        let faculty = sqlx::query_as::<_, Faculty>(&format!(
            r#"
            INSERT INTO coursechoice.faculty
                (faculty_id, name, email, password_hash, position_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {FACULTY_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(position_id)
        .fetch_one(&self.pool)
        .await?;

        info!("Created faculty account: {} ({})", faculty.email, faculty.faculty_id);
        let position = self.position_of(faculty.position_id).await?;
        Ok(FacultyDetail { faculty, position })
    }

    /// Update the account; the credential changes only when a new hash is
    /// supplied. Returns None when the account does not exist.
    pub async fn update(
        &self,
        faculty_id: Uuid,
        name: &str,
        email: &str,
        password_hash: Option<&str>,
        position_id: Uuid,
    ) -> Result<Option<FacultyDetail>, sqlx::Error> {
        let faculty = sqlx::query_as::<_, Faculty>(&format!(
            r#"
            UPDATE coursechoice.faculty
            SET name = $2, email = $3, position_id = $4,
                password_hash = COALESCE($5, password_hash),
                updated_at = now()
            WHERE faculty_id = $1
            RETURNING {FACULTY_COLUMNS}
            "#
        ))
        .bind(faculty_id)
        .bind(name)
        .bind(email)
        .bind(position_id)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await?;

        let Some(faculty) = faculty else {
            return Ok(None);
        };
        let position = self.position_of(faculty.position_id).await?;
        Ok(Some(FacultyDetail { faculty, position }))
    }

    /// Number of sessions the member is assigned to.
    pub async fn assignment_count(&self, faculty_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM coursechoice.session_faculty WHERE faculty_id = $1",
        )
        .bind(faculty_id)
        .fetch_one(&self.pool)
        .await
    }

    /// Returns false when the account does not exist.
    pub async fn delete(&self, faculty_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM coursechoice.faculty WHERE faculty_id = $1")
            .bind(faculty_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            info!("Deleted faculty account: {}", faculty_id);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub(crate) async fn position_of(&self, position_id: Uuid) -> Result<Position, sqlx::Error> {
        sqlx::query_as::<_, Position>(
            r#"
            SELECT position_id, name, details, min_credits, created_at, updated_at
            FROM coursechoice.positions
            WHERE position_id = $1
            "#,
        )
        .bind(position_id)
        .fetch_one(&self.pool)
        .await
    }

    pub(crate) async fn positions_by_id(&self) -> Result<HashMap<Uuid, Position>, sqlx::Error> {
        let positions = sqlx::query_as::<_, Position>(
            r#"
            SELECT position_id, name, details, min_credits, created_at, updated_at
            FROM coursechoice.positions
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(positions
            .into_iter()
            .map(|p| (p.position_id, p))
            .collect())
    }
}

pub(crate) fn join_positions(
    faculty: Vec<Faculty>,
    positions: &HashMap<Uuid, Position>,
) -> Vec<FacultyDetail> {
    faculty
        .into_iter()
        .filter_map(|f| {
            positions.get(&f.position_id).map(|p| FacultyDetail {
                faculty: f,
                position: p.clone(),
            })
        })
        .collect()
}
