//! Academic position management.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::Position;

const POSITION_COLUMNS: &str =
    "position_id, name, details, min_credits, created_at, updated_at";

#[derive(Clone)]
pub struct PositionService {
    pool: PgPool,
}

impl PositionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All positions, ordered by name.
    pub async fn list(&self) -> Result<Vec<Position>, sqlx::Error> {
        sqlx::query_as::<_, Position>(&format!(
            "SELECT {POSITION_COLUMNS} FROM coursechoice.positions ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await
    }

    pub async fn create(
        &self,
        name: &str,
        details: &str,
        min_credits: i32,
    ) -> Result<Position, sqlx::Error> {
        let position = sqlx::query_as::<_, Position>(&format!(
            r#"
            INSERT INTO coursechoice.positions (position_id, name, details, min_credits)
            VALUES ($1, $2, $3, $4)
            RETURNING {POSITION_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(details)
        .bind(min_credits)
        .fetch_one(&self.pool)
        .await?;

        info!("Created position: {} ({})", position.name, position.position_id);
        Ok(position)
    }

    /// Full update. Returns None when the position does not exist.
    pub async fn update(
        &self,
        position_id: Uuid,
        name: &str,
        details: &str,
        min_credits: i32,
    ) -> Result<Option<Position>, sqlx::Error> {
        sqlx::query_as::<_, Position>(&format!(
            r#"
            UPDATE coursechoice.positions
            SET name = $2, details = $3, min_credits = $4, updated_at = now()
            WHERE position_id = $1
            RETURNING {POSITION_COLUMNS}
            "#
        ))
        .bind(position_id)
        .bind(name)
        .bind(details)
        .bind(min_credits)
        .fetch_optional(&self.pool)
        .await
    }

    /// Number of faculty currently holding the position.
    pub async fn faculty_count(&self, position_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM coursechoice.faculty WHERE position_id = $1",
        )
        .bind(position_id)
        .fetch_one(&self.pool)
        .await
    }

    /// Returns false when the position does not exist.
    pub async fn delete(&self, position_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM coursechoice.positions WHERE position_id = $1")
            .bind(position_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            info!("Deleted position: {}", position_id);
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
