//! Course catalog management.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::Course;

const COURSE_COLUMNS: &str =
    "course_id, course_name, course_code, details, credits, is_elective, created_at, updated_at";

#[derive(Clone)]
pub struct CourseService {
    pool: PgPool,
}

impl CourseService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The full catalog, ordered by course name.
    pub async fn list(&self) -> Result<Vec<Course>, sqlx::Error> {
        sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM coursechoice.courses ORDER BY course_name"
        ))
        .fetch_all(&self.pool)
        .await
    }

    pub async fn find_by_code(&self, course_code: &str) -> Result<Option<Course>, sqlx::Error> {
        sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM coursechoice.courses WHERE course_code = $1"
        ))
        .bind(course_code)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn create(
        &self,
        course_name: &str,
        course_code: &str,
        details: Option<&str>,
        credits: i32,
        is_elective: bool,
    ) -> Result<Course, sqlx::Error> {
        let course = sqlx::query_as::<_, Course>(&format!(
            r#"
            INSERT INTO coursechoice.courses
                (course_id, course_name, course_code, details, credits, is_elective)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COURSE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(course_name)
        .bind(course_code)
        .bind(details)
        .bind(credits)
        .bind(is_elective)
        .fetch_one(&self.pool)
        .await?;

        info!("Created course: {} ({})", course.course_code, course.course_id);
        Ok(course)
    }

    /// Full update. Returns None when the course does not exist.
    pub async fn update(
        &self,
        course_id: Uuid,
        course_name: &str,
        course_code: &str,
        details: Option<&str>,
        credits: i32,
        is_elective: bool,
    ) -> Result<Option<Course>, sqlx::Error> {
        sqlx::query_as::<_, Course>(&format!(
            r#"
            UPDATE coursechoice.courses
            SET course_name = $2, course_code = $3, details = $4,
                credits = $5, is_elective = $6, updated_at = now()
            WHERE course_id = $1
            RETURNING {COURSE_COLUMNS}
            "#
        ))
        .bind(course_id)
        .bind(course_name)
        .bind(course_code)
        .bind(details)
        .bind(credits)
        .bind(is_elective)
        .fetch_optional(&self.pool)
        .await
    }

    /// Number of sessions the course is offered in.
    pub async fn session_reference_count(&self, course_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM coursechoice.session_courses WHERE course_id = $1",
        )
        .bind(course_id)
        .fetch_one(&self.pool)
        .await
    }

    /// Returns false when the course does not exist.
    pub async fn delete(&self, course_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM coursechoice.courses WHERE course_id = $1")
            .bind(course_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            info!("Deleted course: {}", course_id);
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
