//! Elective proposal management: faculty propose courses, admins approve
//! them into the catalog or reject them.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::models::{
    Course, ElectiveCourse, ElectiveDetail, ElectiveStatus, ElectiveWithCourse, Faculty,
    FacultyDetail, Position,
};

const ELECTIVE_COLUMNS: &str = "elective_id, faculty_id, session_id, course_name, course_code, \
     description, credits, status, admin_notes, course_id, created_at, updated_at";

// PENDING sorts ahead of decided proposals in admin listings.
const STATUS_RANK: &str =
    "CASE status WHEN 'PENDING' THEN 0 WHEN 'APPROVED' THEN 1 ELSE 2 END";

/// Joined proposal row with proposer, position, and the promoted catalog
/// course when approval created one.
#[derive(FromRow)]
struct DetailRow {
    elective_id: Uuid,
    faculty_id: Uuid,
    session_id: Option<Uuid>,
    course_name: String,
    course_code: String,
    description: String,
    credits: i32,
    status: ElectiveStatus,
    admin_notes: Option<String>,
    course_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    faculty_name: String,
    faculty_email: String,
    position_id: Uuid,
    faculty_created_at: DateTime<Utc>,
    faculty_updated_at: DateTime<Utc>,
    position_name: String,
    position_details: String,
    min_credits: i32,
    position_created_at: DateTime<Utc>,
    position_updated_at: DateTime<Utc>,
    cat_course_name: Option<String>,
    cat_course_code: Option<String>,
    cat_details: Option<String>,
    cat_credits: Option<i32>,
    cat_is_elective: Option<bool>,
    cat_created_at: Option<DateTime<Utc>>,
    cat_updated_at: Option<DateTime<Utc>>,
}

impl DetailRow {
    fn into_detail(self) -> ElectiveDetail {
        let course = promoted_course(
            self.course_id,
            self.cat_course_name,
            self.cat_course_code,
            self.cat_details,
            self.cat_credits,
            self.cat_is_elective,
            self.cat_created_at,
            self.cat_updated_at,
        );
        ElectiveDetail {
            elective: ElectiveCourse {
                elective_id: self.elective_id,
                faculty_id: self.faculty_id,
                session_id: self.session_id,
                course_name: self.course_name,
                course_code: self.course_code,
                description: self.description,
                credits: self.credits,
                status: self.status,
                admin_notes: self.admin_notes,
                course_id: self.course_id,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            faculty: FacultyDetail {
                faculty: Faculty {
                    faculty_id: self.faculty_id,
                    name: self.faculty_name,
                    email: self.faculty_email,
                    position_id: self.position_id,
                    created_at: self.faculty_created_at,
                    updated_at: self.faculty_updated_at,
                },
                position: Position {
                    position_id: self.position_id,
                    name: self.position_name,
                    details: self.position_details,
                    min_credits: self.min_credits,
                    created_at: self.position_created_at,
                    updated_at: self.position_updated_at,
                },
            },
            course,
        }
    }
}

/// Joined proposal row with just the promoted course (roster overview).
#[derive(FromRow)]
struct WithCourseRow {
    elective_id: Uuid,
    faculty_id: Uuid,
    session_id: Option<Uuid>,
    course_name: String,
    course_code: String,
    description: String,
    credits: i32,
    status: ElectiveStatus,
    admin_notes: Option<String>,
    course_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    cat_course_name: Option<String>,
    cat_course_code: Option<String>,
    cat_details: Option<String>,
    cat_credits: Option<i32>,
    cat_is_elective: Option<bool>,
    cat_created_at: Option<DateTime<Utc>>,
    cat_updated_at: Option<DateTime<Utc>>,
}

impl WithCourseRow {
    fn into_with_course(self) -> ElectiveWithCourse {
        let course = promoted_course(
            self.course_id,
            self.cat_course_name,
            self.cat_course_code,
            self.cat_details,
            self.cat_credits,
            self.cat_is_elective,
            self.cat_created_at,
            self.cat_updated_at,
        );
        ElectiveWithCourse {
            elective: ElectiveCourse {
                elective_id: self.elective_id,
                faculty_id: self.faculty_id,
                session_id: self.session_id,
                course_name: self.course_name,
                course_code: self.course_code,
                description: self.description,
                credits: self.credits,
                status: self.status,
                admin_notes: self.admin_notes,
                course_id: self.course_id,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            course,
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn promoted_course(
    course_id: Option<Uuid>,
    name: Option<String>,
    code: Option<String>,
    details: Option<String>,
    credits: Option<i32>,
    is_elective: Option<bool>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
) -> Option<Course> {
    Some(Course {
        course_id: course_id?,
        course_name: name?,
        course_code: code?,
        details,
        credits: credits?,
        is_elective: is_elective?,
        created_at: created_at?,
        updated_at: updated_at?,
    })
}

const DETAIL_SELECT: &str = r#"
    SELECT e.elective_id, e.faculty_id, e.session_id, e.course_name, e.course_code,
           e.description, e.credits, e.status, e.admin_notes, e.course_id,
           e.created_at, e.updated_at,
           f.name AS faculty_name, f.email AS faculty_email, f.position_id,
           f.created_at AS faculty_created_at, f.updated_at AS faculty_updated_at,
           p.name AS position_name, p.details AS position_details, p.min_credits,
           p.created_at AS position_created_at, p.updated_at AS position_updated_at,
           c.course_name AS cat_course_name, c.course_code AS cat_course_code,
           c.details AS cat_details, c.credits AS cat_credits, c.is_elective AS cat_is_elective,
           c.created_at AS cat_created_at, c.updated_at AS cat_updated_at
    FROM coursechoice.elective_courses e
    JOIN coursechoice.faculty f USING (faculty_id)
    JOIN coursechoice.positions p ON p.position_id = f.position_id
    LEFT JOIN coursechoice.courses c ON c.course_id = e.course_id
"#;

#[derive(Clone)]
pub struct ElectiveService {
    pool: PgPool,
}

impl ElectiveService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// One member's proposals, newest first.
    pub async fn list_by_faculty(
        &self,
        faculty_id: Uuid,
    ) -> Result<Vec<ElectiveDetail>, sqlx::Error> {
        let rows = sqlx::query_as::<_, DetailRow>(&format!(
            "{DETAIL_SELECT} WHERE e.faculty_id = $1 ORDER BY e.created_at DESC"
        ))
        .bind(faculty_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(DetailRow::into_detail).collect())
    }

    /// All proposals for admin review, pending first then newest.
    pub async fn list_for_review(
        &self,
        status: Option<ElectiveStatus>,
    ) -> Result<Vec<ElectiveDetail>, sqlx::Error> {
        let rows = sqlx::query_as::<_, DetailRow>(&format!(
            r#"
            {DETAIL_SELECT}
            WHERE $1::varchar IS NULL OR e.status = $1
            ORDER BY {STATUS_RANK}, e.created_at DESC
            "#
        ))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(DetailRow::into_detail).collect())
    }

    pub async fn find(&self, elective_id: Uuid) -> Result<Option<ElectiveCourse>, sqlx::Error> {
        sqlx::query_as::<_, ElectiveCourse>(&format!(
            "SELECT {ELECTIVE_COLUMNS} FROM coursechoice.elective_courses WHERE elective_id = $1"
        ))
        .bind(elective_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn detail(
        &self,
        elective_id: Uuid,
    ) -> Result<Option<ElectiveDetail>, sqlx::Error> {
        let row = sqlx::query_as::<_, DetailRow>(&format!(
            "{DETAIL_SELECT} WHERE e.elective_id = $1"
        ))
        .bind(elective_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(DetailRow::into_detail))
    }

    /// Proposals the member has already made against a session.
    pub async fn session_proposal_count(
        &self,
        faculty_id: Uuid,
        session_id: Uuid,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM coursechoice.elective_courses
            WHERE faculty_id = $1 AND session_id = $2
            "#,
        )
        .bind(faculty_id)
        .bind(session_id)
        .fetch_one(&self.pool)
        .await
    }

    /// True when the member already has a proposal with the code, excluding
    /// `exclude` (used when editing a proposal in place).
    pub async fn has_code_conflict(
        &self,
        faculty_id: Uuid,
        course_code: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, sqlx::Error> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM coursechoice.elective_courses
            WHERE faculty_id = $1 AND course_code = $2
              AND ($3::uuid IS NULL OR elective_id <> $3)
            "#,
        )
        .bind(faculty_id)
        .bind(course_code)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    pub async fn create(
        &self,
        faculty_id: Uuid,
        session_id: Option<Uuid>,
        course_name: &str,
        course_code: &str,
        description: &str,
        credits: i32,
    ) -> Result<ElectiveCourse, sqlx::Error> {
        let elective = sqlx::query_as::<_, ElectiveCourse>(&format!(
            r#"
            INSERT INTO coursechoice.elective_courses
                (elective_id, faculty_id, session_id, course_name, course_code, description, credits)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ELECTIVE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(faculty_id)
        .bind(session_id)
        .bind(course_name)
        .bind(course_code)
        .bind(description)
        .bind(credits)
        .fetch_one(&self.pool)
        .await?;

        info!(
            "Faculty {} proposed elective {} ({})",
            faculty_id, elective.course_code, elective.elective_id
        );
        Ok(elective)
    }

    /// Edit a proposal in place. Returns None when it does not exist.
    pub async fn update_proposal(
        &self,
        elective_id: Uuid,
        course_name: &str,
        course_code: &str,
        description: &str,
        credits: i32,
    ) -> Result<Option<ElectiveCourse>, sqlx::Error> {
        sqlx::query_as::<_, ElectiveCourse>(&format!(
            r#"
            UPDATE coursechoice.elective_courses
            SET course_name = $2, course_code = $3, description = $4,
                credits = $5, updated_at = now()
            WHERE elective_id = $1
            RETURNING {ELECTIVE_COLUMNS}
            "#
        ))
        .bind(elective_id)
        .bind(course_name)
        .bind(course_code)
        .bind(description)
        .bind(credits)
        .fetch_optional(&self.pool)
        .await
    }

    /// Returns false when the proposal does not exist.
    pub async fn delete(&self, elective_id: Uuid) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM coursechoice.elective_courses WHERE elective_id = $1")
                .bind(elective_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() > 0 {
            info!("Deleted elective proposal: {}", elective_id);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Record an admin decision. Approval promotes the proposal into the
    /// course catalog and links the created course, atomically; rejection
    /// clears any course link. Returns None when the proposal vanished.
    pub async fn decide(
        &self,
        elective_id: Uuid,
        status: ElectiveStatus,
        admin_notes: Option<&str>,
    ) -> Result<Option<ElectiveDetail>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let proposal = sqlx::query_as::<_, ElectiveCourse>(&format!(
            r#"
            SELECT {ELECTIVE_COLUMNS} FROM coursechoice.elective_courses
            WHERE elective_id = $1
            FOR UPDATE
            "#
        ))
        .bind(elective_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(proposal) = proposal else {
            return Ok(None);
        };

        let course_id = if status == ElectiveStatus::Approved {
            let course_id: Uuid = sqlx::query_scalar(
                r#"
                INSERT INTO coursechoice.courses
                    (course_id, course_name, course_code, details, credits, is_elective)
                VALUES ($1, $2, $3, $4, $5, TRUE)
                RETURNING course_id
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(&proposal.course_name)
            .bind(&proposal.course_code)
            .bind(&proposal.description)
            .bind(proposal.credits)
            .fetch_one(&mut *tx)
            .await?;
            Some(course_id)
        } else {
            None
        };

        sqlx::query(
            r#"
            UPDATE coursechoice.elective_courses
            SET status = $2, admin_notes = $3, course_id = $4, updated_at = now()
            WHERE elective_id = $1
            "#,
        )
        .bind(elective_id)
        .bind(status.as_str())
        .bind(admin_notes)
        .bind(course_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!("Elective {} marked {}", elective_id, status);

        self.detail(elective_id).await
    }

    /// Proposals for the admin roster: any belonging to the given faculty
    /// and bound to the given sessions, with promoted courses, newest first.
    pub(crate) async fn with_course_for_pairs(
        &self,
        faculty_ids: &[Uuid],
        session_ids: &[Uuid],
    ) -> Result<Vec<ElectiveWithCourse>, sqlx::Error> {
        let rows = sqlx::query_as::<_, WithCourseRow>(
            r#"
            SELECT e.elective_id, e.faculty_id, e.session_id, e.course_name, e.course_code,
                   e.description, e.credits, e.status, e.admin_notes, e.course_id,
                   e.created_at, e.updated_at,
                   c.course_name AS cat_course_name, c.course_code AS cat_course_code,
                   c.details AS cat_details, c.credits AS cat_credits,
                   c.is_elective AS cat_is_elective,
                   c.created_at AS cat_created_at, c.updated_at AS cat_updated_at
            FROM coursechoice.elective_courses e
            LEFT JOIN coursechoice.courses c ON c.course_id = e.course_id
            WHERE e.faculty_id = ANY($1) AND e.session_id = ANY($2)
            ORDER BY e.created_at DESC
            "#,
        )
        .bind(faculty_ids)
        .bind(session_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(WithCourseRow::into_with_course).collect())
    }
}
