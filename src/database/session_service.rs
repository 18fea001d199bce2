//! Scheduling session management: the session records themselves plus the
//! course-offering and faculty-assignment link tables.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::models::{
    Course, Faculty, FacultyDetail, Position, Session, SessionCourse, SessionCourseDetail,
    SessionDetail, SessionFaculty, SessionFacultyDetail,
};

const SESSION_COLUMNS: &str =
    "session_id, name, details, is_active, max_courses, max_electives, created_at, updated_at";

/// Joined session_courses row; aliases keep course columns distinct.
#[derive(FromRow)]
struct CourseLinkRow {
    session_course_id: Uuid,
    session_id: Uuid,
    course_id: Uuid,
    course_name: String,
    course_code: String,
    details: Option<String>,
    credits: i32,
    is_elective: bool,
    course_created_at: DateTime<Utc>,
    course_updated_at: DateTime<Utc>,
}

impl CourseLinkRow {
    fn into_detail(self) -> SessionCourseDetail {
        SessionCourseDetail {
            link: SessionCourse {
                session_course_id: self.session_course_id,
                session_id: self.session_id,
                course_id: self.course_id,
            },
            course: Course {
                course_id: self.course_id,
                course_name: self.course_name,
                course_code: self.course_code,
                details: self.details,
                credits: self.credits,
                is_elective: self.is_elective,
                created_at: self.course_created_at,
                updated_at: self.course_updated_at,
            },
        }
    }
}

/// Joined session_faculty row carrying the member and their position.
#[derive(FromRow)]
struct FacultyLinkRow {
    session_faculty_id: Uuid,
    session_id: Uuid,
    faculty_id: Uuid,
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
}

impl FacultyLinkRow {
    fn into_detail(self) -> SessionFacultyDetail {
        SessionFacultyDetail {
            link: SessionFaculty {
                session_faculty_id: self.session_faculty_id,
                session_id: self.session_id,
                faculty_id: self.faculty_id,
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
        }
    }
}

#[derive(Clone)]
pub struct SessionService {
    pool: PgPool,
}

impl SessionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All sessions newest first, offerings and assignments embedded.
    pub async fn list_detailed(&self) -> Result<Vec<SessionDetail>, sqlx::Error> {
        let sessions = sqlx::query_as::<_, Session>(&format!(
            "SELECT {SESSION_COLUMNS} FROM coursechoice.sessions ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = sessions.iter().map(|s| s.session_id).collect();
        let mut courses = group_by_session(self.course_links_for(&ids).await?, |d| d.link.session_id);
        let mut faculties =
            group_by_session(self.faculty_links_for(&ids).await?, |d| d.link.session_id);

        Ok(sessions
            .into_iter()
            .map(|session| {
                let session_id = session.session_id;
                SessionDetail {
                    session,
                    session_courses: courses.remove(&session_id).unwrap_or_default(),
                    session_faculties: faculties.remove(&session_id).unwrap_or_default(),
                }
            })
            .collect())
    }

    pub async fn find(&self, session_id: Uuid) -> Result<Option<Session>, sqlx::Error> {
        sqlx::query_as::<_, Session>(&format!(
            "SELECT {SESSION_COLUMNS} FROM coursechoice.sessions WHERE session_id = $1"
        ))
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Single session with offerings and assignments embedded.
    pub async fn detail(&self, session_id: Uuid) -> Result<Option<SessionDetail>, sqlx::Error> {
        let Some(session) = self.find(session_id).await? else {
            return Ok(None);
        };
        let session_courses = self.course_links_for(&[session_id]).await?;
        let session_faculties = self.faculty_links_for(&[session_id]).await?;
        Ok(Some(SessionDetail {
            session,
            session_courses,
            session_faculties,
        }))
    }

    pub async fn create(
        &self,
        name: &str,
        details: Option<&str>,
        is_active: bool,
        max_courses: i32,
    ) -> Result<Session, sqlx::Error> {
        let session = sqlx::query_as::<_, Session>(&format!(
            r#"
            INSERT INTO coursechoice.sessions (session_id, name, details, is_active, max_courses)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {SESSION_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(details)
        .bind(is_active)
        .bind(max_courses)
        .fetch_one(&self.pool)
        .await?;

        info!("Created session: {} ({})", session.name, session.session_id);
        Ok(session)
    }

    /// Full update. Returns None when the session does not exist.
    pub async fn update(
        &self,
        session_id: Uuid,
        name: &str,
        details: Option<&str>,
        is_active: bool,
        max_courses: i32,
        max_electives: i32,
    ) -> Result<Option<Session>, sqlx::Error> {
        sqlx::query_as::<_, Session>(&format!(
            r#"
            UPDATE coursechoice.sessions
            SET name = $2, details = $3, is_active = $4,
                max_courses = $5, max_electives = $6, updated_at = now()
            WHERE session_id = $1
            RETURNING {SESSION_COLUMNS}
            "#
        ))
        .bind(session_id)
        .bind(name)
        .bind(details)
        .bind(is_active)
        .bind(max_courses)
        .bind(max_electives)
        .fetch_optional(&self.pool)
        .await
    }

    /// Counts of faculty assignments, course offerings, and elective
    /// proposals still referencing the session.
    pub async fn reference_counts(&self, session_id: Uuid) -> Result<(i64, i64, i64), sqlx::Error> {
        sqlx::query_as::<_, (i64, i64, i64)>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM coursechoice.session_faculty WHERE session_id = $1),
                (SELECT COUNT(*) FROM coursechoice.session_courses WHERE session_id = $1),
                (SELECT COUNT(*) FROM coursechoice.elective_courses WHERE session_id = $1)
            "#,
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await
    }

    /// Returns false when the session does not exist.
    pub async fn delete(&self, session_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM coursechoice.sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            info!("Deleted session: {}", session_id);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Attach courses to a session in one transaction; a duplicate pair
    /// rolls the whole batch back.
    pub async fn attach_courses(
        &self,
        session_id: Uuid,
        course_ids: &[Uuid],
    ) -> Result<Vec<SessionCourseDetail>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let mut link_ids = Vec::with_capacity(course_ids.len());

        for course_id in course_ids {
            let link_id: Uuid = sqlx::query_scalar(
                r#"
                INSERT INTO coursechoice.session_courses (session_course_id, session_id, course_id)
                VALUES ($1, $2, $3)
                RETURNING session_course_id
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(session_id)
            .bind(course_id)
            .fetch_one(&mut *tx)
            .await?;
            link_ids.push(link_id);
        }

        tx.commit().await?;
        info!(
            "Attached {} course(s) to session {}",
            link_ids.len(),
            session_id
        );

        let rows = sqlx::query_as::<_, CourseLinkRow>(
            r#"
            SELECT sc.session_course_id, sc.session_id, sc.course_id,
                   c.course_name, c.course_code, c.details, c.credits, c.is_elective,
                   c.created_at AS course_created_at, c.updated_at AS course_updated_at
            FROM coursechoice.session_courses sc
            JOIN coursechoice.courses c USING (course_id)
            WHERE sc.session_course_id = ANY($1)
            ORDER BY c.course_name
            "#,
        )
        .bind(&link_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CourseLinkRow::into_detail).collect())
    }

    /// Returns false when the course was not attached to the session.
    pub async fn detach_course(
        &self,
        session_id: Uuid,
        course_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM coursechoice.session_courses WHERE session_id = $1 AND course_id = $2",
        )
        .bind(session_id)
        .bind(course_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Attach faculty to a session in one transaction; a duplicate pair
    /// rolls the whole batch back.
    pub async fn attach_faculty(
        &self,
        session_id: Uuid,
        faculty_ids: &[Uuid],
    ) -> Result<Vec<SessionFacultyDetail>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let mut link_ids = Vec::with_capacity(faculty_ids.len());

        for faculty_id in faculty_ids {
            let link_id: Uuid = sqlx::query_scalar(
                r#"
                INSERT INTO coursechoice.session_faculty (session_faculty_id, session_id, faculty_id)
                VALUES ($1, $2, $3)
                RETURNING session_faculty_id
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(session_id)
            .bind(faculty_id)
            .fetch_one(&mut *tx)
            .await?;
            link_ids.push(link_id);
        }

        tx.commit().await?;
        info!(
            "Assigned {} faculty to session {}",
            link_ids.len(),
            session_id
        );

        let rows = sqlx::query_as::<_, FacultyLinkRow>(
            r#"
            SELECT sf.session_faculty_id, sf.session_id, sf.faculty_id,
                   f.name AS faculty_name, f.email AS faculty_email, f.position_id,
                   f.created_at AS faculty_created_at, f.updated_at AS faculty_updated_at,
                   p.name AS position_name, p.details AS position_details, p.min_credits,
                   p.created_at AS position_created_at, p.updated_at AS position_updated_at
            FROM coursechoice.session_faculty sf
            JOIN coursechoice.faculty f USING (faculty_id)
            JOIN coursechoice.positions p USING (position_id)
            WHERE sf.session_faculty_id = ANY($1)
            ORDER BY f.name
            "#,
        )
        .bind(&link_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(FacultyLinkRow::into_detail).collect())
    }

    /// Returns false when the member was not assigned to the session.
    pub async fn detach_faculty(
        &self,
        session_id: Uuid,
        faculty_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM coursechoice.session_faculty WHERE session_id = $1 AND faculty_id = $2",
        )
        .bind(session_id)
        .bind(faculty_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Offerings for a set of sessions, courses embedded.
    pub(crate) async fn course_links_for(
        &self,
        session_ids: &[Uuid],
    ) -> Result<Vec<SessionCourseDetail>, sqlx::Error> {
        let rows = sqlx::query_as::<_, CourseLinkRow>(
            r#"
            SELECT sc.session_course_id, sc.session_id, sc.course_id,
                   c.course_name, c.course_code, c.details, c.credits, c.is_elective,
                   c.created_at AS course_created_at, c.updated_at AS course_updated_at
            FROM coursechoice.session_courses sc
            JOIN coursechoice.courses c USING (course_id)
            WHERE sc.session_id = ANY($1)
            ORDER BY c.course_name
            "#,
        )
        .bind(session_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CourseLinkRow::into_detail).collect())
    }

    /// Assignments for a set of sessions, faculty and positions embedded.
    pub(crate) async fn faculty_links_for(
        &self,
        session_ids: &[Uuid],
    ) -> Result<Vec<SessionFacultyDetail>, sqlx::Error> {
        let rows = sqlx::query_as::<_, FacultyLinkRow>(
            r#"
            SELECT sf.session_faculty_id, sf.session_id, sf.faculty_id,
                   f.name AS faculty_name, f.email AS faculty_email, f.position_id,
                   f.created_at AS faculty_created_at, f.updated_at AS faculty_updated_at,
                   p.name AS position_name, p.details AS position_details, p.min_credits,
                   p.created_at AS position_created_at, p.updated_at AS position_updated_at
            FROM coursechoice.session_faculty sf
            JOIN coursechoice.faculty f USING (faculty_id)
            JOIN coursechoice.positions p USING (position_id)
            WHERE sf.session_id = ANY($1)
            ORDER BY f.name
            "#,
        )
        .bind(session_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(FacultyLinkRow::into_detail).collect())
    }
}

fn group_by_session<T>(items: Vec<T>, key: impl Fn(&T) -> Uuid) -> HashMap<Uuid, Vec<T>> {
    let mut grouped: HashMap<Uuid, Vec<T>> = HashMap::new();
    for item in items {
        grouped.entry(key(&item)).or_default().push(item);
    }
    grouped
}
