//! Course-preference persistence: the faculty portal view, ranked-choice
//! replacement, and the admin roster overview.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::models::{
    AssignmentOverview, Course, CourseChoice, CourseChoiceDetail, Faculty, FacultyDetail,
    FacultySessionView, Position, Session, SessionCourse, SessionCourseDetail, SessionFaculty,
    SessionWithCourses,
};

use super::{ElectiveService, SessionService};

/// Everything the preference validation rules need about one assignment.
#[derive(Debug, Clone, FromRow)]
pub struct AssignmentContext {
    pub session_faculty_id: Uuid,
    pub session_id: Uuid,
    pub faculty_id: Uuid,
    pub max_courses: i32,
    pub min_credits: i32,
    pub position_name: String,
}

/// Joined course_choices row.
#[derive(FromRow)]
struct ChoiceRow {
    choice_id: Uuid,
    session_faculty_id: Uuid,
    session_course_id: Uuid,
    preference_order: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
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

impl ChoiceRow {
    fn into_detail(self) -> CourseChoiceDetail {
        CourseChoiceDetail {
            choice: CourseChoice {
                choice_id: self.choice_id,
                session_faculty_id: self.session_faculty_id,
                session_course_id: self.session_course_id,
                preference_order: self.preference_order,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            session_course: SessionCourseDetail {
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
            },
        }
    }
}

/// Joined session_faculty + sessions row for the faculty portal view.
#[derive(FromRow)]
struct AssignedSessionRow {
    session_faculty_id: Uuid,
    session_id: Uuid,
    faculty_id: Uuid,
    name: String,
    details: Option<String>,
    is_active: bool,
    max_courses: i32,
    max_electives: i32,
    session_created_at: DateTime<Utc>,
    session_updated_at: DateTime<Utc>,
}

/// Joined roster row for the admin overview.
#[derive(FromRow)]
struct RosterRow {
    session_faculty_id: Uuid,
    session_id: Uuid,
    faculty_id: Uuid,
    session_name: String,
    session_details: Option<String>,
    is_active: bool,
    max_courses: i32,
    max_electives: i32,
    session_created_at: DateTime<Utc>,
    session_updated_at: DateTime<Utc>,
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

#[derive(Clone)]
pub struct PreferenceService {
    pool: PgPool,
    sessions: SessionService,
    electives: ElectiveService,
}

impl PreferenceService {
    pub fn new(pool: PgPool) -> Self {
        let sessions = SessionService::new(pool.clone());
        let electives = ElectiveService::new(pool.clone());
        Self {
            pool,
            sessions,
            electives,
        }
    }

    /// Load the session/position context for one assignment, or None when
    /// the assignment does not exist.
    pub async fn assignment_context(
        &self,
        session_faculty_id: Uuid,
    ) -> Result<Option<AssignmentContext>, sqlx::Error> {
        sqlx::query_as::<_, AssignmentContext>(
            r#"
            SELECT sf.session_faculty_id, sf.session_id, sf.faculty_id,
                   s.max_courses, p.min_credits, p.name AS position_name
            FROM coursechoice.session_faculty sf
            JOIN coursechoice.sessions s USING (session_id)
            JOIN coursechoice.faculty f USING (faculty_id)
            JOIN coursechoice.positions p ON p.position_id = f.position_id
            WHERE sf.session_faculty_id = $1
            "#,
        )
        .bind(session_faculty_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Combined credit value of the given session-course offerings.
    pub async fn credit_total(&self, session_course_ids: &[Uuid]) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(c.credits), 0)::BIGINT
            FROM coursechoice.session_courses sc
            JOIN coursechoice.courses c USING (course_id)
            WHERE sc.session_course_id = ANY($1)
            "#,
        )
        .bind(session_course_ids)
        .fetch_one(&self.pool)
        .await
    }

    /// Atomically replace an assignment's ranking with the submitted one and
    /// return the stored choices in preference order.
    pub async fn replace_choices(
        &self,
        session_faculty_id: Uuid,
        ranking: &[(Uuid, i32)],
    ) -> Result<Vec<CourseChoiceDetail>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM coursechoice.course_choices WHERE session_faculty_id = $1")
            .bind(session_faculty_id)
            .execute(&mut *tx)
            .await?;

        for (session_course_id, preference_order) in ranking {
            sqlx::query(
                r#"
                INSERT INTO coursechoice.course_choices
                    (choice_id, session_faculty_id, session_course_id, preference_order)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(session_faculty_id)
            .bind(session_course_id)
            .bind(preference_order)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!(
            "Stored {} preference(s) for assignment {}",
            ranking.len(),
            session_faculty_id
        );

        self.choices_for(&[session_faculty_id])
            .await
            .map(|mut grouped| grouped.remove(&session_faculty_id).unwrap_or_default())
    }

    /// The faculty portal view: every active session the member is assigned
    /// to, with offerings and their current ranking embedded.
    pub async fn faculty_session_views(
        &self,
        faculty_id: Uuid,
    ) -> Result<Vec<FacultySessionView>, sqlx::Error> {
        let rows = sqlx::query_as::<_, AssignedSessionRow>(
            r#"
            SELECT sf.session_faculty_id, sf.session_id, sf.faculty_id,
                   s.name, s.details, s.is_active, s.max_courses, s.max_electives,
                   s.created_at AS session_created_at, s.updated_at AS session_updated_at
            FROM coursechoice.session_faculty sf
            JOIN coursechoice.sessions s USING (session_id)
            WHERE sf.faculty_id = $1 AND s.is_active
            ORDER BY s.created_at DESC
            "#,
        )
        .bind(faculty_id)
        .fetch_all(&self.pool)
        .await?;

        let session_ids: Vec<Uuid> = rows.iter().map(|r| r.session_id).collect();
        let assignment_ids: Vec<Uuid> = rows.iter().map(|r| r.session_faculty_id).collect();

        let mut offerings: HashMap<Uuid, Vec<SessionCourseDetail>> = HashMap::new();
        for link in self.sessions.course_links_for(&session_ids).await? {
            offerings.entry(link.link.session_id).or_default().push(link);
        }
        let mut choices = self.choices_for(&assignment_ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| FacultySessionView {
                link: SessionFaculty {
                    session_faculty_id: row.session_faculty_id,
                    session_id: row.session_id,
                    faculty_id: row.faculty_id,
                },
                session: SessionWithCourses {
                    session: Session {
                        session_id: row.session_id,
                        name: row.name,
                        details: row.details,
                        is_active: row.is_active,
                        max_courses: row.max_courses,
                        max_electives: row.max_electives,
                        created_at: row.session_created_at,
                        updated_at: row.session_updated_at,
                    },
                    session_courses: offerings.remove(&row.session_id).unwrap_or_default(),
                },
                course_choices: choices.remove(&row.session_faculty_id).unwrap_or_default(),
            })
            .collect())
    }

    /// The admin roster: every assignment (optionally one session's), with
    /// rankings and session-bound elective proposals embedded.
    pub async fn assignments_overview(
        &self,
        session_id: Option<Uuid>,
    ) -> Result<Vec<AssignmentOverview>, sqlx::Error> {
        let rows = sqlx::query_as::<_, RosterRow>(
            r#"
            SELECT sf.session_faculty_id, sf.session_id, sf.faculty_id,
                   s.name AS session_name, s.details AS session_details, s.is_active,
                   s.max_courses, s.max_electives,
                   s.created_at AS session_created_at, s.updated_at AS session_updated_at,
                   f.name AS faculty_name, f.email AS faculty_email, f.position_id,
                   f.created_at AS faculty_created_at, f.updated_at AS faculty_updated_at,
                   p.name AS position_name, p.details AS position_details, p.min_credits,
                   p.created_at AS position_created_at, p.updated_at AS position_updated_at
            FROM coursechoice.session_faculty sf
            JOIN coursechoice.sessions s USING (session_id)
            JOIN coursechoice.faculty f USING (faculty_id)
            JOIN coursechoice.positions p ON p.position_id = f.position_id
            WHERE $1::uuid IS NULL OR sf.session_id = $1
            ORDER BY s.name DESC, f.name ASC
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        let assignment_ids: Vec<Uuid> = rows.iter().map(|r| r.session_faculty_id).collect();
        let session_ids: Vec<Uuid> = rows.iter().map(|r| r.session_id).collect();
        let faculty_ids: Vec<Uuid> = rows.iter().map(|r| r.faculty_id).collect();

        let mut choices = self.choices_for(&assignment_ids).await?;
        let electives = self
            .electives
            .with_course_for_pairs(&faculty_ids, &session_ids)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let proposals = electives
                    .iter()
                    .filter(|e| {
                        e.elective.faculty_id == row.faculty_id
                            && e.elective.session_id == Some(row.session_id)
                    })
                    .cloned()
                    .collect();
                AssignmentOverview {
                    link: SessionFaculty {
                        session_faculty_id: row.session_faculty_id,
                        session_id: row.session_id,
                        faculty_id: row.faculty_id,
                    },
                    session: Session {
                        session_id: row.session_id,
                        name: row.session_name,
                        details: row.session_details,
                        is_active: row.is_active,
                        max_courses: row.max_courses,
                        max_electives: row.max_electives,
                        created_at: row.session_created_at,
                        updated_at: row.session_updated_at,
                    },
                    faculty: FacultyDetail {
                        faculty: Faculty {
                            faculty_id: row.faculty_id,
                            name: row.faculty_name,
                            email: row.faculty_email,
                            position_id: row.position_id,
                            created_at: row.faculty_created_at,
                            updated_at: row.faculty_updated_at,
                        },
                        position: Position {
                            position_id: row.position_id,
                            name: row.position_name,
                            details: row.position_details,
                            min_credits: row.min_credits,
                            created_at: row.position_created_at,
                            updated_at: row.position_updated_at,
                        },
                    },
                    course_choices: choices.remove(&row.session_faculty_id).unwrap_or_default(),
                    elective_proposals: proposals,
                }
            })
            .collect())
    }

    /// Ranked choices for a set of assignments, grouped by assignment and
    /// ordered by preference.
    async fn choices_for(
        &self,
        assignment_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<CourseChoiceDetail>>, sqlx::Error> {
        let rows = sqlx::query_as::<_, ChoiceRow>(
            r#"
            SELECT ch.choice_id, ch.session_faculty_id, ch.session_course_id,
                   ch.preference_order, ch.created_at, ch.updated_at,
                   sc.session_id, sc.course_id,
                   c.course_name, c.course_code, c.details, c.credits, c.is_elective,
                   c.created_at AS course_created_at, c.updated_at AS course_updated_at
            FROM coursechoice.course_choices ch
            JOIN coursechoice.session_courses sc USING (session_course_id)
            JOIN coursechoice.courses c USING (course_id)
            WHERE ch.session_faculty_id = ANY($1)
            ORDER BY ch.preference_order
            "#,
        )
        .bind(assignment_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<CourseChoiceDetail>> = HashMap::new();
        for row in rows {
            grouped
                .entry(row.session_faculty_id)
                .or_default()
                .push(row.into_detail());
        }
        Ok(grouped)
    }
}
