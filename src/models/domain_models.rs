//! Row models and composed API shapes.
//!
//! Each row model derives `FromRow` against the matching table and serializes
//! with camelCase keys. Password hashes never appear on these types: queries
//! that need them use the private account rows inside the database services.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Login role selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Faculty,
}

/// Review state of an elective proposal, matching the DB check constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ElectiveStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ElectiveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Parse the wire form. Unknown strings are rejected rather than
    /// defaulted so the status filter and decision endpoints can 400.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(Self::Pending),
            "APPROVED" => Some(Self::Approved),
            "REJECTED" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for ElectiveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Administrator account (password hash never selected into this type).
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub admin_id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Academic position with its minimum teaching-credit requirement.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub position_id: Uuid,
    pub name: String,
    pub details: String,
    pub min_credits: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Faculty account (password hash never selected into this type).
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Faculty {
    pub faculty_id: Uuid,
    pub name: String,
    pub email: String,
    pub position_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Faculty account with its position embedded.
#[derive(Debug, Clone, Serialize)]
pub struct FacultyDetail {
    #[serde(flatten)]
    pub faculty: Faculty,
    pub position: Position,
}

/// Catalog course.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub course_id: Uuid,
    pub course_name: String,
    pub course_code: String,
    pub details: Option<String>,
    pub credits: i32,
    pub is_elective: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Scheduling session.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: Uuid,
    pub name: String,
    pub details: Option<String>,
    pub is_active: bool,
    pub max_courses: i32,
    pub max_electives: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Link row attaching a course to a session.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SessionCourse {
    pub session_course_id: Uuid,
    pub session_id: Uuid,
    pub course_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionCourseDetail {
    #[serde(flatten)]
    pub link: SessionCourse,
    pub course: Course,
}

/// Link row assigning a faculty member to a session.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SessionFaculty {
    pub session_faculty_id: Uuid,
    pub session_id: Uuid,
    pub faculty_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionFacultyDetail {
    #[serde(flatten)]
    pub link: SessionFaculty,
    pub faculty: FacultyDetail,
}

/// Session with its course offerings embedded (faculty view).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionWithCourses {
    #[serde(flatten)]
    pub session: Session,
    pub session_courses: Vec<SessionCourseDetail>,
}

/// Session with both offerings and assignments embedded (admin view).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDetail {
    #[serde(flatten)]
    pub session: Session,
    pub session_courses: Vec<SessionCourseDetail>,
    pub session_faculties: Vec<SessionFacultyDetail>,
}

/// One ranked course preference.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CourseChoice {
    pub choice_id: Uuid,
    pub session_faculty_id: Uuid,
    pub session_course_id: Uuid,
    pub preference_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseChoiceDetail {
    #[serde(flatten)]
    pub choice: CourseChoice,
    pub session_course: SessionCourseDetail,
}

/// An assignment as the faculty portal sees it: the session, its offerings,
/// and the member's current ranking.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacultySessionView {
    #[serde(flatten)]
    pub link: SessionFaculty,
    pub session: SessionWithCourses,
    pub course_choices: Vec<CourseChoiceDetail>,
}

/// An assignment as the admin roster sees it: who, where, their ranking, and
/// their elective proposals for that session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentOverview {
    #[serde(flatten)]
    pub link: SessionFaculty,
    pub session: Session,
    pub faculty: FacultyDetail,
    pub course_choices: Vec<CourseChoiceDetail>,
    pub elective_proposals: Vec<ElectiveWithCourse>,
}

/// Elective course proposal.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ElectiveCourse {
    pub elective_id: Uuid,
    pub faculty_id: Uuid,
    pub session_id: Option<Uuid>,
    pub course_name: String,
    pub course_code: String,
    pub description: String,
    pub credits: i32,
    pub status: ElectiveStatus,
    pub admin_notes: Option<String>,
    pub course_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Proposal with the promoted catalog course, when approval created one.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectiveWithCourse {
    #[serde(flatten)]
    pub elective: ElectiveCourse,
    pub course: Option<Course>,
}

/// Proposal with proposer and promoted course embedded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectiveDetail {
    #[serde(flatten)]
    pub elective: ElectiveCourse,
    pub faculty: FacultyDetail,
    pub course: Option<Course>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_wire_format_is_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let parsed: Role = serde_json::from_str("\"faculty\"").unwrap();
        assert_eq!(parsed, Role::Faculty);
    }

    #[test]
    fn elective_status_wire_format_is_uppercase() {
        assert_eq!(
            serde_json::to_string(&ElectiveStatus::Pending).unwrap(),
            "\"PENDING\""
        );
        assert_eq!(ElectiveStatus::parse("APPROVED"), Some(ElectiveStatus::Approved));
        assert_eq!(ElectiveStatus::parse("approved"), None);
        assert_eq!(ElectiveStatus::parse("DRAFT"), None);
    }

    #[test]
    fn models_serialize_camel_case() {
        let position = Position {
            position_id: Uuid::new_v4(),
            name: "Lecturer".into(),
            details: "Teaching-focused position".into(),
            min_credits: 20,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&position).unwrap();
        assert!(json.get("minCredits").is_some());
        assert!(json.get("positionId").is_some());
        assert!(json.get("min_credits").is_none());
    }

    #[test]
    fn detail_shapes_flatten_the_row() {
        let now = Utc::now();
        let course = Course {
            course_id: Uuid::new_v4(),
            course_name: "Database Systems".into(),
            course_code: "CS301".into(),
            details: None,
            credits: 3,
            is_elective: false,
            created_at: now,
            updated_at: now,
        };
        let link = SessionCourse {
            session_course_id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            course_id: course.course_id,
        };
        let detail = SessionCourseDetail {
            link,
            course: course.clone(),
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert!(json.get("sessionCourseId").is_some());
        assert_eq!(json["course"]["courseCode"], "CS301");
    }
}
