//! Models module for the course-preference portal
//!
//! Row models map the `coursechoice` schema one-to-one; the `*Detail`
//! composites are the nested shapes the REST layer serializes.

pub mod domain_models;

// Re-export commonly used types for convenience
pub use domain_models::{
    Admin, AssignmentOverview, Course, CourseChoice, CourseChoiceDetail, ElectiveCourse,
    ElectiveDetail, ElectiveStatus, ElectiveWithCourse, Faculty, FacultyDetail,
    FacultySessionView, Position, Role, Session, SessionCourse, SessionCourseDetail,
    SessionDetail, SessionFaculty, SessionFacultyDetail, SessionWithCourses,
};
