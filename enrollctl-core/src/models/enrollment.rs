//! Enrollment rows linking a student to a course

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Course, CourseId};

/// One (student, course) enrollment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub student_id: String,
    pub course_id: CourseId,
    pub enrollment_date: NaiveDate,
    /// Not assigned by the enrollment transaction
    pub grade: Option<f64>,
}

impl Enrollment {
    /// Fresh enrollment without a grade.
    pub fn new(student_id: impl Into<String>, course_id: CourseId, enrollment_date: NaiveDate) -> Self {
        Self {
            student_id: student_id.into(),
            course_id,
            enrollment_date,
            grade: None,
        }
    }
}

/// A course as seen from one student's enrollment list
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrolledCourse {
    #[serde(flatten)]
    pub course: Course,
    pub enrollment_date: NaiveDate,
    pub grade: Option<f64>,
}
