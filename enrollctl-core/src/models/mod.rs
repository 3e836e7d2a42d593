//! Domain models with validation at construction
//!
//! Request inputs are validated before they reach a store.
//! Invalid input returns ValidationError, not panic.

pub mod course;
pub mod enrollment;
pub mod student;
pub mod validation;

pub use course::{Course, CourseId, CourseName, CoursePatch, NewCourse};
pub use enrollment::{EnrolledCourse, Enrollment};
pub use student::{NewStudent, Student, StudentId, StudentPatch};
pub use validation::ValidationError;
