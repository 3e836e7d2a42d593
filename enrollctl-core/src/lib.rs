//! enrollctl-core: course enrollment domain
//!
//! Holds everything about enrollment that does not depend on a particular
//! database or transport:
//! - validated domain models (students, courses, enrollments)
//! - the store traits the enrollment transaction runs against
//! - an in-memory store implementation
//! - the enrollment transaction itself (validation pipeline, writer, coordinator)

pub mod enroll;
pub mod error;
pub mod memory;
pub mod models;
pub mod store;

pub use enroll::{enroll_courses, enroll_courses_on, CourseBatch, EnrollReceipt};
pub use error::{EnrollError, ErrorClass, StoreError};
pub use memory::MemoryStore;
pub use models::{
    Course, CourseId, CourseName, CoursePatch, EnrolledCourse, Enrollment, NewCourse, NewStudent,
    Student, StudentId, StudentPatch, ValidationError,
};
pub use store::{EnrollmentStore, EnrollmentTx};
