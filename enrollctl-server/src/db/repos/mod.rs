//! Repository implementations for database access
//!
//! - `StudentRepo` / `CourseRepo`: single-entity CRUD
//! - `EnrollmentRepo`: read side of enrollments
//! - `PgEnrollmentStore`: the enrollment transaction's store, backed by Postgres

pub mod courses;
pub mod enrollments;
pub mod students;

pub use courses::CourseRepo;
pub use enrollments::{EnrollmentRepo, PgEnrollmentStore, PgEnrollmentTx};
pub use students::StudentRepo;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("{resource} Not Found")]
    NotFound { resource: &'static str, id: String },

    #[error("{message}")]
    Conflict { message: &'static str },
}

/// True when `err` is a Postgres unique-constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}
