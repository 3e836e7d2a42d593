//! Error types for the enrollment transaction.
//!
//! `EnrollError` is the single failure value every stage of the transaction
//! returns. It knows its own [`ErrorClass`], so the transport boundary can turn
//! it into a status code without matching on individual variants.

use thiserror::Error;

use crate::models::{CourseId, ValidationError};

/// Coarse failure classes, each with a fixed HTTP-style status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    BadRequest,
    NotFound,
    Conflict,
    Internal,
}

impl ErrorClass {
    /// Numeric status code for this class.
    pub fn status_code(self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Internal => 500,
        }
    }
}

/// Failure reported by a store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A uniqueness constraint rejected a write
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Any other backend failure; displays as the backend's own text
    #[error(transparent)]
    Backend(Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wrap a backend error.
    pub fn backend(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(source))
    }

    /// Backend failure from a plain message.
    pub fn message(message: impl Into<String>) -> Self {
        Self::Backend(message.into().into())
    }
}

/// Failure of the enrollment transaction.
///
/// Display strings of the validation variants are the user-facing messages.
#[derive(Error, Debug)]
pub enum EnrollError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Student Not Found")]
    StudentNotFound { student_id: String },

    #[error("Some course IDs Are Not Found")]
    CoursesNotFound { missing: Vec<CourseId> },

    #[error("You can't enrolled some courses again")]
    AlreadyEnrolled { course_ids: Vec<CourseId> },

    #[error("Some courses have reached max capacity")]
    CapacityReached { course_ids: Vec<CourseId> },

    /// Transaction could not be opened
    #[error("{0}")]
    Begin(StoreError),

    /// Transaction could not be committed
    #[error("{0}")]
    Commit(StoreError),

    /// Any other store failure inside the transaction
    #[error("{0}")]
    Store(#[from] StoreError),
}

impl EnrollError {
    /// Failure class, which fixes the status code at the boundary.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Validation(_) => ErrorClass::BadRequest,
            Self::StudentNotFound { .. } | Self::CoursesNotFound { .. } => ErrorClass::NotFound,
            Self::AlreadyEnrolled { .. } | Self::CapacityReached { .. } => ErrorClass::Conflict,
            Self::Begin(_) | Self::Commit(_) | Self::Store(_) => ErrorClass::Internal,
        }
    }

    /// Shorthand for `self.class().status_code()`.
    pub fn status_code(&self) -> u16 {
        self.class().status_code()
    }

    /// True for failures caused by the request rather than the store.
    pub fn is_rejection(&self) -> bool {
        self.class() != ErrorClass::Internal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_user_facing() {
        let err = EnrollError::StudentNotFound {
            student_id: "S1".into(),
        };
        assert_eq!(err.to_string(), "Student Not Found");

        let err = EnrollError::CoursesNotFound { missing: vec![7] };
        assert_eq!(err.to_string(), "Some course IDs Are Not Found");

        let err = EnrollError::AlreadyEnrolled { course_ids: vec![1] };
        assert_eq!(err.to_string(), "You can't enrolled some courses again");

        let err = EnrollError::CapacityReached { course_ids: vec![1] };
        assert_eq!(err.to_string(), "Some courses have reached max capacity");
    }

    #[test]
    fn classes_map_to_status_codes() {
        assert_eq!(
            EnrollError::StudentNotFound {
                student_id: "x".into()
            }
            .status_code(),
            404
        );
        assert_eq!(
            EnrollError::CapacityReached { course_ids: vec![] }.status_code(),
            409
        );
        assert_eq!(
            EnrollError::Commit(StoreError::message("connection reset")).status_code(),
            500
        );
        assert_eq!(
            EnrollError::Validation(ValidationError::Empty { field: "courseIds" }).status_code(),
            400
        );
    }

    #[test]
    fn store_errors_display_backend_text() {
        let err = EnrollError::Begin(StoreError::message("pool timed out"));
        assert_eq!(err.to_string(), "pool timed out");
        assert!(!err.is_rejection());
    }
}
