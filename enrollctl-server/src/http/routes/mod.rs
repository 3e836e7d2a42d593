//! Route handlers organized by resource

pub mod courses;
pub mod enrollments;
pub mod health;
pub mod students;

use serde::Serialize;

/// `{"message": ...}` body for operations without a record to return
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    pub fn new(message: &'static str) -> Self {
        Self { message }
    }
}
