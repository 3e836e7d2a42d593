//! Store traits the enrollment transaction runs against
//!
//! A store hands out transactions; every read and write of the enrollment
//! transaction goes through the [`EnrollmentTx`] it was given, so all of it
//! observes and modifies the same uncommitted state.
//!
//! Dropping a transaction without calling [`EnrollmentTx::commit`] must
//! discard its writes.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::StoreError;
use crate::models::{CourseId, StudentId};

/// Source of enrollment transactions
#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    type Tx: EnrollmentTx;

    /// Open a new transaction.
    async fn begin(&self) -> Result<Self::Tx, StoreError>;
}

/// Reads and writes scoped to one open transaction.
///
/// Course id slices passed in are sorted and free of duplicates.
#[async_trait]
pub trait EnrollmentTx: Send + Sized {
    /// Whether exactly one student has this id.
    async fn student_exists(&mut self, student_id: &StudentId) -> Result<bool, StoreError>;

    /// Which of `course_ids` exist.
    ///
    /// Backends that can lock should hold the matched course rows until the
    /// transaction ends.
    async fn existing_courses(&mut self, course_ids: &[CourseId]) -> Result<Vec<CourseId>, StoreError>;

    /// Which of `course_ids` the student is already enrolled in.
    async fn enrolled_courses(
        &mut self,
        student_id: &StudentId,
        course_ids: &[CourseId],
    ) -> Result<Vec<CourseId>, StoreError>;

    /// Which of `course_ids` have as many enrollments as their max capacity, or more.
    async fn full_courses(&mut self, course_ids: &[CourseId]) -> Result<Vec<CourseId>, StoreError>;

    /// Insert one enrollment per course, returning the number of rows written.
    async fn insert_enrollments(
        &mut self,
        student_id: &StudentId,
        course_ids: &[CourseId],
        enrolled_on: NaiveDate,
    ) -> Result<u64, StoreError>;

    /// Make every write of this transaction durable.
    async fn commit(self) -> Result<(), StoreError>;

    /// Discard every write of this transaction.
    async fn rollback(self) -> Result<(), StoreError>;
}
