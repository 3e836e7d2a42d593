//! Enrollment writer
//!
//! Inserts the validated batch. Runs after the pipeline and repeats none of
//! its checks.

use chrono::NaiveDate;
use tracing::warn;

use super::CourseBatch;
use crate::error::{EnrollError, StoreError};
use crate::models::StudentId;
use crate::store::EnrollmentTx;

/// Insert one enrollment per course in `batch`, all dated `enrolled_on`.
///
/// A uniqueness violation at this point means another transaction enrolled
/// the same pair after our check; it surfaces as the duplicate conflict.
pub async fn write_enrollments<T: EnrollmentTx>(
    tx: &mut T,
    student_id: &StudentId,
    batch: &CourseBatch,
    enrolled_on: NaiveDate,
) -> Result<u64, EnrollError> {
    tx.insert_enrollments(student_id, batch.ids(), enrolled_on)
        .await
        .map_err(|err| match err {
            StoreError::UniqueViolation(detail) => {
                warn!(student = %student_id, %detail, "enrollment insert hit unique constraint");
                EnrollError::AlreadyEnrolled {
                    course_ids: batch.ids().to_vec(),
                }
            }
            other => EnrollError::Store(other),
        })
}
