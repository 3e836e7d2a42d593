//! The enrollment transaction
//!
//! ```text
//! begin -> validate (student, courses, duplicates, capacity) -> write -> commit
//! ```
//!
//! Any failure after `begin` rolls the transaction back before the error is
//! returned. The coordinator owns the transaction handle, and `commit` consumes
//! it, so once a commit succeeds there is nothing left to roll back; a handle
//! dropped on any other path discards its writes.

pub mod pipeline;
pub mod writer;

use std::collections::BTreeSet;

use chrono::{Local, NaiveDate};
use tracing::{error, info, instrument, warn};

use crate::error::EnrollError;
use crate::models::{CourseId, StudentId};
use crate::store::{EnrollmentStore, EnrollmentTx};

/// Requested course ids, deduplicated and sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseBatch(Vec<CourseId>);

impl CourseBatch {
    /// Normalize a request.
    ///
    /// An empty batch is representable; the pipeline rejects it once the
    /// student has been checked.
    ///
    /// # Example
    /// ```
    /// use enrollctl_core::CourseBatch;
    ///
    /// let batch = CourseBatch::new(&[3, 1, 3]);
    /// assert_eq!(batch.ids(), &[1, 3]);
    /// assert!(CourseBatch::new(&[]).is_empty());
    /// ```
    pub fn new(course_ids: &[CourseId]) -> Self {
        let unique: BTreeSet<_> = course_ids.iter().copied().collect();
        Self(unique.into_iter().collect())
    }

    pub fn ids(&self) -> &[CourseId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// What a committed enrollment transaction wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollReceipt {
    pub student_id: StudentId,
    pub course_ids: Vec<CourseId>,
    pub enrolled_on: NaiveDate,
    pub rows_written: u64,
}

/// Enroll a student in a batch of courses, dated today (local time).
pub async fn enroll_courses<S: EnrollmentStore>(
    store: &S,
    student_id: &StudentId,
    course_ids: &[CourseId],
) -> Result<EnrollReceipt, EnrollError> {
    enroll_courses_on(store, student_id, course_ids, Local::now().date_naive()).await
}

/// Enroll a student in a batch of courses with an explicit enrollment date.
#[instrument(skip_all, fields(student = %student_id, requested = course_ids.len()))]
pub async fn enroll_courses_on<S: EnrollmentStore>(
    store: &S,
    student_id: &StudentId,
    course_ids: &[CourseId],
    enrolled_on: NaiveDate,
) -> Result<EnrollReceipt, EnrollError> {
    let result = run(store, student_id, course_ids, enrolled_on).await;

    match &result {
        Ok(receipt) => info!(
            courses = ?receipt.course_ids,
            date = %receipt.enrolled_on,
            "enrollment committed"
        ),
        Err(err) if err.is_rejection() => warn!(reason = ?err, "enrollment rejected"),
        Err(err) => error!(error = %err, "enrollment failed"),
    }

    result
}

async fn run<S: EnrollmentStore>(
    store: &S,
    student_id: &StudentId,
    course_ids: &[CourseId],
    enrolled_on: NaiveDate,
) -> Result<EnrollReceipt, EnrollError> {
    let batch = CourseBatch::new(course_ids);

    let mut tx = store.begin().await.map_err(EnrollError::Begin)?;

    let rows_written = match validate_and_write(&mut tx, student_id, &batch, enrolled_on).await {
        Ok(rows) => rows,
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "rollback failed; connection will discard the transaction");
            }
            return Err(err);
        }
    };

    tx.commit().await.map_err(EnrollError::Commit)?;

    Ok(EnrollReceipt {
        student_id: student_id.clone(),
        course_ids: batch.0,
        enrolled_on,
        rows_written,
    })
}

async fn validate_and_write<T: EnrollmentTx>(
    tx: &mut T,
    student_id: &StudentId,
    batch: &CourseBatch,
    enrolled_on: NaiveDate,
) -> Result<u64, EnrollError> {
    pipeline::validate(tx, student_id, batch).await?;
    writer::write_enrollments(tx, student_id, batch, enrolled_on).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_sorts_and_dedupes() {
        let batch = CourseBatch::new(&[5, 2, 5, 2, 9]);
        assert_eq!(batch.ids(), &[2, 5, 9]);
        assert_eq!(batch.len(), 3);
    }

    #[test]
    fn empty_input_gives_empty_batch() {
        let batch = CourseBatch::new(&[]);
        assert!(batch.is_empty());
        assert_eq!(batch.len(), 0);
    }
}
