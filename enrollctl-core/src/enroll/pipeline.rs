//! Validation pipeline
//!
//! Read-only checks, always in this order, each against the open
//! transaction. The first violation ends the run; later checks never execute.

use std::collections::BTreeSet;

use tracing::debug;

use super::CourseBatch;
use crate::error::EnrollError;
use crate::models::{StudentId, ValidationError};
use crate::store::EnrollmentTx;

/// Run every check against `tx`, stopping at the first violation.
pub async fn validate<T: EnrollmentTx>(
    tx: &mut T,
    student_id: &StudentId,
    batch: &CourseBatch,
) -> Result<(), EnrollError> {
    check_student(tx, student_id).await?;
    check_not_empty(batch)?;
    check_courses_exist(tx, batch).await?;
    check_not_enrolled(tx, student_id, batch).await?;
    check_capacity(tx, batch).await?;
    Ok(())
}

/// 1. The student must exist.
pub async fn check_student<T: EnrollmentTx>(
    tx: &mut T,
    student_id: &StudentId,
) -> Result<(), EnrollError> {
    if !tx.student_exists(student_id).await? {
        return Err(EnrollError::StudentNotFound {
            student_id: student_id.to_string(),
        });
    }
    debug!(student = %student_id, "student exists");
    Ok(())
}

/// 2. At least one course must be requested.
pub fn check_not_empty(batch: &CourseBatch) -> Result<(), EnrollError> {
    if batch.is_empty() {
        return Err(ValidationError::Empty { field: "courseIds" }.into());
    }
    Ok(())
}

/// 3. Every requested course must exist.
///
/// Compares ids, not counts, so a repeated id can never stand in for a
/// missing one.
pub async fn check_courses_exist<T: EnrollmentTx>(
    tx: &mut T,
    batch: &CourseBatch,
) -> Result<(), EnrollError> {
    let found: BTreeSet<_> = tx.existing_courses(batch.ids()).await?.into_iter().collect();
    let missing: Vec<_> = batch
        .ids()
        .iter()
        .copied()
        .filter(|id| !found.contains(id))
        .collect();

    if !missing.is_empty() {
        return Err(EnrollError::CoursesNotFound { missing });
    }
    debug!(courses = batch.len(), "all courses exist");
    Ok(())
}

/// 4. The student must not already hold any of the courses.
pub async fn check_not_enrolled<T: EnrollmentTx>(
    tx: &mut T,
    student_id: &StudentId,
    batch: &CourseBatch,
) -> Result<(), EnrollError> {
    let course_ids = tx.enrolled_courses(student_id, batch.ids()).await?;
    if !course_ids.is_empty() {
        return Err(EnrollError::AlreadyEnrolled { course_ids });
    }
    Ok(())
}

/// 5. Every course must have a free seat. One full course rejects the batch.
pub async fn check_capacity<T: EnrollmentTx>(
    tx: &mut T,
    batch: &CourseBatch,
) -> Result<(), EnrollError> {
    let course_ids = tx.full_courses(batch.ids()).await?;
    if !course_ids.is_empty() {
        return Err(EnrollError::CapacityReached { course_ids });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::models::{Enrollment, Student};
    use crate::store::EnrollmentStore;
    use chrono::NaiveDate;

    async fn seeded() -> (MemoryStore, StudentId) {
        let store = MemoryStore::new();
        store
            .add_student(Student {
                student_id: "S1".into(),
                name: "Grace".into(),
                email: "grace@example.com".into(),
                gender: "F".into(),
                major: "CS".into(),
            })
            .await;
        store.add_course("Compilers", 2, 4).await;
        store.add_course("Networks", 1, 3).await;
        (store, StudentId::new("S1").unwrap())
    }

    fn batch(ids: &[i32]) -> CourseBatch {
        CourseBatch::new(ids)
    }

    #[tokio::test]
    async fn passes_for_valid_request() {
        let (store, student) = seeded().await;
        let mut tx = store.begin().await.unwrap();
        validate(&mut tx, &student, &batch(&[1, 2])).await.unwrap();
    }

    #[tokio::test]
    async fn missing_ids_are_reported() {
        let (store, _) = seeded().await;
        let mut tx = store.begin().await.unwrap();
        let err = check_courses_exist(&mut tx, &batch(&[1, 7, 9])).await.unwrap_err();
        match err {
            EnrollError::CoursesNotFound { missing } => assert_eq!(missing, vec![7, 9]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn repeated_id_does_not_mask_missing_one() {
        let (store, student) = seeded().await;
        let mut tx = store.begin().await.unwrap();
        let err = validate(&mut tx, &student, &batch(&[1, 1, 99]))
            .await
            .unwrap_err();
        assert!(matches!(err, EnrollError::CoursesNotFound { .. }));
    }

    #[tokio::test]
    async fn student_check_runs_first() {
        let (store, _) = seeded().await;
        let ghost = StudentId::new("nobody").unwrap();
        let mut tx = store.begin().await.unwrap();
        // Course 99 is missing too, but the student check wins.
        let err = validate(&mut tx, &ghost, &batch(&[99])).await.unwrap_err();
        assert!(matches!(err, EnrollError::StudentNotFound { .. }));
    }

    #[tokio::test]
    async fn empty_batch_is_checked_after_student() {
        let (store, student) = seeded().await;
        let ghost = StudentId::new("nobody").unwrap();
        let mut tx = store.begin().await.unwrap();

        let err = validate(&mut tx, &ghost, &batch(&[])).await.unwrap_err();
        assert!(matches!(err, EnrollError::StudentNotFound { .. }));

        let err = validate(&mut tx, &student, &batch(&[])).await.unwrap_err();
        assert!(matches!(err, EnrollError::Validation(ValidationError::Empty { field: "courseIds" })));
    }

    #[tokio::test]
    async fn duplicate_check_runs_before_capacity() {
        let (store, student) = seeded().await;
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        // Student already holds the only seat of course 2: both checks would fail.
        store.add_enrollment(Enrollment::new("S1", 2, date)).await;

        let mut tx = store.begin().await.unwrap();
        let err = validate(&mut tx, &student, &batch(&[2])).await.unwrap_err();
        match err {
            EnrollError::AlreadyEnrolled { course_ids } => assert_eq!(course_ids, vec![2]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn full_course_rejects_whole_batch() {
        let (store, student) = seeded().await;
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        store.add_enrollment(Enrollment::new("S2", 2, date)).await;

        let mut tx = store.begin().await.unwrap();
        let err = validate(&mut tx, &student, &batch(&[1, 2])).await.unwrap_err();
        match err {
            EnrollError::CapacityReached { course_ids } => assert_eq!(course_ids, vec![2]),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
