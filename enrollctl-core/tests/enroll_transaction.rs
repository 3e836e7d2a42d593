//! End-to-end behavior of the enrollment transaction against the in-memory store

use chrono::NaiveDate;
use enrollctl_core::{
    enroll_courses, enroll_courses_on, EnrollError, Enrollment, MemoryStore, Student, StudentId,
};

fn student(id: &str) -> Student {
    Student {
        student_id: id.into(),
        name: format!("Student {id}"),
        email: format!("{}@example.com", id.to_lowercase()),
        gender: "X".into(),
        major: "Undeclared".into(),
    }
}

fn sid(id: &str) -> StudentId {
    StudentId::new(id).unwrap()
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 1).unwrap()
}

/// S1 and S2 exist; courses 1 and 2 have 30 seats, course 3 has one.
async fn campus() -> MemoryStore {
    let store = MemoryStore::new();
    store.add_student(student("S1")).await;
    store.add_student(student("S2")).await;
    store.add_course("Algorithms", 30, 4).await;
    store.add_course("Databases", 30, 3).await;
    store.add_course("Quantum Computing", 1, 5).await;
    store
}

// === Success ===

#[tokio::test]
async fn enrolls_in_every_requested_course() {
    let store = campus().await;

    let receipt = enroll_courses_on(&store, &sid("S1"), &[1, 2], date())
        .await
        .unwrap();

    assert_eq!(receipt.course_ids, vec![1, 2]);
    assert_eq!(receipt.rows_written, 2);

    let rows = store.enrollments_for("S1").await;
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|e| e.enrollment_date == date()));
}

#[tokio::test]
async fn default_date_is_today() {
    let store = campus().await;
    let today = chrono::Local::now().date_naive();

    let receipt = enroll_courses(&store, &sid("S1"), &[1]).await.unwrap();

    // Tolerate a run that straddles midnight.
    assert!(receipt.enrolled_on >= today);
    assert_eq!(store.enrollments_for("S1").await[0].enrollment_date, receipt.enrolled_on);
}

#[tokio::test]
async fn repeated_ids_enroll_once() {
    let store = campus().await;

    enroll_courses_on(&store, &sid("S1"), &[1, 1], date())
        .await
        .unwrap();

    assert_eq!(store.enrollments_for("S1").await.len(), 1);
}

#[tokio::test]
async fn last_seat_can_be_taken() {
    let store = campus().await;
    enroll_courses_on(&store, &sid("S1"), &[3], date())
        .await
        .unwrap();
    assert_eq!(store.enrollment_count(3).await, 1);
}

// === Rejections ===

#[tokio::test]
async fn unknown_student_is_not_found() {
    let store = campus().await;

    for courses in [vec![1], vec![1, 2], vec![42], vec![]] {
        let err = enroll_courses_on(&store, &sid("ghost"), &courses, date())
            .await
            .unwrap_err();
        assert!(matches!(err, EnrollError::StudentNotFound { .. }));
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.to_string(), "Student Not Found");
    }
    assert!(store.enrollments().await.is_empty());
}

#[tokio::test]
async fn unknown_course_is_not_found_and_writes_nothing() {
    let store = campus().await;

    let err = enroll_courses_on(&store, &sid("S1"), &[1, 2, 77], date())
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 404);
    assert_eq!(err.to_string(), "Some course IDs Are Not Found");
    assert!(store.enrollments().await.is_empty());
}

#[tokio::test]
async fn repeated_valid_id_does_not_mask_missing_id() {
    let store = campus().await;

    let err = enroll_courses_on(&store, &sid("S1"), &[1, 1, 99], date())
        .await
        .unwrap_err();

    match err {
        EnrollError::CoursesNotFound { missing } => assert_eq!(missing, vec![99]),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(store.enrollments().await.is_empty());
}

#[tokio::test]
async fn re_enrolling_is_conflict_even_with_new_courses() {
    let store = campus().await;
    enroll_courses_on(&store, &sid("S1"), &[1], date())
        .await
        .unwrap();

    let err = enroll_courses_on(&store, &sid("S1"), &[1, 2], date())
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 409);
    assert_eq!(err.to_string(), "You can't enrolled some courses again");
    let rows = store.enrollments_for("S1").await;
    assert_eq!(rows.len(), 1, "course 2 must not be enrolled");
    assert_eq!(rows[0].course_id, 1);
}

#[tokio::test]
async fn full_course_rejects_entire_batch() {
    let store = campus().await;
    store.add_enrollment(Enrollment::new("S2", 3, date())).await;

    let err = enroll_courses_on(&store, &sid("S1"), &[1, 2, 3], date())
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 409);
    assert_eq!(err.to_string(), "Some courses have reached max capacity");
    assert!(store.enrollments_for("S1").await.is_empty());
}

#[tokio::test]
async fn capacity_one_course_with_one_enrollment_rejects_new_student() {
    let store = MemoryStore::new();
    store.add_student(student("S1")).await;
    store.add_student(student("S2")).await;
    let course = store.add_course("Tutorial", 1, 1).await;
    store.add_enrollment(Enrollment::new("S2", course.id, date())).await;

    let err = enroll_courses_on(&store, &sid("S1"), &[course.id], date())
        .await
        .unwrap_err();

    assert!(matches!(err, EnrollError::CapacityReached { .. }));
    assert_eq!(store.enrollments().await.len(), 1);
}

#[tokio::test]
async fn zero_capacity_course_is_always_full() {
    let store = campus().await;
    let closed = store.add_course("Closed Lab", 0, 1).await;

    let err = enroll_courses_on(&store, &sid("S1"), &[closed.id], date())
        .await
        .unwrap_err();

    assert!(matches!(err, EnrollError::CapacityReached { .. }));
}

#[tokio::test]
async fn unknown_student_with_empty_batch_is_not_found() {
    let store = MemoryStore::new();

    let err = enroll_courses_on(&store, &sid("ghost"), &[], date())
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 404);
    assert_eq!(err.to_string(), "Student Not Found");
}

#[tokio::test]
async fn empty_request_is_bad_request() {
    let store = campus().await;

    let err = enroll_courses_on(&store, &sid("S1"), &[], date())
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 400);
    assert_eq!(err.to_string(), "courseIds cannot be empty");
}

// === Store failures ===

#[tokio::test]
async fn begin_failure_is_internal() {
    let store = campus().await;
    store.fail_next_begin();

    let err = enroll_courses_on(&store, &sid("S1"), &[1], date())
        .await
        .unwrap_err();

    assert!(matches!(err, EnrollError::Begin(_)));
    assert_eq!(err.status_code(), 500);
    assert_eq!(err.to_string(), "memory store: begin refused");
}

#[tokio::test]
async fn commit_failure_is_internal_and_persists_nothing() {
    let store = campus().await;
    store.fail_next_commit();

    let err = enroll_courses_on(&store, &sid("S1"), &[1, 2], date())
        .await
        .unwrap_err();

    assert!(matches!(err, EnrollError::Commit(_)));
    assert_eq!(err.status_code(), 500);
    assert!(store.enrollments().await.is_empty());

    // The store is usable again afterwards.
    enroll_courses_on(&store, &sid("S1"), &[1, 2], date())
        .await
        .unwrap();
    assert_eq!(store.enrollments_for("S1").await.len(), 2);
}

// === Concurrency ===

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_enrollments_never_oversubscribe_last_seat() {
    let store = campus().await;

    let handles: Vec<_> = ["S1", "S2"]
        .into_iter()
        .map(|id| {
            let store = store.clone();
            tokio::spawn(async move { enroll_courses_on(&store, &sid(id), &[3], date()).await })
        })
        .collect();

    let mut successes = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.expect("task panicked") {
            Ok(_) => successes += 1,
            Err(EnrollError::CapacityReached { .. }) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(conflicts, 1);
    assert_eq!(store.enrollment_count(3).await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_fill_course_exactly_to_capacity() {
    let store = MemoryStore::new();
    let course = store.add_course("Popular", 5, 3).await;
    for i in 0..20 {
        store.add_student(student(&format!("S{i}"))).await;
    }

    let handles: Vec<_> = (0..20)
        .map(|i| {
            let store = store.clone();
            let course_id = course.id;
            tokio::spawn(async move {
                enroll_courses_on(&store, &sid(&format!("S{i}")), &[course_id], date()).await
            })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        if handle.await.expect("task panicked").is_ok() {
            successes += 1;
        }
    }

    assert_eq!(successes, 5);
    assert_eq!(store.enrollment_count(course.id).await, 5);
}
