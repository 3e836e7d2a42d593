use chrono::NaiveDate;
use enrollctl_core::{enroll_courses_on, EnrollError, MemoryStore, Student, StudentId};
use proptest::prelude::*;

/// Courses 1..=5 exist with plenty of seats.
const KNOWN: std::ops::RangeInclusive<i32> = 1..=5;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

async fn campus() -> MemoryStore {
    let store = MemoryStore::new();
    store
        .add_student(Student {
            student_id: "S1".into(),
            name: "Prop".into(),
            email: "prop@example.com".into(),
            gender: "X".into(),
            major: "Testing".into(),
        })
        .await;
    for i in KNOWN {
        store.add_course(&format!("Course {i}"), 100, 3).await;
    }
    store
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 1).unwrap()
}

proptest! {
    /// Property: any batch containing an unknown id is NotFound and writes nothing
    #[test]
    fn prop_unknown_course_writes_nothing(
        mut ids in prop::collection::vec(KNOWN, 0..8),
        unknown in 6i32..1000,
        position in any::<prop::sample::Index>(),
    ) {
        ids.insert(position.index(ids.len() + 1), unknown);

        let rt = runtime();
        let (result, rows) = rt.block_on(async {
            let store = campus().await;
            let result = enroll_courses_on(&store, &StudentId::new("S1").unwrap(), &ids, date()).await;
            (result, store.enrollments().await.len())
        });

        prop_assert!(matches!(result, Err(EnrollError::CoursesNotFound { .. })), "expected CoursesNotFound, got {:?}", result);
        prop_assert_eq!(rows, 0);
    }

    /// Property: a batch of known ids writes exactly one row per distinct id
    #[test]
    fn prop_known_courses_write_one_row_each(ids in prop::collection::vec(KNOWN, 1..12)) {
        let distinct: std::collections::BTreeSet<_> = ids.iter().copied().collect();

        let rt = runtime();
        let rows = rt.block_on(async {
            let store = campus().await;
            enroll_courses_on(&store, &StudentId::new("S1").unwrap(), &ids, date())
                .await
                .unwrap();
            store.enrollments_for("S1").await
        });

        prop_assert_eq!(rows.len(), distinct.len());
        prop_assert!(rows.iter().all(|e| distinct.contains(&e.course_id)));
    }
}
