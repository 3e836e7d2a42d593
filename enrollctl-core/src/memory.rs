//! In-memory enrollment store
//!
//! Transactions are serializable: `begin` takes an exclusive lock on the whole
//! store and works on a private copy of it; `commit` swaps the copy in and
//! dropping the transaction throws it away. Used by tests and by anything
//! that needs the enrollment rules without a database.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::StoreError;
use crate::models::{Course, CourseId, Enrollment, Student, StudentId};
use crate::store::{EnrollmentStore, EnrollmentTx};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    students: BTreeMap<String, Student>,
    courses: BTreeMap<CourseId, Course>,
    enrollments: BTreeMap<(String, CourseId), Enrollment>,
    last_course_id: CourseId,
}

impl MemoryState {
    fn enrollment_count(&self, course_id: CourseId) -> usize {
        self.enrollments
            .values()
            .filter(|e| e.course_id == course_id)
            .count()
    }
}

/// One-shot failure switches
#[derive(Debug, Default)]
struct Faults {
    begin: AtomicBool,
    commit: AtomicBool,
}

/// Shared in-memory store; clones share the same data
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    faults: Arc<Faults>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a student.
    pub async fn add_student(&self, student: Student) {
        let mut state = self.state.lock().await;
        state.students.insert(student.student_id.clone(), student);
    }

    /// Insert a course with the next generated id.
    pub async fn add_course(&self, name: &str, max_capacity: i32, credits: i32) -> Course {
        let mut state = self.state.lock().await;
        state.last_course_id += 1;
        let course = Course {
            id: state.last_course_id,
            name: name.to_owned(),
            max_capacity,
            credits,
        };
        state.courses.insert(course.id, course.clone());
        course
    }

    /// Insert an enrollment directly, bypassing every enrollment check.
    pub async fn add_enrollment(&self, enrollment: Enrollment) {
        let mut state = self.state.lock().await;
        state
            .enrollments
            .insert((enrollment.student_id.clone(), enrollment.course_id), enrollment);
    }

    /// All committed enrollments, ordered by (student, course).
    pub async fn enrollments(&self) -> Vec<Enrollment> {
        self.state.lock().await.enrollments.values().cloned().collect()
    }

    /// Committed enrollments of one student.
    pub async fn enrollments_for(&self, student_id: &str) -> Vec<Enrollment> {
        self.state
            .lock()
            .await
            .enrollments
            .values()
            .filter(|e| e.student_id == student_id)
            .cloned()
            .collect()
    }

    /// Committed enrollments of one course.
    pub async fn enrollment_count(&self, course_id: CourseId) -> usize {
        self.state.lock().await.enrollment_count(course_id)
    }

    /// Make the next `begin` fail.
    pub fn fail_next_begin(&self) {
        self.faults.begin.store(true, Ordering::SeqCst);
    }

    /// Make the next `commit` fail.
    pub fn fail_next_commit(&self) {
        self.faults.commit.store(true, Ordering::SeqCst);
    }
}

/// Open transaction over a [`MemoryStore`]
#[derive(Debug)]
pub struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
    faults: Arc<Faults>,
}

#[async_trait]
impl EnrollmentStore for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx, StoreError> {
        if self.faults.begin.swap(false, Ordering::SeqCst) {
            return Err(StoreError::message("memory store: begin refused"));
        }

        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.clone();
        Ok(MemoryTx {
            guard,
            working,
            faults: Arc::clone(&self.faults),
        })
    }
}

#[async_trait]
impl EnrollmentTx for MemoryTx {
    async fn student_exists(&mut self, student_id: &StudentId) -> Result<bool, StoreError> {
        Ok(self.working.students.contains_key(student_id.as_str()))
    }

    async fn existing_courses(&mut self, course_ids: &[CourseId]) -> Result<Vec<CourseId>, StoreError> {
        Ok(course_ids
            .iter()
            .copied()
            .filter(|id| self.working.courses.contains_key(id))
            .collect())
    }

    async fn enrolled_courses(
        &mut self,
        student_id: &StudentId,
        course_ids: &[CourseId],
    ) -> Result<Vec<CourseId>, StoreError> {
        Ok(course_ids
            .iter()
            .copied()
            .filter(|id| {
                self.working
                    .enrollments
                    .contains_key(&(student_id.as_str().to_owned(), *id))
            })
            .collect())
    }

    async fn full_courses(&mut self, course_ids: &[CourseId]) -> Result<Vec<CourseId>, StoreError> {
        Ok(course_ids
            .iter()
            .filter_map(|id| self.working.courses.get(id))
            .filter(|course| {
                let taken = self.working.enrollment_count(course.id) as i64;
                taken >= i64::from(course.max_capacity)
            })
            .map(|course| course.id)
            .collect())
    }

    async fn insert_enrollments(
        &mut self,
        student_id: &StudentId,
        course_ids: &[CourseId],
        enrolled_on: NaiveDate,
    ) -> Result<u64, StoreError> {
        for &course_id in course_ids {
            let key = (student_id.as_str().to_owned(), course_id);
            if self.working.enrollments.contains_key(&key) {
                return Err(StoreError::UniqueViolation(format!(
                    "enrollment ({}, {}) already exists",
                    student_id, course_id
                )));
            }
            self.working
                .enrollments
                .insert(key, Enrollment::new(student_id.as_str(), course_id, enrolled_on));
        }
        Ok(course_ids.len() as u64)
    }

    async fn commit(self) -> Result<(), StoreError> {
        if self.faults.commit.swap(false, Ordering::SeqCst) {
            return Err(StoreError::message("memory store: commit refused"));
        }

        let MemoryTx {
            mut guard, working, ..
        } = self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        Ok(())
    }
}
