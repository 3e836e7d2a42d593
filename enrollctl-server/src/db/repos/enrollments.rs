//! Enrollment storage
//!
//! - `PgEnrollmentStore` runs the enrollment transaction on Postgres
//! - `EnrollmentRepo` lists a student's courses
//!
//! Isolation: READ COMMITTED plus `FOR UPDATE` on the requested course rows.
//! Concurrent enrollments touching the same course queue on that lock, and
//! the duplicate and capacity checks that follow it see every enrollment
//! committed before the lock was granted.

use async_trait::async_trait;
use chrono::NaiveDate;
use enrollctl_core::{
    CourseId, EnrolledCourse, EnrollmentStore, EnrollmentTx, StoreError, StudentId,
};
use sqlx::{PgPool, Postgres, Row, Transaction};

use super::courses::course_from_row;
use super::DbError;

/// Map a sqlx error into the store error the enrollment transaction expects.
fn store_error(err: sqlx::Error) -> StoreError {
    match err.as_database_error() {
        Some(db_err) if db_err.is_unique_violation() => {
            StoreError::UniqueViolation(db_err.message().to_owned())
        }
        _ => StoreError::backend(err),
    }
}

/// Postgres-backed enrollment store
#[derive(Debug, Clone)]
pub struct PgEnrollmentStore {
    pool: PgPool,
}

impl PgEnrollmentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// One open Postgres transaction; rolls back when dropped uncommitted
#[derive(Debug)]
pub struct PgEnrollmentTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl EnrollmentStore for PgEnrollmentStore {
    type Tx = PgEnrollmentTx;

    async fn begin(&self) -> Result<PgEnrollmentTx, StoreError> {
        let tx = self.pool.begin().await.map_err(store_error)?;
        Ok(PgEnrollmentTx { tx })
    }
}

#[async_trait]
impl EnrollmentTx for PgEnrollmentTx {
    async fn student_exists(&mut self, student_id: &StudentId) -> Result<bool, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students WHERE student_id = $1")
            .bind(student_id.as_str())
            .fetch_one(&mut *self.tx)
            .await
            .map_err(store_error)?;
        Ok(count == 1)
    }

    async fn existing_courses(&mut self, course_ids: &[CourseId]) -> Result<Vec<CourseId>, StoreError> {
        // Ascending lock order keeps concurrent batches from deadlocking.
        sqlx::query_scalar("SELECT id FROM courses WHERE id = ANY($1) ORDER BY id FOR UPDATE")
            .bind(course_ids)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(store_error)
    }

    async fn enrolled_courses(
        &mut self,
        student_id: &StudentId,
        course_ids: &[CourseId],
    ) -> Result<Vec<CourseId>, StoreError> {
        sqlx::query_scalar(
            r#"
            SELECT course_id
            FROM enrollments
            WHERE student_id = $1 AND course_id = ANY($2)
            ORDER BY course_id
            "#,
        )
        .bind(student_id.as_str())
        .bind(course_ids)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(store_error)
    }

    async fn full_courses(&mut self, course_ids: &[CourseId]) -> Result<Vec<CourseId>, StoreError> {
        // LEFT JOIN so courses without enrollments are counted as zero.
        sqlx::query_scalar(
            r#"
            SELECT c.id
            FROM courses c
            LEFT JOIN enrollments e ON e.course_id = c.id
            WHERE c.id = ANY($1)
            GROUP BY c.id, c.max_capacity
            HAVING COUNT(e.course_id) >= c.max_capacity
            ORDER BY c.id
            "#,
        )
        .bind(course_ids)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(store_error)
    }

    async fn insert_enrollments(
        &mut self,
        student_id: &StudentId,
        course_ids: &[CourseId],
        enrolled_on: NaiveDate,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO enrollments (student_id, course_id, enrollment_date)
            SELECT $1, course_id, $3
            FROM UNNEST($2::int4[]) AS batch(course_id)
            "#,
        )
        .bind(student_id.as_str())
        .bind(course_ids)
        .bind(enrolled_on)
        .execute(&mut *self.tx)
        .await
        .map_err(store_error)?;

        Ok(result.rows_affected())
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(store_error)
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback().await.map_err(store_error)
    }
}

/// Read side of enrollments
pub struct EnrollmentRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> EnrollmentRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Courses a student is enrolled in, with enrollment date and grade.
    pub async fn courses_for_student(&self, id: &StudentId) -> Result<Vec<EnrolledCourse>, DbError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM students WHERE student_id = $1)")
                .bind(id.as_str())
                .fetch_one(self.pool)
                .await?;
        if !exists {
            return Err(DbError::NotFound {
                resource: "Student",
                id: id.to_string(),
            });
        }

        let rows = sqlx::query(
            r#"
            SELECT c.id, c.name, c.max_capacity, c.credits, e.enrollment_date, e.grade
            FROM enrollments e
            JOIN courses c ON c.id = e.course_id
            WHERE e.student_id = $1
            ORDER BY c.id
            "#,
        )
        .bind(id.as_str())
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|r| EnrolledCourse {
                course: course_from_row(r),
                enrollment_date: r.get("enrollment_date"),
                grade: r.get("grade"),
            })
            .collect())
    }
}
