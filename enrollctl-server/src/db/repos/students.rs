//! Student repository
//!
//! - create: explicit id pre-check, unique violation as backstop
//! - update: single COALESCE update, only supplied fields change

use enrollctl_core::{Student, StudentId, StudentPatch};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::{is_unique_violation, DbError};

const STUDENT_EXISTS: &str = "Student ID already exists";

/// Student repository
pub struct StudentRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> StudentRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All students, ordered by id.
    pub async fn list(&self) -> Result<Vec<Student>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT student_id, name, email, gender, major
            FROM students
            ORDER BY student_id
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.iter().map(student_from_row).collect())
    }

    /// One student by id.
    pub async fn get(&self, id: &StudentId) -> Result<Student, DbError> {
        let row = sqlx::query(
            r#"
            SELECT student_id, name, email, gender, major
            FROM students
            WHERE student_id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| not_found(id))?;

        Ok(student_from_row(&row))
    }

    /// Number of students with this id (0 or 1).
    pub async fn count(&self, id: &str) -> Result<i64, DbError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students WHERE student_id = $1")
            .bind(id)
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Insert a validated student.
    pub async fn create(&self, student: &Student) -> Result<Student, DbError> {
        if self.count(&student.student_id).await? > 0 {
            return Err(DbError::Conflict {
                message: STUDENT_EXISTS,
            });
        }

        let row = sqlx::query(
            r#"
            INSERT INTO students (student_id, name, email, gender, major)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING student_id, name, email, gender, major
            "#,
        )
        .bind(&student.student_id)
        .bind(&student.name)
        .bind(&student.email)
        .bind(&student.gender)
        .bind(&student.major)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DbError::Conflict {
                    message: STUDENT_EXISTS,
                }
            } else {
                DbError::Sqlx(e)
            }
        })?;

        Ok(student_from_row(&row))
    }

    /// Apply a validated patch, returning the updated record.
    pub async fn update(&self, id: &StudentId, patch: &StudentPatch) -> Result<Student, DbError> {
        if patch.is_empty() {
            return self.get(id).await;
        }

        let row = sqlx::query(
            r#"
            UPDATE students SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                gender = COALESCE($4, gender),
                major = COALESCE($5, major)
            WHERE student_id = $1
            RETURNING student_id, name, email, gender, major
            "#,
        )
        .bind(id.as_str())
        .bind(patch.name.as_deref())
        .bind(patch.email.as_deref())
        .bind(patch.gender.as_deref())
        .bind(patch.major.as_deref())
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| not_found(id))?;

        Ok(student_from_row(&row))
    }

    /// Delete a student; their enrollments cascade.
    pub async fn delete(&self, id: &StudentId) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM students WHERE student_id = $1")
            .bind(id.as_str())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}

fn student_from_row(row: &PgRow) -> Student {
    Student {
        student_id: row.get("student_id"),
        name: row.get("name"),
        email: row.get("email"),
        gender: row.get("gender"),
        major: row.get("major"),
    }
}

fn not_found(id: &StudentId) -> DbError {
    DbError::NotFound {
        resource: "Student",
        id: id.to_string(),
    }
}
