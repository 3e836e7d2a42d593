//! Course repository
//!
//! Course names are unique. Writes check the name explicitly first so the
//! caller gets a conflict, and map a unique violation from a racing writer
//! to the same conflict.

use enrollctl_core::{Course, CourseId, CoursePatch, NewCourse};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::{is_unique_violation, DbError};

const NAME_TAKEN: &str = "Course name already exists";

/// Course repository
pub struct CourseRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> CourseRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All courses, ordered by id.
    pub async fn list(&self) -> Result<Vec<Course>, DbError> {
        let rows = sqlx::query("SELECT id, name, max_capacity, credits FROM courses ORDER BY id")
            .fetch_all(self.pool)
            .await?;

        Ok(rows.iter().map(course_from_row).collect())
    }

    /// One course by id.
    pub async fn get(&self, id: CourseId) -> Result<Course, DbError> {
        let row = sqlx::query("SELECT id, name, max_capacity, credits FROM courses WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| not_found(id))?;

        Ok(course_from_row(&row))
    }

    /// Number of courses with this id (0 or 1).
    pub async fn count(&self, id: CourseId) -> Result<i64, DbError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses WHERE id = $1")
            .bind(id)
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Whether a course other than `except` already uses `name`.
    pub async fn name_taken(&self, name: &str, except: Option<CourseId>) -> Result<bool, DbError> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM courses WHERE name = $1 AND ($2::int4 IS NULL OR id <> $2))",
        )
        .bind(name)
        .bind(except)
        .fetch_one(self.pool)
        .await?;
        Ok(taken)
    }

    /// Insert a validated course, returning it with its generated id.
    pub async fn create(&self, course: &NewCourse) -> Result<Course, DbError> {
        if self.name_taken(&course.name, None).await? {
            return Err(DbError::Conflict {
                message: NAME_TAKEN,
            });
        }

        let row = sqlx::query(
            r#"
            INSERT INTO courses (name, max_capacity, credits)
            VALUES ($1, $2, $3)
            RETURNING id, name, max_capacity, credits
            "#,
        )
        .bind(&course.name)
        .bind(course.max_capacity)
        .bind(course.credits)
        .fetch_one(self.pool)
        .await
        .map_err(map_name_conflict)?;

        Ok(course_from_row(&row))
    }

    /// Apply a validated patch, returning the updated record.
    pub async fn update(&self, id: CourseId, patch: &CoursePatch) -> Result<Course, DbError> {
        if self.count(id).await? == 0 {
            return Err(not_found(id));
        }
        if let Some(name) = &patch.name {
            if self.name_taken(name, Some(id)).await? {
                return Err(DbError::Conflict {
                    message: NAME_TAKEN,
                });
            }
        }
        if patch.is_empty() {
            return self.get(id).await;
        }

        let row = sqlx::query(
            r#"
            UPDATE courses SET
                name = COALESCE($2, name),
                max_capacity = COALESCE($3, max_capacity),
                credits = COALESCE($4, credits)
            WHERE id = $1
            RETURNING id, name, max_capacity, credits
            "#,
        )
        .bind(id)
        .bind(patch.name.as_deref())
        .bind(patch.max_capacity)
        .bind(patch.credits)
        .fetch_optional(self.pool)
        .await
        .map_err(map_name_conflict)?
        .ok_or_else(|| not_found(id))?;

        Ok(course_from_row(&row))
    }

    /// Delete a course; its enrollments cascade.
    pub async fn delete(&self, id: CourseId) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}

pub(crate) fn course_from_row(row: &PgRow) -> Course {
    Course {
        id: row.get("id"),
        name: row.get("name"),
        max_capacity: row.get("max_capacity"),
        credits: row.get("credits"),
    }
}

fn map_name_conflict(err: sqlx::Error) -> DbError {
    if is_unique_violation(&err) {
        DbError::Conflict {
            message: NAME_TAKEN,
        }
    } else {
        DbError::Sqlx(err)
    }
}

fn not_found(id: CourseId) -> DbError {
    DbError::NotFound {
        resource: "Course",
        id: id.to_string(),
    }
}
