//! Student endpoints

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use enrollctl_core::{NewStudent, Student, StudentPatch};
use tracing::instrument;

use super::MessageResponse;
use crate::db::repos::StudentRepo;
use crate::http::error::ApiError;
use crate::http::extractors::{JsonBody, ValidStudentId};
use crate::http::server::AppState;

/// GET /students - every student, ordered by id
#[instrument(skip(state))]
async fn list_students(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Student>>, ApiError> {
    let students = StudentRepo::new(&state.pool).list().await?;
    Ok(Json(students))
}

/// POST /students - create a student with a caller-supplied id
#[instrument(skip(state, req), fields(student = %req.student_id))]
async fn create_student(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<NewStudent>,
) -> Result<(StatusCode, Json<Student>), ApiError> {
    let student = req.validate()?;
    let created = StudentRepo::new(&state.pool).create(&student).await?;
    tracing::info!("Created student");

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /students/{student_id}
#[instrument(skip(state), fields(student = %id))]
async fn get_student(
    State(state): State<Arc<AppState>>,
    ValidStudentId(id): ValidStudentId,
) -> Result<Json<Student>, ApiError> {
    let student = StudentRepo::new(&state.pool).get(&id).await?;
    Ok(Json(student))
}

/// PUT /students/{student_id} - only supplied fields change
#[instrument(skip(state, patch), fields(student = %id))]
async fn update_student(
    State(state): State<Arc<AppState>>,
    ValidStudentId(id): ValidStudentId,
    JsonBody(patch): JsonBody<StudentPatch>,
) -> Result<Json<Student>, ApiError> {
    let patch = patch.validate()?;
    let student = StudentRepo::new(&state.pool).update(&id, &patch).await?;
    Ok(Json(student))
}

/// DELETE /students/{student_id} - enrollments cascade
#[instrument(skip(state), fields(student = %id))]
async fn delete_student(
    State(state): State<Arc<AppState>>,
    ValidStudentId(id): ValidStudentId,
) -> Result<Json<MessageResponse>, ApiError> {
    StudentRepo::new(&state.pool).delete(&id).await?;
    tracing::info!("Deleted student");

    Ok(Json(MessageResponse::new("Student deleted successfully")))
}

/// Student routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/students", get(list_students).post(create_student))
        .route(
            "/students/{student_id}",
            get(get_student).put(update_student).delete(delete_student),
        )
}
