//! Enrollment endpoints
//!
//! `POST /students/{student_id}/enroll` runs the enrollment transaction;
//! `GET /students/{student_id}/courses` lists what a student is enrolled in.

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use enrollctl_core::{enroll_courses, CourseId, EnrolledCourse, EnrollmentStore, StudentId};
use serde::Deserialize;
use tracing::instrument;

use super::MessageResponse;
use crate::db::repos::{EnrollmentRepo, PgEnrollmentStore};
use crate::http::error::ApiError;
use crate::http::extractors::{JsonBody, ValidStudentId};
use crate::http::server::AppState;

/// Fixed confirmation for a committed enrollment
pub const ENROLL_SUCCESS: &str = "Success enroll courses";

/// Enroll request body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    #[serde(default)]
    pub course_ids: Vec<CourseId>,
}

/// Run the enrollment transaction against `store` and shape the response.
pub async fn enroll_with<S: EnrollmentStore>(
    store: &S,
    student_id: &StudentId,
    req: &EnrollRequest,
) -> Result<Json<MessageResponse>, ApiError> {
    enroll_courses(store, student_id, &req.course_ids).await?;
    Ok(Json(MessageResponse::new(ENROLL_SUCCESS)))
}

/// POST /students/{student_id}/enroll
#[instrument(skip(state, req), fields(student = %id, requested = req.course_ids.len()))]
async fn enroll(
    State(state): State<Arc<AppState>>,
    ValidStudentId(id): ValidStudentId,
    JsonBody(req): JsonBody<EnrollRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let store = PgEnrollmentStore::new(state.pool.clone());
    enroll_with(&store, &id, &req).await
}

/// GET /students/{student_id}/courses
#[instrument(skip(state), fields(student = %id))]
async fn student_courses(
    State(state): State<Arc<AppState>>,
    ValidStudentId(id): ValidStudentId,
) -> Result<Json<Vec<EnrolledCourse>>, ApiError> {
    let courses = EnrollmentRepo::new(&state.pool).courses_for_student(&id).await?;
    Ok(Json(courses))
}

/// Enrollment routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/students/{student_id}/enroll", post(enroll))
        .route("/students/{student_id}/courses", get(student_courses))
}
