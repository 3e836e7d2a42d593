//! Course endpoints

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use enrollctl_core::{Course, CoursePatch, NewCourse};
use tracing::instrument;

use super::MessageResponse;
use crate::db::repos::CourseRepo;
use crate::http::error::ApiError;
use crate::http::extractors::{JsonBody, ValidCourseId};
use crate::http::server::AppState;

/// GET /courses - every course, ordered by id
#[instrument(skip(state))]
async fn list_courses(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Course>>, ApiError> {
    let courses = CourseRepo::new(&state.pool).list().await?;
    Ok(Json(courses))
}

/// POST /courses - create a course; the store assigns its id
#[instrument(skip(state, req), fields(name = %req.name))]
async fn create_course(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<NewCourse>,
) -> Result<(StatusCode, Json<Course>), ApiError> {
    let course = req.validate()?;
    let created = CourseRepo::new(&state.pool).create(&course).await?;
    tracing::info!(course = created.id, "Created course");

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /courses/{course_id}
#[instrument(skip(state), fields(course = id))]
async fn get_course(
    State(state): State<Arc<AppState>>,
    ValidCourseId(id): ValidCourseId,
) -> Result<Json<Course>, ApiError> {
    let course = CourseRepo::new(&state.pool).get(id).await?;
    Ok(Json(course))
}

/// PUT /courses/{course_id} - only supplied fields change
#[instrument(skip(state, patch), fields(course = id))]
async fn update_course(
    State(state): State<Arc<AppState>>,
    ValidCourseId(id): ValidCourseId,
    JsonBody(patch): JsonBody<CoursePatch>,
) -> Result<Json<Course>, ApiError> {
    let patch = patch.validate()?;
    let course = CourseRepo::new(&state.pool).update(id, &patch).await?;
    Ok(Json(course))
}

/// DELETE /courses/{course_id} - enrollments cascade
#[instrument(skip(state), fields(course = id))]
async fn delete_course(
    State(state): State<Arc<AppState>>,
    ValidCourseId(id): ValidCourseId,
) -> Result<Json<MessageResponse>, ApiError> {
    CourseRepo::new(&state.pool).delete(id).await?;
    tracing::info!("Deleted course");

    Ok(Json(MessageResponse::new("Course deleted successfully")))
}

/// Course routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/courses", get(list_courses).post(create_course))
        .route(
            "/courses/{course_id}",
            get(get_course).put(update_course).delete(delete_course),
        )
}
