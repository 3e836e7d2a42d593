//! Custom Axum extractors
//!
//! All of them reject with `ApiError`, so malformed paths and bodies come
//! back as 400 with a JSON `message`.

use axum::extract::{FromRequest, FromRequestParts, Path};
use axum::http::request::Parts;
use enrollctl_core::{CourseId, StudentId};

use super::error::ApiError;

/// Extract a student id from path
///
/// Only an empty segment is rejected here; ids that cannot exist fall
/// through to the store and come back as not found.
pub struct ValidStudentId(pub StudentId);

impl<S> FromRequestParts<S> for ValidStudentId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id): Path<String> = Path::from_request_parts(parts, state).await?;
        Ok(Self(StudentId::lookup(&id)?))
    }
}

/// Extract an integer course id from path
pub struct ValidCourseId(pub CourseId);

impl<S> FromRequestParts<S> for ValidCourseId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state).await?;
        let id = raw
            .trim()
            .parse::<CourseId>()
            .map_err(|_| ApiError::bad_request("course id must be an integer"))?;
        Ok(Self(id))
    }
}

/// `Json` whose rejection is an `ApiError`
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);
