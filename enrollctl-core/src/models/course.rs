//! Course records and their validated inputs

use std::fmt;

use serde::{Deserialize, Serialize};

use super::validation::{non_negative, required_text};
use super::ValidationError;

/// Store-generated course identifier
pub type CourseId = i32;

/// Maximum length for course names
const MAX_COURSE_NAME_LEN: usize = 128;

/// Validated course name (trimmed, non-empty)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CourseName(String);

impl CourseName {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        required_text(s, "name", MAX_COURSE_NAME_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CourseName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CourseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Course record as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub max_capacity: i32,
    pub credits: i32,
}

/// Create-course request body
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewCourse {
    pub name: String,
    pub max_capacity: i32,
    pub credits: i32,
}

impl NewCourse {
    /// Validate and return a normalized copy.
    pub fn validate(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: CourseName::new(&self.name)?.0,
            max_capacity: non_negative(self.max_capacity, "maxCapacity")?,
            credits: non_negative(self.credits, "credits")?,
        })
    }
}

/// Partial course update; only supplied fields change
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePatch {
    pub name: Option<String>,
    pub max_capacity: Option<i32>,
    pub credits: Option<i32>,
}

impl CoursePatch {
    /// Validate supplied fields, returning a normalized patch.
    pub fn validate(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: self
                .name
                .as_deref()
                .map(|n| CourseName::new(n).map(|n| n.0))
                .transpose()?,
            max_capacity: self
                .max_capacity
                .map(|v| non_negative(v, "maxCapacity"))
                .transpose()?,
            credits: self.credits.map(|v| non_negative(v, "credits")).transpose()?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.max_capacity.is_none() && self.credits.is_none()
    }
}
