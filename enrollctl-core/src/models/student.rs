//! Student records and their validated inputs

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::validation::required_text;
use super::ValidationError;

/// Maximum length for student ids
const MAX_STUDENT_ID_LEN: usize = 64;

/// Maximum length for free-text student fields
const MAX_TEXT_LEN: usize = 128;

/// RFC 5321 path limit
const MAX_EMAIL_LEN: usize = 254;

/// Loose `local@domain.tld` shape; deliverability is not our concern
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("invalid email regex"));

/// Validated, caller-supplied student identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StudentId(String);

impl StudentId {
    /// Create a student id.
    ///
    /// # Rules
    /// - Not empty after trimming
    /// - Max 64 characters
    /// - No inner whitespace
    ///
    /// # Example
    /// ```
    /// use enrollctl_core::StudentId;
    ///
    /// assert!(StudentId::new("S1").is_ok());
    /// assert!(StudentId::new("").is_err());
    /// assert!(StudentId::new("S 1").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let id = required_text(s, "studentId", MAX_STUDENT_ID_LEN)?;
        if id.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidFormat {
                field: "studentId",
                reason: "must not contain whitespace",
            });
        }
        Ok(Self(id))
    }

    /// Id of an existing student, as given in a request path.
    ///
    /// Only emptiness is checked. An id that breaks the creation rules
    /// cannot match any stored student, and the store reports that as
    /// not found.
    ///
    /// # Example
    /// ```
    /// use enrollctl_core::StudentId;
    ///
    /// assert_eq!(StudentId::lookup("S 1").unwrap().as_str(), "S 1");
    /// assert!(StudentId::lookup("  ").is_err());
    /// ```
    pub fn lookup(s: &str) -> Result<Self, ValidationError> {
        let id = s.trim();
        if id.is_empty() {
            return Err(ValidationError::Empty { field: "studentId" });
        }
        Ok(Self(id.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for StudentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Student record as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub student_id: String,
    pub name: String,
    pub email: String,
    pub gender: String,
    pub major: String,
}

/// Create-student request body.
///
/// Missing fields deserialize as empty and fail validation instead of
/// failing the JSON parse.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewStudent {
    pub student_id: String,
    pub name: String,
    pub email: String,
    pub gender: String,
    pub major: String,
}

impl NewStudent {
    /// Validate every field and return the normalized record.
    pub fn validate(&self) -> Result<Student, ValidationError> {
        Ok(Student {
            student_id: StudentId::new(&self.student_id)?.into_string(),
            name: required_text(&self.name, "name", MAX_TEXT_LEN)?,
            email: validate_email(&self.email)?,
            gender: required_text(&self.gender, "gender", MAX_TEXT_LEN)?,
            major: required_text(&self.major, "major", MAX_TEXT_LEN)?,
        })
    }
}

/// Partial student update; only supplied fields change
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub major: Option<String>,
}

impl StudentPatch {
    /// Validate supplied fields, returning a normalized patch.
    pub fn validate(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: self
                .name
                .as_deref()
                .map(|v| required_text(v, "name", MAX_TEXT_LEN))
                .transpose()?,
            email: self.email.as_deref().map(validate_email).transpose()?,
            gender: self
                .gender
                .as_deref()
                .map(|v| required_text(v, "gender", MAX_TEXT_LEN))
                .transpose()?,
            major: self
                .major
                .as_deref()
                .map(|v| required_text(v, "major", MAX_TEXT_LEN))
                .transpose()?,
        })
    }

    /// True when no field is supplied.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.gender.is_none() && self.major.is_none()
    }
}

fn validate_email(value: &str) -> Result<String, ValidationError> {
    let email = required_text(value, "email", MAX_EMAIL_LEN)?;
    if !EMAIL_RE.is_match(&email) {
        return Err(ValidationError::InvalidFormat {
            field: "email",
            reason: "must look like name@example.com",
        });
    }
    Ok(email)
}
