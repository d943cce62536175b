//! Post form validation
//!
//! The store accepts any field values. Front ends call `validate` before
//! `create` or `update` and show the per-field messages.

use std::fmt;

use thiserror::Error;

use crate::models::NewPost;

/// Longest allowed title, in characters
pub const MAX_TITLE_CHARS: usize = 100;

/// Longest allowed description, in characters
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// A single field that failed validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title is required")]
    TitleRequired,

    #[error("Title must be less than 100 characters")]
    TitleTooLong,

    #[error("Description is required")]
    DescriptionRequired,

    #[error("Description must be less than 500 characters")]
    DescriptionTooLong,

    #[error("Author is required")]
    AuthorRequired,
}

impl ValidationError {
    /// Name of the field this error belongs to
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::TitleRequired | ValidationError::TitleTooLong => "title",
            ValidationError::DescriptionRequired | ValidationError::DescriptionTooLong => {
                "description"
            }
            ValidationError::AuthorRequired => "author",
        }
    }
}

/// Every field error found in one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    /// The error for `field`, if any
    pub fn for_field(&self, field: &str) -> Option<&ValidationError> {
        self.0.iter().find(|e| e.field() == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Check post fields against the form rules
///
/// Lengths are counted in characters, not bytes. Blank (whitespace only)
/// values count as missing.
pub fn validate(fields: &NewPost) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    if fields.title.trim().is_empty() {
        errors.push(ValidationError::TitleRequired);
    } else if fields.title.chars().count() > MAX_TITLE_CHARS {
        errors.push(ValidationError::TitleTooLong);
    }

    if fields.description.trim().is_empty() {
        errors.push(ValidationError::DescriptionRequired);
    } else if fields.description.chars().count() > MAX_DESCRIPTION_CHARS {
        errors.push(ValidationError::DescriptionTooLong);
    }

    if fields.author.trim().is_empty() {
        errors.push(ValidationError::AuthorRequired);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}
