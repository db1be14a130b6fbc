pub mod email;
pub mod group;
pub mod recipe;

pub use email::validate_email;
pub use group::{validate_group_description, validate_group_name};
pub use recipe::{
    validate_difficulty, validate_ingredients, validate_instructions, validate_prep_time,
    validate_rating, validate_recipe_category, validate_recipe_title,
};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValidationError {
    EmailEmpty,
    EmailTooLong,
    EmailInvalidFormat,
    PasswordEmpty,
    PasswordTooShort,
    PasswordTooLong,
    NameEmpty,
    NameTooLong,
    GroupNameTooShort,
    GroupNameTooLong,
    GroupDescriptionTooLong,
    TitleEmpty,
    TitleTooLong,
    CategoryEmpty,
    IngredientsEmpty,
    InstructionsEmpty,
    PrepTimeTooShort,
    DifficultyOutOfRange,
    RatingOutOfRange,
    VisibilityInvalid,
    GroupIdsEmpty,
    RoleInvalid,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmailEmpty => write!(f, "Email cannot be empty"),
            Self::EmailTooLong => write!(f, "Email is too long (max 254 characters)"),
            Self::EmailInvalidFormat => write!(f, "Invalid email format"),
            Self::PasswordEmpty => write!(f, "Password cannot be empty"),
            Self::PasswordTooShort => write!(f, "Password must be at least 8 characters"),
            Self::PasswordTooLong => write!(f, "Password is too long (max 128 characters)"),
            Self::NameEmpty => write!(f, "Name cannot be empty"),
            Self::NameTooLong => write!(f, "Name is too long (max 100 characters)"),
            Self::GroupNameTooShort => write!(f, "Group name must be at least 2 characters"),
            Self::GroupNameTooLong => write!(f, "Group name is too long (max 100 characters)"),
            Self::GroupDescriptionTooLong => {
                write!(f, "Group description is too long (max 500 characters)")
            }
            Self::TitleEmpty => write!(f, "Title cannot be empty"),
            Self::TitleTooLong => write!(f, "Title is too long (max 200 characters)"),
            Self::CategoryEmpty => write!(f, "Category cannot be empty"),
            Self::IngredientsEmpty => write!(f, "At least one ingredient is required"),
            Self::InstructionsEmpty => write!(f, "At least one instruction is required"),
            Self::PrepTimeTooShort => write!(f, "Prep time must be at least 1 minute"),
            Self::DifficultyOutOfRange => write!(f, "Difficulty must be between 1 and 5"),
            Self::RatingOutOfRange => write!(f, "Rating must be between 0 and 5"),
            Self::VisibilityInvalid => write!(f, "Invalid visibility value"),
            Self::GroupIdsEmpty => {
                write!(f, "Group recipes must belong to at least one group")
            }
            Self::RoleInvalid => write!(f, "Invalid group role"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// A map of field name to validation message, reported whole to the client.
///
/// Collected so a request with several bad fields is rejected once with all
/// of its problems, not one at a time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, error: ValidationError) {
        self.0.insert(field.to_owned(), error.to_string());
    }

    /// Records a check's outcome under `field` if it failed.
    pub fn check(&mut self, field: &str, result: Result<(), ValidationError>) {
        if let Err(err) = result {
            self.push(field, err);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.0
    }

    /// One-line rendering for logs and `Display`.
    #[must_use]
    pub fn summary(&self) -> String {
        self.0
            .iter()
            .map(|(field, msg)| format!("{field}: {msg}"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Returns `Ok(())` when no field failed, otherwise the collected map.
    pub fn into_result(self) -> Result<(), crate::HearthError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(crate::HearthError::Validation(self))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_errors_collects_all_failures() {
        let mut errors = FieldErrors::new();
        errors.check("email", Err(ValidationError::EmailInvalidFormat));
        errors.check("name", Ok(()));
        errors.check("title", Err(ValidationError::TitleEmpty));

        assert!(!errors.is_empty());
        assert_eq!(errors.fields().len(), 2);
        assert!(errors.fields().contains_key("email"));
        assert!(errors.fields().contains_key("title"));
    }

    #[test]
    fn test_field_errors_into_result() {
        let errors = FieldErrors::new();
        assert!(errors.into_result().is_ok());

        let mut errors = FieldErrors::new();
        errors.push("rating", ValidationError::RatingOutOfRange);
        let err = errors.into_result().unwrap_err();
        assert!(matches!(err, crate::HearthError::Validation(_)));
    }
}
