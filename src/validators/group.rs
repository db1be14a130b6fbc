use super::ValidationError;

pub fn validate_group_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();

    if trimmed.len() < 2 {
        return Err(ValidationError::GroupNameTooShort);
    }

    if trimmed.len() > 100 {
        return Err(ValidationError::GroupNameTooLong);
    }

    Ok(())
}

pub fn validate_group_description(description: &str) -> Result<(), ValidationError> {
    if description.trim().len() > 500 {
        return Err(ValidationError::GroupDescriptionTooLong);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_group_names() {
        assert!(validate_group_name("Family").is_ok());
        assert!(validate_group_name("Ha").is_ok());
        assert!(validate_group_name("סבתא של כולם").is_ok());
    }

    #[test]
    fn test_group_name_too_short() {
        assert_eq!(
            validate_group_name("a").unwrap_err(),
            ValidationError::GroupNameTooShort
        );
        assert_eq!(
            validate_group_name("  a  ").unwrap_err(),
            ValidationError::GroupNameTooShort
        );
    }

    #[test]
    fn test_group_name_too_long() {
        let long = "a".repeat(101);
        assert_eq!(
            validate_group_name(&long).unwrap_err(),
            ValidationError::GroupNameTooLong
        );
    }

    #[test]
    fn test_description_limits() {
        assert!(validate_group_description("").is_ok());
        assert!(validate_group_description("weekend bakes").is_ok());
        let long = "d".repeat(501);
        assert_eq!(
            validate_group_description(&long).unwrap_err(),
            ValidationError::GroupDescriptionTooLong
        );
    }
}
