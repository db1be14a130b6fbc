use super::ValidationError;

pub fn validate_recipe_title(title: &str) -> Result<(), ValidationError> {
    let trimmed = title.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::TitleEmpty);
    }

    if trimmed.len() > 200 {
        return Err(ValidationError::TitleTooLong);
    }

    Ok(())
}

pub fn validate_recipe_category(category: &str) -> Result<(), ValidationError> {
    if category.trim().is_empty() {
        return Err(ValidationError::CategoryEmpty);
    }

    Ok(())
}

pub fn validate_ingredients(ingredients: &[String]) -> Result<(), ValidationError> {
    if ingredients.iter().all(|i| i.trim().is_empty()) {
        return Err(ValidationError::IngredientsEmpty);
    }

    Ok(())
}

pub fn validate_instructions(instructions: &[String]) -> Result<(), ValidationError> {
    if instructions.iter().all(|i| i.trim().is_empty()) {
        return Err(ValidationError::InstructionsEmpty);
    }

    Ok(())
}

pub fn validate_prep_time(prep_time: u32) -> Result<(), ValidationError> {
    if prep_time < 1 {
        return Err(ValidationError::PrepTimeTooShort);
    }

    Ok(())
}

pub fn validate_difficulty(difficulty: u8) -> Result<(), ValidationError> {
    if !(1..=5).contains(&difficulty) {
        return Err(ValidationError::DifficultyOutOfRange);
    }

    Ok(())
}

pub fn validate_rating(rating: u8) -> Result<(), ValidationError> {
    if rating > 5 {
        return Err(ValidationError::RatingOutOfRange);
    }

    Ok(())
}
