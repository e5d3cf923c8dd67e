//! Common validation utilities.

use validator::ValidationError;

/// Maximum number of ingredients on a single dish.
const MAX_INGREDIENTS: usize = 100;

/// Maximum length of a single ingredient line.
const MAX_INGREDIENT_LEN: usize = 200;

/// Normalizes an email for storage and comparison: trimmed and lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates that a name is not blank after trimming.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value cannot be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Validates a dish ingredient list: bounded size, no blank entries.
pub fn validate_ingredients(ingredients: &[String]) -> Result<(), ValidationError> {
    if ingredients.len() > MAX_INGREDIENTS {
        let mut err = ValidationError::new("ingredients_count");
        err.message = Some(format!("At most {} ingredients are allowed", MAX_INGREDIENTS).into());
        return Err(err);
    }

    for ingredient in ingredients {
        if ingredient.trim().is_empty() {
            let mut err = ValidationError::new("ingredient_blank");
            err.message = Some("Ingredients cannot be blank".into());
            return Err(err);
        }
        if ingredient.len() > MAX_INGREDIENT_LEN {
            let mut err = ValidationError::new("ingredient_length");
            err.message = Some(
                format!(
                    "Ingredients must be at most {} characters",
                    MAX_INGREDIENT_LEN
                )
                .into(),
            );
            return Err(err);
        }
    }

    Ok(())
}

/// Validates a list of free-form tags: no blank entries.
pub fn validate_tags(tags: &[String]) -> Result<(), ValidationError> {
    if tags.iter().any(|t| t.trim().is_empty()) {
        let mut err = ValidationError::new("tag_blank");
        err.message = Some("Tags cannot be blank".into());
        return Err(err);
    }
    Ok(())
}
