use thiserror::Error;

pub const TASK_TEXT_MAX: usize = 250;
pub const CATEGORY_NAME_MAX: usize = 20;

/// Form-level validation failures. The store itself accepts anything; these
/// checks belong to whoever collects input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("task text is {0} characters, the limit is {max}", max = TASK_TEXT_MAX)]
    TextTooLong(usize),
    #[error("task needs either text or a description")]
    EmptyTask,
    #[error("category name must not be empty")]
    EmptyCategoryName,
    #[error("category name is {0} characters, the limit is {max}", max = CATEGORY_NAME_MAX)]
    CategoryNameTooLong(usize),
}

/// Text may be empty only when a non-empty description accompanies it.
pub fn validate_task_text(text: &str, description: Option<&str>) -> Result<(), ValidationError> {
    let len = text.chars().count();
    if len > TASK_TEXT_MAX {
        return Err(ValidationError::TextTooLong(len));
    }
    let has_description = description.is_some_and(|d| !d.trim().is_empty());
    if text.trim().is_empty() && !has_description {
        return Err(ValidationError::EmptyTask);
    }
    Ok(())
}

pub fn validate_category_name(name: &str) -> Result<(), ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyCategoryName);
    }
    let len = name.chars().count();
    if len > CATEGORY_NAME_MAX {
        return Err(ValidationError::CategoryNameTooLong(len));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_text() {
        assert!(validate_task_text("Buy milk", None).is_ok());
        assert!(validate_task_text("", Some("<p>notes</p>")).is_ok());
        assert_eq!(validate_task_text("  ", None), Err(ValidationError::EmptyTask));
        assert_eq!(validate_task_text("", Some(" ")), Err(ValidationError::EmptyTask));
        let long = "x".repeat(251);
        assert_eq!(validate_task_text(&long, None), Err(ValidationError::TextTooLong(251)));
        assert!(validate_task_text(&"é".repeat(250), None).is_ok());
    }

    #[test]
    fn category_names() {
        assert!(validate_category_name("Errands").is_ok());
        assert_eq!(validate_category_name(" "), Err(ValidationError::EmptyCategoryName));
        assert_eq!(
            validate_category_name("a-very-long-category-name"),
            Err(ValidationError::CategoryNameTooLong(25))
        );
    }
}
