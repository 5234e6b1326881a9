//! Review comment types and validation.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const MAX_COMMENT_LENGTH: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommentType {
    Employee,
    Manager,
    Discussion,
    Final,
}

impl CommentType {
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "Employee" => Ok(Self::Employee),
            "Manager" => Ok(Self::Manager),
            "Discussion" => Ok(Self::Discussion),
            "Final" => Ok(Self::Final),
            _ => Err(CoreError::Validation(format!(
                "Invalid comment type '{s}'. Must be one of: Employee, Manager, Discussion, Final"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "Employee",
            Self::Manager => "Manager",
            Self::Discussion => "Discussion",
            Self::Final => "Final",
        }
    }
}

pub fn validate_comment_text(text: &str) -> Result<(), CoreError> {
    if text.trim().is_empty() {
        return Err(CoreError::Validation(
            "Comment text must not be empty".to_string(),
        ));
    }
    if text.len() > MAX_COMMENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Comment exceeds maximum length of {MAX_COMMENT_LENGTH} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_types() {
        assert_eq!(CommentType::from_str_db("Final").unwrap(), CommentType::Final);
        assert!(CommentType::from_str_db("final").is_err());
    }

    #[test]
    fn rejects_blank_and_oversized_text() {
        assert!(validate_comment_text("  ").is_err());
        assert!(validate_comment_text(&"x".repeat(MAX_COMMENT_LENGTH + 1)).is_err());
        assert!(validate_comment_text("Good progress on KR 2").is_ok());
    }
}
