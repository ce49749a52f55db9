//! Service layer: the work behind each API route.
//!
//! Services own the database handle and, where the feature needs one,
//! the chat model. Route handlers stay thin.

pub mod analysis;
pub mod budget;
pub mod cards;
pub mod matching;

pub use analysis::{AnalysisOutcome, AnalysisService};
pub use budget::AiBudget;
pub use cards::{CardService, GenerateCardsRequest};
pub use matching::{MatchService, MatchSuggestion, MatchView};

use crate::error::AppError;

/// Trims submitted learning material and enforces the length bound.
pub(crate) fn validate_content(content: &str, max_chars: usize) -> Result<&str, AppError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::validation("Content is required"));
    }
    if content.chars().count() > max_chars {
        return Err(AppError::validation(format!(
            "Content must be at most {} characters",
            max_chars
        )));
    }
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_content() {
        assert_eq!(validate_content("  notes \n", 100).unwrap(), "notes");
        assert!(matches!(validate_content("   ", 100), Err(AppError::Validation(_))));
        assert!(validate_content("abcdef", 5).is_err());
        assert!(validate_content("abcde", 5).is_ok());
    }
}
