//! Study profile of a user: the preferences the buddy matcher scores on.

pub mod handlers;

use serde::Deserialize;

use crate::db::ProfileUpdate;
use crate::error::AppError;

/// Ordered from least to most experienced.
pub const EXPERIENCE_LEVELS: [&str; 4] = ["beginner", "intermediate", "advanced", "expert"];

const MAX_NAME_CHARS: usize = 100;
const MAX_LABEL_CHARS: usize = 50;
const MAX_LIST_ENTRIES: usize = 20;
const MAX_ENTRY_CHARS: usize = 100;

pub fn experience_rank(level: &str) -> Option<usize> {
    let level = level.trim();
    EXPERIENCE_LEVELS.iter().position(|l| l.eq_ignore_ascii_case(level))
}

/// Profile fields as sent by the client, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    pub name: Option<String>,
    pub preferred_subjects: Option<Vec<String>>,
    pub study_style: Option<String>,
    pub availability: Option<String>,
    pub experience_level: Option<String>,
    pub interests: Option<Vec<String>>,
}

pub fn validate_profile(input: ProfileInput) -> Result<ProfileUpdate, AppError> {
    Ok(ProfileUpdate {
        name: optional_text("name", input.name, MAX_NAME_CHARS)?,
        study_style: optional_text("studyStyle", input.study_style, MAX_LABEL_CHARS)?,
        availability: optional_text("availability", input.availability, MAX_LABEL_CHARS)?,
        experience_level: input.experience_level.map(validate_experience).transpose()?,
        preferred_subjects: input
            .preferred_subjects
            .map(|list| clean_list("preferredSubjects", list))
            .transpose()?,
        interests: input.interests.map(|list| clean_list("interests", list)).transpose()?,
    })
}

fn optional_text(field: &str, value: Option<String>, max_chars: usize) -> Result<Option<String>, AppError> {
    match value {
        None => Ok(None),
        Some(value) => {
            let value = value.trim();
            if value.is_empty() {
                return Err(AppError::validation(format!("{} must not be empty", field)));
            }
            if value.chars().count() > max_chars {
                return Err(AppError::validation(format!(
                    "{} must be at most {} characters",
                    field, max_chars
                )));
            }
            Ok(Some(value.to_string()))
        }
    }
}

fn validate_experience(level: String) -> Result<String, AppError> {
    experience_rank(&level)
        .map(|rank| EXPERIENCE_LEVELS[rank].to_string())
        .ok_or_else(|| {
            AppError::validation(format!(
                "experienceLevel must be one of: {}",
                EXPERIENCE_LEVELS.join(", ")
            ))
        })
}

fn clean_list(field: &str, list: Vec<String>) -> Result<Vec<String>, AppError> {
    let cleaned: Vec<String> = list
        .into_iter()
        .map(|entry| entry.trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect();

    if cleaned.len() > MAX_LIST_ENTRIES {
        return Err(AppError::validation(format!(
            "{} accepts at most {} entries",
            field, MAX_LIST_ENTRIES
        )));
    }
    if cleaned.iter().any(|entry| entry.chars().count() > MAX_ENTRY_CHARS) {
        return Err(AppError::validation(format!(
            "{} entries must be at most {} characters",
            field, MAX_ENTRY_CHARS
        )));
    }
    Ok(cleaned)
}
