//! Preference Store: the `profiles` table and the onboarding topic catalog.

pub mod catalog;
pub mod handlers;
pub mod store;

use crate::errors::AppError;

pub const MAX_PREFERENCES: usize = 50;

/// Trims entries and drops case-insensitive duplicates, keeping the first
/// spelling seen. Blank entries are rejected rather than skipped.
pub fn normalize_preferences(raw: &[String]) -> Result<Vec<String>, AppError> {
    let mut normalized: Vec<String> = Vec::with_capacity(raw.len());
    for entry in raw {
        let trimmed = entry.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "Preferences must not contain empty entries".to_string(),
            ));
        }
        if !normalized.iter().any(|p| p.eq_ignore_ascii_case(trimmed)) {
            normalized.push(trimmed.to_string());
        }
    }
    if normalized.len() > MAX_PREFERENCES {
        return Err(AppError::Validation(format!(
            "At most {MAX_PREFERENCES} preferences are allowed"
        )));
    }
    Ok(normalized)
}
