use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::languages::{is_valid_github_login, language_affinity};
use crate::models::language::LanguageShare;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct LanguagesResponse {
    pub username: String,
    pub languages: Vec<LanguageShare>,
}

/// GET /api/v1/languages/:username
///
/// An unknown account or a GitHub outage yields an empty list, not an error.
pub async fn handle_get_languages(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<LanguagesResponse>, AppError> {
    if !is_valid_github_login(&username) {
        return Err(AppError::Validation(format!(
            "'{username}' is not a valid GitHub username"
        )));
    }

    let languages = language_affinity(&state.github, &state.cache, &username).await;
    Ok(Json(LanguagesResponse {
        username,
        languages,
    }))
}
