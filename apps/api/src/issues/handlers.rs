use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;

use crate::errors::AppError;
use crate::issues::fetch_candidate_issues;
use crate::models::issue::CandidateIssue;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct IssuesResponse {
    pub success: bool,
    pub count: usize,
    pub issues: Vec<CandidateIssue>,
}

/// GET /api/v1/issues
///
/// Unscored candidate feed, freshest first.
pub async fn handle_list_issues(
    State(state): State<AppState>,
) -> Result<Json<IssuesResponse>, AppError> {
    let issues =
        fetch_candidate_issues(&state.github, &state.config.tracked_repositories, Utc::now())
            .await
            .issues;
    Ok(Json(IssuesResponse {
        success: true,
        count: issues.len(),
        issues,
    }))
}
