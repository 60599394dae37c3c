use axum::{extract::State, Json};

use crate::digest::runner::{run_digest, DigestReport};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/v1/digest/run
pub async fn handle_run_digest(
    State(state): State<AppState>,
) -> Result<Json<DigestReport>, AppError> {
    let report = run_digest(&state).await?;
    Ok(Json(report))
}
