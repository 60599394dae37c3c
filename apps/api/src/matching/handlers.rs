use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::recommend::{recommend, resolve_limit, Recommendations};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RecommendationQuery {
    pub user_id: Uuid,
    pub limit: Option<usize>,
}

/// GET /api/v1/recommendations?user_id=...&limit=...
pub async fn handle_recommendations(
    State(state): State<AppState>,
    Query(params): Query<RecommendationQuery>,
) -> Result<Json<Recommendations>, AppError> {
    let limit = resolve_limit(params.limit)?;
    let recommendations = recommend(&state, params.user_id, limit).await?;
    Ok(Json(recommendations))
}
