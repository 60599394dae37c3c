use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::ProfileRow;
use crate::profiles::catalog::{search_catalog, CatalogTopic};
use crate::profiles::normalize_preferences;
use crate::profiles::store;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub profile: ProfileRow,
    pub needs_onboarding: bool,
}

impl From<ProfileRow> for ProfileResponse {
    fn from(profile: ProfileRow) -> Self {
        Self {
            needs_onboarding: profile.needs_onboarding(),
            profile,
        }
    }
}

#[derive(Deserialize)]
pub struct PreferencesRequest {
    pub preferences: Vec<String>,
}

#[derive(Deserialize)]
pub struct MentorStatusRequest {
    pub mentor_status: bool,
}

#[derive(Deserialize)]
pub struct NotificationsRequest {
    pub email_notifications: bool,
}

#[derive(Deserialize)]
pub struct CatalogQuery {
    pub q: Option<String>,
}

#[derive(Serialize)]
pub struct CatalogResponse {
    pub topics: Vec<CatalogTopic>,
}

/// GET /api/v1/profiles/:id
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = store::require_profile(&state.db, id).await?;
    Ok(Json(profile.into()))
}

/// PUT /api/v1/profiles/:id/preferences
pub async fn handle_update_preferences(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<PreferencesRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let preferences = normalize_preferences(&req.preferences)?;
    let profile = store::update_preferences(&state.db, id, &preferences).await?;
    info!("Profile {id} saved {} preferences", preferences.len());
    Ok(Json(profile.into()))
}

/// PUT /api/v1/profiles/:id/mentor
pub async fn handle_set_mentor_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<MentorStatusRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = store::set_mentor_status(&state.db, id, req.mentor_status).await?;
    Ok(Json(profile.into()))
}

/// PUT /api/v1/profiles/:id/notifications
pub async fn handle_set_notifications(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<NotificationsRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = store::set_email_notifications(&state.db, id, req.email_notifications).await?;
    Ok(Json(profile.into()))
}

/// DELETE /api/v1/profiles/:id
pub async fn handle_delete_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    store::delete_profile(&state.db, id).await?;
    info!("Profile {id} deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/preferences/catalog?q=
pub async fn handle_preference_catalog(Query(params): Query<CatalogQuery>) -> Json<CatalogResponse> {
    Json(CatalogResponse {
        topics: search_catalog(params.q.as_deref()),
    })
}
