use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::ProfileRow;

const PROFILE_COLUMNS: &str =
    "id, username, email, preferences, mentor_status, email_notifications, updated_at";

pub async fn get_profile(pool: &PgPool, id: Uuid) -> Result<Option<ProfileRow>, sqlx::Error> {
    sqlx::query_as::<_, ProfileRow>(&format!(
        "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Like `get_profile`, but a missing row is a 404.
pub async fn require_profile(pool: &PgPool, id: Uuid) -> Result<ProfileRow, AppError> {
    get_profile(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {id} not found")))
}

/// Mentors with a linked GitHub account, excluding `exclude` (the viewer).
pub async fn list_mentors(pool: &PgPool, exclude: Uuid) -> Result<Vec<ProfileRow>, sqlx::Error> {
    sqlx::query_as::<_, ProfileRow>(&format!(
        r#"
        SELECT {PROFILE_COLUMNS} FROM profiles
        WHERE mentor_status = TRUE
          AND username IS NOT NULL
          AND id <> $1
        ORDER BY username ASC
        "#
    ))
    .bind(exclude)
    .fetch_all(pool)
    .await
}

pub async fn list_notification_recipients(pool: &PgPool) -> Result<Vec<ProfileRow>, sqlx::Error> {
    sqlx::query_as::<_, ProfileRow>(&format!(
        "SELECT {PROFILE_COLUMNS} FROM profiles WHERE email_notifications = TRUE ORDER BY id"
    ))
    .fetch_all(pool)
    .await
}

pub async fn update_preferences(
    pool: &PgPool,
    id: Uuid,
    preferences: &[String],
) -> Result<ProfileRow, AppError> {
    sqlx::query_as::<_, ProfileRow>(&format!(
        r#"
        UPDATE profiles SET preferences = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING {PROFILE_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(preferences)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Profile {id} not found")))
}

pub async fn set_mentor_status(
    pool: &PgPool,
    id: Uuid,
    mentor_status: bool,
) -> Result<ProfileRow, AppError> {
    sqlx::query_as::<_, ProfileRow>(&format!(
        r#"
        UPDATE profiles SET mentor_status = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING {PROFILE_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(mentor_status)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Profile {id} not found")))
}

pub async fn set_email_notifications(
    pool: &PgPool,
    id: Uuid,
    enabled: bool,
) -> Result<ProfileRow, AppError> {
    sqlx::query_as::<_, ProfileRow>(&format!(
        r#"
        UPDATE profiles SET email_notifications = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING {PROFILE_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(enabled)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Profile {id} not found")))
}

pub async fn delete_profile(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Profile {id} not found")));
    }
    Ok(())
}
