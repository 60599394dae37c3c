use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A row of the `profiles` table. `id` is the identity provider's user id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    /// GitHub login. NULL until the user links an account.
    pub username: Option<String>,
    pub email: Option<String>,
    /// NULL means the user has not been through onboarding yet.
    pub preferences: Option<Vec<String>>,
    pub mentor_status: bool,
    pub email_notifications: bool,
    pub updated_at: DateTime<Utc>,
}

impl ProfileRow {
    pub fn needs_onboarding(&self) -> bool {
        self.preferences.is_none()
    }

    pub fn preference_list(&self) -> Vec<String> {
        self.preferences.clone().unwrap_or_default()
    }
}
