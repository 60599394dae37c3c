use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::models::profile::ProfileRow;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Recipient {0} has no email address")]
    MissingAddress(uuid::Uuid),
}

/// Delivers a rendered digest to one profile.
///
/// Carried in `AppState` as `Arc<dyn Notifier>` so a mail transport can be
/// swapped in without touching the digest job.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, recipient: &ProfileRow, subject: &str, body: &str)
        -> Result<(), NotifyError>;
}

/// Writes digests to the log instead of sending mail.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(
        &self,
        recipient: &ProfileRow,
        subject: &str,
        body: &str,
    ) -> Result<(), NotifyError> {
        let address = recipient
            .email
            .as_deref()
            .ok_or(NotifyError::MissingAddress(recipient.id))?;
        info!(to = address, subject, "Digest notification\n{body}");
        Ok(())
    }
}
