use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::digest::changes::{reconcile, render_digest, ChangeSet, Reconciliation, StoredIssue};
use crate::digest::notifier::Notifier;
use crate::errors::AppError;
use crate::issues::{fetch_candidate_issues, CandidateFeed};
use crate::models::profile::ProfileRow;
use crate::profiles::store::list_notification_recipients;
use crate::state::AppState;

pub const DIGEST_SUBJECT: &str = "New good first issues on gitTogether";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DigestReport {
    pub added: usize,
    pub removed: usize,
    pub has_changes: bool,
    pub notified: usize,
    pub failed: usize,
    /// Tracked repositories whose issues could not be listed this run.
    pub unavailable: usize,
}

pub async fn load_snapshot(pool: &PgPool) -> Result<Vec<StoredIssue>, sqlx::Error> {
    sqlx::query_as::<_, StoredIssue>(
        "SELECT id, title, url, repo, number, created_at FROM issues ORDER BY created_at DESC, id",
    )
    .fetch_all(pool)
    .await
}

/// Replaces the whole snapshot in one transaction.
pub async fn replace_snapshot(pool: &PgPool, issues: &[StoredIssue]) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM issues").execute(&mut *tx).await?;
    for issue in issues {
        sqlx::query(
            r#"
            INSERT INTO issues (id, title, url, repo, number, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(issue.id)
        .bind(&issue.title)
        .bind(&issue.url)
        .bind(&issue.repo)
        .bind(issue.number)
        .bind(issue.created_at)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

/// Sends `body` to every recipient. Returns `(notified, failed)`.
pub async fn notify_all(
    notifier: &dyn Notifier,
    recipients: &[ProfileRow],
    body: &str,
) -> (usize, usize) {
    let mut notified = 0;
    let mut failed = 0;
    for recipient in recipients {
        match notifier.notify(recipient, DIGEST_SUBJECT, body).await {
            Ok(()) => notified += 1,
            Err(e) => {
                warn!("Digest notification to {} failed: {e}", recipient.id);
                failed += 1;
            }
        }
    }
    (notified, failed)
}

fn report(changes: &ChangeSet, unavailable: usize, notified: usize, failed: usize) -> DigestReport {
    DigestReport {
        added: changes.added.len(),
        removed: changes.removed.len(),
        has_changes: changes.has_changes(),
        notified,
        failed,
        unavailable,
    }
}

/// Reconciles the stored snapshot with a fresh feed. Returns `None` when no
/// tracked repository answered, since an empty feed then says nothing about
/// which issues closed.
pub fn plan_digest(
    stored: &[StoredIssue],
    feed: &CandidateFeed,
    tracked: usize,
) -> Option<Reconciliation> {
    if tracked > 0 && feed.unavailable.len() >= tracked {
        return None;
    }
    let fresh: Vec<StoredIssue> = feed.issues.iter().map(StoredIssue::from).collect();
    let unavailable: Vec<String> = feed.unavailable.iter().map(|r| r.to_string()).collect();
    Some(reconcile(stored, fresh, &unavailable))
}

/// Refreshes the issue snapshot and notifies opted-in profiles of changes.
pub async fn run_digest(state: &AppState) -> Result<DigestReport, AppError> {
    let tracked = &state.config.tracked_repositories;
    let (stored, feed) = tokio::join!(
        load_snapshot(&state.db),
        fetch_candidate_issues(&state.github, tracked, Utc::now()),
    );
    let stored = stored?;
    let unavailable = feed.unavailable.len();

    let Some(Reconciliation { changes, snapshot }) = plan_digest(&stored, &feed, tracked.len())
    else {
        warn!("Digest skipped: none of {} tracked repositories answered", tracked.len());
        return Ok(report(&ChangeSet::default(), unavailable, 0, 0));
    };
    if !changes.has_changes() {
        info!("Digest: no changes across {} stored issues", stored.len());
        return Ok(report(&changes, unavailable, 0, 0));
    }

    replace_snapshot(&state.db, &snapshot).await?;
    info!(
        "Digest: {} added, {} removed; snapshot now holds {} issues",
        changes.added.len(),
        changes.removed.len(),
        snapshot.len()
    );

    let recipients = list_notification_recipients(&state.db).await?;
    let body = render_digest(&changes);
    let (notified, failed) = notify_all(state.notifier.as_ref(), &recipients, &body).await;
    Ok(report(&changes, unavailable, notified, failed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::TimeZone;
    use uuid::Uuid;

    use crate::config::TrackedRepository;
    use crate::digest::changes::detect_changes;
    use crate::digest::changes::tests::stored;
    use crate::digest::notifier::{LogNotifier, NotifyError};
    use crate::languages::tests::FakeGitHub;

    fn recipient(email: Option<&str>) -> ProfileRow {
        ProfileRow {
            id: Uuid::new_v4(),
            username: Some("dev".into()),
            email: email.map(String::from),
            preferences: None,
            mentor_status: false,
            email_notifications: true,
            updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    /// Records deliveries and rejects one address.
    struct RecordingNotifier {
        sent: Mutex<Vec<String>>,
        reject: &'static str,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(
            &self,
            recipient: &ProfileRow,
            _subject: &str,
            _body: &str,
        ) -> Result<(), NotifyError> {
            let address = recipient.email.clone().unwrap_or_default();
            if address == self.reject {
                return Err(NotifyError::MissingAddress(recipient.id));
            }
            self.sent.lock().unwrap().push(address);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_failed_notification_does_not_stop_the_rest() {
        let notifier = RecordingNotifier {
            sent: Mutex::new(Vec::new()),
            reject: "b@example.com",
        };
        let recipients = vec![
            recipient(Some("a@example.com")),
            recipient(Some("b@example.com")),
            recipient(Some("c@example.com")),
        ];

        let (notified, failed) = notify_all(&notifier, &recipients, "body").await;
        assert_eq!((notified, failed), (2, 1));
        assert_eq!(
            *notifier.sent.lock().unwrap(),
            vec!["a@example.com".to_string(), "c@example.com".to_string()]
        );
    }

    #[tokio::test]
    async fn test_log_notifier_requires_address() {
        let (notified, failed) = notify_all(
            &LogNotifier,
            &[recipient(Some("a@example.com")), recipient(None)],
            "body",
        )
        .await;
        assert_eq!((notified, failed), (1, 1));
    }

    #[test]
    fn test_report_counts() {
        let changes = detect_changes(&[stored(1, "a/x")], &[stored(2, "a/x"), stored(3, "a/x")]);
        let r = report(&changes, 0, 4, 1);
        assert_eq!(
            r,
            DigestReport {
                added: 2,
                removed: 1,
                has_changes: true,
                notified: 4,
                failed: 1,
                unavailable: 0,
            }
        );
    }

    fn tracked(names: &[&str]) -> Vec<TrackedRepository> {
        names.iter().map(|n| n.parse().unwrap()).collect()
    }

    #[tokio::test]
    async fn test_github_outage_skips_digest() {
        let repos = tracked(&["rust-lang/rust", "golang/go"]);
        let feed = fetch_candidate_issues(&FakeGitHub::default(), &repos, Utc::now()).await;
        assert!(feed.issues.is_empty());
        assert_eq!(feed.unavailable.len(), 2);

        let snapshot = vec![stored(1, "rust-lang/rust"), stored(2, "golang/go")];
        assert!(plan_digest(&snapshot, &feed, repos.len()).is_none());
    }

    #[tokio::test]
    async fn test_partial_outage_keeps_unreachable_repository_rows() {
        let repos = tracked(&["rust-lang/rust", "golang/go"]);
        let mut github = FakeGitHub::default();
        // golang/go answers with no open issues; rust-lang/rust is unreachable.
        github.issues.insert("golang/go".into(), Vec::new());
        let feed = fetch_candidate_issues(&github, &repos, Utc::now()).await;

        let snapshot = vec![stored(1, "rust-lang/rust"), stored(2, "golang/go")];
        let plan = plan_digest(&snapshot, &feed, repos.len()).unwrap();

        let removed: Vec<i64> = plan.changes.removed.iter().map(|i| i.id).collect();
        assert_eq!(removed, vec![2]);
        assert!(plan.changes.added.is_empty());
        assert_eq!(plan.snapshot, vec![stored(1, "rust-lang/rust")]);
    }

    #[test]
    fn test_no_tracked_repositories_is_not_an_outage() {
        let plan = plan_digest(&[stored(1, "a/x")], &CandidateFeed::default(), 0).unwrap();
        let removed: Vec<i64> = plan.changes.removed.iter().map(|i| i.id).collect();
        assert_eq!(removed, vec![1]);
    }
}
