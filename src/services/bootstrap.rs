use std::sync::Arc;

use anyhow::Result;

use crate::core::time::{format_ms, Clock, SharedClock};
use crate::repositories::attempt_state::{AttemptStore, StoredAttempt};
use crate::schemas::exam::{ExamSession, ExpiryReason, MINUTE_MS};
use crate::services::authority::ExamAuthority;

#[derive(Debug)]
pub(crate) enum BootstrapOutcome {
    /// First entry for this attempt: fresh instants were computed and saved.
    Started(ExamSession),
    /// A persisted attempt matched; its end instant is reused unchanged, so
    /// elapsed wall-clock time stays spent across restarts.
    Resumed(ExamSession),
    /// Terminal. Persisted state has already been cleared by the time the
    /// caller observes this.
    Expired(ExpiryReason),
}

/// Decides, once per entry into the exam page, whether to resume the stored
/// countdown or create a new one.
pub(crate) struct SessionBootstrap {
    store: Arc<dyn AttemptStore>,
    clock: SharedClock,
}

impl SessionBootstrap {
    pub(crate) fn new(store: Arc<dyn AttemptStore>, clock: SharedClock) -> Self {
        Self { store, clock }
    }

    /// Local-only resolution against the supplied duration.
    ///
    /// A stored record that disagrees with `limit_minutes` (or belongs to a
    /// different attempt) is never resumed: a stale shorter attempt must not
    /// grant extra time, and a longer one must not be silently truncated.
    pub(crate) fn resolve(
        &self,
        access_id: i64,
        limit_minutes: i64,
    ) -> Result<BootstrapOutcome> {
        if limit_minutes <= 0 {
            tracing::warn!(limit_minutes, "Refusing to start countdown without a valid duration");
            self.store.clear()?;
            return Ok(BootstrapOutcome::Expired(ExpiryReason::InvalidDuration));
        }

        let stored = match self.store.load() {
            Ok(stored) => stored,
            Err(err) => {
                tracing::warn!(error = %err, "Discarding unreadable attempt record");
                self.store.clear()?;
                return Ok(BootstrapOutcome::Expired(ExpiryReason::StaleSession));
            }
        };

        let now_ms = self.clock.now_ms();

        let Some(stored) = stored else {
            let attempt = StoredAttempt {
                access_id,
                started_at_ms: now_ms,
                ends_at_ms: now_ms + limit_minutes * MINUTE_MS,
                limit_minutes,
            };
            self.store.save(&attempt)?;
            tracing::info!(
                access_id,
                limit_minutes,
                ends_at = %format_ms(attempt.ends_at_ms),
                "Started exam countdown"
            );
            return Ok(BootstrapOutcome::Started(session_from(attempt)));
        };

        if stored.access_id != access_id || stored.limit_minutes != limit_minutes {
            tracing::warn!(
                stored_access_id = stored.access_id,
                access_id,
                stored_limit = stored.limit_minutes,
                limit_minutes,
                "Stored attempt does not match the configured exam; expiring"
            );
            self.store.clear()?;
            return Ok(BootstrapOutcome::Expired(ExpiryReason::StaleSession));
        }

        if stored.ends_at_ms - now_ms <= 0 {
            self.store.clear()?;
            return Ok(BootstrapOutcome::Expired(ExpiryReason::Elapsed));
        }

        Ok(BootstrapOutcome::Resumed(session_from(stored)))
    }

    /// Authoritative variant: the portal's verdict overrides local clock math
    /// entirely, and the duration it reports seeds the stale-limit check.
    /// An unreachable portal counts as a denial.
    pub(crate) async fn resolve_with_authority(
        &self,
        authority: &dyn ExamAuthority,
        access_id: i64,
        fallback_limit_minutes: i64,
    ) -> Result<BootstrapOutcome> {
        let status = match authority.attempt_status(access_id).await {
            Ok(status) => status,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    access_id,
                    "Attempt status check failed; treating as cannot continue"
                );
                self.store.clear()?;
                return Ok(BootstrapOutcome::Expired(ExpiryReason::AuthorityUnavailable));
            }
        };

        if !status.can_continue {
            tracing::info!(access_id, "Portal denied continuation of the attempt");
            self.store.clear()?;
            return Ok(BootstrapOutcome::Expired(ExpiryReason::AuthorityDenied));
        }

        let limit_minutes = status.time_limit_minutes.unwrap_or(fallback_limit_minutes);
        self.resolve(access_id, limit_minutes)
    }
}

fn session_from(attempt: StoredAttempt) -> ExamSession {
    ExamSession {
        access_id: attempt.access_id,
        started_at_ms: attempt.started_at_ms,
        ends_at_ms: attempt.ends_at_ms,
        limit_minutes: attempt.limit_minutes,
    }
}
