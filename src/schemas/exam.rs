use serde::{Deserialize, Serialize};
use thiserror::Error;

pub(crate) const MINUTE_MS: i64 = 60_000;

/// One resolved exam attempt window. `ends_at_ms` is fixed at first start and
/// never recomputed on resume; remaining time is always derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ExamSession {
    pub(crate) access_id: i64,
    pub(crate) started_at_ms: i64,
    pub(crate) ends_at_ms: i64,
    pub(crate) limit_minutes: i64,
}

impl ExamSession {
    pub(crate) fn remaining_ms(&self, now_ms: i64) -> i64 {
        self.ends_at_ms - now_ms
    }
}

/// Every terminal path of an attempt converges on one of these. The display
/// string doubles as the log line; the student-facing notice is uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub(crate) enum ExpiryReason {
    #[error("exam duration is missing or not positive")]
    InvalidDuration,
    #[error("stored attempt does not match the configured exam")]
    StaleSession,
    #[error("exam time has elapsed")]
    Elapsed,
    #[error("portal denied continuation of the attempt")]
    AuthorityDenied,
    #[error("portal status check was unavailable")]
    AuthorityUnavailable,
}

#[derive(Debug, Serialize)]
pub(crate) struct StartExamRequest {
    pub(crate) dni: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StartExamResponse {
    pub(crate) status: String,
    #[serde(default)]
    pub(crate) access_id: Option<i64>,
    #[serde(default)]
    pub(crate) message: Option<String>,
}

/// Authoritative answer about an in-flight attempt. The limit rides along so
/// the client can reconcile a persisted countdown against the server's value.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AttemptStatus {
    pub(crate) can_continue: bool,
    #[serde(default)]
    pub(crate) time_limit_minutes: Option<i64>,
}
