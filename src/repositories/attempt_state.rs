use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const ATTEMPT_FILE: &str = "attempt.json";

/// The persisted countdown record: start instant, end instant and the limit
/// they were derived from, scoped to one attempt. All three live and die
/// together; `ends_at_ms` is never rewritten once saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct StoredAttempt {
    pub(crate) access_id: i64,
    pub(crate) started_at_ms: i64,
    pub(crate) ends_at_ms: i64,
    pub(crate) limit_minutes: i64,
}

/// Key/value port over the attempt record so the bootstrap and the countdown
/// can be exercised without touching the filesystem.
pub(crate) trait AttemptStore: Send + Sync {
    fn load(&self) -> Result<Option<StoredAttempt>>;
    fn save(&self, attempt: &StoredAttempt) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Production store: one JSON file in the state directory, surviving client
/// restarts the way the original survived page reloads.
#[derive(Debug, Clone)]
pub(crate) struct FileAttemptStore {
    path: PathBuf,
}

impl FileAttemptStore {
    pub(crate) fn new(state_dir: &Path) -> Self {
        Self { path: state_dir.join(ATTEMPT_FILE) }
    }
}

impl AttemptStore for FileAttemptStore {
    fn load(&self) -> Result<Option<StoredAttempt>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read {}", self.path.display()));
            }
        };

        let attempt: StoredAttempt = serde_json::from_slice(&bytes)
            .with_context(|| format!("Corrupted attempt record at {}", self.path.display()))?;

        Ok(Some(attempt))
    }

    fn save(&self, attempt: &StoredAttempt) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let bytes = serde_json::to_vec_pretty(attempt).context("Failed to encode attempt")?;
        fs::write(&self.path, bytes)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => {
                Err(err).with_context(|| format!("Failed to remove {}", self.path.display()))
            }
        }
    }
}
