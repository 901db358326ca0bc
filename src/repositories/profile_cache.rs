use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::schemas::student::StudentProfile;

const PROFILE_FILE: &str = "profile.json";

/// Profile data kept across client restarts so a student does not re-enter
/// their DNI mid-attempt. `access_id` appears once the attempt has started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct CachedProfile {
    pub(crate) profile: StudentProfile,
    #[serde(default)]
    pub(crate) access_id: Option<i64>,
}

pub(crate) trait ProfileCache: Send + Sync {
    fn load(&self) -> Result<Option<CachedProfile>>;
    fn save(&self, cached: &CachedProfile) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

#[derive(Debug, Clone)]
pub(crate) struct FileProfileCache {
    path: PathBuf,
}

impl FileProfileCache {
    pub(crate) fn new(state_dir: &Path) -> Self {
        Self { path: state_dir.join(PROFILE_FILE) }
    }
}

impl ProfileCache for FileProfileCache {
    fn load(&self) -> Result<Option<CachedProfile>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read {}", self.path.display()));
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(cached) => Ok(Some(cached)),
            Err(err) => {
                // A stale profile only costs the student one DNI prompt.
                tracing::warn!(error = %err, path = %self.path.display(), "Discarding unreadable profile cache");
                Ok(None)
            }
        }
    }

    fn save(&self, cached: &CachedProfile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let bytes = serde_json::to_vec_pretty(cached).context("Failed to encode profile")?;
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
