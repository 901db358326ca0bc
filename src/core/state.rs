use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use crate::core::config::Settings;
use crate::core::time::{system_clock, SharedClock};
use crate::repositories::attempt_state::{AttemptStore, FileAttemptStore};
use crate::repositories::profile_cache::{FileProfileCache, ProfileCache};
use crate::services::authority::PortalClient;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    clock: SharedClock,
    portal: PortalClient,
    attempts: Arc<dyn AttemptStore>,
    profiles: Arc<dyn ProfileCache>,
}

impl AppState {
    pub(crate) fn new(
        settings: Settings,
        clock: SharedClock,
        portal: PortalClient,
        attempts: Arc<dyn AttemptStore>,
        profiles: Arc<dyn ProfileCache>,
    ) -> Self {
        Self { inner: Arc::new(InnerState { settings, clock, portal, attempts, profiles }) }
    }

    pub(crate) fn from_settings(settings: Settings) -> anyhow::Result<Self> {
        let portal = PortalClient::from_settings(&settings)?;

        let state_dir = PathBuf::from(&settings.storage().state_dir);
        std::fs::create_dir_all(&state_dir).with_context(|| {
            format!("Failed to create state directory {}", state_dir.display())
        })?;

        let attempts: Arc<dyn AttemptStore> = Arc::new(FileAttemptStore::new(&state_dir));
        let profiles: Arc<dyn ProfileCache> = Arc::new(FileProfileCache::new(&state_dir));

        Ok(Self::new(settings, system_clock(), portal, attempts, profiles))
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn clock(&self) -> &SharedClock {
        &self.inner.clock
    }

    pub(crate) fn portal(&self) -> &PortalClient {
        &self.inner.portal
    }

    pub(crate) fn attempts(&self) -> &Arc<dyn AttemptStore> {
        &self.inner.attempts
    }

    pub(crate) fn profiles(&self) -> &Arc<dyn ProfileCache> {
        &self.inner.profiles
    }
}
