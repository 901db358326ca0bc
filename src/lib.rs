pub(crate) mod core;
pub(crate) mod portal;
pub(crate) mod repositories;
pub(crate) mod schemas;
pub(crate) mod services;

#[cfg(test)]
mod test_support;

use crate::core::{config::Settings, state::AppState, telemetry};

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;

    let state = AppState::from_settings(settings)?;

    tracing::info!(
        portal = %state.settings().portal().base_url,
        environment = %state.settings().runtime().environment.as_str(),
        "Rendir exam portal client starting"
    );

    portal::run(state).await
}
