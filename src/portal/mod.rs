pub(crate) mod display;
pub(crate) mod errors;
pub(crate) mod exam;
pub(crate) mod identity;
pub(crate) mod validation;


use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::core::state::AppState;
use crate::repositories::profile_cache::{CachedProfile, ProfileCache};

pub(crate) async fn run(state: AppState) -> Result<()> {
    let mut input = BufReader::new(tokio::io::stdin());
    run_with_input(state, &mut input).await
}

/// Full portal flow: identify the student (or pick up a cached attempt),
/// then enter the exam page. Split from `run` so tests can drive it with a
/// scripted input stream.
pub(crate) async fn run_with_input<R>(state: AppState, input: &mut R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let cached = state.profiles().load()?;

    let (profile, access_id) = match cached {
        Some(CachedProfile { profile, access_id: Some(access_id) }) => {
            tracing::info!(access_id, dni = profile.dni, "Resuming cached exam attempt");
            (profile, access_id)
        }
        _ => {
            let profile = identity::resolve_student(&state, input).await?;
            let access_id = identity::begin_attempt(&state, &profile, input).await?;
            (profile, access_id)
        }
    };

    exam::run_exam_page(&state, access_id, profile.exam_time_limit, input).await
}

/// `Ok(None)` means the input stream is exhausted.
pub(crate) async fn read_line<R>(input: &mut R) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    if input.read_line(&mut line).await? == 0 {
        Ok(None)
    } else {
        Ok(Some(line))
    }
}
