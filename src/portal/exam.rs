use std::sync::Arc;

use anyhow::Result;
use tokio::io::AsyncBufRead;
use tokio::sync::watch;

use crate::core::state::AppState;
use crate::core::time::Clock;
use crate::portal::display::TerminalDisplay;
use crate::portal::{read_line, validation};
use crate::repositories::attempt_state::AttemptStore;
use crate::repositories::profile_cache::ProfileCache;
use crate::schemas::exam::{ExamSession, ExpiryReason};
use crate::services::authority::SubmitOutcome;
use crate::services::bootstrap::{BootstrapOutcome, SessionBootstrap};
use crate::services::countdown::{format_clock, CountdownTimer};

/// Exam page flow: resolve the countdown (resume or start), then run it until
/// expiry, submission, or interruption.
pub(crate) async fn run_exam_page<R>(
    state: &AppState,
    access_id: i64,
    limit_minutes: i64,
    input: &mut R,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let bootstrap = SessionBootstrap::new(state.attempts().clone(), state.clock().clone());

    let outcome = if state.settings().exam().authority_check_enabled {
        bootstrap.resolve_with_authority(state.portal(), access_id, limit_minutes).await?
    } else {
        bootstrap.resolve(access_id, limit_minutes)?
    };

    let session = match outcome {
        BootstrapOutcome::Started(session) => {
            println!("Examen iniciado. Tiempo disponible: {} minutos.", session.limit_minutes);
            session
        }
        BootstrapOutcome::Resumed(session) => {
            tracing::info!(
                access_id,
                started_at = %crate::core::time::format_ms(session.started_at_ms),
                remaining = %format_clock(session.remaining_ms(state.clock().now_ms())),
                "Resuming exam countdown"
            );
            session
        }
        BootstrapOutcome::Expired(reason) => {
            return finish_expired(state, reason);
        }
    };

    run_countdown(state, &session, input).await
}

async fn run_countdown<R>(state: &AppState, session: &ExamSession, input: &mut R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let (expiry_tx, mut expiry_rx) = watch::channel(false);

    let mut timer = CountdownTimer::new(session.ends_at_ms, state.clock().clone());
    let attempts = state.attempts().clone();
    let profiles = state.profiles().clone();

    timer.start(
        Arc::new(TerminalDisplay),
        Box::new(move || {
            // Cleanup strictly precedes the visible "time's up" transition.
            if let Err(err) = attempts.clear() {
                tracing::error!(error = %err, "Failed to clear attempt state on expiry");
            }
            if let Err(err) = profiles.clear() {
                tracing::error!(error = %err, "Failed to clear profile cache on expiry");
            }
            println!();
            println!("Tiempo de examen terminado");
            expiry_tx.send(true).ok();
        }),
    );

    println!("Cuando termine, ingrese el enlace de GitHub de su proyecto y presione ENTER:");

    let interrupted = interrupt_signal();
    tokio::pin!(interrupted);

    let access_id = session.access_id;
    loop {
        tokio::select! {
            _ = expiry_rx.changed() => {
                // Input is disabled from here on; the notice was already shown
                // by the expiry callback.
                timer.stop();
                return Ok(());
            }
            _ = &mut interrupted => {
                timer.stop();
                tracing::info!(access_id, "Exam interrupted; attempt state kept for resume");
                println!();
                println!("Examen interrumpido. Vuelva a ingresar para continuar.");
                return Ok(());
            }
            line = read_line(input) => {
                let Some(line) = line? else {
                    // Input gone mid-attempt: behave like an interruption so a
                    // restart resumes with the same deadline.
                    timer.stop();
                    tracing::info!(access_id, "Input closed; attempt state kept for resume");
                    return Ok(());
                };

                let link = line.trim();
                if link.is_empty() || timer.has_expired() {
                    continue;
                }

                if let Err(err) = validation::validate_repository_link(link) {
                    println!("{err}");
                    continue;
                }

                match state.portal().submit_exam(access_id, link).await {
                    Ok(SubmitOutcome::Accepted) => {
                        timer.stop();
                        state.attempts().clear()?;
                        state.profiles().clear()?;
                        tracing::info!(access_id, "Exam submitted");
                        println!("Examen enviado exitosamente");
                        return Ok(());
                    }
                    Ok(SubmitOutcome::Rejected(message)) => {
                        tracing::warn!(access_id, message = %message, "Submission rejected by portal");
                        println!("{message}");
                    }
                    Err(err) => {
                        tracing::error!(error = %err, access_id, "Failed to submit exam");
                        println!("Hubo un problema al enviar el examen");
                    }
                }
            }
        }
    }
}

fn finish_expired(state: &AppState, reason: ExpiryReason) -> Result<()> {
    tracing::warn!(reason = %reason, "Exam attempt expired at bootstrap");
    // The bootstrap already cleared the attempt record; the cached profile
    // goes with it so the next run starts from identification again.
    state.profiles().clear()?;
    println!("Tiempo de examen terminado");
    Ok(())
}

async fn interrupt_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}
