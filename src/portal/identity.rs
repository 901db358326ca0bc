use anyhow::Result;
use tokio::io::AsyncBufRead;

use crate::core::state::AppState;
use crate::portal::errors::PortalError;
use crate::portal::{read_line, validation};
use crate::repositories::profile_cache::{CachedProfile, ProfileCache};
use crate::schemas::student::StudentProfile;
use crate::services::authority::EligibilityOutcome;

/// DNI entry loop: validate locally, ask the portal, repeat until an eligible
/// student shows up or the input ends.
pub(crate) async fn resolve_student<R>(state: &AppState, input: &mut R) -> Result<StudentProfile>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        println!("Ingrese su DNI (7 u 8 dígitos, sin puntos):");

        let Some(line) = read_line(input).await? else {
            return Err(PortalError::InputClosed.into());
        };
        let dni = line.trim();

        if let Err(err) = validation::validate_dni(dni) {
            println!("{err}");
            continue;
        }

        match state.portal().validate_dni(dni).await {
            Ok(EligibilityOutcome::Eligible(profile)) => {
                tracing::info!(dni = profile.dni, "Student eligible for exam");
                print_profile(&profile);
                return Ok(profile);
            }
            Ok(EligibilityOutcome::NotEligible(message)) => {
                tracing::warn!(dni, message = %message, "Student not eligible for exam");
                println!("{message}");
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to validate DNI with the portal");
                println!("Hubo un problema al validar el DNI");
            }
        }
    }
}

/// Confirms the start, registers the access record with the portal and caches
/// profile + access id for resumption after a client restart.
pub(crate) async fn begin_attempt<R>(
    state: &AppState,
    profile: &StudentProfile,
    input: &mut R,
) -> Result<i64>
where
    R: AsyncBufRead + Unpin,
{
    println!("Presione ENTER para comenzar el examen...");
    if read_line(input).await?.is_none() {
        return Err(PortalError::InputClosed.into());
    }

    let access_id = state.portal().start_exam(profile.dni).await?;

    state
        .profiles()
        .save(&CachedProfile { profile: profile.clone(), access_id: Some(access_id) })?;

    tracing::info!(access_id, dni = profile.dni, "Exam attempt started");
    Ok(access_id)
}

fn print_profile(profile: &StudentProfile) {
    println!();
    println!("  DNI:         {}", profile.dni);
    println!("  Nombre:      {}", profile.full_name);
    println!("  Email:       {}", profile.email);
    println!("  Tecnicatura: {}", profile.program);
    println!("  Duración del examen: {} minutos", profile.exam_time_limit);
    println!();
}
