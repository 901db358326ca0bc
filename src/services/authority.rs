use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use validator::Validate;

use crate::core::config::Settings;
use crate::schemas::exam::{AttemptStatus, StartExamRequest, StartExamResponse};
use crate::schemas::student::{StudentProfile, ValidateDniRequest, ValidateDniResponse};
use crate::schemas::submission::{PortalAck, SubmitExamRequest};

#[derive(Debug, Clone)]
pub(crate) enum EligibilityOutcome {
    Eligible(StudentProfile),
    NotEligible(String),
}

#[derive(Debug, Clone)]
pub(crate) enum SubmitOutcome {
    Accepted,
    Rejected(String),
}

/// Server-side source of truth for whether an attempt may still proceed.
/// A transport failure is indistinguishable from a denial for callers that
/// gate on it; the timed exam fails closed.
#[async_trait]
pub(crate) trait ExamAuthority: Send + Sync {
    async fn attempt_status(&self, access_id: i64) -> Result<AttemptStatus>;
}

#[derive(Debug, Clone)]
pub(crate) struct PortalClient {
    client: Client,
    base_url: String,
}

impl PortalClient {
    pub(crate) fn from_settings(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(settings.portal().connect_timeout_seconds))
            .timeout(Duration::from_secs(settings.portal().request_timeout_seconds))
            .build()
            .context("Failed to build portal HTTP client")?;

        Ok(Self {
            client,
            base_url: settings.portal().base_url.trim_end_matches('/').to_string(),
        })
    }

    pub(crate) async fn validate_dni(&self, dni: &str) -> Result<EligibilityOutcome> {
        let request = ValidateDniRequest { dni: dni.to_string() };
        request.validate().context("DNI rejected before reaching the portal")?;

        let response = self
            .client
            .post(format!("{}/validate_dni", self.base_url))
            .json(&request)
            .send()
            .await
            .context("Failed to call portal validate_dni")?;

        let status = response.status();
        let body: ValidateDniResponse = response.json().await.with_context(|| {
            format!("Portal validate_dni returned an unreadable body (status {status})")
        })?;

        if status.is_success() {
            let profile = body
                .student_info
                .ok_or_else(|| anyhow!("Portal validate_dni response missing student_info"))?;
            Ok(EligibilityOutcome::Eligible(profile))
        } else {
            Ok(EligibilityOutcome::NotEligible(
                body.message.unwrap_or_else(|| "DNI no habilitado para rendir".to_string()),
            ))
        }
    }

    pub(crate) async fn start_exam(&self, dni: i64) -> Result<i64> {
        let response = self
            .client
            .post(format!("{}/start_exam", self.base_url))
            .json(&StartExamRequest { dni })
            .send()
            .await
            .context("Failed to call portal start_exam")?;

        let status = response.status();
        let body: StartExamResponse = response.json().await.with_context(|| {
            format!("Portal start_exam returned an unreadable body (status {status})")
        })?;

        if !status.is_success() || body.status != "success" {
            return Err(anyhow!(
                "Portal refused to start the exam (status {status}): {}",
                body.message.unwrap_or_else(|| "unknown error".to_string())
            ));
        }

        body.access_id.ok_or_else(|| anyhow!("Portal start_exam response missing access_id"))
    }

    pub(crate) async fn submit_exam(
        &self,
        access_id: i64,
        github_link: &str,
    ) -> Result<SubmitOutcome> {
        let request = SubmitExamRequest { access_id, github_link: github_link.to_string() };
        request.validate().context("Submission rejected before reaching the portal")?;

        let response = self
            .client
            .post(format!("{}/submit_exam", self.base_url))
            .json(&request)
            .send()
            .await
            .context("Failed to call portal submit_exam")?;

        let status = response.status();
        let body: PortalAck = response.json().await.with_context(|| {
            format!("Portal submit_exam returned an unreadable body (status {status})")
        })?;

        if status.is_success() && body.status == "success" {
            Ok(SubmitOutcome::Accepted)
        } else {
            Ok(SubmitOutcome::Rejected(
                body.message.unwrap_or_else(|| "No se pudo enviar el examen".to_string()),
            ))
        }
    }
}

#[async_trait]
impl ExamAuthority for PortalClient {
    async fn attempt_status(&self, access_id: i64) -> Result<AttemptStatus> {
        let response = self
            .client
            .get(format!("{}/attempt_status/{access_id}", self.base_url))
            .send()
            .await
            .context("Failed to call portal attempt_status")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Portal attempt_status failed (status {status})"));
        }

        response.json().await.context("Portal attempt_status returned an unreadable body")
    }
}
