use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::core::time::Clock;
use crate::repositories::attempt_state::{AttemptStore, StoredAttempt};
use crate::schemas::exam::AttemptStatus;
use crate::services::authority::ExamAuthority;
use crate::services::countdown::TimerDisplay;

pub(crate) async fn env_lock() -> OwnedMutexGuard<()> {
    static LOCK: OnceLock<Arc<AsyncMutex<()>>> = OnceLock::new();
    let lock = LOCK.get_or_init(|| Arc::new(AsyncMutex::new(()))).clone();
    lock.lock_owned().await
}

pub(crate) fn set_test_env(portal_url: &str, state_dir: &std::path::Path) {
    std::env::set_var("RENDIR_ENV", "test");
    std::env::set_var("RENDIR_STRICT_CONFIG", "0");
    std::env::set_var("RENDIR_PORTAL_URL", portal_url);
    std::env::set_var("RENDIR_STATE_DIR", state_dir.display().to_string());
    std::env::set_var("RENDIR_AUTHORITY_CHECK", "1");
    std::env::remove_var("RENDIR_FALLBACK_TIME_LIMIT_MINUTES");
    std::env::remove_var("RENDIR_LOG_JSON");
}

/// Clock whose "now" only moves when a test says so.
pub(crate) struct ManualClock {
    now_ms: AtomicI64,
}

impl ManualClock {
    pub(crate) fn new(now_ms: i64) -> Self {
        Self { now_ms: AtomicI64::new(now_ms) }
    }

    pub(crate) fn set(&self, value_ms: i64) {
        self.now_ms.store(value_ms, Ordering::SeqCst);
    }

    pub(crate) fn advance(&self, delta_ms: i64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub(crate) struct RecordingDisplay {
    frames: Mutex<Vec<String>>,
}

impl RecordingDisplay {
    pub(crate) fn frames(&self) -> Vec<String> {
        self.frames.lock().expect("frames lock").clone()
    }
}

impl TimerDisplay for RecordingDisplay {
    fn show(&self, remaining: &str) {
        self.frames.lock().expect("frames lock").push(remaining.to_string());
    }
}

#[derive(Default)]
pub(crate) struct MemoryAttemptStore {
    inner: Mutex<Option<StoredAttempt>>,
}

impl MemoryAttemptStore {
    pub(crate) fn with(attempt: StoredAttempt) -> Self {
        Self { inner: Mutex::new(Some(attempt)) }
    }
}

impl AttemptStore for MemoryAttemptStore {
    fn load(&self) -> anyhow::Result<Option<StoredAttempt>> {
        Ok(self.inner.lock().expect("attempt lock").clone())
    }

    fn save(&self, attempt: &StoredAttempt) -> anyhow::Result<()> {
        *self.inner.lock().expect("attempt lock") = Some(attempt.clone());
        Ok(())
    }

    fn clear(&self) -> anyhow::Result<()> {
        *self.inner.lock().expect("attempt lock") = None;
        Ok(())
    }
}

pub(crate) enum StubVerdict {
    Continue(Option<i64>),
    Deny,
    Unreachable,
}

pub(crate) struct StubAuthority {
    verdict: StubVerdict,
}

impl StubAuthority {
    pub(crate) fn new(verdict: StubVerdict) -> Self {
        Self { verdict }
    }
}

#[async_trait::async_trait]
impl ExamAuthority for StubAuthority {
    async fn attempt_status(&self, _access_id: i64) -> anyhow::Result<AttemptStatus> {
        match self.verdict {
            StubVerdict::Continue(limit) => {
                Ok(AttemptStatus { can_continue: true, time_limit_minutes: limit })
            }
            StubVerdict::Deny => Ok(AttemptStatus { can_continue: false, time_limit_minutes: None }),
            StubVerdict::Unreachable => Err(anyhow::anyhow!("portal unreachable")),
        }
    }
}

/// Loopback stand-in for the Flask portal, speaking its wire contract.
pub(crate) struct StubPortalConfig {
    pub(crate) dni: i64,
    pub(crate) time_limit_minutes: i64,
    pub(crate) eligible: bool,
    pub(crate) can_continue: bool,
    pub(crate) accept_submission: bool,
}

impl Default for StubPortalConfig {
    fn default() -> Self {
        Self {
            dni: 30123456,
            time_limit_minutes: 120,
            eligible: true,
            can_continue: true,
            accept_submission: true,
        }
    }
}

pub(crate) struct StubPortal {
    pub(crate) base_url: String,
    pub(crate) submissions: Arc<Mutex<Vec<(i64, String)>>>,
}

struct StubServerState {
    config: StubPortalConfig,
    submissions: Arc<Mutex<Vec<(i64, String)>>>,
    next_access_id: AtomicI64,
}

pub(crate) async fn spawn_stub_portal(config: StubPortalConfig) -> StubPortal {
    let submissions = Arc::new(Mutex::new(Vec::new()));
    let shared = Arc::new(StubServerState {
        config,
        submissions: submissions.clone(),
        next_access_id: AtomicI64::new(1),
    });

    let app = Router::new()
        .route("/validate_dni", post(stub_validate_dni))
        .route("/start_exam", post(stub_start_exam))
        .route("/attempt_status/:access_id", get(stub_attempt_status))
        .route("/submit_exam", post(stub_submit_exam))
        .with_state(shared);

    let listener =
        tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind stub portal");
    let base_url = format!("http://{}", listener.local_addr().expect("stub portal addr"));

    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    StubPortal { base_url, submissions }
}

async fn stub_validate_dni(
    State(stub): State<Arc<StubServerState>>,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    let dni = body["dni"].as_str().unwrap_or_default();
    let known = dni.parse::<i64>().map(|value| value == stub.config.dni).unwrap_or(false);

    if stub.config.eligible && known {
        (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "success",
                "student_info": {
                    "dni": stub.config.dni,
                    "nombre": "Estudiante de Prueba",
                    "email": "estudiante@example.edu.ar",
                    "tecnicatura": "Desarrollo de Software",
                    "exam_time_limit": stub.config.time_limit_minutes,
                },
            })),
        )
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "status": "error",
                "message": "No existe DNI inscripto para RENDIR EXAMENES FINALES EN CASA",
            })),
        )
    }
}

async fn stub_start_exam(
    State(stub): State<Arc<StubServerState>>,
    Json(_body): Json<serde_json::Value>,
) -> impl IntoResponse {
    let access_id = stub.next_access_id.fetch_add(1, Ordering::SeqCst);
    Json(serde_json::json!({ "status": "success", "access_id": access_id }))
}

async fn stub_attempt_status(
    State(stub): State<Arc<StubServerState>>,
    Path(_access_id): Path<i64>,
) -> impl IntoResponse {
    Json(serde_json::json!({
        "can_continue": stub.config.can_continue,
        "time_limit_minutes": stub.config.time_limit_minutes,
    }))
}

async fn stub_submit_exam(
    State(stub): State<Arc<StubServerState>>,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    let access_id = body["access_id"].as_i64().unwrap_or_default();
    let link = body["github_link"].as_str().unwrap_or_default().to_string();
    stub.submissions.lock().expect("submissions lock").push((access_id, link));

    if stub.config.accept_submission {
        (StatusCode::OK, Json(serde_json::json!({ "status": "success" })))
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "status": "error",
                "message": "No se pudo enviar el examen",
            })),
        )
    }
}
