use std::env;

use thiserror::Error;

const DEFAULT_PORTAL_URL: &str = "http://localhost:5000";

#[derive(Debug, Clone)]
pub(crate) struct Settings {
    runtime: RuntimeSettings,
    portal: PortalSettings,
    exam: ExamSettings,
    storage: StorageSettings,
    telemetry: TelemetrySettings,
}

#[derive(Debug, Clone)]
pub(crate) struct PortalSettings {
    pub(crate) base_url: String,
    pub(crate) connect_timeout_seconds: u64,
    pub(crate) request_timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub(crate) struct ExamSettings {
    pub(crate) fallback_time_limit_minutes: i64,
    pub(crate) authority_check_enabled: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct StorageSettings {
    pub(crate) state_dir: String,
}

#[derive(Debug, Clone)]
pub(crate) struct TelemetrySettings {
    pub(crate) log_level: String,
    pub(crate) json: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct RuntimeSettings {
    pub(crate) environment: Environment,
    pub(crate) strict_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Environment {
    Development,
    Production,
    Staging,
    Test,
}

impl Environment {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Staging => "staging",
            Environment::Test => "test",
        }
    }

    fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
    #[error("missing required value for {0}")]
    MissingValue(&'static str),
}

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let environment =
            parse_environment(env_optional("RENDIR_ENV").or_else(|| env_optional("ENVIRONMENT")));
        let strict_config =
            env_optional("RENDIR_STRICT_CONFIG").map(|value| parse_bool(&value)).unwrap_or(false)
                || environment.is_production();

        let base_url = env_or_default("RENDIR_PORTAL_URL", DEFAULT_PORTAL_URL);
        let connect_timeout_seconds = parse_u64(
            "RENDIR_PORTAL_CONNECT_TIMEOUT_SECONDS",
            env_or_default("RENDIR_PORTAL_CONNECT_TIMEOUT_SECONDS", "10"),
        )?;
        let request_timeout_seconds = parse_u64(
            "RENDIR_PORTAL_TIMEOUT_SECONDS",
            env_or_default("RENDIR_PORTAL_TIMEOUT_SECONDS", "30"),
        )?;

        let fallback_time_limit_minutes = parse_i64(
            "RENDIR_FALLBACK_TIME_LIMIT_MINUTES",
            env_or_default("RENDIR_FALLBACK_TIME_LIMIT_MINUTES", "120"),
        )?;
        let authority_check_enabled = env_optional("RENDIR_AUTHORITY_CHECK")
            .map(|value| parse_bool(&value))
            .unwrap_or(true);

        let state_dir = env_or_default("RENDIR_STATE_DIR", ".rendir");

        let log_level = env_or_default("RENDIR_LOG_LEVEL", "info");
        let json = env_optional("RENDIR_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            runtime: RuntimeSettings { environment, strict_config },
            portal: PortalSettings { base_url, connect_timeout_seconds, request_timeout_seconds },
            exam: ExamSettings { fallback_time_limit_minutes, authority_check_enabled },
            storage: StorageSettings { state_dir },
            telemetry: TelemetrySettings { log_level, json },
        };

        settings.validate()?;

        Ok(settings)
    }

    pub(crate) fn portal(&self) -> &PortalSettings {
        &self.portal
    }

    pub(crate) fn exam(&self) -> &ExamSettings {
        &self.exam
    }

    pub(crate) fn storage(&self) -> &StorageSettings {
        &self.storage
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.portal.base_url.starts_with("http://")
            || self.portal.base_url.starts_with("https://"))
        {
            return Err(ConfigError::InvalidValue {
                field: "RENDIR_PORTAL_URL",
                value: self.portal.base_url.clone(),
            });
        }

        if self.portal.connect_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "RENDIR_PORTAL_CONNECT_TIMEOUT_SECONDS",
                value: "0".to_string(),
            });
        }

        if self.portal.request_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "RENDIR_PORTAL_TIMEOUT_SECONDS",
                value: "0".to_string(),
            });
        }

        if self.exam.fallback_time_limit_minutes <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "RENDIR_FALLBACK_TIME_LIMIT_MINUTES",
                value: self.exam.fallback_time_limit_minutes.to_string(),
            });
        }

        if self.storage.state_dir.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "RENDIR_STATE_DIR",
                value: String::from("<empty>"),
            });
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        // Production clients must point at an explicit portal, not the dev default.
        if env_optional("RENDIR_PORTAL_URL").is_none() {
            return Err(ConfigError::MissingValue("RENDIR_PORTAL_URL"));
        }

        Ok(())
    }
}

fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn env_or_default(key: &str, default: &str) -> String {
    env_optional(key).unwrap_or_else(|| default.to_string())
}

fn parse_u64(field: &'static str, value: String) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidValue { field, value })
}

fn parse_i64(field: &'static str, value: String) -> Result<i64, ConfigError> {
    value.parse::<i64>().map_err(|_| ConfigError::InvalidValue { field, value })
}

fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "yes" | "YES" | "on" | "ON")
}

fn parse_environment(value: Option<String>) -> Environment {
    match value.as_deref().map(|val| val.to_lowercase()) {
        Some(ref val) if val == "production" || val == "prod" => Environment::Production,
        Some(ref val) if val == "staging" => Environment::Staging,
        Some(ref val) if val == "test" || val == "testing" => Environment::Test,
        _ => Environment::Development,
    }
}
