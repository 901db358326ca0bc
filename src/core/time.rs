use std::sync::Arc;

use time::{format_description::well_known::Rfc3339, OffsetDateTime};

/// Source of "now" for all countdown math, injectable so the timer and the
/// session bootstrap can be tested without the wall clock.
pub(crate) trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

pub(crate) type SharedClock = Arc<dyn Clock>;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
    }
}

pub(crate) fn system_clock() -> SharedClock {
    Arc::new(SystemClock)
}

pub(crate) fn format_ms(value_ms: i64) -> String {
    match OffsetDateTime::from_unix_timestamp_nanos(i128::from(value_ms) * 1_000_000) {
        Ok(value) => value.format(&Rfc3339).unwrap_or_else(|_| value.to_string()),
        Err(_) => value_ms.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_ms_outputs_utc_z() {
        // 2025-01-02T10:20:30Z
        assert_eq!(format_ms(1_735_813_230_000), "2025-01-02T10:20:30Z");
    }

    #[test]
    fn format_ms_keeps_millisecond_fraction() {
        let formatted = format_ms(1_735_813_230_500);
        assert!(formatted.starts_with("2025-01-02T10:20:30.5"), "formatted: {formatted}");
        assert!(formatted.ends_with('Z'));
    }

    #[test]
    fn system_clock_is_past_2024() {
        assert!(SystemClock.now_ms() > 1_704_067_200_000);
    }
}
