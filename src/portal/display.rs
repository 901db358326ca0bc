use std::io::Write;

use crate::services::countdown::TimerDisplay;

/// Rewrites a single terminal line per tick, the way the original page
/// rewrote the timer element's text.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TerminalDisplay;

impl TimerDisplay for TerminalDisplay {
    fn show(&self, remaining: &str) {
        print!("\r  Tiempo restante: {remaining} ");
        std::io::stdout().flush().ok();
    }
}
