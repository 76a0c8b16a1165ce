use std::time::Duration;

use serde::Deserialize;

/// Timing and policy knobs for the sync engine.
///
/// The late-penalty rate is deliberately a single configured constant: the
/// legacy grid shipped both a 20% and a 5% deduction in different revisions,
/// so the rate is policy, not arithmetic. 5% is the default because it is
/// what the most recent revision applied.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Trailing-edge debounce window for per-field saves.
    pub debounce_ms: u64,
    /// How long a `Saved` badge stays up before auto-clearing to idle.
    pub saved_clear_ms: u64,
    /// How long an `Error` badge stays up before auto-clearing to idle.
    pub error_clear_ms: u64,
    /// Fraction deducted from the teacher mark for late submissions, in [0, 1].
    pub late_penalty_rate: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 800,
            saved_clear_ms: 2000,
            error_clear_ms: 3000,
            late_penalty_rate: 0.05,
        }
    }
}

impl EngineConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn saved_clear(&self) -> Duration {
        Duration::from_millis(self.saved_clear_ms)
    }

    pub fn error_clear(&self) -> Duration {
        Duration::from_millis(self.error_clear_ms)
    }
}
