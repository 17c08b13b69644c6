use serde::{Deserialize, Serialize};

use super::state::TimerPhase;

/// Work phase length in Normal mode (50 minutes).
pub const WORK_LIMIT_SECS: u64 = 50 * 60;
/// Rest phase length in Normal mode (10 minutes).
pub const REST_LIMIT_SECS: u64 = 10 * 60;
/// Rounds per full Normal session.
pub const DEFAULT_TOTAL_CYCLES: u32 = 4;
/// Minutes vibed per minute of earned rest.
pub const VIBE_REST_RATIO: u32 = 5;

/// Fixed limits the engine runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub work_secs: u64,
    pub rest_secs: u64,
    pub total_cycles: u32,
    pub rest_ratio: u32,
}

impl Schedule {
    /// Build a schedule from minute durations.
    ///
    /// Zero values are clamped to one so the phase limits and the cycle
    /// modulus stay meaningful.
    pub fn from_minutes(work_min: u64, rest_min: u64, total_cycles: u32, rest_ratio: u32) -> Self {
        Self {
            work_secs: work_min.max(1).saturating_mul(60),
            rest_secs: rest_min.max(1).saturating_mul(60),
            total_cycles: total_cycles.max(1),
            rest_ratio: rest_ratio.max(1),
        }
    }

    /// Phase limit in seconds.
    pub fn limit_secs(&self, phase: TimerPhase) -> f64 {
        match phase {
            TimerPhase::Work => self.work_secs as f64,
            TimerPhase::Rest => self.rest_secs as f64,
        }
    }

    pub fn work_minutes(&self) -> u64 {
        self.work_secs / 60
    }

    pub fn rest_minutes(&self) -> u64 {
        self.rest_secs / 60
    }

    /// Length of a full Normal session (every WORK+REST pair).
    pub fn total_duration_secs(&self) -> u64 {
        (self.work_secs + self.rest_secs).saturating_mul(self.total_cycles as u64)
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            work_secs: WORK_LIMIT_SECS,
            rest_secs: REST_LIMIT_SECS,
            total_cycles: DEFAULT_TOTAL_CYCLES,
            rest_ratio: VIBE_REST_RATIO,
        }
    }
}
