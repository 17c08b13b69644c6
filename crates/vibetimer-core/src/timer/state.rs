use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::schedule::DEFAULT_TOTAL_CYCLES;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    /// Fixed work/rest cycles.
    Normal,
    /// Open-ended stopwatch; stopping it earns rest.
    Vibing,
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerMode::Normal => f.write_str("normal"),
            TimerMode::Vibing => f.write_str("vibing"),
        }
    }
}

impl FromStr for TimerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" => Ok(TimerMode::Normal),
            "vibing" | "vibe" => Ok(TimerMode::Vibing),
            other => Err(format!("unknown mode '{other}' (expected normal or vibing)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    Work,
    Rest,
}

impl fmt::Display for TimerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerPhase::Work => f.write_str("work"),
            TimerPhase::Rest => f.write_str("rest"),
        }
    }
}

/// Everything the presentation layer needs to render the timer.
///
/// Owned by a [`TimerEngine`](super::TimerEngine) and only mutated through
/// its operations; callers get read-only access or a cloned snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerState {
    pub mode: TimerMode,
    /// Drives transitions in Normal mode only. In Vibing it just labels the
    /// stopwatch.
    pub phase: TimerPhase,
    pub is_running: bool,
    /// Seconds in the current phase (Normal) or vibing session (Vibing).
    pub elapsed_seconds: f64,
    /// Seconds spent in the Work phase over the whole session.
    pub total_work_seconds: f64,
    /// 1-indexed round, always within `1..=total_cycles`.
    pub current_cycle: u32,
    pub total_cycles: u32,
    /// Session summary overlay; only opened by stopping a vibing session.
    pub show_summary: bool,
    /// Whole minutes of rest earned by the last stopped vibing session.
    pub last_calculated_rest: u64,
    /// `elapsed_seconds` frozen at the moment vibing was stopped.
    pub last_vibed_seconds: f64,
}

impl TimerState {
    pub fn new(total_cycles: u32) -> Self {
        Self {
            mode: TimerMode::Normal,
            phase: TimerPhase::Work,
            is_running: false,
            elapsed_seconds: 0.0,
            total_work_seconds: 0.0,
            current_cycle: 1,
            total_cycles: total_cycles.max(1),
            show_summary: false,
            last_calculated_rest: 0,
            last_vibed_seconds: 0.0,
        }
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new(DEFAULT_TOTAL_CYCLES)
    }
}
