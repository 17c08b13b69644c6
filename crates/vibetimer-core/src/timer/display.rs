//! Render-ready view of a [`TimerState`].
//!
//! The engine keeps fractional seconds; everything here floors to whole
//! seconds for display only.

use serde::Serialize;

use super::rest::EarnedRest;
use super::schedule::Schedule;
use super::state::{TimerMode, TimerPhase, TimerState};

/// Format seconds as `MM:SS`. Minutes are not capped at 59.
pub fn format_clock(seconds: f64) -> String {
    let secs = seconds.max(0.0);
    let mins = (secs / 60.0).floor() as u64;
    let rem = (secs % 60.0).floor() as u64;
    format!("{mins:02}:{rem:02}")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerView {
    /// Countdown in Normal, count-up in Vibing.
    pub clock: String,
    /// 0.0 ..= 1.0 through the current Normal phase; always 0 in Vibing.
    pub progress: f64,
    pub badge: &'static str,
    pub hint: String,
    /// `"2 of 4"`; only shown in Normal mode.
    pub rounds: Option<String>,
    pub is_running: bool,
}

impl TimerView {
    pub fn new(state: &TimerState, schedule: &Schedule) -> Self {
        let vibing = state.mode == TimerMode::Vibing;
        let resting = state.phase == TimerPhase::Rest;
        let limit = schedule.limit_secs(state.phase);

        let (value, progress) = if vibing {
            (state.elapsed_seconds, 0.0)
        } else {
            (
                (limit - state.elapsed_seconds).max(0.0),
                (state.elapsed_seconds / limit).min(1.0),
            )
        };

        let (badge, hint) = if vibing {
            ("VIBING IN FLOW", "Stay in the zone".to_string())
        } else if resting {
            ("EARNED REST", "Time to recharge".to_string())
        } else {
            (
                "FOCUS SESSION",
                format!(
                    "Goal: {}m / {}m",
                    schedule.work_minutes(),
                    schedule.rest_minutes()
                ),
            )
        };

        Self {
            clock: format_clock(value),
            progress,
            badge,
            hint,
            rounds: (!vibing).then(|| format!("{} of {}", state.current_cycle, state.total_cycles)),
            is_running: state.is_running,
        }
    }
}

/// What the session-summary overlay shows after vibing stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SummaryView {
    pub vibed_minutes: u64,
    pub vibed_seconds: u64,
    pub rest_minutes: u64,
    pub rest_seconds: u64,
}

impl SummaryView {
    /// Built from the frozen `last_vibed_seconds`, so later resets don't
    /// change what the overlay shows.
    pub fn new(state: &TimerState, schedule: &Schedule) -> Self {
        let vibed = state.last_vibed_seconds.max(0.0);
        let rest = EarnedRest::from_vibed(vibed, schedule.rest_ratio);
        Self {
            vibed_minutes: (vibed / 60.0).floor() as u64,
            vibed_seconds: (vibed % 60.0).floor() as u64,
            rest_minutes: rest.whole_minutes(),
            rest_seconds: rest.leftover_seconds(),
        }
    }
}
