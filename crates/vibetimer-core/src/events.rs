use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{TimerMode, TimerPhase, TimerState};

/// Every state change in the engine produces an Event.
/// The front end renders them; the driver forwards them on a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: TimerMode,
        phase: TimerPhase,
        elapsed_seconds: f64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: TimerMode,
        phase: TimerPhase,
        elapsed_seconds: f64,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    /// A Normal-mode phase ran to its limit and the next one began.
    PhaseCompleted {
        completed: TimerPhase,
        next: TimerPhase,
        current_cycle: u32,
        total_work_seconds: f64,
        at: DateTime<Utc>,
    },
    ModeSwitched {
        from: TimerMode,
        to: TimerMode,
        /// Whether elapsed time carried over (only when leaving a Work phase).
        kept_elapsed: bool,
        at: DateTime<Utc>,
    },
    VibingStopped {
        vibed_seconds: f64,
        earned_rest_minutes: u64,
        at: DateTime<Utc>,
    },
    RestStarted {
        earned_rest_minutes: u64,
        at: DateTime<Utc>,
    },
    SessionDiscarded {
        vibed_seconds: f64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        at: DateTime<Utc>,
    },
    /// A command was not valid in the current state; nothing changed.
    CommandRejected {
        reason: String,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Short machine-friendly name, matching the serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::TimerStarted { .. } => "TimerStarted",
            Event::TimerPaused { .. } => "TimerPaused",
            Event::TimerReset { .. } => "TimerReset",
            Event::PhaseCompleted { .. } => "PhaseCompleted",
            Event::ModeSwitched { .. } => "ModeSwitched",
            Event::VibingStopped { .. } => "VibingStopped",
            Event::RestStarted { .. } => "RestStarted",
            Event::SessionDiscarded { .. } => "SessionDiscarded",
            Event::StateSnapshot { .. } => "StateSnapshot",
            Event::CommandRejected { .. } => "CommandRejected",
        }
    }
}
