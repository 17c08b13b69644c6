mod clock;
mod display;
mod engine;
mod rest;
mod schedule;
mod state;

pub use clock::{Clock, ManualClock, SystemClock};
pub use display::{format_clock, SummaryView, TimerView};
pub use engine::TimerEngine;
pub use rest::EarnedRest;
pub use schedule::{
    Schedule, DEFAULT_TOTAL_CYCLES, REST_LIMIT_SECS, VIBE_REST_RATIO, WORK_LIMIT_SECS,
};
pub use state::{TimerMode, TimerPhase, TimerState};
