//! # vibetimer Core Library
//!
//! Core logic for a two-mode focus timer: fixed-interval **Normal** cycling
//! of work and rest phases, and open-ended **Vibing** sessions that earn
//! rest in proportion to the time spent in flow.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A wall-clock-based state machine that requires the caller
//!   to periodically invoke `tick()` for progress updates
//! - **Driver**: A tokio task that ticks the engine every 100ms while it runs
//!   and serializes user commands with the ticks
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`TimerState`]: Read-only snapshot handed to the presentation layer
//! - [`EarnedRest`]: Rest reward arithmetic
//! - [`Config`]: Application configuration management

pub mod driver;
pub mod error;
pub mod events;
pub mod storage;
pub mod timer;

pub use driver::{Command, DriverHandle};
pub use error::{ConfigError, CoreError, TimerError};
pub use events::Event;
pub use storage::Config;
pub use timer::{
    EarnedRest, Schedule, SummaryView, TimerEngine, TimerMode, TimerPhase, TimerState, TimerView,
};
