//! Earned-rest arithmetic.
//!
//! A vibing session earns one minute of rest for every `ratio` minutes
//! vibed. The stored figure is whole minutes; the summary also shows the
//! leftover seconds. Both come from the same ratio.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EarnedRest {
    /// Exact rest in seconds (`vibed / ratio`).
    pub seconds: f64,
}

impl EarnedRest {
    pub fn from_vibed(vibed_secs: f64, ratio: u32) -> Self {
        let ratio = ratio.max(1) as f64;
        Self {
            seconds: vibed_secs.max(0.0) / ratio,
        }
    }

    /// Whole minutes earned, i.e. `floor(vibed / 60 / ratio)`.
    pub fn whole_minutes(&self) -> u64 {
        (self.seconds / 60.0).floor() as u64
    }

    /// Seconds past the last whole minute, floored.
    pub fn leftover_seconds(&self) -> u64 {
        (self.seconds % 60.0).floor() as u64
    }
}
