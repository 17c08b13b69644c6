//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()`
//! periodically while the timer runs (see [`crate::driver`]).
//!
//! ## Modes
//!
//! ```text
//! Normal:  Work --(work limit)--> Rest --(rest limit)--> Work (next cycle)
//! Vibing:  Work --stop_vibing--> [summary] --start_rest--> Rest (open-ended)
//!                                          \--discard----> Work (stopped)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(Schedule::default());
//! engine.toggle_running();
//! // Every 100ms:
//! engine.tick(); // Returns Some(Event::PhaseCompleted) on a phase change
//! ```

use chrono::Utc;
use tracing::{debug, info};

use super::clock::{Clock, SystemClock};
use super::rest::EarnedRest;
use super::schedule::Schedule;
use super::state::{TimerMode, TimerPhase, TimerState};
use crate::error::TimerError;
use crate::events::Event;

/// Core timer engine.
///
/// Operates on wall-clock deltas read from `C`. Paused time never counts:
/// the tick reference is cleared on pause and re-anchored on resume.
#[derive(Debug, Clone)]
pub struct TimerEngine<C: Clock = SystemClock> {
    schedule: Schedule,
    state: TimerState,
    /// Clock reading (ms since epoch) at the previous tick, or at the moment
    /// the timer last started running.
    last_tick_epoch_ms: Option<u64>,
    clock: C,
}

impl TimerEngine<SystemClock> {
    /// Create a stopped engine in Normal/Work at cycle 1.
    pub fn new(schedule: Schedule) -> Self {
        Self::with_clock(schedule, SystemClock)
    }
}

impl Default for TimerEngine<SystemClock> {
    fn default() -> Self {
        Self::new(Schedule::default())
    }
}

impl<C: Clock> TimerEngine<C> {
    pub fn with_clock(schedule: Schedule, clock: C) -> Self {
        Self {
            state: TimerState::new(schedule.total_cycles),
            schedule,
            last_tick_epoch_ms: None,
            clock,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn mode(&self) -> TimerMode {
        self.state.mode
    }

    pub fn phase(&self) -> TimerPhase {
        self.state.phase
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    /// Rest earned by the session currently on the clock.
    pub fn pending_rest(&self) -> EarnedRest {
        EarnedRest::from_vibed(self.state.elapsed_seconds, self.schedule.rest_ratio)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state.clone(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Play/pause.
    pub fn toggle_running(&mut self) -> Event {
        let running = !self.state.is_running;
        self.set_running(running);
        debug!(running, mode = %self.state.mode, phase = %self.state.phase, "timer toggled");
        if running {
            Event::TimerStarted {
                mode: self.state.mode,
                phase: self.state.phase,
                elapsed_seconds: self.state.elapsed_seconds,
                at: Utc::now(),
            }
        } else {
            Event::TimerPaused {
                mode: self.state.mode,
                phase: self.state.phase,
                elapsed_seconds: self.state.elapsed_seconds,
                at: Utc::now(),
            }
        }
    }

    /// Stop and return to the start of the first Work phase.
    ///
    /// Session totals (`total_work_seconds`, `total_cycles`) are kept.
    pub fn reset(&mut self) -> Event {
        self.set_running(false);
        self.state.elapsed_seconds = 0.0;
        self.state.phase = TimerPhase::Work;
        self.state.current_cycle = 1;
        debug!("timer reset");
        Event::TimerReset { at: Utc::now() }
    }

    /// Switch between Normal and Vibing. Returns `None` if already in `mode`.
    ///
    /// Elapsed time carries over only out of a Work phase; any Rest progress
    /// is dropped. The phase is always Work afterwards.
    pub fn switch_mode(&mut self, mode: TimerMode) -> Option<Event> {
        let from = self.state.mode;
        if from == mode {
            return None;
        }
        let kept_elapsed = self.state.phase == TimerPhase::Work;
        if !kept_elapsed {
            self.state.elapsed_seconds = 0.0;
        }
        self.state.mode = mode;
        self.state.phase = TimerPhase::Work;
        debug!(%from, to = %mode, kept_elapsed, "mode switched");
        Some(Event::ModeSwitched {
            from,
            to: mode,
            kept_elapsed,
            at: Utc::now(),
        })
    }

    /// End a vibing session and open the summary.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::NotVibing`] in Normal mode; the state is left
    /// untouched.
    pub fn stop_vibing(&mut self) -> Result<Event, TimerError> {
        if self.state.mode != TimerMode::Vibing {
            return Err(TimerError::NotVibing {
                mode: self.state.mode,
            });
        }
        self.set_running(false);
        let vibed = self.state.elapsed_seconds;
        let earned = self.pending_rest().whole_minutes();
        self.state.show_summary = true;
        self.state.last_vibed_seconds = vibed;
        self.state.last_calculated_rest = earned;
        info!(vibed_seconds = vibed, earned_rest_minutes = earned, "vibing stopped");
        Ok(Event::VibingStopped {
            vibed_seconds: vibed,
            earned_rest_minutes: earned,
            at: Utc::now(),
        })
    }

    /// Take the earned rest from the summary.
    ///
    /// The mode stays Vibing, so the rest runs open-ended with no limit.
    pub fn start_rest(&mut self) -> Event {
        self.state.show_summary = false;
        self.state.phase = TimerPhase::Rest;
        self.state.elapsed_seconds = 0.0;
        self.set_running(true);
        debug!(earned_rest_minutes = self.state.last_calculated_rest, "rest started");
        Event::RestStarted {
            earned_rest_minutes: self.state.last_calculated_rest,
            at: Utc::now(),
        }
    }

    /// Throw the summarized session away and go back to a stopped Work phase.
    pub fn discard_session(&mut self) -> Event {
        self.state.show_summary = false;
        self.state.elapsed_seconds = 0.0;
        self.state.phase = TimerPhase::Work;
        self.set_running(false);
        debug!("session discarded");
        Event::SessionDiscarded {
            vibed_seconds: self.state.last_vibed_seconds,
            at: Utc::now(),
        }
    }

    /// Call periodically. Returns `Some(Event::PhaseCompleted)` when a
    /// Normal-mode phase reaches its limit.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.state.is_running {
            return None;
        }
        let now = self.clock.now_ms();
        let delta = self
            .last_tick_epoch_ms
            .map(|last| now.saturating_sub(last) as f64 / 1000.0)
            .unwrap_or(0.0);
        self.last_tick_epoch_ms = Some(now);
        self.advance(delta)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn set_running(&mut self, running: bool) {
        self.state.is_running = running;
        self.last_tick_epoch_ms = if running {
            Some(self.clock.now_ms())
        } else {
            None
        };
    }

    /// Apply `delta` seconds of running time.
    fn advance(&mut self, delta: f64) -> Option<Event> {
        let phase = self.state.phase;
        let candidate = self.state.elapsed_seconds + delta;

        if self.state.mode == TimerMode::Normal {
            let limit = self.schedule.limit_secs(phase);
            if candidate >= limit {
                return Some(self.complete_phase(limit));
            }
        }

        self.state.elapsed_seconds = candidate;
        if phase == TimerPhase::Work {
            self.state.total_work_seconds += delta;
        }
        None
    }

    /// Move to the other Normal phase. Overshoot past `limit` is dropped.
    fn complete_phase(&mut self, limit: f64) -> Event {
        let completed = self.state.phase;
        match completed {
            TimerPhase::Work => {
                // The full limit is credited on top of the ticks already counted.
                self.state.total_work_seconds += limit;
                self.state.phase = TimerPhase::Rest;
            }
            TimerPhase::Rest => {
                self.state.phase = TimerPhase::Work;
                self.state.current_cycle =
                    (self.state.current_cycle % self.state.total_cycles) + 1;
            }
        }
        self.state.elapsed_seconds = 0.0;
        info!(
            %completed,
            next = %self.state.phase,
            cycle = self.state.current_cycle,
            "phase completed"
        );
        Event::PhaseCompleted {
            completed,
            next: self.state.phase,
            current_cycle: self.state.current_cycle,
            total_work_seconds: self.state.total_work_seconds,
            at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::clock::ManualClock;
    use proptest::prelude::*;

    const EPS: f64 = 1e-6;

    fn engine() -> (TimerEngine<ManualClock>, ManualClock) {
        let clock = ManualClock::new(1_700_000_000_000);
        (
            TimerEngine::with_clock(Schedule::default(), clock.clone()),
            clock,
        )
    }

    fn run_for(engine: &mut TimerEngine<ManualClock>, clock: &ManualClock, secs: f64) -> Option<Event> {
        clock.advance_secs(secs);
        engine.tick()
    }

    #[test]
    fn first_tick_after_start_has_zero_delta() {
        let (mut engine, _clock) = engine();
        engine.toggle_running();
        assert!(engine.tick().is_none());
        assert_eq!(engine.state().elapsed_seconds, 0.0);
    }

    #[test]
    fn ticks_accumulate_wall_clock_deltas() {
        let (mut engine, clock) = engine();
        engine.toggle_running();
        for _ in 0..10 {
            run_for(&mut engine, &clock, 0.1);
        }
        // A late tick is reconciled rather than counted as one period.
        run_for(&mut engine, &clock, 2.5);
        assert!((engine.state().elapsed_seconds - 3.5).abs() < EPS);
        assert!((engine.state().total_work_seconds - 3.5).abs() < EPS);
    }

    #[test]
    fn tick_while_paused_is_a_no_op() {
        let (mut engine, clock) = engine();
        clock.advance_secs(30.0);
        assert!(engine.tick().is_none());
        assert_eq!(engine.state().elapsed_seconds, 0.0);
    }

    #[test]
    fn paused_interval_is_not_counted() {
        let (mut engine, clock) = engine();
        engine.toggle_running();
        run_for(&mut engine, &clock, 10.0);

        assert!(matches!(engine.toggle_running(), Event::TimerPaused { .. }));
        clock.advance_secs(600.0);
        assert!(matches!(engine.toggle_running(), Event::TimerStarted { .. }));

        engine.tick();
        assert!((engine.state().elapsed_seconds - 10.0).abs() < EPS);
        run_for(&mut engine, &clock, 1.0);
        assert!((engine.state().elapsed_seconds - 11.0).abs() < EPS);
    }

    #[test]
    fn work_limit_crossing_moves_to_rest_once() {
        let (mut engine, clock) = engine();
        engine.toggle_running();

        let event = run_for(&mut engine, &clock, 3600.0);
        match event {
            Some(Event::PhaseCompleted {
                completed, next, ..
            }) => {
                assert_eq!(completed, TimerPhase::Work);
                assert_eq!(next, TimerPhase::Rest);
            }
            other => panic!("Expected PhaseCompleted, got {other:?}"),
        }
        let s = engine.state();
        assert_eq!(s.phase, TimerPhase::Rest);
        assert_eq!(s.elapsed_seconds, 0.0);
        assert!(s.is_running);
        // Full limit, not the 3600s candidate.
        assert_eq!(s.total_work_seconds, 3000.0);

        assert!(run_for(&mut engine, &clock, 1.0).is_none());
        assert_eq!(engine.phase(), TimerPhase::Rest);
        assert_eq!(engine.state().total_work_seconds, 3000.0);
    }

    #[test]
    fn work_crossing_adds_full_limit_on_top_of_ticked_time() {
        let (mut engine, clock) = engine();
        engine.toggle_running();
        run_for(&mut engine, &clock, 2999.9);
        assert_eq!(engine.phase(), TimerPhase::Work);
        assert!((engine.state().total_work_seconds - 2999.9).abs() < EPS);

        let event = run_for(&mut engine, &clock, 0.5);
        assert!(matches!(
            event,
            Some(Event::PhaseCompleted { total_work_seconds, .. })
                if (total_work_seconds - 5999.9).abs() < EPS
        ));
        assert_eq!(engine.phase(), TimerPhase::Rest);
        assert!((engine.state().total_work_seconds - 5999.9).abs() < EPS);
    }

    #[test]
    fn exact_limit_counts_as_reached() {
        let (mut engine, clock) = engine();
        engine.toggle_running();
        assert!(run_for(&mut engine, &clock, 3000.0).is_some());
        assert_eq!(engine.phase(), TimerPhase::Rest);
    }

    #[test]
    fn rest_does_not_add_work_time() {
        let (mut engine, clock) = engine();
        engine.toggle_running();
        run_for(&mut engine, &clock, 3000.0);
        run_for(&mut engine, &clock, 120.0);
        assert!((engine.state().elapsed_seconds - 120.0).abs() < EPS);
        assert_eq!(engine.state().total_work_seconds, 3000.0);
    }

    #[test]
    fn rest_completion_advances_cycle() {
        let (mut engine, clock) = engine();
        engine.toggle_running();
        run_for(&mut engine, &clock, 3000.0);
        let event = run_for(&mut engine, &clock, 600.0);
        assert!(matches!(
            event,
            Some(Event::PhaseCompleted {
                completed: TimerPhase::Rest,
                next: TimerPhase::Work,
                current_cycle: 2,
                ..
            })
        ));
        assert_eq!(engine.state().current_cycle, 2);
        assert!(engine.is_running());
    }

    #[test]
    fn cycle_wraps_after_last_round() {
        let (mut engine, clock) = engine();
        engine.toggle_running();
        // Three full rounds bring us to cycle 4.
        for _ in 0..3 {
            run_for(&mut engine, &clock, 3000.0);
            run_for(&mut engine, &clock, 600.0);
        }
        assert_eq!(engine.state().current_cycle, 4);
        run_for(&mut engine, &clock, 3000.0);
        run_for(&mut engine, &clock, 600.0);
        assert_eq!(engine.state().current_cycle, 1);
        assert_eq!(engine.state().total_work_seconds, 4.0 * 3000.0);
    }

    #[test]
    fn reset_returns_to_first_work_phase_and_keeps_totals() {
        let (mut engine, clock) = engine();
        engine.toggle_running();
        run_for(&mut engine, &clock, 3000.0);
        run_for(&mut engine, &clock, 600.0);
        run_for(&mut engine, &clock, 42.0);

        engine.reset();
        let s = engine.state().clone();
        assert!(!s.is_running);
        assert_eq!(s.elapsed_seconds, 0.0);
        assert_eq!(s.phase, TimerPhase::Work);
        assert_eq!(s.current_cycle, 1);
        assert_eq!(s.total_cycles, 4);
        assert!((s.total_work_seconds - 3042.0).abs() < EPS);

        engine.reset();
        assert_eq!(engine.state(), &s);
    }

    #[test]
    fn reset_stops_the_tick_reference() {
        let (mut engine, clock) = engine();
        engine.toggle_running();
        engine.reset();
        clock.advance_secs(100.0);
        assert!(engine.tick().is_none());
        engine.toggle_running();
        engine.tick();
        assert_eq!(engine.state().elapsed_seconds, 0.0);
    }

    #[test]
    fn switch_mode_to_same_mode_is_a_no_op() {
        let (mut engine, _clock) = engine();
        assert!(engine.switch_mode(TimerMode::Normal).is_none());
    }

    #[test]
    fn switch_mode_from_work_keeps_elapsed() {
        let (mut engine, clock) = engine();
        engine.toggle_running();
        run_for(&mut engine, &clock, 90.0);
        let event = engine.switch_mode(TimerMode::Vibing);
        assert!(matches!(
            event,
            Some(Event::ModeSwitched {
                kept_elapsed: true,
                ..
            })
        ));
        assert_eq!(engine.mode(), TimerMode::Vibing);
        assert!((engine.state().elapsed_seconds - 90.0).abs() < EPS);
        assert!(engine.is_running());
    }

    #[test]
    fn switch_mode_from_rest_discards_progress() {
        let (mut engine, clock) = engine();
        engine.toggle_running();
        run_for(&mut engine, &clock, 3000.0);
        run_for(&mut engine, &clock, 200.0);
        assert_eq!(engine.phase(), TimerPhase::Rest);

        engine.switch_mode(TimerMode::Vibing);
        assert_eq!(engine.state().elapsed_seconds, 0.0);
        assert_eq!(engine.phase(), TimerPhase::Work);
    }

    #[test]
    fn long_vibe_switched_to_normal_completes_work_with_limit_credit() {
        let (mut engine, clock) = engine();
        engine.switch_mode(TimerMode::Vibing);
        engine.toggle_running();
        run_for(&mut engine, &clock, 4000.0);
        engine.switch_mode(TimerMode::Normal);

        let event = run_for(&mut engine, &clock, 0.1);
        assert!(matches!(event, Some(Event::PhaseCompleted { .. })));
        assert_eq!(engine.phase(), TimerPhase::Rest);
        assert!((engine.state().total_work_seconds - 7000.0).abs() < EPS);
    }

    #[test]
    fn vibing_has_no_limit() {
        let (mut engine, clock) = engine();
        engine.switch_mode(TimerMode::Vibing);
        engine.toggle_running();
        assert!(run_for(&mut engine, &clock, 7200.0).is_none());
        let s = engine.state();
        assert_eq!(s.phase, TimerPhase::Work);
        assert_eq!(s.elapsed_seconds, 7200.0);
        assert_eq!(s.total_work_seconds, 7200.0);
        assert_eq!(s.current_cycle, 1);
    }

    #[test]
    fn stop_vibing_computes_earned_rest() {
        let (mut engine, clock) = engine();
        engine.switch_mode(TimerMode::Vibing);
        engine.toggle_running();
        run_for(&mut engine, &clock, 1500.0);

        let event = engine.stop_vibing().unwrap();
        assert!(matches!(
            event,
            Event::VibingStopped {
                earned_rest_minutes: 5,
                ..
            }
        ));
        let s = engine.state();
        assert!(!s.is_running);
        assert!(s.show_summary);
        assert_eq!(s.last_calculated_rest, 5);
        assert_eq!(s.last_vibed_seconds, 1500.0);
    }

    #[test]
    fn stop_vibing_in_normal_mode_is_rejected() {
        let (mut engine, clock) = engine();
        engine.toggle_running();
        run_for(&mut engine, &clock, 1500.0);
        let before = engine.state().clone();

        let err = engine.stop_vibing().unwrap_err();
        assert_eq!(
            err,
            TimerError::NotVibing {
                mode: TimerMode::Normal
            }
        );
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn stop_then_discard_returns_to_stopped_work() {
        let (mut engine, clock) = engine();
        engine.switch_mode(TimerMode::Vibing);
        engine.toggle_running();
        run_for(&mut engine, &clock, 321.0);
        engine.stop_vibing().unwrap();

        let event = engine.discard_session();
        assert!(matches!(event, Event::SessionDiscarded { vibed_seconds, .. } if vibed_seconds == 321.0));
        let s = engine.state();
        assert_eq!(s.elapsed_seconds, 0.0);
        assert!(!s.show_summary);
        assert!(!s.is_running);
        assert_eq!(s.phase, TimerPhase::Work);
        assert_eq!(s.mode, TimerMode::Vibing);
        // The frozen figure survives for anyone still rendering it.
        assert_eq!(s.last_vibed_seconds, 321.0);
    }

    #[test]
    fn start_rest_runs_open_ended_rest_under_vibing() {
        let (mut engine, clock) = engine();
        engine.switch_mode(TimerMode::Vibing);
        engine.toggle_running();
        run_for(&mut engine, &clock, 3000.0);
        engine.stop_vibing().unwrap();
        let total_before = engine.state().total_work_seconds;

        clock.advance_secs(60.0);
        let event = engine.start_rest();
        assert!(matches!(
            event,
            Event::RestStarted {
                earned_rest_minutes: 10,
                ..
            }
        ));
        assert_eq!(engine.mode(), TimerMode::Vibing);
        assert_eq!(engine.phase(), TimerPhase::Rest);
        assert!(engine.is_running());
        assert!(!engine.state().show_summary);

        // Time on the summary screen is not counted.
        engine.tick();
        assert_eq!(engine.state().elapsed_seconds, 0.0);

        // Well past the Normal rest limit, still resting.
        assert!(run_for(&mut engine, &clock, 1200.0).is_none());
        assert_eq!(engine.phase(), TimerPhase::Rest);
        assert_eq!(engine.state().elapsed_seconds, 1200.0);
        assert_eq!(engine.state().total_work_seconds, total_before);
    }

    #[test]
    fn rest_and_discard_apply_without_a_summary() {
        let (mut engine, clock) = engine();
        engine.toggle_running();
        run_for(&mut engine, &clock, 120.0);

        assert!(matches!(
            engine.start_rest(),
            Event::RestStarted {
                earned_rest_minutes: 0,
                ..
            }
        ));
        assert_eq!(engine.phase(), TimerPhase::Rest);
        assert_eq!(engine.state().elapsed_seconds, 0.0);
        assert!(engine.is_running());

        assert!(matches!(
            engine.discard_session(),
            Event::SessionDiscarded { .. }
        ));
        assert_eq!(engine.phase(), TimerPhase::Work);
        assert!(!engine.is_running());
        assert!(!engine.state().show_summary);
    }

    #[test]
    fn pending_rest_tracks_live_session() {
        let (mut engine, clock) = engine();
        engine.switch_mode(TimerMode::Vibing);
        engine.toggle_running();
        run_for(&mut engine, &clock, 600.0);
        assert_eq!(engine.pending_rest().whole_minutes(), 2);
    }

    #[test]
    fn snapshot_returns_state() {
        let (engine, _clock) = engine();
        match engine.snapshot() {
            Event::StateSnapshot { state, .. } => {
                assert_eq!(state, TimerState::default());
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }

    proptest! {
        #[test]
        fn normal_mode_invariants_hold(deltas in proptest::collection::vec(0u64..900_000, 1..60)) {
            let (mut engine, clock) = engine();
            engine.toggle_running();
            let mut last_total = 0.0;
            for ms in deltas {
                clock.advance_ms(ms);
                engine.tick();
                let s = engine.state();
                prop_assert!(s.elapsed_seconds >= 0.0);
                prop_assert!(s.elapsed_seconds < engine.schedule().limit_secs(s.phase));
                prop_assert!((1..=s.total_cycles).contains(&s.current_cycle));
                prop_assert!(s.total_work_seconds + EPS >= last_total);
                last_total = s.total_work_seconds;
            }
        }

        #[test]
        fn vibing_elapsed_is_sum_of_deltas(deltas in proptest::collection::vec(0u64..10_000_000, 1..40)) {
            let (mut engine, clock) = engine();
            engine.switch_mode(TimerMode::Vibing);
            engine.toggle_running();
            let mut expected = 0.0;
            for ms in deltas {
                clock.advance_ms(ms);
                engine.tick();
                expected += ms as f64 / 1000.0;
            }
            prop_assert!((engine.state().elapsed_seconds - expected).abs() < 1e-3);
            prop_assert!((engine.state().total_work_seconds - expected).abs() < 1e-3);
        }
    }
}
