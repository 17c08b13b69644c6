//! Tick driver.
//!
//! Runs a [`TimerEngine`] on a single task: periodic ticks and user
//! commands are handled one at a time in arrival order inside one
//! `select!` loop. The tick interval only exists while the engine is
//! running; it is dropped on pause and recreated on resume.

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::error::TimerError;
use crate::events::Event;
use crate::timer::{Clock, TimerEngine, TimerMode, TimerState};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// A user intent forwarded by the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Toggle,
    Reset,
    SwitchMode { mode: TimerMode },
    StopVibing,
    StartRest,
    Discard,
    /// Emit a `StateSnapshot` event.
    Snapshot,
    Quit,
}

/// Apply one command to the engine.
///
/// `Ok(None)` means the command had nothing to do (e.g. switching to the
/// current mode). `Quit` is handled by the driver loop, not here.
pub fn apply<C: Clock>(
    engine: &mut TimerEngine<C>,
    command: Command,
) -> Result<Option<Event>, TimerError> {
    let event = match command {
        Command::Toggle => Some(engine.toggle_running()),
        Command::Reset => Some(engine.reset()),
        Command::SwitchMode { mode } => engine.switch_mode(mode),
        Command::StopVibing => Some(engine.stop_vibing()?),
        Command::StartRest => Some(engine.start_rest()),
        Command::Discard => Some(engine.discard_session()),
        Command::Snapshot => Some(engine.snapshot()),
        Command::Quit => None,
    };
    Ok(event)
}

/// Channels and task for a spawned driver.
pub struct DriverHandle<C: Clock> {
    pub commands: mpsc::Sender<Command>,
    /// Latest state, updated after every tick and command.
    pub state: watch::Receiver<TimerState>,
    pub events: mpsc::UnboundedReceiver<Event>,
    /// Resolves to the engine once the driver stops.
    pub task: JoinHandle<TimerEngine<C>>,
}

/// Spawn [`run`] on the current tokio runtime.
pub fn spawn<C>(engine: TimerEngine<C>, period: Duration) -> DriverHandle<C>
where
    C: Clock + Send + 'static,
{
    let (command_tx, command_rx) = mpsc::channel(32);
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(engine.state().clone());
    let task = tokio::spawn(run(engine, period, command_rx, event_tx, state_tx));
    DriverHandle {
        commands: command_tx,
        state: state_rx,
        events: event_rx,
        task,
    }
}

/// Drive `engine` until `commands` closes or a `Quit` arrives.
pub async fn run<C: Clock>(
    mut engine: TimerEngine<C>,
    period: Duration,
    mut commands: mpsc::Receiver<Command>,
    events: mpsc::UnboundedSender<Event>,
    state: watch::Sender<TimerState>,
) -> TimerEngine<C> {
    let mut ticker: Option<Interval> = None;

    loop {
        sync_ticker(engine.is_running(), &mut ticker, period);

        let event = tokio::select! {
            command = commands.recv() => {
                let command = match command {
                    Some(Command::Quit) | None => break,
                    Some(command) => command,
                };
                debug!(?command, "command received");
                match apply(&mut engine, command) {
                    Ok(event) => event,
                    Err(e) => {
                        warn!(?command, error = %e, "command rejected");
                        Some(Event::CommandRejected {
                            reason: e.to_string(),
                            at: Utc::now(),
                        })
                    }
                }
            }
            _ = next_tick(&mut ticker) => engine.tick(),
        };

        // Publish state before the event so receivers of the event see it.
        let current = engine.state();
        state.send_if_modified(|published| {
            if published != current {
                *published = current.clone();
                true
            } else {
                false
            }
        });
        if let Some(event) = event {
            debug!(kind = event.kind(), "event emitted");
            if events.send(event).is_err() {
                debug!("event receiver dropped");
                break;
            }
        }
    }

    debug!("driver stopped");
    engine
}

fn sync_ticker(running: bool, ticker: &mut Option<Interval>, period: Duration) {
    match (running, ticker.is_some()) {
        (true, false) => {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            *ticker = Some(interval);
        }
        (false, true) => *ticker = None,
        _ => {}
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
