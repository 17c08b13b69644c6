use std::io::Write;
use std::time::Duration;

use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;
use vibetimer_core::driver;
use vibetimer_core::timer::format_clock;
use vibetimer_core::{
    Command, Config, Event, Schedule, SummaryView, TimerEngine, TimerMode, TimerState, TimerView,
};

const HELP: &str = "commands: t(oggle)  r(eset)  n(ormal)  v(ibing)  s(top)  rest  d(iscard)  status  q(uit)";

#[derive(Args)]
pub struct RunArgs {
    /// Mode to start in (normal or vibing)
    #[arg(long, default_value = "normal")]
    mode: TimerMode,

    /// Work phase length in minutes (overrides config)
    #[arg(long)]
    work: Option<u64>,

    /// Rest phase length in minutes (overrides config)
    #[arg(long)]
    rest: Option<u64>,

    /// Rounds per Normal session (overrides config)
    #[arg(long)]
    cycles: Option<u32>,

    /// Minutes vibed per minute of earned rest (overrides config)
    #[arg(long)]
    ratio: Option<u32>,

    /// Start the timer right away
    #[arg(long)]
    start: bool,

    /// Print events as JSON lines instead of a live status line
    #[arg(long)]
    json: bool,
}

impl RunArgs {
    fn schedule(&self, config: &Config) -> Schedule {
        let timer = &config.timer;
        Schedule::from_minutes(
            self.work.unwrap_or(timer.work_minutes),
            self.rest.unwrap_or(timer.rest_minutes),
            self.cycles.unwrap_or(timer.total_cycles),
            self.ratio.unwrap_or(timer.vibe_rest_ratio),
        )
    }
}

pub fn run(args: RunArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let schedule = args.schedule(config);
    let period = config.tick_interval();

    // Ticks and input share one thread; the driver serializes them.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(session(args, schedule, period));
    // Don't wait on a stdin read still parked in the blocking pool.
    runtime.shutdown_background();
    result
}

async fn session(
    args: RunArgs,
    schedule: Schedule,
    period: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = TimerEngine::new(schedule);
    engine.switch_mode(args.mode);
    if args.start {
        engine.toggle_running();
    }

    let mut renderer = Renderer::new(args.json, schedule);
    renderer.intro(engine.state())?;

    let driver::DriverHandle {
        commands,
        mut state,
        mut events,
        task,
    } = driver::spawn(engine, period);
    tokio::spawn(read_input(commands));

    loop {
        tokio::select! {
            biased;
            event = events.recv() => match event {
                Some(event) => {
                    let current = state.borrow().clone();
                    renderer.event(&event, &current)?;
                }
                None => break,
            },
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = state.borrow_and_update().clone();
                renderer.status(&current)?;
            }
        }
    }

    let engine = task.await?;
    renderer.outro(&engine)?;
    Ok(())
}

/// Forward stdin lines to the driver until EOF or `quit`.
async fn read_input(commands: mpsc::Sender<Command>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                debug!(error = %e, "stdin closed");
                break;
            }
        };
        match parse_command(&line) {
            Ok(Some(command)) => {
                if commands.send(command).await.is_err() || command == Command::Quit {
                    break;
                }
            }
            Ok(None) => {}
            Err(msg) => eprintln!("{msg}\n{HELP}"),
        }
    }
}

/// Map a line of user input to a driver command. Blank lines are ignored.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let command = match line.trim().to_lowercase().as_str() {
        "" => return Ok(None),
        "t" | "toggle" | "p" | "play" | "pause" => Command::Toggle,
        "r" | "reset" => Command::Reset,
        "n" | "normal" => Command::SwitchMode {
            mode: TimerMode::Normal,
        },
        "v" | "vibe" | "vibing" => Command::SwitchMode {
            mode: TimerMode::Vibing,
        },
        "s" | "stop" => Command::StopVibing,
        "rest" => Command::StartRest,
        "d" | "discard" => Command::Discard,
        "status" | "?" => Command::Snapshot,
        "q" | "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command '{other}'")),
    };
    Ok(Some(command))
}

struct Renderer {
    json: bool,
    schedule: Schedule,
    out: std::io::Stdout,
}

impl Renderer {
    fn new(json: bool, schedule: Schedule) -> Self {
        Self {
            json,
            schedule,
            out: std::io::stdout(),
        }
    }

    fn intro(&mut self, state: &TimerState) -> std::io::Result<()> {
        if self.json {
            return Ok(());
        }
        let mut out = self.out.lock();
        writeln!(
            out,
            "vibetimer: {}m work / {}m rest x {} rounds ({}m in all), 1m rest per {}m vibed",
            self.schedule.work_minutes(),
            self.schedule.rest_minutes(),
            self.schedule.total_cycles,
            self.schedule.total_duration_secs() / 60,
            self.schedule.rest_ratio
        )?;
        writeln!(out, "{HELP}")?;
        drop(out);
        self.status(state)
    }

    fn status(&mut self, state: &TimerState) -> std::io::Result<()> {
        if self.json {
            return Ok(());
        }
        let view = TimerView::new(state, &self.schedule);
        let rounds = view
            .rounds
            .map(|r| format!("  round {r}"))
            .unwrap_or_default();
        let running = if view.is_running { "running" } else { "paused" };
        let mut out = self.out.lock();
        write!(
            out,
            "\r[{}] {}  {}{}  ({})\x1b[K",
            view.badge, view.clock, view.hint, rounds, running
        )?;
        out.flush()
    }

    fn event(&mut self, event: &Event, state: &TimerState) -> std::io::Result<()> {
        if self.json {
            let line = serde_json::to_string(event).map_err(std::io::Error::other)?;
            let mut out = self.out.lock();
            writeln!(out, "{line}")?;
            return out.flush();
        }

        let line = match event {
            Event::PhaseCompleted {
                completed,
                next,
                current_cycle,
                ..
            } => Some(format!(
                "{completed} phase complete, {next} begins (round {current_cycle} of {})",
                state.total_cycles
            )),
            Event::ModeSwitched { to, .. } => Some(format!("mode: {to}")),
            Event::TimerReset { .. } => Some("reset".to_string()),
            Event::VibingStopped { .. } => {
                let summary = SummaryView::new(state, &self.schedule);
                Some(format!(
                    "zone break: vibed {}m {:02}s, earned rest {}m {:02}s. Type 'rest' to start resting or 'discard'.",
                    summary.vibed_minutes,
                    summary.vibed_seconds,
                    summary.rest_minutes,
                    summary.rest_seconds
                ))
            }
            Event::RestStarted {
                earned_rest_minutes,
                ..
            } => Some(format!("resting ({earned_rest_minutes} min earned)")),
            Event::SessionDiscarded { vibed_seconds, .. } => Some(format!(
                "session of {} discarded",
                format_clock(*vibed_seconds)
            )),
            Event::StateSnapshot { state, .. } => Some(format!(
                "{} / {}: elapsed {}, total work {}, round {} of {}",
                state.mode,
                state.phase,
                format_clock(state.elapsed_seconds),
                format_clock(state.total_work_seconds),
                state.current_cycle,
                state.total_cycles
            )),
            Event::CommandRejected { reason, .. } => {
                eprintln!("\nerror: {reason}");
                None
            }
            Event::TimerStarted { .. } | Event::TimerPaused { .. } => None,
        };

        if let Some(line) = line {
            let mut out = self.out.lock();
            writeln!(out, "\r\x1b[K{line}")?;
        }
        self.status(state)
    }

    fn outro(&mut self, engine: &TimerEngine) -> std::io::Result<()> {
        let mut out = self.out.lock();
        if self.json {
            let line =
                serde_json::to_string(&engine.snapshot()).map_err(std::io::Error::other)?;
            writeln!(out, "{line}")?;
        } else {
            writeln!(
                out,
                "\ntotal work this session: {}",
                format_clock(engine.state().total_work_seconds)
            )?;
        }
        out.flush()
    }
}
