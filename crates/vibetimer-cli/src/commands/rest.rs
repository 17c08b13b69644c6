use clap::Args;
use serde::Serialize;
use vibetimer_core::timer::format_clock;
use vibetimer_core::{Config, EarnedRest};

#[derive(Args)]
pub struct RestArgs {
    /// Vibed duration (e.g. "25m", "1h30m", "1500s", "0.5h"; bare numbers are minutes)
    #[arg(value_parser = parse_duration_secs)]
    duration: f64,

    /// Minutes vibed per minute of rest (overrides config)
    #[arg(long)]
    ratio: Option<u32>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct RestReport {
    vibed_seconds: f64,
    ratio: u32,
    rest_seconds: f64,
    rest_minutes: u64,
}

pub fn run(args: RestArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let ratio = args.ratio.unwrap_or(config.timer.vibe_rest_ratio).max(1);
    let rest = EarnedRest::from_vibed(args.duration, ratio);

    if args.json {
        let report = RestReport {
            vibed_seconds: args.duration,
            ratio,
            rest_seconds: rest.seconds,
            rest_minutes: rest.whole_minutes(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "vibed {} -> earned rest {} ({} min)",
            format_clock(args.duration),
            format_clock(rest.seconds),
            rest.whole_minutes()
        );
    }
    Ok(())
}

/// Parse "1h30m", "25m", "90s", "1.5h" or a bare number of minutes into seconds.
pub fn parse_duration_secs(s: &str) -> Result<f64, String> {
    let s = s.trim().to_lowercase();
    if let Ok(minutes) = s.parse::<f64>() {
        return if minutes >= 0.0 {
            Ok(minutes * 60.0)
        } else {
            Err("duration cannot be negative".to_string())
        };
    }

    let mut total_secs = 0.0;
    let mut current_num = String::new();
    for ch in s.chars() {
        if ch.is_ascii_digit() || ch == '.' {
            current_num.push(ch);
            continue;
        }
        let unit_secs = match ch {
            'h' => 3600.0,
            'm' => 60.0,
            's' => 1.0,
            _ => return Err(format!("unexpected '{ch}' in duration")),
        };
        let value: f64 = current_num
            .parse()
            .map_err(|_| format!("missing number before '{ch}'"))?;
        total_secs += value * unit_secs;
        current_num.clear();
    }

    if !current_num.is_empty() {
        return Err("trailing number without unit (use h, m or s)".to_string());
    }
    if s.is_empty() {
        return Err("Invalid duration format. Use: 25m, 1h30m, 90s, 1.5h".to_string());
    }
    Ok(total_secs)
}
