//! sim-runner: headless runner for the pig collection simulator.
//!
//! Usage:
//!   sim-runner --seed 12345 --days 15 --data-dir ./data
//!   sim-runner --seed 12345 --db run.db --speed fast_forward
//!   sim-runner --seed 12345 --ipc-mode
//!
//! Events go to stdout as JSON lines (or to the SQLite event log with
//! `--db`). The run summary goes to stderr.

use anyhow::Result;
use pigroute_core::{
    clock::SimSpeed,
    command::SessionCommand,
    config::SimConfig,
    engine::report_error,
    farm::FarmSnapshot,
    planner::{DailySummary, DayPhase},
    store::SimStore,
    types::Day,
    JsonLinesSink, SimError, SimSession, StoreSink,
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Serialize)]
struct UiState<'a> {
    run_id: &'a str,
    next_day: Day,
    horizon: Day,
    phase: DayPhase,
    complete: bool,
    cumulative_profit: f64,
    abandoned_days: &'a [Day],
    daily_log: &'a [DailySummary],
    farms: Vec<FarmSnapshot>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let days = parse_arg(&args, "--days", 0i64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = find_arg(&args, "--db");
    let data_dir = find_arg(&args, "--data-dir").unwrap_or("./data");
    let speed: SimSpeed = find_arg(&args, "--speed")
        .map(str::parse::<SimSpeed>)
        .transpose()
        .map_err(anyhow::Error::msg)?
        .unwrap_or(SimSpeed::Normal);

    let mut config = SimConfig::load(data_dir)?;
    if days > 0 {
        config.tuning.horizon_days = days;
    }

    eprintln!("pigroute sim-runner");
    eprintln!("  seed:      {seed}");
    eprintln!("  days:      {}", config.tuning.horizon_days);
    eprintln!("  data_dir:  {data_dir}");
    eprintln!("  db:        {}", db.unwrap_or("-"));
    eprintln!();

    let stdout_sink = JsonLinesSink::new(io::stdout());

    let mut session = match SimSession::create(config, seed) {
        Ok(s) => s,
        Err(e) => {
            report_error(&stdout_sink, &e);
            return Err(e.into());
        }
    };
    session.clock.set_speed(speed);

    if ipc_mode {
        return run_ipc_loop(&mut session, &stdout_sink);
    }

    match db {
        Some(path) => {
            let store = SimStore::open(path)?;
            store.migrate()?;
            store.insert_run(&session.run_id, seed, env!("CARGO_PKG_VERSION"))?;
            let sink = StoreSink::new(session.run_id.clone(), store);
            session.run_to_completion(&sink)?;
            let stored = sink.with_store(|s| s.event_count(sink.run_id(), None))??;
            eprintln!("  events stored: {stored}");
        }
        None => {
            session.run_to_completion(&stdout_sink)?;
        }
    }

    print_summary(&session);
    Ok(())
}

fn run_ipc_loop(session: &mut SimSession, sink: &JsonLinesSink<io::Stdout>) -> Result<()> {
    let stdin = io::stdin();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: SessionCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                reply(&serde_json::json!({ "error": e.to_string() }))?;
                continue;
            }
        };

        match cmd {
            SessionCommand::Quit => break,
            SessionCommand::Step { days } => {
                for _ in 0..days {
                    if session.is_complete() {
                        break;
                    }
                    step_or_report(session.step(sink))?;
                }
            }
            SessionCommand::RunToEnd => {
                step_or_report(session.run_to_completion(sink).map(|_| ()))?;
            }
            SessionCommand::Reset => session.reset(),
            SessionCommand::SetSpeed { speed } => session.clock.set_speed(speed),
            SessionCommand::GetState => {}
        }
        reply(&build_ui_state(session))?;
    }
    Ok(())
}

/// A lost sink ends the loop; any other failure is answered and the
/// session keeps serving.
fn step_or_report<T>(result: Result<T, SimError>) -> Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(e @ SimError::SinkUnavailable { .. }) => Err(e.into()),
        Err(e) => {
            log::warn!("ipc: {e}");
            reply(&serde_json::json!({ "error": e.to_string() }))
        }
    }
}

fn reply(value: &impl serde::Serialize) -> Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", serde_json::to_string(value)?)?;
    stdout.flush()?;
    Ok(())
}

fn build_ui_state(session: &SimSession) -> UiState<'_> {
    UiState {
        run_id:            &session.run_id,
        next_day:          session.clock.current_day,
        horizon:           session.clock.horizon,
        phase:             session.phase(),
        complete:          session.is_complete(),
        cumulative_profit: session.cumulative_profit(),
        abandoned_days:    session.abandoned_days(),
        daily_log:         session.daily_log(),
        farms:             session.farm_snapshots(),
    }
}

fn print_summary(session: &SimSession) {
    let entries = session.daily_log();
    let pigs: u32 = entries.iter().map(|s| s.pigs_processed).sum();
    let trucks: usize = entries.iter().map(|s| s.trucks_used).sum();
    let remaining: u64 = session.farms().iter().map(|f| f.inventory() as u64).sum();

    eprintln!("=== RUN SUMMARY ===");
    eprintln!("  run_id:          {}", session.run_id);
    eprintln!("  days run:        {}", session.clock.days_completed());
    eprintln!("  pigs processed:  {pigs}");
    eprintln!("  truck trips:     {trucks}");
    eprintln!("  pigs remaining:  {remaining}");
    eprintln!("  abandoned days:  {:?}", session.abandoned_days());

    eprintln!();
    eprintln!("=== DAILY P&L ===");
    if entries.is_empty() {
        eprintln!("  (No days completed)");
    } else {
        for s in entries {
            eprintln!(
                "  day {:>2} | pigs {:>5} | trucks {:>2} | revenue {:>10.2} | var {:>8.2} | fixed {:>8.2} | profit {:>10.2}",
                s.day, s.pigs_processed, s.trucks_used, s.net_revenue,
                s.variable_transport_cost, s.fixed_cost, s.net_profit
            );
        }
        eprintln!("  cumulative profit: {:.2}", session.cumulative_profit());
    }
}

fn find_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    find_arg(args, flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
