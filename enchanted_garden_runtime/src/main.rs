// CLI entry point for the Enchanted Garden simulation.
//
// Runs a garden headless: loads an optional config, catalog and command
// script, plays the script against the sim, and prints the final snapshot as
// JSON on stdout. Events are logged through `tracing` on stderr (filter with
// `RUST_LOG`, default `info`).
//
// By default garden time is fast-forwarded: `--ticks N` garden ticks run as
// fast as the machine allows. With `--realtime` the script is fed to a
// session actor (`session.rs`) on the wall clock instead, and the run takes
// as long as the garden time it covers.
//
// Usage:
//   garden [OPTIONS]
//     --seed <N>          PRNG seed (default: 1)
//     --config <PATH>     GameConfig JSON (default: built-in balance)
//     --catalog <PATH>    PlantCatalog JSON (default: built-in plants)
//     --script <PATH>     JSON array of timed commands
//     --ticks <N>         Garden ticks to run (default: 60)
//     --realtime          Run on the wall clock through the session actor

use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use enchanted_garden_runtime::script::load_script;
use enchanted_garden_runtime::session::{SessionOutput, start_session};
use enchanted_garden_sim::catalog::PlantCatalog;
use enchanted_garden_sim::command::SimCommand;
use enchanted_garden_sim::config::GameConfig;
use enchanted_garden_sim::event::{SimEvent, SimEventKind};
use enchanted_garden_sim::sim::SimState;
use enchanted_garden_sim::snapshot::GardenSnapshot;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

struct Options {
    seed: u64,
    config: Option<PathBuf>,
    catalog: Option<PathBuf>,
    script: Option<PathBuf>,
    ticks: u64,
    realtime: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            seed: 1,
            config: None,
            catalog: None,
            script: None,
            ticks: 60,
            realtime: false,
        }
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let options = parse_args();
    let sim = build_sim(&options);
    let script = match &options.script {
        Some(path) => load_script(path, sim.config.grid_width, sim.config.grid_height)
            .unwrap_or_else(|e| fail(&format!("Failed to load script: {e}"))),
        None => Vec::new(),
    };
    let end_ms = options.ticks.saturating_mul(sim.config.tick_interval_ms);
    info!(seed = options.seed, ticks = options.ticks, commands = script.len(), "garden starting");

    let snapshot = if options.realtime {
        run_realtime(sim, &script, end_ms)
    } else {
        run_headless(sim, &script, end_ms)
    };

    match snapshot.to_json() {
        Ok(json) => println!("{json}"),
        Err(e) => fail(&format!("Failed to serialize snapshot: {e}")),
    }
}

fn build_sim(options: &Options) -> SimState {
    let config = match &options.config {
        Some(path) => GameConfig::from_json(&read_file(path))
            .unwrap_or_else(|e| fail(&format!("Invalid config {}: {e}", path.display()))),
        None => GameConfig::default(),
    };
    let catalog = match &options.catalog {
        Some(path) => PlantCatalog::from_json(&read_file(path))
            .unwrap_or_else(|e| fail(&format!("Invalid catalog {}: {e}", path.display()))),
        None => PlantCatalog::default(),
    };
    SimState::with_config(options.seed, config, catalog)
}

fn run_headless(mut sim: SimState, script: &[SimCommand], end_ms: u64) -> GardenSnapshot {
    let result = sim.step(script, end_ms);
    for command in &result.command_results {
        if let Err(err) = &command.outcome {
            info!(%err, "command rejected");
        }
    }
    log_events(&result.events);
    sim.snapshot()
}

fn run_realtime(sim: SimState, script: &[SimCommand], end_ms: u64) -> GardenSnapshot {
    let (handle, outputs) = start_session(sim);
    let started = Instant::now();
    let elapsed_ms = || u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    for command in script.iter().filter(|c| c.at_ms <= end_ms) {
        let wait = command.at_ms.saturating_sub(elapsed_ms());
        drain(&outputs, Duration::from_millis(wait));
        if let Err(e) = handle.command(command.action.clone()) {
            fail(&format!("Session failed: {e}"));
        }
    }
    drain(&outputs, Duration::from_millis(end_ms.saturating_sub(elapsed_ms())));

    match handle.stop() {
        Ok(sim) => {
            log_events(&outputs.try_iter().flat_map(|o| o.events).collect::<Vec<_>>());
            sim.snapshot()
        }
        Err(e) => fail(&format!("Session failed: {e}")),
    }
}

/// Log session output for up to `duration`.
fn drain(outputs: &std::sync::mpsc::Receiver<SessionOutput>, duration: Duration) {
    let deadline = Instant::now() + duration;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return;
        }
        match outputs.recv_timeout(remaining) {
            Ok(output) => log_events(&output.events),
            Err(_) => thread::sleep(remaining.min(Duration::from_millis(10))),
        }
    }
}

fn log_events(events: &[SimEvent]) {
    for event in events {
        match &event.kind {
            SimEventKind::Notification { message, severity, .. } => {
                info!(at_ms = event.at_ms, ?severity, "{message}");
            }
            SimEventKind::TickCompleted { .. } | SimEventKind::NotificationDismissed { .. } => {}
            kind => debug!(at_ms = event.at_ms, ?kind, "garden event"),
        }
    }
}

fn read_file(path: &Path) -> String {
    std::fs::read_to_string(path)
        .unwrap_or_else(|e| fail(&format!("Failed to read {}: {e}", path.display())))
}

fn fail(message: &str) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}

/// Parse command-line arguments. Uses simple `std::env::args()` matching.
fn parse_args() -> Options {
    let mut options = Options::default();
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                i += 1;
                options.seed = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| usage_error("--seed requires a number"));
            }
            "--config" => {
                i += 1;
                options.config = Some(path_arg(&args, i, "--config"));
            }
            "--catalog" => {
                i += 1;
                options.catalog = Some(path_arg(&args, i, "--catalog"));
            }
            "--script" => {
                i += 1;
                options.script = Some(path_arg(&args, i, "--script"));
            }
            "--ticks" => {
                i += 1;
                options.ticks = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(|| usage_error("--ticks requires a number"));
            }
            "--realtime" => options.realtime = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => usage_error(&format!("Unknown argument: {other}")),
        }
        i += 1;
    }

    options
}

fn path_arg(args: &[String], i: usize, flag: &str) -> PathBuf {
    args.get(i)
        .map(PathBuf::from)
        .unwrap_or_else(|| usage_error(&format!("{flag} requires a path")))
}

fn usage_error(message: &str) -> ! {
    eprintln!("{message}");
    print_usage();
    std::process::exit(1);
}

fn print_usage() {
    println!("Usage: garden [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --seed <N>          PRNG seed (default: 1)");
    println!("  --config <PATH>     GameConfig JSON (default: built-in balance)");
    println!("  --catalog <PATH>    PlantCatalog JSON (default: built-in plants)");
    println!("  --script <PATH>     JSON array of timed commands");
    println!("  --ticks <N>         Garden ticks to run (default: 60)");
    println!("  --realtime          Run on the wall clock through the session actor");
    println!("  --help, -h          Show this help");
}
