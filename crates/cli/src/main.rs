mod settings;

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossbeam_channel::Sender;

use smartad_core::analytics::domain::detection_log::DetectionLog;
use smartad_core::catalog::domain::catalog::Catalog;
use smartad_core::catalog::infrastructure::json_catalog_reader::read_catalog;
use smartad_core::rotation::domain::rotation_scheduler::RotationScheduler;
use smartad_core::sampling::domain::detection_sampler::DetectionSampler;
use smartad_core::sampling::domain::sampler_config::{SamplerConfig, SimulationConfig};
use smartad_core::sampling::infrastructure::simulated_sensor_policy::SimulatedSensorPolicy;
use smartad_core::session::console::Console;
use smartad_core::session::console_command::ConsoleCommand;
use smartad_core::session::console_observer::LogConsoleObserver;
use smartad_core::session::infrastructure::event_loop::{
    EventLoop, LoopConfig, LoopExit, LoopReport,
};
use smartad_core::session::infrastructure::session_timers::LoopTiming;
use smartad_core::shared::demographics::Target;
use smartad_core::shared::random_source::{RandomSource, RngRandomSource};

use settings::Settings;

/// Demographic ad targeting console with a simulated camera.
#[derive(Parser)]
#[command(name = "smartad")]
struct Cli {
    /// Stop after this many seconds. When omitted, runs until `q` or end of stdin.
    #[arg(long)]
    duration: Option<u64>,

    /// Seed for reproducible detections and fallback picks.
    #[arg(long)]
    seed: Option<u64>,

    /// JSON ad catalog (built-in demo catalog when omitted).
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Milliseconds between sensor samples.
    #[arg(long)]
    sample_period_ms: Option<u64>,

    /// Chance (0.0-1.0) that a sample sees a person.
    #[arg(long)]
    detection_probability: Option<f64>,

    /// How long the detection overlay stays up (3000-8000 ms).
    #[arg(long)]
    dwell_ms: Option<u64>,

    /// Initial target as AGE:GENDER, e.g. 30:female.
    #[arg(long)]
    target: Option<Target>,

    /// Print a JSON snapshot every second instead of log lines.
    #[arg(long)]
    json: bool,

    /// Seconds between dashboard summaries (0 = never).
    #[arg(long)]
    stats_every: Option<u64>,

    /// Read commands from stdin: p, a, t AGE GENDER, c, u, s, q.
    /// Always on when --duration is omitted.
    #[arg(long)]
    interactive: bool,

    /// Persist the effective settings as the new defaults.
    #[arg(long)]
    save_settings: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let settings = merge_settings(Settings::load(), &cli);
    let sampler_config = SamplerConfig::new(
        Duration::from_millis(settings.sample_period_ms),
        Duration::from_millis(settings.dwell_ms),
    )?;
    let simulation = SimulationConfig::with_probability(settings.detection_probability)?;

    if cli.save_settings {
        let path = settings.save()?;
        log::info!("Settings saved to {}", path.display());
    }

    let catalog = match &settings.catalog {
        Some(path) => read_catalog(path)?,
        None => Catalog::default(),
    };
    log::info!("Catalog holds {} ads", catalog.len());

    let (scheduler_rng, sensor_rng) = build_rngs(cli.seed);
    let mut console = Console::new(
        RotationScheduler::new(catalog, scheduler_rng),
        DetectionSampler::new(
            sampler_config,
            Box::new(SimulatedSensorPolicy::new(simulation)),
            sensor_rng,
        ),
        DetectionLog::default(),
        Box::new(LogConsoleObserver::new()),
    );

    let (command_tx, command_rx) = crossbeam_channel::unbounded();
    if let Some(target) = cli.target {
        command_tx.send(ConsoleCommand::SetTarget(target))?;
    }
    if reads_stdin(&cli) {
        spawn_stdin_reader(command_tx.clone());
    }
    drop(command_tx);

    let mut loop_config = LoopConfig::new(LoopTiming::from_config(&sampler_config));
    loop_config.run_for = cli.duration.map(Duration::from_secs);

    let json = cli.json;
    let stats_every = settings.stats_every;
    let outcome = EventLoop::new(loop_config, command_rx).run(&mut console, |console, report, now| {
        match report {
            LoopReport::Tick if json => print_snapshot(console, now),
            LoopReport::Tick => {
                let uptime = console.uptime_seconds();
                if stats_every > 0 && uptime > 0 && uptime % stats_every == 0 {
                    log::info!("\n{}", console.stats(now).render());
                }
            }
            LoopReport::StatsRequested => println!("{}", console.stats(now).render()),
        }
    });

    if outcome.exit != LoopExit::Quit {
        log::info!("Stopped ({:?})", outcome.exit);
    }
    log::debug!("Timer ledger: {:?}", outcome.ledger);

    let now = Instant::now();
    if json {
        print_snapshot(&console, now);
    } else {
        println!("{}", console.stats(now).render());
    }
    Ok(())
}

fn merge_settings(mut settings: Settings, cli: &Cli) -> Settings {
    if let Some(ms) = cli.sample_period_ms {
        settings.sample_period_ms = ms;
    }
    if let Some(ms) = cli.dwell_ms {
        settings.dwell_ms = ms;
    }
    if let Some(p) = cli.detection_probability {
        settings.detection_probability = p;
    }
    if let Some(secs) = cli.stats_every {
        settings.stats_every = secs;
    }
    if let Some(path) = &cli.catalog {
        settings.catalog = Some(path.clone());
    }
    settings
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.duration == Some(0) {
        return Err("Duration must be at least 1 second".into());
    }
    if let Some(path) = &cli.catalog {
        if !path.exists() {
            return Err(format!("Catalog file not found: {}", path.display()).into());
        }
    }
    if let Some(p) = cli.detection_probability {
        if !(0.0..=1.0).contains(&p) {
            return Err(
                format!("Detection probability must be between 0.0 and 1.0, got {p}").into(),
            );
        }
    }
    if cli.sample_period_ms == Some(0) {
        return Err("Sample period must be greater than zero".into());
    }
    Ok(())
}

/// Without a deadline stdin is the only way to end the run cleanly.
fn reads_stdin(cli: &Cli) -> bool {
    cli.interactive || cli.duration.is_none()
}

fn build_rngs(seed: Option<u64>) -> (Box<dyn RandomSource>, Box<dyn RandomSource>) {
    match seed {
        Some(seed) => (
            Box::new(RngRandomSource::seeded(seed)),
            Box::new(RngRandomSource::seeded(seed.wrapping_add(1))),
        ),
        None => (
            Box::new(RngRandomSource::from_entropy()),
            Box::new(RngRandomSource::from_entropy()),
        ),
    }
}

fn print_snapshot(console: &Console, now: Instant) {
    match serde_json::to_string(&console.snapshot(now)) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize snapshot: {e}"),
    }
}

/// Forwards parsed stdin lines to the event loop. EOF quits.
fn spawn_stdin_reader(commands: Sender<ConsoleCommand>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<ConsoleCommand>() {
                Ok(command) => {
                    if commands.send(command).is_err() || command == ConsoleCommand::Quit {
                        return;
                    }
                }
                Err(e) => eprintln!("{e}"),
            }
        }
        let _ = commands.send(ConsoleCommand::Quit);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use smartad_core::shared::demographics::Gender;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("smartad").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults_parse() {
        let cli = parse(&[]);
        assert!(cli.duration.is_none());
        assert!(!cli.json);
        assert!(validate(&cli).is_ok());
    }

    #[test]
    fn test_target_flag_parses() {
        let cli = parse(&["--target", "30:female"]);
        assert_eq!(cli.target, Some(Target::new(30, Gender::Female)));
    }

    #[test]
    fn test_bad_target_is_rejected_by_clap() {
        let result = Cli::try_parse_from(["smartad", "--target", "thirty"]);
        assert!(result.is_err());
    }

    #[rstest]
    #[case::zero_duration(&["--duration", "0"])]
    #[case::probability_high(&["--detection-probability", "1.5"])]
    #[case::zero_period(&["--sample-period-ms", "0"])]
    #[case::missing_catalog(&["--catalog", "/definitely/not/here.json"])]
    fn test_validate_rejects(#[case] args: &[&str]) {
        assert!(validate(&parse(args)).is_err());
    }

    #[test]
    fn test_flags_override_settings() {
        let cli = parse(&[
            "--dwell-ms",
            "5000",
            "--stats-every",
            "0",
            "--catalog",
            "ads.json",
        ]);
        let merged = merge_settings(Settings::default(), &cli);
        assert_eq!(merged.dwell_ms, 5000);
        assert_eq!(merged.stats_every, 0);
        assert_eq!(merged.sample_period_ms, 2000);
        assert_eq!(merged.catalog, Some(PathBuf::from("ads.json")));
    }

    #[rstest]
    #[case::open_ended(&["--seed", "1"], true)]
    #[case::bounded(&["--duration", "10"], false)]
    #[case::bounded_interactive(&["--duration", "10", "--interactive"], true)]
    #[case::open_ended_interactive(&["--interactive"], true)]
    fn test_stdin_reader_runs_whenever_run_is_open_ended(
        #[case] args: &[&str],
        #[case] expected: bool,
    ) {
        assert_eq!(reads_stdin(&parse(args)), expected);
    }

    #[test]
    fn test_seeded_rngs_are_reproducible_and_distinct() {
        let (mut a1, mut b1) = build_rngs(Some(7));
        let (mut a2, _) = build_rngs(Some(7));
        let first = a1.next_unit();
        assert_eq!(first, a2.next_unit());
        assert_ne!(first, b1.next_unit());
    }
}
