use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use popper_core::{
    EventRecorder, PopConfig, PopError, PopScheduler, SceneGraph, TargetHost, TracingPlayer,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

fn main() -> popper_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            seconds,
            fps,
            seed,
            strike_chance,
            events,
        } => run_session(SessionOptions {
            config: config.as_deref(),
            seconds,
            fps,
            seed,
            strike_chance,
            events: events.as_deref(),
        }),
        Commands::DefaultConfig { output } => write_default_config(output.as_deref()),
    }
}

struct SessionOptions<'a> {
    config: Option<&'a Path>,
    seconds: f32,
    fps: u32,
    seed: Option<u64>,
    strike_chance: f64,
    events: Option<&'a Path>,
}

fn run_session(options: SessionOptions<'_>) -> popper_core::Result<()> {
    if !(options.seconds.is_finite() && options.seconds >= 0.0) {
        return Err(PopError::config("--seconds must be a finite, non-negative number"));
    }
    if options.fps == 0 {
        return Err(PopError::config("--fps must be at least 1"));
    }
    if !(0.0..=1.0).contains(&options.strike_chance) {
        return Err(PopError::config("--strike-chance must be within [0, 1]"));
    }

    let config = match options.config {
        Some(path) => PopConfig::load(path)?,
        None => PopConfig::default(),
    };
    let scene = SceneGraph::from_descriptors(&config.targets);
    let pool = scene.handles();
    tracing::info!(
        targets = pool.len(),
        seconds = options.seconds,
        fps = options.fps,
        seed = ?options.seed,
        "starting session"
    );

    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut scheduler = PopScheduler::new(config, pool, scene, TracingPlayer::new())?
        .with_score_sink(|score: u32| tracing::info!("{}", popper_core::format_score(score)));
    let mut recorder = EventRecorder::new();

    let dt = 1.0 / options.fps as f32;
    let ticks = (options.seconds * options.fps as f32).round() as u64;

    recorder.start();
    scheduler.start(&mut rng);
    for _ in 0..ticks {
        swing_hammer(&mut scheduler, options.strike_chance, &mut rng);
        let events = scheduler.tick(dt, &mut rng);
        recorder.record(scheduler.elapsed(), events);
    }
    scheduler.stop();
    recorder.stop();

    let summary = recorder.summary();
    tracing::info!(
        pops = summary.pops,
        hits = summary.hits,
        completed = summary.completed,
        busy_skips = summary.busy_skips,
        sounds = scheduler.player().plays(),
        "session finished"
    );
    println!(
        "{} ({} pops, {} escaped, {} skipped while busy)",
        scheduler.score_text(),
        summary.pops,
        summary.completed,
        summary.busy_skips
    );

    if let Some(path) = options.events {
        recorder.write_json_lines(BufWriter::new(File::create(path)?))?;
        tracing::info!(?path, events = recorder.events().len(), "wrote event log");
    }

    Ok(())
}

/// Stands in for the physics layer: with probability `chance` per tick the
/// hammer lands on one of the currently raised targets.
fn swing_hammer<R: Rng>(
    scheduler: &mut PopScheduler<SceneGraph, TracingPlayer>,
    chance: f64,
    rng: &mut R,
) {
    let raised = scheduler.active_targets();
    if raised.is_empty() || !rng.gen_bool(chance) {
        return;
    }
    let target = raised[rng.gen_range(0..raised.len())];
    if scheduler.host().is_active(target) {
        scheduler.strike(target);
    }
}

fn write_default_config(output: Option<&Path>) -> popper_core::Result<()> {
    let json = PopConfig::default().to_json_pretty()?;
    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            tracing::info!(?path, "wrote default configuration");
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Pop-up target scheduler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a headless session against an in-memory scene.
    Run {
        /// JSON configuration file; built-in defaults when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Session length in seconds.
        #[arg(short, long, default_value_t = 60.0)]
        seconds: f32,
        /// Simulated frame rate.
        #[arg(long, default_value_t = 60)]
        fps: u32,
        /// RNG seed for a reproducible session.
        #[arg(long)]
        seed: Option<u64>,
        /// Probability per frame that the hammer hits a raised target.
        #[arg(long, default_value_t = 0.02)]
        strike_chance: f64,
        /// Write every event as a JSON line to this file.
        #[arg(short, long)]
        events: Option<PathBuf>,
    },
    /// Print the default configuration as JSON.
    DefaultConfig {
        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
