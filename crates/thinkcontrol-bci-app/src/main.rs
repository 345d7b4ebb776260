//! ThinkControl BCI Application
//!
//! Headless runner for the motor-imagery cursor-control simulator. Each
//! published tick is printed as a status line or as a JSON object.
//!
//! # Usage
//!
//! ```bash
//! # Run until Ctrl-C at the default 100 ms cadence
//! thinkcontrol run
//!
//! # Reproducible 30 s session, forcing a classification every 5 s
//! thinkcontrol run --seed 42 --duration-secs 30 --force-every 5
//!
//! # JSON lines for another renderer
//! thinkcontrol run --json --config session.json
//!
//! # Print the default configuration
//! thinkcontrol config
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::runtime::Runtime;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use thinkcontrol_bci_core::{DecoderConfig, HitScoring, Label, Snapshot};
use thinkcontrol_bci_native::{ControlLoop, TickUpdate};

/// ThinkControl BCI Application
#[derive(Parser, Debug)]
#[command(name = "thinkcontrol")]
#[command(author, version, about = "Motor-imagery BCI cursor-control simulator", long_about = None)]
struct Cli {
    /// Logging verbosity level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a control session (default if no subcommand)
    Run(RunArgs),

    /// Print the default configuration as JSON
    Config,
}

#[derive(clap::Args, Debug, Default)]
struct RunArgs {
    /// Load the configuration from a JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tick cadence in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Seed the random source for a reproducible session
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many seconds (runs until Ctrl-C otherwise)
    #[arg(short, long)]
    duration_secs: Option<u64>,

    /// Force a classification every this many seconds
    #[arg(long)]
    force_every: Option<u64>,

    /// Score a hit only when the cursor enters a target zone
    #[arg(long)]
    edge_triggered: bool,

    /// Label held before the first tick: left or right
    #[arg(long)]
    initial_label: Option<Label>,

    /// Print one JSON object per update instead of status lines
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("ThinkControl BCI v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        None => run(RunArgs::default()),
        Some(Commands::Run(args)) => run(args),
        Some(Commands::Config) => print_default_config(),
    }
}

/// Print the default configuration
fn print_default_config() -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&DecoderConfig::default())?);
    Ok(())
}

/// Build the session configuration: file (or defaults), then flag overrides.
fn load_config(args: &RunArgs) -> anyhow::Result<DecoderConfig> {
    let mut config = match &args.config {
        Some(path) => read_config(path)?,
        None => DecoderConfig::default(),
    };

    if let Some(tick_ms) = args.tick_ms {
        config = config.tick_interval_ms(tick_ms);
    }
    if args.edge_triggered {
        config = config.hit_scoring(HitScoring::EdgeTriggered);
    }
    if let Some(label) = args.initial_label {
        config = config.initial_label(label);
    }

    config.validate()?;
    Ok(config)
}

fn read_config(path: &Path) -> anyhow::Result<DecoderConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// Run a control session
fn run(args: RunArgs) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    if args.force_every == Some(0) {
        anyhow::bail!("--force-every must be at least 1 second");
    }

    let session = match args.seed {
        Some(seed) => {
            info!("Seeded session (seed {})", seed);
            ControlLoop::seeded(config, seed)?
        }
        None => ControlLoop::from_entropy(config)?,
    };

    let rt = Runtime::new()?;
    rt.block_on(run_async(&session, &args))?;

    let summary = session.snapshot();
    if args.json {
        println!("{}", serde_json::to_string(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

/// Drive the session until the deadline or Ctrl-C
async fn run_async<R, C>(session: &ControlLoop<R, C>, args: &RunArgs) -> anyhow::Result<()>
where
    R: rand::Rng + Send + 'static,
    C: thinkcontrol_bci_core::Clock + Send + 'static,
{
    let deadline = args
        .duration_secs
        .map(|secs| secs_from_now(secs, "--duration-secs"))
        .transpose()?;
    let mut force = match args.force_every {
        Some(secs) => {
            let start = secs_from_now(secs, "--force-every")?;
            let mut interval = time::interval_at(start, Duration::from_secs(secs));
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            Some(interval)
        }
        None => None,
    };

    let mut updates = session.subscribe();
    session.start()?;

    loop {
        tokio::select! {
            result = updates.recv() => match result {
                Ok(update) => print_update(&update, args.json)?,
                Err(RecvError::Lagged(n)) => warn!("Output lagged, skipped {} updates", n),
                Err(RecvError::Closed) => break,
            },

            () = sleep_until(deadline) => {
                info!("Session duration elapsed");
                break;
            }

            _ = tick_opt(force.as_mut()) => {
                session.force_classify();
            }

            result = tokio::signal::ctrl_c() => {
                result?;
                info!("Interrupted");
                break;
            }
        }
    }

    session.stop();

    // Forward anything published before the stop.
    while let Ok(update) = updates.try_recv() {
        print_update(&update, args.json)?;
    }
    Ok(())
}

/// Instant `secs` seconds from now, rejecting values the clock cannot represent.
fn secs_from_now(secs: u64, flag: &str) -> anyhow::Result<Instant> {
    match Instant::now().checked_add(Duration::from_secs(secs)) {
        Some(instant) => Ok(instant),
        None => anyhow::bail!("{flag} {secs} is too large"),
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn tick_opt(interval: Option<&mut time::Interval>) -> Instant {
    match interval {
        Some(interval) => interval.tick().await,
        None => std::future::pending().await,
    }
}

/// Print one update
fn print_update(update: &TickUpdate, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(update)?);
        return Ok(());
    }

    let snapshot = &update.snapshot;
    let mut line = format!(
        "#{:<5} {:<10} {:>3.0}%  L {:>3.0}% | R {:>3.0}%  cursor {:>5.1} ({:<10})  hits {}/{}",
        update.sequence,
        snapshot.current_label.display_name(),
        snapshot.confidence * 100.0,
        snapshot.left_probability * 100.0,
        snapshot.right_probability * 100.0,
        snapshot.cursor_position,
        snapshot.cursor_zone.name(),
        snapshot.hits_left,
        snapshot.hits_right,
    );
    if update.forced {
        line.push_str("  [forced]");
    }
    for hit in &update.events {
        line.push_str(&format!("  {hit}"));
    }
    if let Some(entry) = &update.recorded {
        line.push_str(&format!(
            "  logged {} {} {}% {}",
            entry.timestamp,
            entry.label,
            entry.confidence_percent,
            if entry.correct { "✓" } else { "✗" }
        ));
    }
    println!("{line}");
    Ok(())
}

/// Print the final state and the classification log
fn print_summary(snapshot: &Snapshot) {
    println!();
    println!(
        "Final cursor {:.1}, hits left {} / right {}",
        snapshot.cursor_position, snapshot.hits_left, snapshot.hits_right
    );
    println!("Recent classifications:");
    if snapshot.history.is_empty() {
        println!("  (none)");
    }
    for entry in &snapshot.history {
        println!(
            "  {}  {:<10} {:>3}%  {}",
            entry.timestamp,
            entry.label.display_name(),
            entry.confidence_percent,
            if entry.correct { "correct" } else { "incorrect" }
        );
    }
}
