//! twin — two locomotives sharing one layout.
//!
//! Runs a built-in preset (or a layout loaded from CSV) on the simulated
//! track and prints each train's outcome.  Every protocol step is logged via
//! `tracing`; `--events <dir>` also writes them to `<dir>/events.csv`.
//!
//! ```text
//! twin --preset two-blocks --laps 3 --grace-ms 500
//! twin --routes routes.csv --junctions junctions.csv --config run.json -v
//! twin --preset spaced --duration-secs 30 --emergency
//! ```

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use loco_core::{EventSink, NoopSink, RunConfig};
use loco_layout::{Layout, Preset, load_junctions_csv, load_trains_csv};
use loco_sim::{CsvEventLog, RailwayBuilder};

/// Layout id used for CSV-loaded routes.
const CSV_LAYOUT_ID: &str = "A";

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "twin", about = "Run two locomotives over shared track sections")]
struct Args {
    /// Built-in layout to run.
    #[arg(long, default_value = "station-then-block", conflicts_with = "routes")]
    preset: Preset,

    /// Route CSV (one row per block) instead of a preset.
    #[arg(long)]
    routes: Option<PathBuf>,

    /// Initial junction CSV, used with --routes.
    #[arg(long, requires = "routes")]
    junctions: Option<PathBuf>,

    /// JSON run configuration; missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stop after this many laps per train.
    #[arg(long)]
    laps: Option<u64>,

    /// Station grace period in milliseconds.
    #[arg(long)]
    grace_ms: Option<u64>,

    /// Halt the run after this many seconds.
    #[arg(long)]
    duration_secs: Option<u64>,

    /// When the duration elapses, emergency-stop both trains (speed 0)
    /// instead of halting them where they are.
    #[arg(long, requires = "duration_secs")]
    emergency: bool,

    /// Directory to write events.csv into.
    #[arg(long)]
    events: Option<PathBuf>,

    /// Debug-level logging (contacts, junctions).
    #[arg(short, long)]
    verbose: bool,
}

// ── Setup ─────────────────────────────────────────────────────────────────────

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_thread_names(true).init();
}

fn load_config(args: &Args) -> Result<RunConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => RunConfig::default(),
    };
    if let Some(laps) = args.laps {
        config.max_laps = Some(laps);
    }
    if let Some(grace) = args.grace_ms {
        config.protocol.station_grace_ms = grace;
    }
    Ok(config)
}

fn load_layout(args: &Args) -> Result<Layout> {
    let Some(routes) = &args.routes else {
        return Ok(args.preset.layout()?);
    };
    let trains = load_trains_csv(routes).with_context(|| format!("loading {}", routes.display()))?;
    let junctions = match &args.junctions {
        Some(path) => load_junctions_csv(path).with_context(|| format!("loading {}", path.display()))?,
        None => Vec::new(),
    };
    Ok(Layout::new(CSV_LAYOUT_ID, junctions, trains)?)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = load_config(&args)?;
    let layout = load_layout(&args)?;
    if config.max_laps.is_none() && args.duration_secs.is_none() {
        info!("no lap limit or duration; running until interrupted");
    }

    let event_log = match &args.events {
        Some(dir) => {
            fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
            Some(Arc::new(CsvEventLog::create(dir)?))
        }
        None => None,
    };
    let sink: Arc<dyn EventSink> = match &event_log {
        Some(log) => log.clone(),
        None => Arc::new(NoopSink),
    };

    println!("=== twin — layout {} ===", layout.id());
    for train in layout.trains() {
        println!(
            "{}: speed {}, station {}, {} block(s)",
            train.loco,
            train.speed,
            train.route.station_contact(),
            train.route.blocks.len()
        );
    }
    println!(
        "Grace: {} ms  |  Laps: {}",
        config.protocol.station_grace_ms,
        config.max_laps.map_or_else(|| "unlimited".to_owned(), |n| n.to_string())
    );
    println!();

    let railway = RailwayBuilder::new(layout, config).sink(sink).build()?;
    if let Some(secs) = args.duration_secs {
        let (handle, emergency) = (railway.handle(), args.emergency);
        thread::Builder::new().name("timer".into()).spawn(move || {
            thread::sleep(Duration::from_secs(secs));
            if emergency {
                handle.emergency_stop();
            } else {
                info!(secs, "duration elapsed; halting");
                handle.halt();
            }
        })?;
    }

    let started = Instant::now();
    let report = railway.run()?;
    let elapsed = started.elapsed();

    if let Some(log) = &event_log {
        log.finish()?;
    }

    println!();
    for outcome in &report.outcomes {
        println!("{}: {} lap(s), {:?}", outcome.loco, outcome.laps, outcome.reason);
    }
    println!("Elapsed: {:.2} s", elapsed.as_secs_f64());
    if let Some(dir) = &args.events {
        println!("Events written to {}", dir.join(loco_sim::EVENTS_FILE).display());
    }
    if report.outcomes.len() != 2 {
        bail!("expected two outcomes, got {}", report.outcomes.len());
    }
    Ok(())
}
