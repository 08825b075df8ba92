//! Vacuum chamber particle tracer
//!
//! Loads a JSON enclosure description, traces a batch of particles through
//! it and appends the absorbed-particle statistics of every collecting
//! surface to a file named after that surface.
//!
//! Usage:
//!   cargo run --release --bin vactrace -- chamber.json --particles 1000000 --threads 8

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use clap::{ArgAction, Parser};
use log::info;
use vactrace::{run_batch, write_surface_statistics, SimulationConfig};

/// Type alias for the error type used throughout this module
type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Vacuum chamber particle tracer
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Monte Carlo particle transport through a polygonal vacuum enclosure",
    long_about = None
)]
struct Args {
    /// JSON configuration describing gas, geometry, source and run
    config: PathBuf,

    /// Number of particles to trace (overrides the configuration)
    #[arg(short, long)]
    particles: Option<u64>,

    /// Number of worker threads (overrides the configuration)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Base random seed (overrides the configuration)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Directory receiving the per-surface statistics files
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Log worker and batch details
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env = env_logger::Env::default().default_filter_or(default_level);
    env_logger::Builder::from_env(env).init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = SimulationConfig::from_file(&args.config)?;
    let gas = config.background();
    let geometry = config.build_geometry()?;
    let source = config.source(&geometry)?;

    let mut settings = config.batch_settings();
    if let Some(particles) = args.particles {
        settings.particles = particles;
    }
    if let Some(threads) = args.threads {
        settings.threads = threads;
    }
    if let Some(seed) = args.seed {
        settings.seed = Some(seed);
    }

    info!(
        "Loaded {} surfaces from {}",
        geometry.len(), args.config.display()
    );
    match gas.mean_free_path() {
        Some(mfp) => info!("Mean free path in gas: {:.6e} m", mfp),
        None => info!("No background gas, vacuum transport only"),
    }

    // Highest decile already reported
    let reported = AtomicU64::new(0);
    let progress: &(dyn Fn(f64) + Sync) = &|fraction: f64| {
        let decile = (fraction * 10.0).floor() as u64;
        if decile > reported.fetch_max(decile, Ordering::Relaxed) {
            info!("Progress: {}%", decile * 10);
        }
    };

    let start = Instant::now();
    let report = run_batch(&geometry, &gas, &source, &settings, Some(progress))?;
    let elapsed = start.elapsed().as_secs_f64();

    let files = write_surface_statistics(&geometry, &report, &gas, &args.output_dir)?;
    let rate = report.simulated as f64 / elapsed.max(f64::EPSILON);

    info!(
        "Simulated {} particles in {:.2} s ({:.0} particles/s)",
        report.simulated, elapsed, rate
    );
    info!(
        "Absorbed: {}, lost: {}, statistics files written: {}",
        report.absorbed, report.lost, files.len()
    );

    Ok(())
}
