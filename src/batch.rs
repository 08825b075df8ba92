//! Batch coordinator
//!
//! Splits a particle quota across a fixed pool of workers. Each worker owns
//! its RNG stream and one in-memory sink per surface, and shares the
//! geometry and gas read-only. Results are merged into a single
//! [`BatchReport`] after every worker has finished.
//!
//! ```no_run
//! use vactrace::batch::{run_batch, BatchSettings};
//! # use vactrace::{Geometry, ParticleSource};
//! # fn demo(geometry: &Geometry, source: &ParticleSource) -> vactrace::Result<()> {
//! let gas = vactrace::Background::vacuum();
//! let settings = BatchSettings::new(100_000, 4).with_seed(42);
//! let report = run_batch(geometry, &gas, source, &settings, None)?;
//! println!("{} absorbed, {} lost", report.absorbed, report.lost);
//! # Ok(())
//! # }
//! ```

use chrono::Utc;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::background::Background;
use crate::geometry::Geometry;
use crate::particle::ParticleSource;
use crate::sink::ParticleRecord;
use crate::tracer::{TraceState, Tracer};
use crate::{Result, TracerError};

/// Golden-ratio increment used to spread worker seeds apart
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Size and seeding of a batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSettings {
    /// Total number of particles to trace
    pub particles: u64,
    /// Number of worker threads
    pub threads: usize,
    /// Base seed; the wall clock is used when unset
    pub seed: Option<u64>,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            particles: 1000,
            threads: 1,
            seed: None,
        }
    }
}

impl BatchSettings {
    pub fn new(particles: u64, threads: usize) -> Self {
        Self {
            particles,
            threads,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Reject settings that cannot run
    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(TracerError::InvalidParameter(
                "worker thread count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Split `total` into `workers` quotas, remainder on the last worker
pub fn partition(total: u64, workers: usize) -> Vec<u64> {
    if workers == 0 {
        return Vec::new();
    }
    let share = total / workers as u64;
    let mut quotas = vec![share; workers];
    if let Some(last) = quotas.last_mut() {
        *last += total % workers as u64;
    }
    quotas
}

/// Seed for worker `index` derived from the batch base seed
pub fn worker_seed(base: u64, index: usize) -> u64 {
    base.wrapping_add((index as u64 + 1).wrapping_mul(SEED_STRIDE))
}

fn clock_seed() -> u64 {
    Utc::now().timestamp_nanos_opt().unwrap_or_default() as u64
}

/// Outcome of one worker's quota
#[derive(Debug, Clone, Default)]
struct WorkerReport {
    simulated: u64,
    absorbed: u64,
    lost: u64,
    statistics: Vec<Vec<ParticleRecord>>,
}

/// Merged outcome of a batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// Particles traced to a terminal state
    pub simulated: u64,
    /// Particles absorbed by any surface
    pub absorbed: u64,
    /// Particles discarded after missing every surface
    pub lost: u64,
    /// Absorbed-particle records indexed by surface id
    pub statistics: Vec<Vec<ParticleRecord>>,
}

impl BatchReport {
    fn empty(surfaces: usize) -> Self {
        Self {
            statistics: vec![Vec::new(); surfaces],
            ..Default::default()
        }
    }

    fn merge(&mut self, worker: WorkerReport) {
        self.simulated += worker.simulated;
        self.absorbed += worker.absorbed;
        self.lost += worker.lost;
        for (merged, records) in self.statistics.iter_mut().zip(worker.statistics) {
            merged.extend(records);
        }
    }

    /// Number of records kept across all surfaces
    pub fn recorded(&self) -> usize {
        self.statistics.iter().map(Vec::len).sum()
    }
}

/// Shared completion counter driving the progress callback
struct Progress<'a> {
    done: AtomicU64,
    total: u64,
    callback: Option<&'a (dyn Fn(f64) + Sync)>,
}

impl Progress<'_> {
    fn advance(&self, count: u64) {
        let done = self.done.fetch_add(count, Ordering::Relaxed) + count;
        if let Some(callback) = self.callback {
            callback(done as f64 / self.total.max(1) as f64);
        }
    }
}

fn run_worker(
    index: usize,
    quota: u64,
    seed: u64,
    tracer: Tracer<'_>,
    source: &ParticleSource,
    progress: &Progress<'_>,
) -> Result<WorkerReport> {
    debug!(
        "Worker {} starting: {} particles, seed {}",
        index, quota, seed
    );
    let mut rng = StdRng::seed_from_u64(seed);
    let mut report = WorkerReport {
        statistics: vec![Vec::new(); tracer.geometry().len()],
        ..Default::default()
    };

    let tick = (quota / 100).max(1);
    let mut pending = 0;
    for _ in 0..quota {
        let particle = source.emit(&mut rng);
        match tracer.trace(particle, &mut rng, &mut report.statistics)? {
            TraceState::Absorbed { .. } => report.absorbed += 1,
            TraceState::Lost => report.lost += 1,
            TraceState::InFlight => {}
        }
        report.simulated += 1;

        pending += 1;
        if pending == tick {
            progress.advance(pending);
            pending = 0;
        }
    }
    if pending > 0 {
        progress.advance(pending);
    }

    debug!(
        "Worker {} finished: {} absorbed, {} lost",
        index, report.absorbed, report.lost
    );
    Ok(report)
}

/// Trace `settings.particles` particles emitted by `source`
///
/// Fails before any tracing when `settings` are invalid or the worker pool
/// cannot be built. `progress`, when given, is called from worker threads
/// with the completed fraction of the whole batch.
pub fn run_batch(
    geometry: &Geometry,
    gas: &Background,
    source: &ParticleSource,
    settings: &BatchSettings,
    progress: Option<&(dyn Fn(f64) + Sync)>,
) -> Result<BatchReport> {
    settings.validate()?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(settings.threads)
        .build()
        .map_err(|e| TracerError::ThreadPool(e.to_string()))?;

    let base_seed = settings.seed.unwrap_or_else(clock_seed);
    let quotas = partition(settings.particles, settings.threads);
    let tracer = Tracer::new(geometry, gas);
    let counter = Progress {
        done: AtomicU64::new(0),
        total: settings.particles,
        callback: progress,
    };

    info!(
        "Tracing {} particles on {} workers (base seed {})",
        settings.particles, settings.threads, base_seed
    );

    let workers: Vec<WorkerReport> = pool.install(|| {
        quotas
            .par_iter()
            .enumerate()
            .map(|(index, &quota)| {
                let seed = worker_seed(base_seed, index);
                run_worker(index, quota, seed, tracer, source, &counter)
            })
            .collect::<Result<Vec<_>>>()
    })?;

    let mut report = BatchReport::empty(geometry.len());
    for worker in workers {
        report.merge(worker);
    }

    info!(
        "Batch complete: {} simulated, {} absorbed, {} lost, {} recorded",
        report.simulated, report.absorbed, report.lost, report.recorded()
    );
    Ok(report)
}
