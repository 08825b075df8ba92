//! Vactrace: Monte Carlo particle transport in polygonal vacuum enclosures
//!
//! This crate traces particles through a closed enclosure made of planar
//! polygon walls, with an optional rarefied background gas. Particles fly
//! in straight lines, scatter isotropically off gas molecules after
//! exponentially distributed free flights, and are either reflected
//! (specularly or diffusely) or absorbed at the walls. Walls flagged for
//! statistics keep the final state of every particle they absorb.
//!
//! ```no_run
//! use vactrace::{run_batch, write_surface_statistics, SimulationConfig};
//!
//! # fn main() -> vactrace::Result<()> {
//! let config = SimulationConfig::from_file("chamber.json")?;
//! let geometry = config.build_geometry()?;
//! let gas = config.background();
//! let source = config.source(&geometry)?;
//!
//! let report = run_batch(&geometry, &gas, &source, &config.batch_settings(), None)?;
//! write_surface_statistics(&geometry, &report, &gas, ".")?;
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

pub mod background;
pub mod batch;
pub mod config;
pub mod constants;
pub mod geometry;
pub mod math;
pub mod particle;
pub mod reflector;
pub mod sink;
pub mod surface;
pub mod tracer;

// Re-export commonly used types
pub use background::Background;
pub use batch::{run_batch, BatchReport, BatchSettings};
pub use config::SimulationConfig;
pub use geometry::{Geometry, SurfaceId};
pub use math::{OrthonormalBasis, Vec3};
pub use particle::{EmissionMode, Emitter, Particle, ParticleSource};
pub use reflector::{Reflector, ReflectorKind};
pub use sink::{write_surface_statistics, ParticleRecord, RecordSink, TextSink};
pub use surface::Surface;
pub use tracer::{TraceState, Tracer};

/// Main error type for the vactrace library
#[derive(Debug, Error)]
pub enum TracerError {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid basis: {0}")]
    InvalidBasis(String),

    #[error("Unknown reflector type: {0}")]
    UnknownReflector(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Worker pool error: {0}")]
    ThreadPool(String),
}

/// Result type for vactrace operations
pub type Result<T> = std::result::Result<T, TracerError>;
