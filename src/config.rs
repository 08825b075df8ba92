//! JSON simulation configuration
//!
//! A configuration file describes the background gas, the enclosure
//! surfaces, and optionally the particle source and run size:
//!
//! ```json
//! {
//!   "gas": {"sigma": 2e-16, "temperature": 300.0, "pressure": 5.0},
//!   "geometry": [
//!     {"name": "wall_0", "contour": [[0,0,0],[0,1,0],[0,1,1],[0,0,1]],
//!      "reflector_type": "mirror", "reflection_coefficient": 0.9,
//!      "collect_statistics": true}
//!   ],
//!   "source": {"origin": [0.5,0.5,0.5], "direction": [0,0,1], "randomize": true},
//!   "run": {"particles": 100000, "threads": 4, "seed": null}
//! }
//! ```
//!
//! Vertices are `[x, y, z]` arrays in metres. Each contour must be wound so
//! that its normal points into the enclosure. Surface names double as
//! statistics file names: they must be unique and free of path separators.
//!
//! Instead of a point, the source may name a surface. Start points are then
//! spread uniformly over that surface and particles leave along its normal:
//!
//! ```json
//! "source": {"surface": "wall_0", "randomize": true}
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::background::Background;
use crate::batch::BatchSettings;
use crate::geometry::Geometry;
use crate::math::Vec3;
use crate::particle::{EmissionMode, ParticleSource};
use crate::reflector::{Reflector, ReflectorKind};
use crate::surface::Surface;
use crate::{Result, TracerError};

/// One surface entry of the `geometry` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceConfig {
    pub name: String,
    pub contour: Vec<[f64; 3]>,
    /// `"mirror"` or `"cosine"`
    pub reflector_type: String,
    pub reflection_coefficient: f64,
    #[serde(default)]
    pub collect_statistics: bool,
}

impl SurfaceConfig {
    pub fn build(&self) -> Result<Surface> {
        let kind: ReflectorKind = self.reflector_type.parse()?;
        let reflector = Reflector::new(kind, self.reflection_coefficient)
            .map_err(|e| TracerError::Config(format!("surface '{}': {}", self.name, e)))?;
        let contour = self.contour.iter().copied().map(Vec3::from).collect();
        Surface::new(
            self.name.clone(),
            contour,
            reflector,
            self.collect_statistics,
        )
    }
}

/// Reject names that cannot serve as a file name inside the output directory
fn validate_name(name: &str) -> Result<()> {
    let reserved = name.is_empty() || name == "." || name == "..";
    if reserved || name.chars().any(|c| matches!(c, '/' | '\\' | '\0')) {
        return Err(TracerError::Config(format!(
            "surface name '{}' is not a valid file name", name
        )));
    }
    Ok(())
}

/// Particle source; unset fields fall back to the first surface
///
/// `surface` selects an area source and excludes `origin` and `direction`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub surface: Option<String>,
    #[serde(default)]
    pub origin: Option<[f64; 3]>,
    #[serde(default)]
    pub direction: Option<[f64; 3]>,
    #[serde(default = "default_randomize")]
    pub randomize: bool,
}

fn default_randomize() -> bool {
    true
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            surface: None,
            origin: None,
            direction: None,
            randomize: default_randomize(),
        }
    }
}

/// Run size and seeding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub particles: u64,
    pub threads: usize,
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        let defaults = BatchSettings::default();
        Self {
            particles: defaults.particles,
            threads: defaults.threads,
            seed: defaults.seed,
        }
    }
}

/// Complete description of a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub gas: Background,
    pub geometry: Vec<SurfaceConfig>,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub run: RunConfig,
}

impl SimulationConfig {
    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref()).map_err(|e| {
            TracerError::Config(format!("cannot read {}: {}", path.as_ref().display(), e))
        })?;
        Self::from_json_str(&text)
    }

    /// Parse a configuration from JSON text
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.gas.validate()?;
        Ok(config)
    }

    pub fn background(&self) -> Background {
        self.gas
    }

    /// Build every surface and verify the enclosure orientation
    ///
    /// Fails with [`TracerError::Config`] on a duplicate surface name or on
    /// a name that is not a plain file name.
    pub fn build_geometry(&self) -> Result<Geometry> {
        let mut names = HashSet::new();
        for surface in &self.geometry {
            validate_name(&surface.name)?;
            if !names.insert(surface.name.as_str()) {
                return Err(TracerError::Config(format!(
                    "surface name '{}' is used more than once", surface.name
                )));
            }
        }

        let surfaces = self
            .geometry
            .iter()
            .map(SurfaceConfig::build)
            .collect::<Result<Vec<_>>>()?;
        let geometry = Geometry::new(surfaces)?;
        geometry.check_orientations()?;
        Ok(geometry)
    }

    /// Particle source
    ///
    /// A named source surface gives an area source aimed along its normal.
    /// Otherwise the source is a point, defaulting to the first surface's
    /// centre and normal.
    pub fn source(&self, geometry: &Geometry) -> Result<ParticleSource> {
        let mode = EmissionMode::from_randomize(self.source.randomize);
        if let Some(name) = &self.source.surface {
            if self.source.origin.is_some() || self.source.direction.is_some() {
                return Err(TracerError::Config(format!(
                    "source surface '{}' excludes origin and direction", name
                )));
            }
            let Some((_, surface)) = geometry.find(name) else {
                return Err(TracerError::Config(format!("unknown source surface '{}'", name)));
            };
            return Ok(ParticleSource::from_surface(surface, mode));
        }

        let first = geometry.get(0).ok_or_else(|| {
            TracerError::InvalidGeometry("geometry contains no surfaces".to_string())
        })?;
        let origin = self
            .source
            .origin
            .map(Vec3::from)
            .unwrap_or(*first.mass_center());
        let direction = self
            .source
            .direction
            .map(Vec3::from)
            .unwrap_or(*first.normal());
        ParticleSource::new(origin, direction, mode)
    }

    pub fn batch_settings(&self) -> BatchSettings {
        BatchSettings {
            particles: self.run.particles,
            threads: self.run.threads,
            seed: self.run.seed,
        }
    }
}
