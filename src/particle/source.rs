//! Particle sources

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::Particle;
use crate::math::Vec3;
use crate::surface::Surface;
use crate::{Result, TracerError};

/// How a source chooses the initial direction of each particle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmissionMode {
    /// Every particle leaves along the nominal direction
    Fixed,
    /// Directions are sampled from the hemisphere around the nominal direction
    Hemispherical,
}

impl EmissionMode {
    /// Mode selected by a "randomize direction" flag
    pub fn from_randomize(randomize: bool) -> Self {
        if randomize {
            EmissionMode::Hemispherical
        } else {
            EmissionMode::Fixed
        }
    }
}

/// Where emitted particles start
#[derive(Debug, Clone)]
pub enum Emitter {
    /// Every particle starts at one point
    Point(Vec3),
    /// Start points are spread uniformly over the area of a surface
    Surface(Box<Surface>),
}

/// Particle source emitting into the enclosure
#[derive(Debug, Clone)]
pub struct ParticleSource {
    emitter: Emitter,
    direction: Vec3,
    mode: EmissionMode,
}

impl ParticleSource {
    /// Create a point source at `origin` with a nominal `direction`
    ///
    /// Fails if `direction` has zero length.
    pub fn new(origin: Vec3, direction: Vec3, mode: EmissionMode) -> Result<Self> {
        let direction = direction.normalize().ok_or_else(|| {
            TracerError::InvalidParameter("source direction has zero length".to_string())
        })?;
        Ok(Self {
            emitter: Emitter::Point(origin),
            direction,
            mode,
        })
    }

    /// Create a source spread over `surface`, aimed along its inward normal
    pub fn from_surface(surface: &Surface, mode: EmissionMode) -> Self {
        Self {
            emitter: Emitter::Surface(Box::new(surface.clone())),
            direction: *surface.normal(),
            mode,
        }
    }

    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    /// Fixed start point, `None` for a surface source
    pub fn origin(&self) -> Option<&Vec3> {
        match &self.emitter {
            Emitter::Point(origin) => Some(origin),
            Emitter::Surface(_) => None,
        }
    }

    /// Nominal (unit) emission direction
    pub fn direction(&self) -> &Vec3 {
        &self.direction
    }

    pub fn mode(&self) -> EmissionMode {
        self.mode
    }

    /// Generate the next particle
    pub fn emit<R: Rng + ?Sized>(&self, rng: &mut R) -> Particle {
        let origin = match &self.emitter {
            Emitter::Point(origin) => *origin,
            Emitter::Surface(surface) => surface.emission_point(rng),
        };
        match self.mode {
            EmissionMode::Fixed => Particle::new(origin, self.direction),
            EmissionMode::Hemispherical => {
                Particle::with_random_direction(origin, &self.direction, rng)
            }
        }
    }
}
