//! Particle transport state and physics
//!
//! A [`Particle`] carries its position, unit direction and collision counters
//! through a trace. It is mutated in place by the tracer and consumed into a
//! [`ParticleRecord`](crate::sink::ParticleRecord) when it is absorbed.

pub mod sampling;
pub mod source;

pub use sampling::{free_flight_distance, hemisphere_direction, isotropic_direction};
pub use source::{EmissionMode, Emitter, ParticleSource};

use rand::Rng;

use crate::background::Background;
use crate::math::Vec3;
use crate::sink::ParticleRecord;

/// Mutable transport state of one particle
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    position: Vec3,
    direction: Vec3,
    /// Number of gas-phase collisions so far
    volume_collisions: u64,
    /// Number of surface collisions so far
    surface_collisions: u64,
}

impl Particle {
    /// Create a particle travelling along `direction` (normalized here)
    ///
    /// `direction` must not be the zero vector.
    pub fn new(position: Vec3, direction: Vec3) -> Self {
        Self {
            position,
            direction: direction.unit(),
            volume_collisions: 0,
            surface_collisions: 0,
        }
    }

    /// Create a particle whose direction is sampled from the hemisphere
    /// around `preferred`
    pub fn with_random_direction<R: Rng + ?Sized>(
        position: Vec3,
        preferred: &Vec3,
        rng: &mut R,
    ) -> Self {
        Self::new(position, hemisphere_direction(preferred, rng))
    }

    pub fn position(&self) -> &Vec3 {
        &self.position
    }

    pub fn direction(&self) -> &Vec3 {
        &self.direction
    }

    pub fn volume_collisions(&self) -> u64 {
        self.volume_collisions
    }

    pub fn surface_collisions(&self) -> u64 {
        self.surface_collisions
    }

    /// Sample the distance this particle flies before hitting a gas molecule
    pub fn distance_in_gas<R: Rng + ?Sized>(&self, gas: &Background, rng: &mut R) -> f64 {
        free_flight_distance(gas, rng)
    }

    /// Fly `distance` along the current direction, then scatter isotropically
    pub fn make_gas_collision<R: Rng + ?Sized>(&mut self, distance: f64, rng: &mut R) {
        self.position = self.position.along(&self.direction, distance);
        self.direction = isotropic_direction(rng);
        self.volume_collisions += 1;
    }

    /// Jump to a surface intersection point and count the collision
    pub fn hit_surface(&mut self, point: Vec3) {
        self.position = point;
        self.surface_collisions += 1;
    }

    /// Adopt a new (unit) direction, e.g. after a reflection
    pub fn set_direction(&mut self, direction: Vec3) {
        self.direction = direction;
    }

    /// Final state of an absorbed particle
    pub fn into_record(self) -> ParticleRecord {
        ParticleRecord {
            position: self.position,
            direction: self.direction,
            volume_collisions: self.volume_collisions,
            surface_collisions: self.surface_collisions,
        }
    }
}
