//! Single-particle trace loop
//!
//! Each step resolves one event: either the particle scatters in the gas
//! before reaching a wall, or it reaches the nearest wall and is reflected
//! or absorbed there. [`Tracer::trace`] repeats steps until the particle
//! reaches a terminal state.

use log::warn;
use rand::Rng;

use crate::background::Background;
use crate::geometry::{Geometry, SurfaceId};
use crate::particle::Particle;
use crate::sink::RecordSink;
use crate::{Result, TracerError};

/// State of a particle after a trace step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceState {
    /// Still travelling inside the enclosure
    InFlight,
    /// Captured by a surface
    Absorbed { surface: SurfaceId },
    /// The flight ray missed every surface; the particle is discarded
    Lost,
}

impl TraceState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TraceState::InFlight)
    }
}

/// Drives particles through a fixed enclosure and background gas
#[derive(Debug, Clone, Copy)]
pub struct Tracer<'a> {
    geometry: &'a Geometry,
    gas: &'a Background,
}

impl<'a> Tracer<'a> {
    pub fn new(geometry: &'a Geometry, gas: &'a Background) -> Self {
        Self { geometry, gas }
    }

    pub fn geometry(&self) -> &'a Geometry {
        self.geometry
    }

    pub fn gas(&self) -> &'a Background {
        self.gas
    }

    /// Advance `particle` by one event
    pub fn step<R: Rng + ?Sized>(&self, particle: &mut Particle, rng: &mut R) -> TraceState {
        let gas_distance = particle.distance_in_gas(self.gas, rng);
        let position = *particle.position();
        let direction = *particle.direction();

        let nearest = self.geometry.nearest_crossing(&position, &direction);
        let (id, point, surface_distance) = match nearest {
            Some(hit) => hit,
            None => {
                warn!(
                    "Particle lost at ({}) heading ({}) after {} wall hits",
                    position, direction, particle.surface_collisions()
                );
                return TraceState::Lost;
            }
        };

        if gas_distance < surface_distance {
            particle.make_gas_collision(gas_distance, rng);
            return TraceState::InFlight;
        }

        particle.hit_surface(point);
        let surface = &self.geometry.surfaces()[id];
        let normal = surface.normal();
        match surface.reflector().reflect(&direction, normal, rng) {
            Some(reflected) => {
                particle.set_direction(reflected);
                TraceState::InFlight
            }
            None => TraceState::Absorbed { surface: id },
        }
    }

    /// Trace `particle` until it is absorbed or lost
    ///
    /// An absorbed particle is handed to `sinks[surface]` when that surface
    /// collects statistics. A surface without a matching sink is an
    /// [`TracerError::InvalidParameter`].
    pub fn trace<R, S>(
        &self,
        mut particle: Particle,
        rng: &mut R,
        sinks: &mut [S],
    ) -> Result<TraceState>
    where
        R: Rng + ?Sized,
        S: RecordSink,
    {
        loop {
            let state = self.step(&mut particle, rng);
            match state {
                TraceState::InFlight => continue,
                TraceState::Absorbed { surface } => {
                    let available = sinks.len();
                    let sink = sinks.get_mut(surface).ok_or_else(|| {
                        TracerError::InvalidParameter(format!(
                            "no statistics sink for surface {} ({} given)",
                            surface, available
                        ))
                    })?;
                    let owner = &self.geometry.surfaces()[surface];
                    owner.save_particle(particle, sink)?;
                    return Ok(state);
                }
                TraceState::Lost => return Ok(state),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::tests::unit_cube;
    use crate::math::Vec3;
    use crate::particle::isotropic_direction;
    use crate::reflector::ReflectorKind;
    use crate::sink::ParticleRecord;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rstest::rstest;

    fn center() -> Vec3 {
        Vec3::new(0.5, 0.5, 0.5)
    }

    #[rstest]
    #[case(ReflectorKind::Mirror)]
    #[case(ReflectorKind::Lambertian)]
    fn test_perfect_reflector_never_absorbs(#[case] kind: ReflectorKind) {
        let cube = unit_cube(kind, 1.0);
        let gas = Background::vacuum();
        let tracer = Tracer::new(&cube, &gas);
        let mut rng = StdRng::seed_from_u64(42);

        let mut particle = Particle::new(center(), isotropic_direction(&mut rng));
        for _ in 0..10_000 {
            assert_eq!(tracer.step(&mut particle, &mut rng), TraceState::InFlight);
        }
        assert_eq!(particle.surface_collisions(), 10_000);
        assert_eq!(particle.volume_collisions(), 0);
        let position = *particle.position();
        for axis in [position.x, position.y, position.z] {
            assert!((0.0..=1.0).contains(&axis));
        }
    }

    #[test]
    fn test_black_walls_absorb_on_first_hit() {
        let cube = unit_cube(ReflectorKind::Mirror, 0.0);
        let gas = Background::vacuum();
        let tracer = Tracer::new(&cube, &gas);
        let mut rng = StdRng::seed_from_u64(7);
        let mut sinks: Vec<Vec<ParticleRecord>> = vec![Vec::new(); cube.len()];

        for _ in 0..1000 {
            let particle = Particle::new(center(), isotropic_direction(&mut rng));
            let state = tracer.trace(particle, &mut rng, &mut sinks).unwrap();
            assert!(matches!(state, TraceState::Absorbed { .. }));
        }

        let records: Vec<&ParticleRecord> = sinks.iter().flatten().collect();
        assert_eq!(records.len(), 1000);
        for record in records {
            assert_eq!(record.surface_collisions, 1);
            assert_eq!(record.volume_collisions, 0);
        }
    }

    #[test]
    fn test_absorbed_particle_lands_in_owning_sink() {
        let cube = unit_cube(ReflectorKind::Mirror, 0.0);
        let gas = Background::vacuum();
        let tracer = Tracer::new(&cube, &gas);
        let mut rng = StdRng::seed_from_u64(1);
        let mut sinks: Vec<Vec<ParticleRecord>> = vec![Vec::new(); cube.len()];

        let particle = Particle::new(center(), Vec3::Z);
        let state = tracer.trace(particle, &mut rng, &mut sinks).unwrap();
        assert_eq!(state, TraceState::Absorbed { surface: 5 });
        assert_eq!(sinks[5].len(), 1);
        assert_eq!(sinks[5][0].position, Vec3::new(0.5, 0.5, 1.0));
        assert_eq!(sinks[5][0].direction, Vec3::Z);
    }

    #[test]
    fn test_dense_gas_scatters_before_walls() {
        let cube = unit_cube(ReflectorKind::Mirror, 0.0);
        // Mean free path of a few hundred nanometres
        let gas = Background::new(1e-15, 300.0, 1e5).unwrap();
        let tracer = Tracer::new(&cube, &gas);
        let mut rng = StdRng::seed_from_u64(3);

        let mut particle = Particle::new(center(), Vec3::X);
        assert_eq!(tracer.step(&mut particle, &mut rng), TraceState::InFlight);
        assert_eq!(particle.volume_collisions(), 1);
        assert_eq!(particle.surface_collisions(), 0);
        let x = particle.position().x;
        assert!(x > 0.5 && x < 0.51);
    }

    #[test]
    fn test_missing_sink_is_reported() {
        let cube = unit_cube(ReflectorKind::Mirror, 0.0);
        let gas = Background::vacuum();
        let tracer = Tracer::new(&cube, &gas);
        let mut rng = StdRng::seed_from_u64(1);
        let mut sinks: Vec<Vec<ParticleRecord>> = vec![Vec::new(); 2];

        let particle = Particle::new(center(), Vec3::Z);
        let result = tracer.trace(particle, &mut rng, &mut sinks);
        assert!(matches!(result, Err(TracerError::InvalidParameter(_))));
    }

    #[test]
    fn test_particle_outside_enclosure_is_lost() {
        let cube = unit_cube(ReflectorKind::Mirror, 0.0);
        let gas = Background::vacuum();
        let tracer = Tracer::new(&cube, &gas);
        let mut rng = StdRng::seed_from_u64(9);
        let mut sinks: Vec<Vec<ParticleRecord>> = vec![Vec::new(); cube.len()];

        let particle = Particle::new(Vec3::new(2.0, 0.5, 0.5), Vec3::X);
        let state = tracer.trace(particle, &mut rng, &mut sinks).unwrap();
        assert_eq!(state, TraceState::Lost);
        assert!(state.is_terminal());
        assert!(sinks.iter().all(|s| s.is_empty()));
    }
}
