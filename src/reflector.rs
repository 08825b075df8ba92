//! Surface reflection models
//!
//! A reflector maps (incident direction, surface normal, random stream) to
//! either a new direction or absorption. Absorption is the only way a
//! particle leaves the simulation.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::math::Vec3;
use crate::particle::hemisphere_direction;
use crate::{Result, TracerError};

/// Closed set of reflection laws, each carrying its reflection coefficient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Reflector {
    /// Specular reflection about the surface normal
    Mirror { reflection_coefficient: f64 },
    /// Diffuse reflection into the hemisphere around the surface normal
    Lambertian { reflection_coefficient: f64 },
}

/// Reflector kind as named in geometry descriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReflectorKind {
    Mirror,
    Lambertian,
}

impl FromStr for ReflectorKind {
    type Err = TracerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mirror" | "specular" => Ok(ReflectorKind::Mirror),
            "cosine" | "lambertian" | "diffuse" => Ok(ReflectorKind::Lambertian),
            _ => Err(TracerError::UnknownReflector(s.to_string())),
        }
    }
}

impl fmt::Display for ReflectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReflectorKind::Mirror => write!(f, "mirror"),
            ReflectorKind::Lambertian => write!(f, "cosine"),
        }
    }
}

impl Reflector {
    /// Build a reflector, checking that the coefficient is a probability
    pub fn new(kind: ReflectorKind, reflection_coefficient: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&reflection_coefficient) {
            return Err(TracerError::InvalidParameter(format!(
                "reflection coefficient must be in [0, 1], got {}",
                reflection_coefficient
            )));
        }
        Ok(match kind {
            ReflectorKind::Mirror => Reflector::Mirror {
                reflection_coefficient,
            },
            ReflectorKind::Lambertian => Reflector::Lambertian {
                reflection_coefficient,
            },
        })
    }

    pub fn kind(&self) -> ReflectorKind {
        match self {
            Reflector::Mirror { .. } => ReflectorKind::Mirror,
            Reflector::Lambertian { .. } => ReflectorKind::Lambertian,
        }
    }

    /// Probability that a collision results in reflection
    pub fn reflection_coefficient(&self) -> f64 {
        match *self {
            Reflector::Mirror {
                reflection_coefficient,
            }
            | Reflector::Lambertian {
                reflection_coefficient,
            } => reflection_coefficient,
        }
    }

    /// Reflect a particle arriving along `incident` at a surface with unit
    /// `normal` pointing into the enclosure
    ///
    /// Returns `None` when the particle is absorbed. The survival draw
    /// `u ∈ [0, 1)` absorbs whenever `u >= R`, so `R = 0` always absorbs and
    /// `R = 1` always reflects.
    pub fn reflect<R: Rng + ?Sized>(
        &self,
        incident: &Vec3,
        normal: &Vec3,
        rng: &mut R,
    ) -> Option<Vec3> {
        let u: f64 = rng.gen();
        if u >= self.reflection_coefficient() {
            return None;
        }
        match self {
            Reflector::Mirror { .. } => {
                let projection = incident.dot(normal);
                Some((*incident - normal.scale(2.0 * projection)).unit())
            }
            Reflector::Lambertian { .. } => Some(hemisphere_direction(normal, rng)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rstest::rstest;

    #[rstest]
    #[case(ReflectorKind::Mirror)]
    #[case(ReflectorKind::Lambertian)]
    fn test_zero_coefficient_always_absorbs(#[case] kind: ReflectorKind) {
        let reflector = Reflector::new(kind, 0.0).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let normal = Vec3::new(0.0, 0.0, -1.0);
        let dir = Vec3::new(2.0, 3.0, 5.0).unit();
        for _ in 0..1000 {
            assert!(reflector.reflect(&dir, &normal, &mut rng).is_none());
        }
    }

    #[rstest]
    #[case(ReflectorKind::Mirror)]
    #[case(ReflectorKind::Lambertian)]
    fn test_unit_coefficient_always_reflects(#[case] kind: ReflectorKind) {
        let reflector = Reflector::new(kind, 1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let normal = Vec3::new(0.0, 0.0, -1.0);
        let dir = Vec3::new(2.0, 3.0, 5.0).unit();
        for _ in 0..1000 {
            assert!(reflector.reflect(&dir, &normal, &mut rng).is_some());
        }
    }

    #[test]
    fn test_mirror_reflection() {
        let reflector = Reflector::new(ReflectorKind::Mirror, 1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let normal = Vec3::new(0.0, 0.0, -1.0);
        let dir = Vec3::new(2.0, 3.0, 5.0).unit();

        let res = reflector.reflect(&dir, &normal, &mut rng).unwrap();
        assert_abs_diff_eq!(res.x, dir.x, epsilon = 1e-15);
        assert_abs_diff_eq!(res.y, dir.y, epsilon = 1e-15);
        assert_abs_diff_eq!(res.z, -dir.z, epsilon = 1e-15);
    }

    #[test]
    fn test_lambertian_never_crosses_surface() {
        let reflector = Reflector::new(ReflectorKind::Lambertian, 1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let normal = Vec3::new(0.0, 0.0, -1.0);
        let oblique = Vec3::new(2.0, 3.0, 5.0).unit();
        let head_on = -normal;

        for _ in 0..1000 {
            let res = reflector.reflect(&oblique, &normal, &mut rng).unwrap();
            assert!(res.dot(&normal) >= 0.0);
            assert!(res.dot(&normal) * oblique.dot(&normal) <= 0.0);

            let res = reflector.reflect(&head_on, &normal, &mut rng).unwrap();
            assert!(res.dot(&head_on) <= 0.0);
        }
    }

    #[test]
    fn test_partial_coefficient_absorption_rate() {
        let reflector = Reflector::new(ReflectorKind::Mirror, 0.9).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let normal = Vec3::Z;
        let dir = -Vec3::Z;
        let n = 100_000;
        let absorbed = (0..n)
            .filter(|_| reflector.reflect(&dir, &normal, &mut rng).is_none())
            .count() as f64;
        assert!((absorbed / n as f64 - 0.1).abs() < 0.005);
    }

    #[rstest]
    #[case("mirror", ReflectorKind::Mirror)]
    #[case("cosine", ReflectorKind::Lambertian)]
    #[case("Lambertian", ReflectorKind::Lambertian)]
    fn test_kind_parsing(#[case] name: &str, #[case] expected: ReflectorKind) {
        assert_eq!(name.parse::<ReflectorKind>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_kind_and_bad_coefficient() {
        assert!(matches!(
            "velvet".parse::<ReflectorKind>(),
            Err(TracerError::UnknownReflector(_))
        ));
        assert!(Reflector::new(ReflectorKind::Mirror, 1.5).is_err());
        assert!(Reflector::new(ReflectorKind::Mirror, -0.1).is_err());
        assert!(Reflector::new(ReflectorKind::Mirror, f64::NAN).is_err());
    }
}
