//! # Planar Polygon Surfaces
//!
//! A [`Surface`] is an immutable closed planar polygon bounding the vacuum
//! enclosure. It answers the geometric questions asked by the tracer:
//!
//! - where (and whether) a ray crosses it: [`Surface::cross_point`]
//! - whether a point on its plane lies within its contour: [`Surface::contains`]
//! - a uniformly distributed point on it: [`Surface::random_point`], or
//!   [`Surface::emission_point`] for particles starting there
//!
//! ## Orientation
//!
//! The normal is derived from the first three contour vertices,
//! `n = (v1 - v0) × (v2 - v0)`, and must point into the enclosure. The
//! vertex order therefore fixes which side of the plane is "inside";
//! [`Geometry`](crate::geometry::Geometry) verifies this for a whole
//! enclosure.
//!
//! ## Boundary drift
//!
//! A computed intersection point can land a few ulps behind the plane, and
//! near edges a few ulps outside the contour. Such points are pulled back
//! along the ray until their offset from the plane, measured along the
//! inward normal, is non-negative ([`Surface::correct_drift`]). Points on
//! the contour boundary count as inside, so grazing hits at edges and
//! corners are never lost.

pub mod winding;

use nalgebra::Vector2;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::constants::{MAX_DRIFT_ITERATIONS, PARALLEL_EPSILON};
use crate::math::{OrthonormalBasis, Vec3};
use crate::particle::Particle;
use crate::reflector::Reflector;
use crate::sink::RecordSink;
use crate::{Result, TracerError};

/// Relative tolerance for contour vertices lying off the plane
const COPLANAR_TOLERANCE: f64 = 1e-9;

/// Plane coefficients of `Ax + By + Cz + D = 0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneEquation {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl PlaneEquation {
    /// Plane through three points, with `(A, B, C) = (p1 - p0) × (p2 - p0)`
    /// and `D` chosen so that `p0` lies on the plane
    pub fn from_points(p0: &Vec3, p1: &Vec3, p2: &Vec3) -> Self {
        let a = (p1.y - p0.y) * (p2.z - p0.z) - (p2.y - p0.y) * (p1.z - p0.z);
        let b = -(p1.x - p0.x) * (p2.z - p0.z) + (p2.x - p0.x) * (p1.z - p0.z);
        let c = (p1.x - p0.x) * (p2.y - p0.y) - (p2.x - p0.x) * (p1.y - p0.y);
        let d = -a * p0.x - b * p0.y - c * p0.z;
        Self { a, b, c, d }
    }

    /// Unnormalized normal `(A, B, C)`
    pub fn normal(&self) -> Vec3 {
        Vec3::new(self.a, self.b, self.c)
    }
}

/// Immutable planar polygon with a reflection law
#[derive(Debug, Clone)]
pub struct Surface {
    name: String,
    contour: Vec<Vec3>,
    plane: PlaneEquation,
    /// Unit normal pointing into the enclosure
    normal: Vec3,
    /// `D / |(A, B, C)|`, so that `normal · x + offset` is a signed distance
    offset: f64,
    basis: OrthonormalBasis,
    /// Contour projected on the basis x/y axes
    local_contour: Vec<Vector2<f64>>,
    triangle_areas: Vec<f64>,
    triangle_sampler: WeightedIndex<f64>,
    mass_center: Vec3,
    reflector: Reflector,
    collect_statistics: bool,
}

impl Surface {
    /// Build a surface from validated vertex data
    ///
    /// Fails with [`TracerError::InvalidGeometry`] if the contour has fewer
    /// than three vertices, if its first three vertices are collinear, if
    /// any vertex lies off the plane, or if its area is zero.
    pub fn new(
        name: impl Into<String>,
        contour: Vec<Vec3>,
        reflector: Reflector,
        collect_statistics: bool,
    ) -> Result<Self> {
        let name = name.into();
        if contour.len() < 3 {
            return Err(TracerError::InvalidGeometry(format!(
                "surface '{}' has {} contour points, at least 3 are required",
                name, contour.len()
            )));
        }

        let plane = PlaneEquation::from_points(&contour[0], &contour[1], &contour[2]);
        let raw_normal = plane.normal();
        let normal = raw_normal.normalize().ok_or_else(|| {
            TracerError::InvalidGeometry(format!(
                "surface '{}' has collinear leading vertices, its plane is undefined",
                name
            ))
        })?;
        let offset = plane.d / raw_normal.length();

        let extent = contour
            .iter()
            .map(|v| v.distance(&contour[0]))
            .fold(1.0_f64, f64::max);
        let tolerance = COPLANAR_TOLERANCE * extent;
        let stray = contour
            .iter()
            .find(|v| (normal.dot(v) + offset).abs() > tolerance);
        if let Some(stray) = stray {
            return Err(TracerError::InvalidGeometry(format!(
                "surface '{}' vertex ({}, {}, {}) is not on the contour plane",
                name, stray.x, stray.y, stray.z
            )));
        }

        let triangle_areas = Self::triangle_areas(&contour);
        let triangle_sampler = WeightedIndex::new(&triangle_areas).map_err(|e| {
            TracerError::InvalidGeometry(format!("surface '{}' has no area: {}", name, e))
        })?;
        let mass_center = Self::center_of_mass(&contour, &triangle_areas);

        let basis = OrthonormalBasis::from_z(&normal);
        let local_contour = Self::project_contour(&basis, &contour);

        Ok(Self {
            name,
            contour,
            plane,
            normal,
            offset,
            basis,
            local_contour,
            triangle_areas,
            triangle_sampler,
            mass_center,
            reflector,
            collect_statistics,
        })
    }

    /// Areas of the fan triangulation `(v0, vi, vi+1)`
    pub fn triangle_areas(contour: &[Vec3]) -> Vec<f64> {
        let Some(&origin) = contour.first() else {
            return Vec::new();
        };
        contour[1..]
            .windows(2)
            .map(|pair| {
                let e1 = pair[0] - origin;
                let e2 = pair[1] - origin;
                0.5 * e1.cross(&e2).length()
            })
            .collect()
    }

    /// Area-weighted centroid of the fan triangles
    pub fn center_of_mass(contour: &[Vec3], triangle_areas: &[f64]) -> Vec3 {
        let Some(&origin) = contour.first() else {
            return Vec3::ZERO;
        };
        let total: f64 = triangle_areas.iter().sum();
        let weighted = contour[1..]
            .windows(2)
            .zip(triangle_areas)
            .fold(Vec3::ZERO, |acc, (pair, area)| {
                acc + (origin + pair[0] + pair[1]).scale(area / 3.0)
            });
        weighted.scale(1.0 / total)
    }

    fn project_contour(basis: &OrthonormalBasis, contour: &[Vec3]) -> Vec<Vector2<f64>> {
        contour
            .iter()
            .map(|v| {
                let local = basis.to_local(v);
                Vector2::new(local.x, local.y)
            })
            .collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contour(&self) -> &[Vec3] {
        &self.contour
    }

    pub fn plane(&self) -> &PlaneEquation {
        &self.plane
    }

    /// Unit normal pointing into the enclosure
    pub fn normal(&self) -> &Vec3 {
        &self.normal
    }

    pub fn basis(&self) -> &OrthonormalBasis {
        &self.basis
    }

    pub fn mass_center(&self) -> &Vec3 {
        &self.mass_center
    }

    /// Total polygon area
    pub fn area(&self) -> f64 {
        self.triangle_areas.iter().sum()
    }

    pub fn reflector(&self) -> &Reflector {
        &self.reflector
    }

    pub fn collects_statistics(&self) -> bool {
        self.collect_statistics
    }

    /// Signed distance of `point` from the plane, positive inside the enclosure
    pub fn signed_distance(&self, point: &Vec3) -> f64 {
        self.normal.dot(point) + self.offset
    }

    /// True if `point`, projected on the plane, lies within the contour
    ///
    /// Only the in-plane coordinates are compared; the distance from the
    /// plane is ignored.
    pub fn contains(&self, point: &Vec3) -> bool {
        let local = self.basis.to_local(point);
        winding::contains(&Vector2::new(local.x, local.y), &self.local_contour)
    }

    /// Pull `end` back along the ray from `start` until it is not behind
    /// the plane
    ///
    /// The offset of `end` from the plane (and so from the centre of mass,
    /// which lies on it) is measured along the inward normal; while it is
    /// negative the point is moved back along the ray onto the plane. Each
    /// retry doubles the step so that a correction smaller than one ulp
    /// still moves the point. The same signed distance decides ray
    /// crossings, so a corrected point is never behind its own surface.
    pub fn correct_drift(&self, start: &Vec3, end: Vec3) -> Vec3 {
        let direction = match (end - *start).normalize() {
            Some(d) => d,
            None => return end,
        };
        let cos = direction.dot(&self.normal);
        if cos.abs() < PARALLEL_EPSILON {
            return end;
        }

        let mut point = end;
        let mut scale = 1.0;
        for _ in 0..MAX_DRIFT_ITERATIONS {
            let drift = self.signed_distance(&point);
            if drift >= 0.0 {
                break;
            }
            point = point.along(&direction, -scale * drift / cos);
            scale *= 2.0;
        }
        point
    }

    /// Intersection of the ray `origin + t * direction`, `t > 0`, with this
    /// polygon
    ///
    /// Returns `None` when the ray is parallel to the plane, when the plane
    /// is behind (or at) the origin, or when the crossing falls outside the
    /// contour.
    pub fn cross_point(&self, origin: &Vec3, direction: &Vec3) -> Option<Vec3> {
        let denom = self.normal.dot(direction);
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }
        let t = -self.signed_distance(origin) / denom;
        if !(t > 0.0) || !t.is_finite() {
            return None;
        }

        let point = self.correct_drift(origin, origin.along(direction, t));
        self.contains(&point).then_some(point)
    }

    /// Uniformly distributed point inside the contour
    ///
    /// Picks a fan triangle with probability proportional to its area, then
    /// samples it with barycentric weights
    /// `(1 - √r1, √r1 (1 - r2), r2 √r1)`.
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        let idx = self.triangle_sampler.sample(rng);
        let a = self.contour[0];
        let b = self.contour[idx + 1];
        let c = self.contour[idx + 2];

        let r1: f64 = rng.gen();
        let r2: f64 = rng.gen();
        let s = r1.sqrt();
        a.scale(1.0 - s) + b.scale(s * (1.0 - r2)) + c.scale(r2 * s)
    }

    /// Uniformly distributed start point for a particle leaving this surface
    ///
    /// Same distribution as [`Surface::random_point`], with the point moved
    /// along the normal until it is not behind the plane, so the particle
    /// cannot cross this surface on its first flight.
    pub fn emission_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        let point = self.random_point(rng);
        let behind = point.along(&self.normal, -1.0);
        self.correct_drift(&behind, point)
    }

    /// Hand an absorbed particle to `sink` if this surface collects statistics
    ///
    /// Returns whether a record was appended.
    pub fn save_particle<S: RecordSink + ?Sized>(
        &self,
        particle: Particle,
        sink: &mut S,
    ) -> Result<bool> {
        if !self.collect_statistics {
            return Ok(false);
        }
        sink.append(&particle.into_record())?;
        Ok(true)
    }
}
