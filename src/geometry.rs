//! Enclosure geometry: the ordered surface table shared by all workers

use crate::math::Vec3;
use crate::surface::Surface;
use crate::{Result, TracerError};

/// Index of a surface within its [`Geometry`]
pub type SurfaceId = usize;

/// Ordered, immutable collection of surfaces bounding the vacuum volume
///
/// Read-only once built, so a single instance is shared by reference
/// across every worker thread.
#[derive(Debug, Clone)]
pub struct Geometry {
    surfaces: Vec<Surface>,
}

impl Geometry {
    /// Wrap a list of surfaces
    ///
    /// Fails if the list is empty. Orientation is not checked here; see
    /// [`Geometry::check_orientations`].
    pub fn new(surfaces: Vec<Surface>) -> Result<Self> {
        if surfaces.is_empty() {
            return Err(TracerError::InvalidGeometry("geometry contains no surfaces".to_string()));
        }
        Ok(Self { surfaces })
    }

    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    pub fn get(&self, id: SurfaceId) -> Option<&Surface> {
        self.surfaces.get(id)
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// First surface called `name`, with its id
    pub fn find(&self, name: &str) -> Option<(SurfaceId, &Surface)> {
        self.surfaces
            .iter()
            .enumerate()
            .find(|(_, surface)| surface.name() == name)
    }

    /// Nearest surface crossed by the ray `origin + t * direction`, `t > 0`
    ///
    /// Ties keep the lowest surface id.
    pub fn nearest_crossing(
        &self,
        origin: &Vec3,
        direction: &Vec3,
    ) -> Option<(SurfaceId, Vec3, f64)> {
        let mut nearest: Option<(SurfaceId, Vec3, f64)> = None;
        for (id, surface) in self.surfaces.iter().enumerate() {
            if let Some(point) = surface.cross_point(origin, direction) {
                let distance = origin.distance(&point);
                if nearest.map_or(true, |(_, _, best)| distance < best) {
                    nearest = Some((id, point, distance));
                }
            }
        }
        nearest
    }

    /// Verify that every surface normal points into the enclosure
    ///
    /// A ray cast from each surface's centre of mass along its normal must
    /// cross another surface. When it escapes, the contour of that surface
    /// is wound the wrong way.
    pub fn check_orientations(&self) -> Result<()> {
        for (id, surface) in self.surfaces.iter().enumerate() {
            let origin = surface.mass_center();
            let normal = surface.normal();
            let hit = self
                .surfaces
                .iter()
                .enumerate()
                .filter(|(other, _)| *other != id)
                .any(|(_, other)| other.cross_point(origin, normal).is_some());
            if !hit {
                return Err(TracerError::InvalidGeometry(format!(
                    "normal of surface '{}' points out of the enclosure, reverse its contour",
                    surface.name()
                )));
            }
        }
        Ok(())
    }
}
