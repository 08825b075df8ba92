//! Orthonormal bases for local coordinate frames
//!
//! Surfaces express their contour in a frame whose z-axis is the surface
//! normal, and direction sampling builds a frame around the preferred
//! direction. Both use [`OrthonormalBasis`].

use nalgebra::Matrix3;

use super::Vec3;
use crate::{Result, TracerError};

/// Maximum |dot product| tolerated between explicitly supplied axes
pub const BASIS_TOLERANCE: f64 = 1e-12;

/// Three mutually orthogonal unit vectors {x̂, ŷ, ẑ}
///
/// Stored as the columns of a rotation matrix `M`, so that
/// `world = M * local` and `local = Mᵀ * world`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthonormalBasis {
    matrix: Matrix3<f64>,
}

impl Default for OrthonormalBasis {
    fn default() -> Self {
        Self {
            matrix: Matrix3::identity(),
        }
    }
}

impl OrthonormalBasis {
    /// Builds a basis from three explicitly given axes
    ///
    /// The axes are normalized. Fails with [`TracerError::InvalidBasis`] if
    /// any axis is degenerate or any pair is not orthogonal.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use vactrace::math::{OrthonormalBasis, Vec3};
    ///
    /// let basis = OrthonormalBasis::from_axes(
    ///     Vec3::new(0.1, 0.0, 0.0),
    ///     Vec3::new(0.0, 25.0, 0.0),
    ///     Vec3::new(0.0, 0.0, -15.0),
    /// ).unwrap();
    /// assert_eq!(basis.z_axis(), Vec3::new(0.0, 0.0, -1.0));
    ///
    /// assert!(OrthonormalBasis::from_axes(
    ///     Vec3::new(1.0, 0.0, 0.0),
    ///     Vec3::new(0.0, 1.0, 0.0),
    ///     Vec3::new(1.0, 2.0, 3.0),
    /// ).is_err());
    /// ```
    pub fn from_axes(i: Vec3, j: Vec3, k: Vec3) -> Result<Self> {
        let unit = |v: Vec3, name: &str| {
            let message = format!("{} axis has zero length", name);
            v.normalize().ok_or(TracerError::InvalidBasis(message))
        };
        let (i, j, k) = (unit(i, "x")?, unit(j, "y")?, unit(k, "z")?);

        for (a, b, pair) in [(i, j, "x/y"), (j, k, "y/z"), (i, k, "x/z")] {
            let dot = a.dot(&b);
            if dot.abs() > BASIS_TOLERANCE {
                return Err(TracerError::InvalidBasis(format!(
                    "axes {} are not orthogonal (dot = {:e})",
                    pair, dot
                )));
            }
        }

        Ok(Self::from_unit_axes(i, j, k))
    }

    /// Derives a right-handed basis whose z-axis is `z`
    ///
    /// The y-axis seed is whichever of `z × x̂` and `z × ŷ` is longer, which
    /// keeps the construction well conditioned when `z` is nearly parallel to
    /// one of the coordinate axes. `z` must not be the zero vector.
    pub fn from_z(z: &Vec3) -> Self {
        let k = z.unit();
        let seed_x = k.cross(&Vec3::X);
        let seed_y = k.cross(&Vec3::Y);
        let j = if seed_x.length_squared() > seed_y.length_squared() {
            seed_x.unit()
        } else {
            seed_y.unit()
        };
        let i = j.cross(&k).unit();
        Self::from_unit_axes(i, j, k)
    }

    fn from_unit_axes(i: Vec3, j: Vec3, k: Vec3) -> Self {
        Self {
            matrix: Matrix3::from_columns(&[i.to_vector3(), j.to_vector3(), k.to_vector3()]),
        }
    }

    /// Local x-axis expressed in world coordinates
    pub fn x_axis(&self) -> Vec3 {
        Vec3::from_vector3(&self.matrix.column(0).into_owned())
    }

    /// Local y-axis expressed in world coordinates
    pub fn y_axis(&self) -> Vec3 {
        Vec3::from_vector3(&self.matrix.column(1).into_owned())
    }

    /// Local z-axis expressed in world coordinates
    pub fn z_axis(&self) -> Vec3 {
        Vec3::from_vector3(&self.matrix.column(2).into_owned())
    }

    /// Transforms world coordinates into this basis
    pub fn to_local(&self, world: &Vec3) -> Vec3 {
        Vec3::from_vector3(&self.matrix.tr_mul(&world.to_vector3()))
    }

    /// Transforms coordinates expressed in this basis back to world coordinates
    pub fn to_world(&self, local: &Vec3) -> Vec3 {
        Vec3::from_vector3(&(self.matrix * local.to_vector3()))
    }
}
