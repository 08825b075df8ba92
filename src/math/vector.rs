//! # Three-Dimensional Vector Module
//!
//! This module provides the `Vec3` value type used for every position and
//! direction handled by the transport engine.
//!
//! ## Equality
//!
//! `Vec3` compares exactly, component by component. Tolerance handling is the
//! caller's responsibility: geometry code that needs an epsilon applies it
//! explicitly where the numerical context is known.
//!
//! ## Examples
//!
//! ```rust
//! use vactrace::math::Vec3;
//!
//! let x_axis = Vec3::new(1.0, 0.0, 0.0);
//! let y_axis = Vec3::new(0.0, 1.0, 0.0);
//!
//! assert_eq!(x_axis.dot(&y_axis), 0.0);
//! assert_eq!(x_axis.cross(&y_axis), Vec3::new(0.0, 0.0, 1.0));
//! ```

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// Three-dimensional vector in double precision
///
/// Represents either a point in space or a direction, depending on context.
/// All operations are pure and return new values.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    /// X-component
    pub x: f64,
    /// Y-component
    pub y: f64,
    /// Z-component
    pub z: f64,
}

impl Vec3 {
    /// The zero vector
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    /// Unit vector along X
    pub const X: Vec3 = Vec3::new(1.0, 0.0, 0.0);
    /// Unit vector along Y
    pub const Y: Vec3 = Vec3::new(0.0, 1.0, 0.0);
    /// Unit vector along Z
    pub const Z: Vec3 = Vec3::new(0.0, 0.0, 1.0);

    /// Creates a new vector from its components
    ///
    /// # Examples
    ///
    /// ```rust
    /// use vactrace::math::Vec3;
    ///
    /// let v = Vec3::new(1.0, 2.0, 3.0);
    /// assert_eq!(v.x, 1.0);
    /// assert_eq!(v.y, 2.0);
    /// assert_eq!(v.z, 3.0);
    /// ```
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Vec3 { x, y, z }
    }

    /// Vector pointing from `start` to `end`
    ///
    /// # Examples
    ///
    /// ```rust
    /// use vactrace::math::Vec3;
    ///
    /// let d = Vec3::between(&Vec3::new(4.0, 8.0, 12.0), &Vec3::new(1.0, 3.0, 5.0));
    /// assert_eq!(d, Vec3::new(-3.0, -5.0, -7.0));
    /// ```
    pub fn between(start: &Vec3, end: &Vec3) -> Self {
        *end - *start
    }

    /// Calculates the dot product with another vector
    pub fn dot(&self, other: &Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Calculates the cross product with another vector
    ///
    /// Follows the right-hand rule:
    ///
    /// ```text
    /// cross = (y₁*z₂ - z₁*y₂, z₁*x₂ - x₁*z₂, x₁*y₂ - y₁*x₂)
    /// ```
    pub fn cross(&self, other: &Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Squared Euclidean length
    pub fn length_squared(&self) -> f64 {
        self.dot(self)
    }

    /// Euclidean length
    pub fn length(&self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Distance between two points
    pub fn distance(&self, other: &Vec3) -> f64 {
        (*other - *self).length()
    }

    /// Returns a unit vector in the same direction
    ///
    /// The length is not checked. Callers must never pass a degenerate
    /// (zero-length) vector; use [`Vec3::normalize`] when the input is not
    /// known to be valid.
    pub fn unit(&self) -> Vec3 {
        let len = self.length();
        Vec3 {
            x: self.x / len,
            y: self.y / len,
            z: self.z / len,
        }
    }

    /// Returns a normalized (unit) vector, or `None` for the zero vector
    ///
    /// # Examples
    ///
    /// ```rust
    /// use vactrace::math::Vec3;
    ///
    /// let unit = Vec3::new(3.0, 4.0, 0.0).normalize().unwrap();
    /// assert_eq!(unit, Vec3::new(0.6, 0.8, 0.0));
    /// assert!(Vec3::ZERO.normalize().is_none());
    /// ```
    pub fn normalize(&self) -> Option<Vec3> {
        let len = self.length();
        if len == 0.0 || !len.is_finite() {
            None
        } else {
            Some(self.unit())
        }
    }

    /// Multiplies every component by `factor`
    pub fn scale(&self, factor: f64) -> Vec3 {
        Vec3 {
            x: self.x * factor,
            y: self.y * factor,
            z: self.z * factor,
        }
    }

    /// Affine step `self + direction * t`
    ///
    /// Used to advance a point a distance `t` along a unit direction.
    pub fn along(&self, direction: &Vec3, t: f64) -> Vec3 {
        Vec3 {
            x: self.x + direction.x * t,
            y: self.y + direction.y * t,
            z: self.z + direction.z * t,
        }
    }

    /// Converts to nalgebra Vector3 for matrix operations
    pub fn to_vector3(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Creates from a nalgebra Vector3
    pub fn from_vector3(vec: &Vector3<f64>) -> Self {
        Vec3::new(vec.x, vec.y, vec.z)
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(c: [f64; 3]) -> Self {
        Vec3::new(c[0], c[1], c[2])
    }
}

impl From<Vec3> for [f64; 3] {
    fn from(v: Vec3) -> Self {
        [v.x, v.y, v.z]
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Vec3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;

    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f64) -> Vec3 {
        self.scale(rhs)
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.x, self.y, self.z)
    }
}
