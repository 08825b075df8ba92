//! Vector and basis algebra
//!
//! Foundational value types shared by every other module: [`Vec3`] for
//! positions and directions and [`OrthonormalBasis`] for local frames
//! aligned to a surface normal or a travel direction.

pub mod basis;
pub mod vector;

pub use basis::{OrthonormalBasis, BASIS_TOLERANCE};
pub use vector::Vec3;
