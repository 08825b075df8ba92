//! Constants module for transport calculations

use std::f64::consts::PI;

// Physics
/// Boltzmann constant in J/K
pub const BOLTZMANN: f64 = 1.380_649e-23;
/// Square centimetres per square metre, for cross-sections given in cm²
pub const CM2_PER_M2: f64 = 1e4;
/// Boltzmann constant folded with the cm² → m² conversion
///
/// With the cross-section in cm², pressure in Pa and temperature in K,
/// `MFP_CONSTANT * T / (p * sigma)` is the mean free path in metres.
pub const MFP_CONSTANT: f64 = BOLTZMANN * CM2_PER_M2;

// Angles
/// Tau (2*PI) for full circle
pub const TAU: f64 = 2.0 * PI;

// Geometry tolerances
/// Smallest |n·d| for which a ray is not considered parallel to a plane
pub const PARALLEL_EPSILON: f64 = 1e-12;
/// Upper bound on drift-correction passes before a point is accepted as is
pub const MAX_DRIFT_ITERATIONS: usize = 64;
