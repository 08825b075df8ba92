//! Background gas parameters

use serde::{Deserialize, Serialize};

use crate::constants::MFP_CONSTANT;
use crate::{Result, TracerError};

/// Simulation-wide background gas
///
/// Read-only for the duration of a batch. A zero cross-section or zero
/// pressure means vacuum transport: the mean free path is infinite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Background {
    /// Collision cross-section in cm²
    pub sigma: f64,
    /// Gas temperature in K
    pub temperature: f64,
    /// Gas pressure in Pa
    pub pressure: f64,
}

impl Background {
    /// Create a validated background gas description
    pub fn new(sigma: f64, temperature: f64, pressure: f64) -> Result<Self> {
        let gas = Self {
            sigma,
            temperature,
            pressure,
        };
        gas.validate()?;
        Ok(gas)
    }

    /// No gas at all, particles only interact with surfaces
    pub fn vacuum() -> Self {
        Self {
            sigma: 0.0,
            temperature: 0.0,
            pressure: 0.0,
        }
    }

    /// Check that every parameter is physical
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("sigma", self.sigma),
            ("temperature", self.temperature),
            ("pressure", self.pressure),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(TracerError::InvalidParameter(format!(
                    "gas {} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }
        // A gas at zero temperature would collide after zero distance forever
        if !self.is_vacuum() && self.temperature == 0.0 {
            return Err(TracerError::InvalidParameter(
                "gas temperature must be positive when pressure and sigma are set".to_string(),
            ));
        }
        Ok(())
    }

    /// True when no gas-phase collisions can occur
    pub fn is_vacuum(&self) -> bool {
        self.sigma == 0.0 || self.pressure == 0.0
    }

    /// Mean free path `k·T/(p·sigma)` in metres, `None` in vacuum
    pub fn mean_free_path(&self) -> Option<f64> {
        if self.is_vacuum() {
            None
        } else {
            Some(MFP_CONSTANT * self.temperature / (self.pressure * self.sigma))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_vacuum_has_no_mean_free_path() {
        assert!(Background::vacuum().mean_free_path().is_none());
        let no_cross_section = Background::new(0.0, 300.0, 5.0).unwrap();
        assert!(no_cross_section.mean_free_path().is_none());
        let no_pressure = Background::new(2e-16, 300.0, 0.0).unwrap();
        assert!(no_pressure.mean_free_path().is_none());
    }

    #[test]
    fn test_mean_free_path() {
        let gas = Background::new(2e-16, 300.0, 5.0).unwrap();
        let expected = 1.380_649e-23 * 300.0 / (5.0 * 2e-16 * 1e-4);
        let mfp = gas.mean_free_path().unwrap();
        assert_relative_eq!(mfp, expected, max_relative = 1e-12);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(Background::new(-1.0, 300.0, 5.0).is_err());
        assert!(Background::new(2e-16, f64::NAN, 5.0).is_err());
        assert!(Background::new(2e-16, 0.0, 5.0).is_err());
        assert!(Background::new(2e-16, 0.0, 0.0).is_ok());
    }
}
