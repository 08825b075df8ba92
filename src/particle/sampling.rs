//! Random sampling laws used during transport
//!
//! - Free-flight distances in the background gas (exponential, inverse CDF)
//! - Isotropic redirection after a gas collision
//! - Hemispherical emission around a preferred direction, used both for
//!   randomized particle creation and for Lambertian reflection

use rand::Rng;

use crate::background::Background;
use crate::constants::TAU;
use crate::math::{OrthonormalBasis, Vec3};

/// Sample the distance to the next gas-phase collision
///
/// Returns `f64::INFINITY` in vacuum. Otherwise draws from an exponential
/// distribution with mean equal to the gas mean free path:
/// `d = -mfp * ln(1 - u)`, `u ∈ [0, 1)`.
pub fn free_flight_distance<R: Rng + ?Sized>(gas: &Background, rng: &mut R) -> f64 {
    match gas.mean_free_path() {
        None => f64::INFINITY,
        Some(mfp) => {
            let u: f64 = rng.gen();
            -mfp * (1.0 - u).ln()
        }
    }
}

/// Direction for the polar/azimuthal pair given in a local frame
fn local_direction(cos_theta: f64, phi: f64) -> Vec3 {
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    Vec3::new(sin_theta * phi.sin(), sin_theta * phi.cos(), cos_theta)
}

/// Fully isotropic direction: cosθ uniform on [-1, 1], φ uniform on [0, 2π)
pub fn isotropic_direction<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let cos_theta: f64 = rng.gen_range(-1.0..=1.0);
    let phi = TAU * rng.gen::<f64>();
    local_direction(cos_theta, phi)
}

/// Direction in the hemisphere centred on `axis`
///
/// cosθ is drawn uniformly on [0, 1] relative to `axis` and φ uniformly on
/// [0, 2π); the local vector is rotated into world coordinates through a
/// basis whose z-axis is `axis`. The result always satisfies
/// `result · axis >= 0`. `axis` must not be the zero vector.
pub fn hemisphere_direction<R: Rng + ?Sized>(axis: &Vec3, rng: &mut R) -> Vec3 {
    let cos_theta: f64 = rng.gen_range(0.0..=1.0);
    let phi = TAU * rng.gen::<f64>();
    let basis = OrthonormalBasis::from_z(axis);
    basis.to_world(&local_direction(cos_theta, phi)).unit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_vacuum_flight_is_infinite() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            assert!(free_flight_distance(&Background::vacuum(), &mut rng).is_infinite());
        }
    }

    #[test]
    fn test_free_flight_is_exponential() {
        let gas = Background::new(2e-16, 300.0, 5.0).unwrap();
        let mfp = gas.mean_free_path().unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let n = 200_000;
        let samples: Vec<f64> = (0..n)
            .map(|_| free_flight_distance(&gas, &mut rng))
            .collect();
        assert!(samples.iter().all(|d| d.is_finite() && *d >= 0.0));

        let mean = samples.iter().sum::<f64>() / n as f64;
        assert!(
            (mean - mfp).abs() / mfp < 0.01,
            "sample mean {} too far from mean free path {}",
            mean,
            mfp
        );

        // P(d > mfp) = e^-1 for an exponential law
        let beyond = samples.iter().filter(|d| **d > mfp).count() as f64 / n as f64;
        assert!((beyond - (-1.0_f64).exp()).abs() < 0.01);
    }

    #[test]
    fn test_isotropic_direction_covers_sphere() {
        let mut rng = StdRng::seed_from_u64(7);
        let n = 50_000;
        let mut mean = Vec3::ZERO;
        for _ in 0..n {
            let d = isotropic_direction(&mut rng);
            assert_abs_diff_eq!(d.length(), 1.0, epsilon = 1e-15);
            mean += d;
        }
        let mean = mean.scale(1.0 / n as f64);
        assert!(mean.length() < 0.02, "isotropic mean {:?} is biased", mean);
    }

    #[test]
    fn test_hemisphere_direction_stays_in_hemisphere() {
        let mut rng = StdRng::seed_from_u64(42);
        let axis = Vec3::new(1.0, -5.0, 8.0);
        for _ in 0..1000 {
            let res = hemisphere_direction(&axis, &mut rng);
            assert!(axis.dot(&res) >= 0.0);
            assert_abs_diff_eq!(res.length(), 1.0, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_hemisphere_mean_cosine() {
        // cosθ uniform on [0, 1] has mean 1/2
        let mut rng = StdRng::seed_from_u64(3);
        let axis = Vec3::new(0.0, 0.0, -2.0);
        let n = 50_000;
        let mean_cos = (0..n)
            .map(|_| hemisphere_direction(&axis, &mut rng).dot(&axis.unit()))
            .sum::<f64>()
            / n as f64;
        assert!((mean_cos - 0.5).abs() < 0.01);
    }
}
