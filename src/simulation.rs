// src/simulation.rs
//! Gaussian mapping and exact GBM path simulation.
//!
//! # Mathematical Framework
//!
//! Geometric Brownian Motion under the risk-neutral measure with continuous
//! dividend yield q:
//! ```text
//! dS_t = (r - q) S_t dt + σ S_t dW_t
//! ```
//!
//! has the exact solution
//! ```text
//! S(t) = S₀ * exp((r - q - σ²/2) t + σ W(t))
//! ```
//!
//! Every function here steps this solution exactly on a uniform time grid
//! from pre-generated standard normal variates; no discretization error is
//! introduced. Uniform QMC points are mapped to normals through the inverse
//! CDF with mandatory clipping away from 0 and 1.

use crate::error::validation::validate_range;
use crate::error::{QmcError, QmcResult};
use crate::math_utils::{norm_ppf, UNIT_CLIP_EPS};
use crate::rng::{get_normal_draw, normal_vec};
use ndarray::{Array1, ArrayView1};
use rand::Rng;

/// Map uniform points in [0, 1) to standard normal variates
///
/// Applies Φ⁻¹ elementwise after clipping inputs to
/// [1e-10, 1 - 1e-10]. The clipping is a numerical-stability safeguard
/// against infinite variates at exactly 0 or 1, not a modeling choice, and
/// is part of the function's contract.
pub fn qmc_to_normal(points: ArrayView1<f64>) -> Array1<f64> {
    points
        .iter()
        .map(|&u| norm_ppf(u.clamp(UNIT_CLIP_EPS, 1.0 - UNIT_CLIP_EPS)))
        .collect()
}

/// Exact GBM value at step `n` of an `m = z.len()` step grid
///
/// ```text
/// S(n) = S₀ * exp((r - q - σ²/2) n Δt + σ √Δt Σ_{k=1}^{n} Z_k),  Δt = T/m
/// ```
///
/// `n = 0` returns `s0` unconditionally without touching `z`.
///
/// # Errors
///
/// `DimensionMismatch` if `n` exceeds the number of supplied variates.
pub fn gbm_explicit(
    s0: f64,
    r: f64,
    sigma: f64,
    q: f64,
    n: usize,
    t: f64,
    z: &[f64],
) -> QmcResult<f64> {
    let m = z.len();
    if n > m {
        return Err(QmcError::DimensionMismatch {
            context: "gbm_explicit step index".to_string(),
            expected: m,
            actual: n,
        });
    }
    if n == 0 {
        return Ok(s0);
    }

    let dt = t / m as f64;
    let sum_z: f64 = z[..n].iter().sum();

    let drift = ((r - q - 0.5 * sigma * sigma) * n as f64 * dt).exp();
    let diffusion = (sigma * dt.sqrt() * sum_z).exp();

    Ok(s0 * drift * diffusion)
}

/// Full exact GBM path of `n + 1` points (including S₀) from `n` normal draws
///
/// Builds the Brownian motion by cumulative √Δt increments on a uniform time
/// grid and evaluates the exact solution at each grid point.
///
/// # Errors
///
/// `DimensionMismatch` unless `z.len() == n`.
pub fn gbm_exact(
    s0: f64,
    t: f64,
    n: usize,
    r: f64,
    q: f64,
    sigma: f64,
    z: &[f64],
) -> QmcResult<Array1<f64>> {
    if z.len() != n {
        return Err(QmcError::DimensionMismatch {
            context: "gbm_exact normal vector".to_string(),
            expected: n,
            actual: z.len(),
        });
    }

    let dt = t / n as f64;
    let sqrt_dt = dt.sqrt();
    let drift = r - q - 0.5 * sigma * sigma;

    let mut path = Array1::zeros(n + 1);
    path[0] = s0;

    let mut w = 0.0;
    for i in 0..n {
        w += sqrt_dt * z[i];
        let ti = dt * (i + 1) as f64;
        path[i + 1] = s0 * (drift * ti + sigma * w).exp();
    }

    Ok(path)
}

/// One exact multiplicative GBM step over an interval of length `dt`
pub fn gbm_step(s: f64, r: f64, q: f64, sigma: f64, dt: f64, z: f64) -> f64 {
    s * ((r - q - 0.5 * sigma * sigma) * dt + sigma * dt.sqrt() * z).exp()
}

/// Two correlated standard normal vectors of length `n`
///
/// Cholesky construction: Z₂ = ρ Z₁ + √(1 - ρ²) Z⊥. The first vector can be
/// caller-supplied (length-checked) or drawn from `rng`. The endpoints
/// ρ = ±1 are valid here and degenerate to Z₂ = ±Z₁; only consumers that
/// divide by √(1 - ρ²) need to reject them.
///
/// # Errors
///
/// `InvalidParameters` for ρ outside [-1, 1]; `DimensionMismatch` for a
/// supplied Z₁ of the wrong length.
pub fn generate_correlated_normals<R: Rng + ?Sized>(
    n: usize,
    rho: f64,
    z1: Option<Array1<f64>>,
    rng: &mut R,
) -> QmcResult<(Array1<f64>, Array1<f64>)> {
    validate_range("rho", rho, -1.0, 1.0)?;

    let z1 = match z1 {
        Some(z) => {
            if z.len() != n {
                return Err(QmcError::DimensionMismatch {
                    context: "generate_correlated_normals Z1".to_string(),
                    expected: n,
                    actual: z.len(),
                });
            }
            z
        }
        None => normal_vec(rng, n),
    };

    let beta = (1.0 - rho * rho).sqrt();
    let z2: Array1<f64> = z1
        .iter()
        .map(|&a| rho * a + beta * get_normal_draw(rng))
        .collect();

    Ok((z1, z2))
}

/// Standard error of a Monte Carlo sample mean: std(samples, ddof=1) / √n
pub fn standard_error(samples: &[f64]) -> f64 {
    let n = samples.len();
    if n <= 1 {
        return 0.0;
    }

    let mean = samples.iter().sum::<f64>() / n as f64;
    let variance =
        samples.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / (n as f64 - 1.0);

    (variance / n as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seed_rng_from_u64;
    use ndarray::array;

    #[test]
    fn test_qmc_to_normal_clips_boundaries() {
        let points = array![0.0, 0.5, 1.0];
        let z = qmc_to_normal(points.view());

        assert!(z[0].is_finite());
        assert!(z[1].abs() < 1e-12);
        assert!(z[2].is_finite());
        assert!(z[0] < -6.0 && z[2] > 6.0);
    }

    #[test]
    fn test_gbm_explicit_step_zero_returns_s0() {
        let z = [1.0, -2.0, 0.5];
        let s = gbm_explicit(100.0, 0.05, 0.2, 0.02, 0, 1.0, &z).unwrap();
        assert_eq!(s, 100.0);
    }

    #[test]
    fn test_gbm_explicit_rejects_step_beyond_path() {
        let z = [0.1, 0.2];
        assert!(gbm_explicit(100.0, 0.05, 0.2, 0.0, 3, 1.0, &z).is_err());
    }

    #[test]
    fn test_gbm_explicit_matches_single_step_formula() {
        let z = [0.7];
        let s = gbm_explicit(100.0, 0.05, 0.2, 0.02, 1, 1.0, &z).unwrap();
        let expected = 100.0 * ((0.05_f64 - 0.02 - 0.5 * 0.04) + 0.2 * 0.7).exp();
        assert!((s - expected).abs() < 1e-12);
    }

    #[test]
    fn test_gbm_exact_path_shape_and_start() {
        let mut rng = seed_rng_from_u64(42);
        let z = normal_vec(&mut rng, 12);
        let path = gbm_exact(100.0, 1.0, 12, 0.05, 0.0, 0.2, z.as_slice().unwrap()).unwrap();

        assert_eq!(path.len(), 13);
        assert_eq!(path[0], 100.0);
        for &s in path.iter() {
            assert!(s > 0.0);
        }
    }

    #[test]
    fn test_gbm_exact_rejects_wrong_length() {
        let z = [0.1, 0.2, 0.3];
        assert!(gbm_exact(100.0, 1.0, 4, 0.05, 0.0, 0.2, &z).is_err());
    }

    #[test]
    fn test_gbm_exact_terminal_matches_explicit() {
        let z = [0.3, -0.8, 1.1, 0.2];
        let path = gbm_exact(100.0, 2.0, 4, 0.03, 0.01, 0.25, &z).unwrap();
        let terminal = gbm_explicit(100.0, 0.03, 0.25, 0.01, 4, 2.0, &z).unwrap();
        assert!((path[4] - terminal).abs() < 1e-9);
    }

    #[test]
    fn test_correlated_normals_sample_correlation() {
        let mut rng = seed_rng_from_u64(42);
        let rho = 0.8;
        let (z1, z2) = generate_correlated_normals(50_000, rho, None, &mut rng).unwrap();

        let n = z1.len() as f64;
        let mean1 = z1.sum() / n;
        let mean2 = z2.sum() / n;
        let mut cov = 0.0;
        let mut var1 = 0.0;
        let mut var2 = 0.0;
        for i in 0..z1.len() {
            cov += (z1[i] - mean1) * (z2[i] - mean2);
            var1 += (z1[i] - mean1) * (z1[i] - mean1);
            var2 += (z2[i] - mean2) * (z2[i] - mean2);
        }
        let sample_rho = cov / (var1.sqrt() * var2.sqrt());

        assert!(
            (sample_rho - rho).abs() < 0.02,
            "sample correlation {} too far from {}",
            sample_rho,
            rho
        );
    }

    #[test]
    fn test_correlated_normals_rejects_rho_outside_closed_range() {
        let mut rng = seed_rng_from_u64(1);
        assert!(generate_correlated_normals(10, 1.5, None, &mut rng).is_err());
        assert!(generate_correlated_normals(10, -1.5, None, &mut rng).is_err());
        assert!(generate_correlated_normals(10, f64::NAN, None, &mut rng).is_err());
    }

    #[test]
    fn test_correlated_normals_degenerate_endpoints() {
        // ρ = ±1 is a valid input here: Z₂ collapses onto ±Z₁ exactly.
        let mut rng = seed_rng_from_u64(3);
        let z1 = normal_vec(&mut rng, 50);

        let (a, b) = generate_correlated_normals(50, 1.0, Some(z1.clone()), &mut rng).unwrap();
        assert_eq!(a, b);

        let (a, b) = generate_correlated_normals(50, -1.0, Some(z1), &mut rng).unwrap();
        for i in 0..a.len() {
            assert_eq!(b[i], -a[i]);
        }
    }

    #[test]
    fn test_standard_error_degenerate() {
        assert_eq!(standard_error(&[]), 0.0);
        assert_eq!(standard_error(&[1.0]), 0.0);
        assert!(standard_error(&[1.0, 2.0, 3.0]) > 0.0);
    }
}
