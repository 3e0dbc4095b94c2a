// src/math_utils.rs
//! Standard-normal CDF, PDF and quantile function.
//!
//! The inverse CDF must stay accurate near 0 and 1 down to the clipping
//! threshold [`UNIT_CLIP_EPS`], since every uniform-to-normal mapping in the
//! library funnels through it.

use statrs::distribution::{ContinuousCDF, Normal};
use statrs::function::erf;
use std::f64::consts::{PI, SQRT_2};

/// Uniform inputs to the quantile function are clipped to
/// [UNIT_CLIP_EPS, 1 - UNIT_CLIP_EPS] to avoid infinite normal variates.
pub const UNIT_CLIP_EPS: f64 = 1e-10;

/// Standard normal cumulative distribution function Φ(x)
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf::erf(x / SQRT_2))
}

/// Standard normal probability density function
///
/// # Formula
/// ```text
/// φ(x) = (1/√(2π)) * exp(-x²/2)
/// ```
pub fn norm_pdf(x: f64) -> f64 {
    (1.0 / (2.0 * PI).sqrt()) * (-0.5 * x * x).exp()
}

/// Standard normal quantile function Φ⁻¹(p)
///
/// Returns ±∞ at p = 0 and p = 1; callers that cannot tolerate infinities
/// clip first (see [`crate::simulation::qmc_to_normal`]).
pub fn norm_ppf(p: f64) -> f64 {
    // Normal::new only fails for non-finite or non-positive scale.
    let standard = Normal::new(0.0, 1.0).unwrap();
    standard.inverse_cdf(p)
}
