// src/analytics/bs_analytic.rs
//! Closed-form option prices and Greeks used as correctness oracles.
//!
//! # Mathematical Foundation
//!
//! Under the risk-neutral measure with continuous dividend yield q:
//! ```text
//! dS_t = (r - q) S_t dt + σ S_t dW_t
//! ```
//!
//! European options have the Black-Scholes closed form; the zero-strike
//! spread (exchange) option has the Margrabe closed form. The Monte Carlo
//! and QMC integrators in this crate are validated against these formulas,
//! never the other way around.

use crate::math_utils::{norm_cdf, norm_pdf};

/// d₁ parameter of the Black-Scholes formula (with dividend yield)
///
/// ```text
/// d₁ = [ln(S₀/K) + (r - q + σ²/2)T] / (σ√T)
/// ```
pub fn d1(s0: f64, k: f64, r: f64, q: f64, sigma: f64, t: f64) -> f64 {
    ((s0 / k).ln() + (r - q + 0.5 * sigma * sigma) * t) / (sigma * t.sqrt())
}

/// d₂ = d₁ - σ√T
pub fn d2(s0: f64, k: f64, r: f64, q: f64, sigma: f64, t: f64) -> f64 {
    d1(s0, k, r, q, sigma, t) - sigma * t.sqrt()
}

/// Black-Scholes European call price
///
/// ```text
/// C = S₀ e^(-qT) Φ(d₁) - K e^(-rT) Φ(d₂)
/// ```
pub fn black_scholes_call(s0: f64, k: f64, r: f64, q: f64, sigma: f64, t: f64) -> f64 {
    let d1_val = d1(s0, k, r, q, sigma, t);
    let d2_val = d2(s0, k, r, q, sigma, t);
    s0 * (-q * t).exp() * norm_cdf(d1_val) - k * (-r * t).exp() * norm_cdf(d2_val)
}

/// Black-Scholes European put price
///
/// ```text
/// P = K e^(-rT) Φ(-d₂) - S₀ e^(-qT) Φ(-d₁)
/// ```
pub fn black_scholes_put(s0: f64, k: f64, r: f64, q: f64, sigma: f64, t: f64) -> f64 {
    let d1_val = d1(s0, k, r, q, sigma, t);
    let d2_val = d2(s0, k, r, q, sigma, t);
    k * (-r * t).exp() * norm_cdf(-d2_val) - s0 * (-q * t).exp() * norm_cdf(-d1_val)
}

/// Margrabe price of the zero-strike spread option
///
/// Closed form for the exchange payoff max(S₂(T) - S₁(T), 0) on two
/// correlated lognormal underlyings:
/// ```text
/// σ² = σ₁² + σ₂² - 2 ρ σ₁ σ₂
/// d₂ = [ln(S₂₀/S₁₀) + (q₁ - q₂ + σ²/2)T] / (σ√T),   d₁ = d₂ - σ√T
/// V  = e^(-q₂T) S₂₀ Φ(d₂) - e^(-q₁T) S₁₀ Φ(d₁)
/// ```
///
/// Exact only for K = 0; the importance-sampling integrator must converge to
/// this value in that limit.
pub fn margrabe_price(
    s10: f64,
    s20: f64,
    q1: f64,
    q2: f64,
    sigma1: f64,
    sigma2: f64,
    rho: f64,
    t: f64,
) -> f64 {
    let sigma = (sigma1 * sigma1 + sigma2 * sigma2 - 2.0 * sigma1 * sigma2 * rho).sqrt();

    let d2_val = ((s20 / s10).ln() + (q1 - q2 + 0.5 * sigma * sigma) * t) / (sigma * t.sqrt());
    let d1_val = d2_val - sigma * t.sqrt();

    (-q2 * t).exp() * s20 * norm_cdf(d2_val) - (-q1 * t).exp() * s10 * norm_cdf(d1_val)
}

/// Delta of a European call: ∂C/∂S = e^(-qT) Φ(d₁)
pub fn call_delta(s0: f64, k: f64, r: f64, q: f64, sigma: f64, t: f64) -> f64 {
    (-q * t).exp() * norm_cdf(d1(s0, k, r, q, sigma, t))
}

/// Gamma of a European call: ∂²C/∂S² = e^(-qT) φ(d₁) / (S₀ σ √T)
pub fn call_gamma(s0: f64, k: f64, r: f64, q: f64, sigma: f64, t: f64) -> f64 {
    (-q * t).exp() * norm_pdf(d1(s0, k, r, q, sigma, t)) / (sigma * s0 * t.sqrt())
}

/// Vega of a European call: ∂C/∂σ = S₀ e^(-qT) φ(d₁) √T
pub fn call_vega(s0: f64, k: f64, r: f64, q: f64, sigma: f64, t: f64) -> f64 {
    t.sqrt() * s0 * (-q * t).exp() * norm_pdf(d1(s0, k, r, q, sigma, t))
}

/// Theta of a European call (calendar decay, -∂C/∂T convention)
pub fn call_theta(s0: f64, k: f64, r: f64, q: f64, sigma: f64, t: f64) -> f64 {
    let d1_val = d1(s0, k, r, q, sigma, t);
    let d2_val = d2(s0, k, r, q, sigma, t);

    let decay = -sigma * (-q * t).exp() * s0 * norm_pdf(d1_val) / (2.0 * t.sqrt());
    let dividend_carry = q * (-q * t).exp() * s0 * norm_cdf(d1_val);
    let funding = -r * k * (-r * t).exp() * norm_cdf(d2_val);

    decay + dividend_carry + funding
}

/// Rho of a European call: ∂C/∂r = K T e^(-rT) Φ(d₂)
pub fn call_rho(s0: f64, k: f64, r: f64, q: f64, sigma: f64, t: f64) -> f64 {
    k * t * (-r * t).exp() * norm_cdf(d2(s0, k, r, q, sigma, t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_black_scholes_known_value() {
        // S0 = K = 100, r = 5%, q = 0, sigma = 20%, T = 1
        let price = black_scholes_call(100.0, 100.0, 0.05, 0.0, 0.2, 1.0);
        let expected = 10.450583572185565;
        assert!(
            (price - expected).abs() < 1e-9,
            "BS call price {} vs expected {}",
            price,
            expected
        );
    }

    #[test]
    fn test_put_call_parity() {
        // C - P = S0 e^{-qT} - K e^{-rT}
        let (s0, k, r, q, sigma, t) = (100.0, 95.0, 0.05, 0.02, 0.2, 1.0);
        let call = black_scholes_call(s0, k, r, q, sigma, t);
        let put = black_scholes_put(s0, k, r, q, sigma, t);
        let forward = s0 * (-q * t).exp() - k * (-r * t).exp();

        assert!(
            (call - put - forward).abs() < 1e-10,
            "parity violated: C - P = {}, forward = {}",
            call - put,
            forward
        );
    }

    #[test]
    fn test_call_delta_range_and_monotonicity() {
        let delta_itm = call_delta(120.0, 100.0, 0.05, 0.0, 0.2, 1.0);
        let delta_atm = call_delta(100.0, 100.0, 0.05, 0.0, 0.2, 1.0);
        let delta_otm = call_delta(80.0, 100.0, 0.05, 0.0, 0.2, 1.0);

        assert!(delta_otm < delta_atm && delta_atm < delta_itm);
        assert!(delta_otm > 0.0 && delta_itm < 1.0);
    }

    #[test]
    fn test_gamma_vega_positive() {
        assert!(call_gamma(100.0, 100.0, 0.05, 0.02, 0.2, 1.0) > 0.0);
        assert!(call_vega(100.0, 100.0, 0.05, 0.02, 0.2, 1.0) > 0.0);
    }

    #[test]
    fn test_theta_matches_no_dividend_reference() {
        // Classic textbook value for S0 = K = 100, r = 5%, sigma = 20%, T = 1
        let theta = call_theta(100.0, 100.0, 0.05, 0.0, 0.2, 1.0);
        let expected = -6.414027546438197;
        assert!(
            (theta - expected).abs() / expected.abs() < 1e-9,
            "theta {} vs expected {}",
            theta,
            expected
        );
    }

    #[test]
    fn test_margrabe_positive_and_scales() {
        let base = margrabe_price(100.0, 110.0, 0.05, 0.05, 0.3, 0.2, 0.8, 1.0);
        assert!(base > 0.0);

        // Doubling both spots doubles the exchange value (homogeneity)
        let doubled = margrabe_price(200.0, 220.0, 0.05, 0.05, 0.3, 0.2, 0.8, 1.0);
        assert!((doubled - 2.0 * base).abs() < 1e-9);
    }
}
