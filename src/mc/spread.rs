// src/mc/spread.rs
//! Importance-sampling QMC integrator for spread options.
//!
//! # Mathematical Framework
//!
//! Prices the discounted payoff
//! ```text
//! V = e^(-rT) E[ max(w₂ S₂(T) - w₁ S₁(T) - K, 0) ]
//! ```
//! on two correlated lognormal underlyings. Naive integration over the unit
//! square wastes most samples where the payoff is zero. Instead:
//!
//! 1. The first coordinate u₁ drives S₁ directly through the inverse-normal
//!    map and the Cholesky factor c₁₁ = σ₁√T.
//! 2. Conditional on S₁, the break-even quantile g for the second underlying
//!    is solved in closed form; d₂ = Φ(g) is the conditional probability of
//!    the payoff being zero.
//! 3. The second coordinate u₂ is reweighted onto [d₂, 1), so every sample
//!    lands in the exercise region; multiplying the integrand by (1 - d₂)
//!    keeps the estimator unbiased.
//!
//! A periodization transform can be applied upstream; its exact Jacobian
//! multiplies every contribution.
//!
//! # Analytic Greeks
//!
//! Delta and Gamma with respect to each spot are exact closed-form
//! derivatives of the per-sample estimator itself, differentiating through
//! the payoff magnitude *and* through the reweighted quantile (which depends
//! on the spot via g). No finite differences, no automatic differentiation.
//! All five integrands read the same per-sample [`SpreadSample`] so the
//! transcendental calls are paid once per point.

use crate::error::validation::*;
use crate::error::{QmcError, QmcResult};
use crate::math_utils::{norm_cdf, norm_pdf, norm_ppf};
use crate::periodization::Periodization;
use bitflags::bitflags;
use ndarray::{ArrayView1, ArrayView2, Axis};
use rayon::prelude::*;

bitflags! {
    /// Selection of spread-option Greeks for the combined evaluator
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct GreekSet: u32 {
        const DELTA1 = 1 << 0;
        const DELTA2 = 1 << 1;
        const GAMMA1 = 1 << 2;
        const GAMMA2 = 1 << 3;
        const ALL = Self::DELTA1.bits()
            | Self::DELTA2.bits()
            | Self::GAMMA1.bits()
            | Self::GAMMA2.bits();
    }
}

/// Spread option on two correlated lognormal underlyings
///
/// Payoff at maturity: max(w₂ S₂(T) - w₁ S₁(T) - K, 0).
#[derive(Debug, Clone, Copy)]
pub struct SpreadOption {
    /// Weight of the first (short) leg
    pub w1: f64,
    /// Weight of the second (long) leg
    pub w2: f64,
    /// Spot price of the first underlying
    pub s10: f64,
    /// Spot price of the second underlying
    pub s20: f64,
    /// Dividend yield of the first underlying
    pub q1: f64,
    /// Dividend yield of the second underlying
    pub q2: f64,
    /// Volatility of the first underlying
    pub sigma1: f64,
    /// Volatility of the second underlying
    pub sigma2: f64,
    /// Correlation between the two driving Brownian motions
    pub rho: f64,
    /// Risk-free rate
    pub r: f64,
    /// Strike
    pub k: f64,
    /// Time to maturity in years
    pub t: f64,
}

impl SpreadOption {
    /// Validate the parameter bundle
    pub fn validate(&self) -> QmcResult<()> {
        validate_positive("w1", self.w1)?;
        validate_positive("w2", self.w2)?;
        validate_positive("s10", self.s10)?;
        validate_positive("s20", self.s20)?;
        validate_non_negative("q1", self.q1)?;
        validate_non_negative("q2", self.q2)?;
        validate_positive("sigma1", self.sigma1)?;
        validate_positive("sigma2", self.sigma2)?;
        validate_correlation("rho", self.rho)?;
        validate_finite("r", self.r)?;
        validate_non_negative("k", self.k)?;
        validate_positive("t", self.t)?;
        Ok(())
    }

    fn coeffs(&self) -> SpreadCoeffs {
        let sqrt_t = self.t.sqrt();
        SpreadCoeffs {
            mu1t: self.s10.ln() + (self.r - self.q1 - 0.5 * self.sigma1 * self.sigma1) * self.t,
            mu2t: self.s20.ln() + (self.r - self.q2 - 0.5 * self.sigma2 * self.sigma2) * self.t,
            c11: self.sigma1 * sqrt_t,
            c21: self.rho * self.sigma2 * sqrt_t,
            c22: (1.0 - self.rho * self.rho).sqrt() * self.sigma2 * sqrt_t,
        }
    }

    /// Price the spread option over a 2-D point set
    ///
    /// Samples hitting the boundary-safety criteria (u₁ ≤ 0 or reweighted
    /// quantile ≥ 1) contribute zero but stay in the averaging denominator N.
    /// When such skips are frequent (very small T, extreme strikes) this
    /// introduces a small bias; the estimate is reported as-is rather than
    /// resampled.
    pub fn price(&self, points: ArrayView2<f64>, periodization: Periodization) -> QmcResult<f64> {
        self.integrate(points, periodization, "spread price", |sample, _| {
            sample.price_integrand()
        })
    }

    /// Delta with respect to the first spot, ∂V/∂S₁₀
    pub fn delta1(&self, points: ArrayView2<f64>, periodization: Periodization) -> QmcResult<f64> {
        self.integrate(points, periodization, "spread delta1", |sample, opt| {
            sample.delta1_integrand(opt)
        })
    }

    /// Delta with respect to the second spot, ∂V/∂S₂₀
    pub fn delta2(&self, points: ArrayView2<f64>, periodization: Periodization) -> QmcResult<f64> {
        self.integrate(points, periodization, "spread delta2", |sample, opt| {
            sample.delta2_integrand(opt)
        })
    }

    /// Gamma with respect to the first spot, ∂²V/∂S₁₀²
    pub fn gamma1(&self, points: ArrayView2<f64>, periodization: Periodization) -> QmcResult<f64> {
        self.integrate(points, periodization, "spread gamma1", |sample, opt| {
            sample.gamma1_integrand(opt)
        })
    }

    /// Gamma with respect to the second spot, ∂²V/∂S₂₀²
    pub fn gamma2(&self, points: ArrayView2<f64>, periodization: Periodization) -> QmcResult<f64> {
        self.integrate(points, periodization, "spread gamma2", |sample, opt| {
            sample.gamma2_integrand(opt)
        })
    }

    /// Price plus any selected Greeks in a single sweep
    ///
    /// Evaluates the shared per-sample base state once per point and feeds it
    /// to every requested integrand, so the inverse-CDF and exponential calls
    /// are not repeated across price and Greeks. Unselected fields of the
    /// result are zero.
    pub fn greeks(
        &self,
        points: ArrayView2<f64>,
        periodization: Periodization,
        set: GreekSet,
    ) -> QmcResult<SpreadGreeks> {
        self.validate()?;
        check_two_columns(points)?;

        let coeffs = self.coeffs();
        let contributions: Vec<[f64; 5]> = points
            .axis_iter(Axis(0))
            .into_par_iter()
            .map(|point| {
                let (u1, u2, jacobian) = periodize_point(point, periodization);
                match SpreadSample::evaluate(u1, u2, self, &coeffs) {
                    None => [0.0; 5],
                    Some(sample) => {
                        let pick = |flag, value: f64| if set.contains(flag) { value } else { 0.0 };
                        [
                            sample.price_integrand() * jacobian,
                            pick(GreekSet::DELTA1, sample.delta1_integrand(self) * jacobian),
                            pick(GreekSet::DELTA2, sample.delta2_integrand(self) * jacobian),
                            pick(GreekSet::GAMMA1, sample.gamma1_integrand(self) * jacobian),
                            pick(GreekSet::GAMMA2, sample.gamma2_integrand(self) * jacobian),
                        ]
                    }
                }
            })
            .collect();

        let mut totals = [0.0f64; 5];
        for row in &contributions {
            for (total, value) in totals.iter_mut().zip(row.iter()) {
                *total += value;
            }
        }

        // Same discount/average association as `integrate`, so the combined
        // sweep is bit-identical to the individual entry points.
        let n = points.nrows() as f64;
        let discount = (-self.r * self.t).exp();
        let greeks = SpreadGreeks {
            price: discount * totals[0] / n,
            delta1: discount * totals[1] / n,
            delta2: discount * totals[2] / n,
            gamma1: discount * totals[3] / n,
            gamma2: discount * totals[4] / n,
        };

        if !greeks.price.is_finite() {
            return Err(QmcError::NumericalInstability {
                method: "spread greeks".to_string(),
                reason: format!("Price estimate is not finite: {}", greeks.price),
            });
        }

        Ok(greeks)
    }

    /// Shared QMC driver: periodize, evaluate, reweight, discount, average
    ///
    /// Per-point contributions are collected in order and summed
    /// sequentially, so repeated runs on the same inputs are bit-identical
    /// regardless of thread scheduling.
    fn integrate<F>(
        &self,
        points: ArrayView2<f64>,
        periodization: Periodization,
        method: &str,
        integrand: F,
    ) -> QmcResult<f64>
    where
        F: Fn(&SpreadSample, &SpreadOption) -> f64 + Sync,
    {
        self.validate()?;
        check_two_columns(points)?;

        let coeffs = self.coeffs();
        let contributions: Vec<f64> = points
            .axis_iter(Axis(0))
            .into_par_iter()
            .map(|point| {
                let (u1, u2, jacobian) = periodize_point(point, periodization);
                match SpreadSample::evaluate(u1, u2, self, &coeffs) {
                    Some(sample) => integrand(&sample, self) * jacobian,
                    None => 0.0,
                }
            })
            .collect();

        let n = points.nrows() as f64;
        let estimate = (-self.r * self.t).exp() * contributions.iter().sum::<f64>() / n;

        if !estimate.is_finite() {
            return Err(QmcError::NumericalInstability {
                method: method.to_string(),
                reason: format!("Estimate is not finite: {}", estimate),
            });
        }

        Ok(estimate)
    }
}

/// Price and Greeks from a single combined sweep
#[derive(Debug, Clone, Copy, Default)]
pub struct SpreadGreeks {
    pub price: f64,
    pub delta1: f64,
    pub delta2: f64,
    pub gamma1: f64,
    pub gamma2: f64,
}

/// Per-pricing-call constants: drift-adjusted log-means and the closed-form
/// Cholesky factors of the bivariate log-covariance
struct SpreadCoeffs {
    mu1t: f64,
    mu2t: f64,
    c11: f64,
    c21: f64,
    c22: f64,
}

/// Ephemeral per-sample state shared by the price and all four Greek
/// integrands
///
/// Constructed fresh per point, consumed immediately, never shared across
/// samples, which is what makes the parallel map over points trivially
/// safe.
struct SpreadSample {
    /// Terminal value of the short leg, w₁ S₁(T)
    s1: f64,
    /// Terminal value of the long leg, w₂ S₂(T)
    s2: f64,
    /// Raw payoff s2 - s1 - K (≥ 0 by construction inside the sampled region)
    payoff: f64,
    /// Conditional normal quantile of the long leg after reweighting
    z2: f64,
    /// Break-even quantile of the long leg given u₁
    g: f64,
    /// Φ(g): conditional probability of zero payoff (reweighting factor 1 - d2)
    d2: f64,
    /// The (periodized) second coordinate before reweighting
    u2: f64,
    c22: f64,
}

impl SpreadSample {
    /// Evaluate the base state for one point, or `None` for a boundary skip
    fn evaluate(u1: f64, u2: f64, opt: &SpreadOption, coeffs: &SpreadCoeffs) -> Option<Self> {
        // Boundary-safety criterion: the inverse CDF is undefined at u1 = 0
        if u1 <= 0.0 {
            return None;
        }

        let inv_u1 = norm_ppf(u1);
        let s1 = opt.w1 * (coeffs.c11 * inv_u1 + coeffs.mu1t).exp();

        // Conditional break-even quantile for the long leg
        let g = ((s1 + opt.k).ln() - opt.w2.ln() - coeffs.mu2t - coeffs.c21 * inv_u1) / coeffs.c22;
        let d2 = norm_cdf(g);

        // Importance sampling: map u2 onto the conditional interval [d2, 1)
        let reweighted = d2 + u2 * (1.0 - d2);
        if reweighted >= 1.0 {
            return None;
        }

        let z2 = norm_ppf(reweighted);
        let s2 = opt.w2 * (coeffs.c21 * inv_u1 + coeffs.c22 * z2 + coeffs.mu2t).exp();

        Some(SpreadSample {
            s1,
            s2,
            payoff: s2 - s1 - opt.k,
            z2,
            g,
            d2,
            u2,
            c22: coeffs.c22,
        })
    }

    /// Price integrand: payoff times the probability weight of the sampled
    /// region
    fn price_integrand(&self) -> f64 {
        (1.0 - self.d2) * self.payoff
    }

    /// ∂/∂S₁₀ of the per-sample estimator
    ///
    /// Differentiates both the payoff and the reweighting factor: s2 depends
    /// on S₁₀ through the reweighted quantile (the exp(½(z₂² - g²)) factor is
    /// the ratio of normal densities from inverting the conditional CDF).
    fn delta1_integrand(&self, opt: &SpreadOption) -> f64 {
        let density_ratio = (0.5 * (self.z2 * self.z2 - self.g * self.g)).exp();

        let indirect = (self.s2 / (self.s1 + opt.k)) * (1.0 - self.u2) * density_ratio;
        let dpayoff_ds1 = (self.s1 / opt.s10) * (indirect - 1.0);

        let dg_ds1 = self.s1 / (self.c22 * (self.s1 + opt.k) * opt.s10);
        let dd2_ds1 = norm_pdf(self.g) * dg_ds1;

        (1.0 - self.d2) * dpayoff_ds1 - dd2_ds1 * self.payoff
    }

    /// ∂/∂S₂₀ of the per-sample estimator
    fn delta2_integrand(&self, opt: &SpreadOption) -> f64 {
        let density_ratio = (0.5 * (self.z2 * self.z2 - self.g * self.g)).exp();

        let dpayoff_ds2 = (self.s2 / opt.s20) * (1.0 - (1.0 - self.u2) * density_ratio);
        let dd2_ds2 = -(self.s2 / opt.s20) * norm_pdf(self.g) / self.c22;

        (1.0 - self.d2) * dpayoff_ds2 - dd2_ds2 * self.payoff
    }

    /// ∂²/∂S₁₀² of the per-sample estimator
    ///
    /// Product/chain-rule expansion of [`Self::delta1_integrand`]; the exact
    /// algebraic form matters for agreement with finite differences of the
    /// price on the same point set.
    fn gamma1_integrand(&self, opt: &SpreadOption) -> f64 {
        let a1 = self.s1 / ((self.s1 + opt.k) * opt.s10);
        let density_ratio = (0.5 * (self.z2 * self.z2 - self.g * self.g)).exp();
        let tail_mass = (1.0 - self.u2) * density_ratio;

        // First derivatives, as in delta1
        let dpayoff = (self.s1 / opt.s10) * ((self.s2 / (self.s1 + opt.k)) * tail_mass - 1.0);
        let dg = a1 / self.c22;
        let dd2 = norm_pdf(self.g) * dg;

        // Second derivatives
        let term1 = tail_mass * (self.z2 / self.c22 + 1.0);
        let term2 = self.g / self.c22 + 1.0;
        let d2payoff = self.s2 * a1 * a1 * tail_mass * (term1 - term2);

        let d2g = -a1 * a1 / self.c22;
        let d2d2 = dd2 * ((d2g / dg) - dg * self.g);

        (1.0 - self.d2) * d2payoff - 2.0 * dpayoff * dd2 - d2d2 * self.payoff
    }

    /// ∂²/∂S₂₀² of the per-sample estimator
    fn gamma2_integrand(&self, opt: &SpreadOption) -> f64 {
        let a1 = self.s2 / (opt.s20 * self.c22);
        let density_ratio = (0.5 * (self.z2 * self.z2 - self.g * self.g)).exp();
        let tail_mass = (1.0 - self.u2) * density_ratio;

        let dpayoff = (self.s2 / opt.s20) * (1.0 - tail_mass);
        let dd2 = -a1 * norm_pdf(self.g);

        let d2payoff = a1 * a1 * tail_mass * (tail_mass * (self.z2 / self.c22 - 1.0) - self.g / self.c22);
        let d2d2 = a1 * a1 * norm_pdf(self.g) * (self.g / self.c22 - 1.0);

        (1.0 - self.d2) * d2payoff - 2.0 * dpayoff * dd2 - d2d2 * self.payoff
    }
}

fn periodize_point(point: ArrayView1<f64>, periodization: Periodization) -> (f64, f64, f64) {
    let (t1, t2) = (point[0], point[1]);
    let jacobian = periodization.derivative(t1) * periodization.derivative(t2);
    (
        periodization.transform(t1),
        periodization.transform(t2),
        jacobian,
    )
}

fn check_two_columns(points: ArrayView2<f64>) -> QmcResult<()> {
    if points.ncols() != 2 {
        return Err(QmcError::DimensionMismatch {
            context: "spread option point set".to_string(),
            expected: 2,
            actual: points.ncols(),
        });
    }
    Ok(())
}
