// src/mc/pricing.rs
//! QMC pricing of European, Asian and lookback options on a single
//! underlying.
//!
//! Each pricer is a discounted average of per-point payoffs over a point set
//! in the unit hypercube: one dimension for European options, one dimension
//! per monitoring date for the path-dependent ones. Points on the boundary
//! of the hypercube (any coordinate ≤ 0) are defined zero-contribution
//! samples, kept in the averaging denominator, the same safety gate the
//! spread integrator applies.
//!
//! Per-point evaluation is a pure function of the read-only parameter
//! bundle, parallel-mapped over rows; contributions are summed in row order
//! so results are reproducible bit-for-bit.

use crate::error::validation::*;
use crate::error::{QmcError, QmcResult};
use crate::math_utils::norm_ppf;
use crate::simulation::{gbm_explicit, gbm_step, qmc_to_normal, standard_error};
use ndarray::{ArrayView1, ArrayView2, Axis};
use rayon::prelude::*;

/// Vanilla option parameter bundle (single underlying)
#[derive(Debug, Clone, Copy)]
pub struct VanillaOption {
    /// Spot price
    pub s0: f64,
    /// Strike
    pub k: f64,
    /// Risk-free rate
    pub r: f64,
    /// Continuous dividend yield
    pub q: f64,
    /// Volatility
    pub sigma: f64,
    /// Time to maturity in years
    pub t: f64,
}

impl VanillaOption {
    /// Validate the parameter bundle
    pub fn validate(&self) -> QmcResult<()> {
        validate_positive("s0", self.s0)?;
        validate_positive("k", self.k)?;
        validate_finite("r", self.r)?;
        validate_non_negative("q", self.q)?;
        validate_positive("sigma", self.sigma)?;
        validate_positive("t", self.t)?;
        Ok(())
    }

    /// Exact terminal price from a single standard normal variate
    fn terminal(&self, z: f64) -> f64 {
        self.s0
            * ((self.r - self.q - 0.5 * self.sigma * self.sigma) * self.t
                + self.sigma * self.t.sqrt() * z)
                .exp()
    }
}

/// A point estimate with its Monte Carlo standard error
#[derive(Debug, Clone, Copy)]
pub struct PricingEstimate {
    pub price: f64,
    pub std_error: f64,
}

/// Price a European call over a 1-D point set
///
/// Works for both pseudo-random and low-discrepancy points; for the latter
/// the standard-error field of [`european_call_estimate`] is a diagnostic,
/// not a confidence interval.
pub fn european_call_mc(opt: &VanillaOption, points: ArrayView1<f64>) -> QmcResult<f64> {
    Ok(european_call_estimate(opt, points)?.price)
}

/// Price a European call and report the sample standard error
pub fn european_call_estimate(
    opt: &VanillaOption,
    points: ArrayView1<f64>,
) -> QmcResult<PricingEstimate> {
    opt.validate()?;

    let discount = (-opt.r * opt.t).exp();
    let discounted: Vec<f64> = points
        .to_vec()
        .into_par_iter()
        .map(|u| {
            if u > 0.0 {
                let st = opt.terminal(norm_ppf(u));
                discount * (st - opt.k).max(0.0)
            } else {
                0.0
            }
        })
        .collect();

    let price = discounted.iter().sum::<f64>() / discounted.len() as f64;
    Ok(PricingEstimate {
        price,
        std_error: standard_error(&discounted),
    })
}

/// Price an arithmetic-average Asian call over an N×m point set
///
/// Payoff: max(avg(S₁, ..., S_m) - K, 0) with m equally spaced monitoring
/// dates. A sample participates only if all m coordinates are strictly
/// positive; otherwise it contributes zero and stays in the denominator.
///
/// # Errors
///
/// `InvalidConfiguration` for zero monitoring dates; `DimensionMismatch`
/// unless the point set has exactly `m` columns.
pub fn asian_call(opt: &VanillaOption, m: usize, points: ArrayView2<f64>) -> QmcResult<f64> {
    opt.validate()?;
    if m == 0 {
        return Err(QmcError::InvalidConfiguration {
            field: "m".to_string(),
            reason: "Asian pricing needs at least one monitoring date".to_string(),
        });
    }
    if points.ncols() != m {
        return Err(QmcError::DimensionMismatch {
            context: "asian_call point set".to_string(),
            expected: m,
            actual: points.ncols(),
        });
    }

    let payoffs: Vec<f64> = points
        .axis_iter(Axis(0))
        .into_par_iter()
        .map(|row| {
            if row.iter().all(|&u| u > 0.0) {
                let z = qmc_to_normal(row);
                let z = z.as_slice().expect("owned 1-D array is contiguous");

                let mut sum = 0.0;
                for j in 0..m {
                    // n = j + 1 never exceeds m, so the step index is valid
                    sum += gbm_explicit(opt.s0, opt.r, opt.sigma, opt.q, j + 1, opt.t, z)
                        .expect("step index within path length");
                }
                (sum / m as f64 - opt.k).max(0.0)
            } else {
                0.0
            }
        })
        .collect();

    Ok((-opt.r * opt.t).exp() * payoffs.iter().sum::<f64>() / payoffs.len() as f64)
}

/// Price a discrete lookback call over an N×m point set
///
/// Payoff: max(max(S₀, S₁, ..., S_m) - K, 0) where the path is built by
/// successive one-step exact GBM multiplications.
pub fn lookback_call(opt: &VanillaOption, points: ArrayView2<f64>) -> QmcResult<f64> {
    lookback(opt, points, |path_extreme_max, _min, k| {
        (path_extreme_max - k).max(0.0)
    })
}

/// Price a discrete lookback put over an N×m point set
///
/// Payoff: max(K - min(S₀, S₁, ..., S_m), 0).
pub fn lookback_put(opt: &VanillaOption, points: ArrayView2<f64>) -> QmcResult<f64> {
    lookback(opt, points, |_max, path_extreme_min, k| {
        (k - path_extreme_min).max(0.0)
    })
}

fn lookback<F>(opt: &VanillaOption, points: ArrayView2<f64>, payoff: F) -> QmcResult<f64>
where
    F: Fn(f64, f64, f64) -> f64 + Sync,
{
    opt.validate()?;

    let m = points.ncols();
    if m == 0 {
        return Err(QmcError::InvalidConfiguration {
            field: "points".to_string(),
            reason: "lookback pricing needs at least one monitoring date".to_string(),
        });
    }
    let dt = opt.t / m as f64;

    let payoffs: Vec<f64> = points
        .axis_iter(Axis(0))
        .into_par_iter()
        .map(|row| {
            if row.iter().all(|&u| u > 0.0) {
                let z = qmc_to_normal(row);

                let mut s = opt.s0;
                let mut running_max = s;
                let mut running_min = s;
                for &zj in z.iter() {
                    s = gbm_step(s, opt.r, opt.q, opt.sigma, dt, zj);
                    running_max = running_max.max(s);
                    running_min = running_min.min(s);
                }
                payoff(running_max, running_min, opt.k)
            } else {
                0.0
            }
        })
        .collect();

    Ok((-opt.r * opt.t).exp() * payoffs.iter().sum::<f64>() / payoffs.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr2, Array1};

    fn test_option() -> VanillaOption {
        VanillaOption {
            s0: 100.0,
            k: 100.0,
            r: 0.05,
            q: 0.02,
            sigma: 0.2,
            t: 1.0,
        }
    }

    #[test]
    fn test_validate_rejects_bad_parameters() {
        let mut opt = test_option();
        opt.sigma = 0.0;
        assert!(opt.validate().is_err());

        let mut opt = test_option();
        opt.s0 = -1.0;
        assert!(opt.validate().is_err());
    }

    #[test]
    fn test_asian_call_rejects_column_mismatch() {
        let opt = test_option();
        let points = arr2(&[[0.5, 0.5], [0.25, 0.75]]);
        assert!(asian_call(&opt, 3, points.view()).is_err());
        assert!(asian_call(&opt, 2, points.view()).is_ok());
    }

    #[test]
    fn test_path_dependent_pricers_reject_zero_monitoring_dates() {
        // An N×0 point set would otherwise average an empty path (0/0)
        let opt = test_option();
        let points = ndarray::Array2::<f64>::zeros((4, 0));
        assert!(asian_call(&opt, 0, points.view()).is_err());
        assert!(lookback_call(&opt, points.view()).is_err());
        assert!(lookback_put(&opt, points.view()).is_err());
    }

    #[test]
    fn test_european_zero_coordinate_contributes_zero() {
        let opt = test_option();
        let single = Array1::from(vec![0.9]);
        let padded = Array1::from(vec![0.0, 0.9]);

        let p1 = european_call_mc(&opt, single.view()).unwrap();
        let p2 = european_call_mc(&opt, padded.view()).unwrap();
        assert!((p2 - 0.5 * p1).abs() < 1e-14);
    }

    #[test]
    fn test_lookback_put_non_negative() {
        let opt = test_option();
        let points = arr2(&[[0.2, 0.4, 0.6], [0.7, 0.1, 0.9], [0.55, 0.35, 0.85]]);
        let price = lookback_put(&opt, points.view()).unwrap();
        assert!(price >= 0.0);
    }
}
